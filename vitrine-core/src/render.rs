// Markup for cards, the profile panel and the full page

use crate::catalog::{ProductCard, load_catalog};
use crate::document::{Document, Element, Region};
use crate::error::Result;
use crate::store::Storage;
use askama::Template;
use tracing::info;
use vitrine_client::ProfileRecord;

pub const EMPTY_CATALOG_HTML: &str = "<p>no products found</p>";

#[derive(Template)]
#[template(path = "card.html")]
struct CardTemplate<'a> {
    card: &'a ProductCard,
}

struct ProfileField<'a> {
    label: &'static str,
    value: &'a str,
}

#[derive(Template)]
#[template(path = "profile.html")]
struct ProfileTemplate<'a> {
    fields: Vec<ProfileField<'a>>,
}

#[derive(Template)]
#[template(path = "error_panel.html")]
struct ErrorPanelTemplate<'a> {
    message: &'a str,
}

struct ControlView<'a> {
    id: &'a str,
    kind: &'static str,
    label: &'a str,
    src: &'a str,
}

struct RegionView<'a> {
    id: &'a str,
    html: &'a str,
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    title: &'a str,
    controls: Vec<ControlView<'a>>,
    regions: Vec<RegionView<'a>>,
}

pub fn render_card(card: &ProductCard) -> Result<String> {
    Ok(CardTemplate { card }.render()?)
}

/// Fills `region` with one card per stored product, in stored order.
///
/// A missing or empty catalog shows the empty-state message. A stored value
/// that does not parse aborts rendering and leaves the region as it was.
pub fn render_cards(store: &dyn Storage, region: &mut Region) -> Result<usize> {
    info!("loading products");

    let cards = match load_catalog(store)? {
        Some(cards) if !cards.is_empty() => cards,
        _ => {
            region.set_inner_html(EMPTY_CATALOG_HTML);
            return Ok(0);
        }
    };

    // Render everything up front so a template failure cannot leave a half-built list.
    let rendered = cards
        .iter()
        .map(render_card)
        .collect::<Result<Vec<_>>>()?;

    region.clear();
    for card in &rendered {
        region.append_html(card);
    }

    Ok(rendered.len())
}

/// One line per card: title, then price and category.
///
/// An empty catalog yields the region's placeholder text instead.
pub fn card_lines(region: &Region) -> Result<Vec<String>> {
    let titles = region.block_text(".card h3")?;
    if titles.is_empty() {
        return Ok(vec![region.text()]);
    }

    let meta = region.block_text(".card .card-meta")?;
    Ok(titles
        .into_iter()
        .zip(meta)
        .map(|(title, meta)| format!("{} ({})", title, meta))
        .collect())
}

/// Visible text of the profile panel, one entry per line of the view.
pub fn panel_lines(region: &Region) -> Result<Vec<String>> {
    let selector = if region.count(".user-info")? > 0 {
        ".user-info p"
    } else if region.count(".error-panel")? > 0 {
        ".error-panel strong, .error-panel p"
    } else {
        return Ok(vec![region.text()]);
    };

    region.block_text(selector)
}

pub fn render_profile(record: &ProfileRecord) -> Result<String> {
    let fields = record
        .fields()
        .into_iter()
        .map(|(label, value)| ProfileField { label, value })
        .collect();

    Ok(ProfileTemplate { fields }.render()?)
}

pub fn render_error_panel(message: &str) -> Result<String> {
    Ok(ErrorPanelTemplate { message }.render()?)
}

/// Standalone HTML page: controls in the header, containers in the body.
pub fn render_document(document: &Document) -> Result<String> {
    let mut controls = Vec::new();
    let mut regions = Vec::new();

    for (id, element) in document.elements() {
        match element {
            Element::Container(region) => regions.push(RegionView {
                id,
                html: region.inner_html(),
            }),
            Element::Button(button) => controls.push(ControlView {
                id,
                kind: element.kind(),
                label: &button.label,
                src: "",
            }),
            Element::Image(image) => controls.push(ControlView {
                id,
                kind: element.kind(),
                label: &image.alt,
                src: &image.src,
            }),
        }
    }

    let page = PageTemplate {
        title: document.title(),
        controls,
        regions,
    };
    Ok(page.render()?)
}

impl Document {
    pub fn to_html(&self) -> Result<String> {
        render_document(self)
    }
}
