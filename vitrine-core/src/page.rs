use crate::catalog::initialize_storage;
use crate::document::{API_CONTENT, CARDS_CONTAINER, Document, Region};
use crate::error::Result;
use crate::profile::{FetchTicket, PaintOutcome, PaintPolicy, ProfilePanel};
use crate::render::render_cards;
use crate::store::Storage;
use crate::wiring::{
    DEFAULT_ICON_SRC, FALLBACK_ICON_SRC, IconStatus, Reaction, UiEvent, Wiring, load_profile_icon,
};
use tracing::info;
use vitrine_client::{FetchError, ProfileClient, ProfileRecord};

/// Options for opening a page
#[derive(Debug, Clone)]
pub struct PageConfig {
    pub icon_src: String,
    pub fallback_icon_src: String,
    pub paint_policy: PaintPolicy,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            icon_src: DEFAULT_ICON_SRC.to_string(),
            fallback_icon_src: FALLBACK_ICON_SRC.to_string(),
            paint_policy: PaintPolicy::default(),
        }
    }
}

/// An open page: its document plus the state the handlers work against.
pub struct Page {
    pub document: Document,
    pub panel: ProfilePanel,
    pub wiring: Wiring,
}

impl Page {
    /// Runs the load sequence up to the point where the first profile fetch
    /// is in flight: seed, render cards, paint loading, attach handlers.
    pub fn open(store: &mut dyn Storage, config: &PageConfig) -> Result<(Self, FetchTicket)> {
        Self::open_document(Document::new(&config.icon_src), store, config)
    }

    /// Like `open`, against a caller-supplied document. Any step whose element
    /// is missing aborts the load with `MissingElement`.
    pub fn open_document(
        document: Document,
        store: &mut dyn Storage,
        config: &PageConfig,
    ) -> Result<(Self, FetchTicket)> {
        Self::load(document, store, config, ProfilePanel::new(config.paint_policy))
    }

    /// Runs the load sequence again for a page that replaces this one.
    /// Request numbering carries on from this page's last ticket.
    pub fn reopen(
        &self,
        store: &mut dyn Storage,
        config: &PageConfig,
    ) -> Result<(Self, FetchTicket)> {
        let panel = ProfilePanel::resume(config.paint_policy, self.panel.issued());
        Self::load(Document::new(&config.icon_src), store, config, panel)
    }

    fn load(
        mut document: Document,
        store: &mut dyn Storage,
        config: &PageConfig,
        mut panel: ProfilePanel,
    ) -> Result<(Self, FetchTicket)> {
        info!("website started");

        initialize_storage(store)?;
        render_cards(store, document.region_mut(CARDS_CONTAINER)?)?;

        let ticket = panel.begin(document.region_mut(API_CONTENT)?);

        let wiring = Wiring::attach(&document, &config.fallback_icon_src)?;

        Ok((
            Self {
                document,
                panel,
                wiring,
            },
            ticket,
        ))
    }

    pub fn begin_fetch(&mut self) -> Result<FetchTicket> {
        Ok(self.panel.begin(self.document.region_mut(API_CONTENT)?))
    }

    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: std::result::Result<ProfileRecord, FetchError>,
    ) -> Result<PaintOutcome> {
        let region = self.document.region_mut(API_CONTENT)?;
        self.panel.complete(region, ticket, outcome)
    }

    pub async fn refresh(&mut self, client: &ProfileClient) -> Result<PaintOutcome> {
        let ticket = self.begin_fetch()?;
        let outcome = client.fetch_profile().await;
        self.complete_fetch(ticket, outcome)
    }

    pub fn dispatch(&mut self, event: &UiEvent) -> Result<Reaction> {
        self.wiring.dispatch(&mut self.document, event)
    }

    pub async fn load_icon(&mut self, client: &ProfileClient) -> Result<IconStatus> {
        load_profile_icon(client, &mut self.document, &self.wiring).await
    }

    /// Re-renders the cards from the store.
    pub fn render_cards(&mut self, store: &dyn Storage) -> Result<usize> {
        render_cards(store, self.document.region_mut(CARDS_CONTAINER)?)
    }

    pub fn region(&self, id: &str) -> Result<&Region> {
        self.document.region(id)
    }

    pub fn to_html(&self) -> Result<String> {
        self.document.to_html()
    }
}

/// Opens a page and waits for the first profile fetch and the icon to settle.
pub async fn load_page(
    store: &mut dyn Storage,
    client: &ProfileClient,
    config: &PageConfig,
) -> Result<(Page, PaintOutcome)> {
    let (mut page, ticket) = Page::open(store, config)?;
    let outcome = client.fetch_profile().await;
    let painted = page.complete_fetch(ticket, outcome)?;
    page.load_icon(client).await?;
    Ok((page, painted))
}
