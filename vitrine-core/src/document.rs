// In-memory page document: named elements components render into

use crate::error::{Result, VitrineError};
use scraper::{Html, Selector};

pub const CARDS_CONTAINER: &str = "cardsContainer";
pub const API_CONTENT: &str = "apiContent";
pub const DEBUG_BTN: &str = "debugBtn";
pub const PROFILE_ICON: &str = "profileIcon";

pub const PAGE_TITLE: &str = "Dev Tools Store";

/// A container element whose inner markup components replace or append to.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    id: String,
    html: String,
}

impl Region {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            html: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn inner_html(&self) -> &str {
        &self.html
    }

    pub fn set_inner_html(&mut self, html: impl Into<String>) {
        self.html = html.into();
    }

    pub fn append_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub fn clear(&mut self) {
        self.html.clear();
    }

    /// All text content, whitespace collapsed.
    pub fn text(&self) -> String {
        let fragment = Html::parse_fragment(&self.html);
        collapse_whitespace(&fragment.root_element().text().collect::<String>())
    }

    /// Text of each element matching `selector`, in document order.
    pub fn block_text(&self, selector: &str) -> Result<Vec<String>> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.html);

        Ok(fragment
            .select(&selector)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|line| !line.is_empty())
            .collect())
    }

    /// Value of `attr` on each element matching `selector` that carries it.
    pub fn attr_values(&self, selector: &str, attr: &str) -> Result<Vec<String>> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.html);

        Ok(fragment
            .select(&selector)
            .filter_map(|el| el.value().attr(attr).map(str::to_string))
            .collect())
    }

    pub fn count(&self, selector: &str) -> Result<usize> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.html);
        Ok(fragment.select(&selector).count())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| VitrineError::InvalidSelector(format!("{}: {}", selector, e)))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Container(Region),
    Button(Button),
    Image(Image),
}

impl Element {
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Container(_) => "container",
            Element::Button(_) => "button",
            Element::Image(_) => "image",
        }
    }
}

/// The page: an ordered set of elements addressed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    title: String,
    elements: Vec<(String, Element)>,
}

impl Document {
    /// The standard page with all four elements the components expect.
    pub fn new(icon_src: &str) -> Self {
        let mut doc = Self::empty(PAGE_TITLE);
        doc.insert(
            PROFILE_ICON,
            Element::Image(Image {
                src: icon_src.to_string(),
                alt: "Profile".to_string(),
            }),
        );
        doc.insert(
            DEBUG_BTN,
            Element::Button(Button {
                label: "Refresh customer".to_string(),
            }),
        );
        doc.insert(CARDS_CONTAINER, Element::Container(Region::new(CARDS_CONTAINER)));
        doc.insert(API_CONTENT, Element::Container(Region::new(API_CONTENT)));
        doc
    }

    pub fn empty(title: &str) -> Self {
        Self {
            title: title.to_string(),
            elements: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Adds an element, replacing any existing one with the same id in place.
    pub fn insert(&mut self, id: &str, element: Element) {
        if let Some(slot) = self.elements.iter_mut().find(|(eid, _)| eid == id) {
            slot.1 = element;
        } else {
            self.elements.push((id.to_string(), element));
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Element> {
        let pos = self.elements.iter().position(|(eid, _)| eid == id)?;
        Some(self.elements.remove(pos).1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.iter().any(|(eid, _)| eid == id)
    }

    pub fn elements(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.elements.iter().map(|(id, el)| (id.as_str(), el))
    }

    pub fn get_element_by_id(&self, id: &str) -> Result<&Element> {
        self.elements
            .iter()
            .find(|(eid, _)| eid == id)
            .map(|(_, el)| el)
            .ok_or_else(|| VitrineError::MissingElement(id.to_string()))
    }

    fn get_element_by_id_mut(&mut self, id: &str) -> Result<&mut Element> {
        self.elements
            .iter_mut()
            .find(|(eid, _)| eid == id)
            .map(|(_, el)| el)
            .ok_or_else(|| VitrineError::MissingElement(id.to_string()))
    }

    pub fn region(&self, id: &str) -> Result<&Region> {
        match self.get_element_by_id(id)? {
            Element::Container(region) => Ok(region),
            _ => Err(wrong_element(id, "a container")),
        }
    }

    pub fn region_mut(&mut self, id: &str) -> Result<&mut Region> {
        match self.get_element_by_id_mut(id)? {
            Element::Container(region) => Ok(region),
            _ => Err(wrong_element(id, "a container")),
        }
    }

    pub fn button(&self, id: &str) -> Result<&Button> {
        match self.get_element_by_id(id)? {
            Element::Button(button) => Ok(button),
            _ => Err(wrong_element(id, "a button")),
        }
    }

    pub fn image(&self, id: &str) -> Result<&Image> {
        match self.get_element_by_id(id)? {
            Element::Image(image) => Ok(image),
            _ => Err(wrong_element(id, "an image")),
        }
    }

    pub fn image_mut(&mut self, id: &str) -> Result<&mut Image> {
        match self.get_element_by_id_mut(id)? {
            Element::Image(image) => Ok(image),
            _ => Err(wrong_element(id, "an image")),
        }
    }
}

fn wrong_element(id: &str, expected: &'static str) -> VitrineError {
    VitrineError::WrongElement {
        id: id.to_string(),
        expected,
    }
}
