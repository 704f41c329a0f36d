// Event handlers for the refresh control and the profile icon

use crate::document::{DEBUG_BTN, Document, PROFILE_ICON};
use crate::error::Result;
use tracing::{debug, info, warn};
use vitrine_client::ProfileClient;

pub const DEFAULT_ICON_SRC: &str = "https://github.com/AlapanDas.png";

/// Blue circle with a person glyph, inline so it cannot fail to load.
pub const FALLBACK_ICON_SRC: &str = "data:image/svg+xml,%3Csvg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22%3E%3Ccircle cx=%2250%22 cy=%2250%22 r=%2250%22 fill=%22%234285F4%22/%3E%3Ctext x=%2250%22 y=%2250%22 font-size=%2240%22 text-anchor=%22middle%22 dy=%22.3em%22 fill=%22white%22%3E%F0%9F%91%A4%3C/text%3E%3C/svg%3E";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Click(String),
    ImageError(String),
}

impl UiEvent {
    pub fn click(id: &str) -> Self {
        UiEvent::Click(id.to_string())
    }
}

/// What the caller has to do after an event was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// Start a new profile fetch.
    RefreshProfile,
    /// Handler only logged.
    Logged,
    FallbackApplied(String),
    /// The fallback itself failed; the source is left alone.
    FallbackFailed,
    /// No handler is attached to the target.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconStatus {
    Loaded(String),
    Broken(String),
}

/// Handlers attached to the refresh control and the profile icon.
#[derive(Debug, Clone)]
pub struct Wiring {
    fallback_src: String,
}

impl Wiring {
    /// Both elements must exist; a missing one aborts wiring.
    pub fn attach(document: &Document, fallback_src: &str) -> Result<Self> {
        document.button(DEBUG_BTN)?;
        document.image(PROFILE_ICON)?;

        Ok(Self {
            fallback_src: fallback_src.to_string(),
        })
    }

    pub fn fallback_src(&self) -> &str {
        &self.fallback_src
    }

    pub fn dispatch(&self, document: &mut Document, event: &UiEvent) -> Result<Reaction> {
        match event {
            UiEvent::Click(id) if id == DEBUG_BTN => {
                info!("refreshing customer data...");
                Ok(Reaction::RefreshProfile)
            }
            UiEvent::Click(id) if id == PROFILE_ICON => {
                info!("profile clicked");
                Ok(Reaction::Logged)
            }
            UiEvent::ImageError(id) if id == PROFILE_ICON => self.apply_fallback(document),
            _ => {
                debug!("No handler for {:?}", event);
                Ok(Reaction::Ignored)
            }
        }
    }

    fn apply_fallback(&self, document: &mut Document) -> Result<Reaction> {
        warn!("image failed to load");
        let icon = document.image_mut(PROFILE_ICON)?;

        if icon.src == self.fallback_src {
            warn!("fallback image failed to load, keeping current source");
            return Ok(Reaction::FallbackFailed);
        }

        icon.src = self.fallback_src.clone();
        Ok(Reaction::FallbackApplied(icon.src.clone()))
    }
}

/// Loads the profile icon, firing the image-error handler when it fails.
///
/// Each substituted source is loaded again, the way a browser reloads a new
/// `src`; the fallback guard keeps this to two attempts.
pub async fn load_profile_icon(
    client: &ProfileClient,
    document: &mut Document,
    wiring: &Wiring,
) -> Result<IconStatus> {
    loop {
        let src = document.image(PROFILE_ICON)?.src.clone();

        match client.probe(&src).await {
            Ok(()) => return Ok(IconStatus::Loaded(src)),
            Err(e) => {
                debug!("Icon {} failed: {}", src, e);
                let event = UiEvent::ImageError(PROFILE_ICON.to_string());
                match wiring.dispatch(document, &event)? {
                    Reaction::FallbackApplied(_) => continue,
                    _ => return Ok(IconStatus::Broken(src)),
                }
            }
        }
    }
}
