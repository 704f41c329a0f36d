// Manual debugging helpers, reachable from the CLI and the REPL

use crate::catalog::CATALOG_KEY;
use crate::document::Region;
use crate::error::Result;
use crate::profile::{PaintOutcome, ProfilePanel, fetch_api_data};
use crate::store::Storage;
use tracing::info;
use vitrine_client::ProfileClient;

/// Logs and returns the raw serialized catalog.
pub fn view_storage(store: &dyn Storage) -> Result<Option<String>> {
    let raw = store.get_item(CATALOG_KEY)?;
    info!("LocalStorage: {}", raw.as_deref().unwrap_or("null"));
    Ok(raw)
}

/// Erases every key in the store. Returns how many keys were removed.
pub fn clear_storage(store: &mut dyn Storage) -> Result<usize> {
    let removed = store.keys()?.len();
    store.clear()?;
    info!("storage cleared");
    Ok(removed)
}

pub async fn refresh_customer(
    client: &ProfileClient,
    panel: &mut ProfilePanel,
    region: &mut Region,
) -> Result<PaintOutcome> {
    fetch_api_data(client, panel, region).await
}
