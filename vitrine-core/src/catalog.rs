// Seed catalog and the store keys it lives under

use crate::error::{Result, VitrineError};
use crate::store::Storage;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const CATALOG_KEY: &str = "devToolsCards";
pub const LAST_VISIT_KEY: &str = "lastVisit";

/// One product entry. `price` is a display label, not a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCard {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: String,
}

impl ProductCard {
    fn new(id: i64, title: &str, description: &str, category: &str, price: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            price: price.to_string(),
        }
    }
}

pub fn seed_catalog() -> Vec<ProductCard> {
    vec![
        ProductCard::new(
            1,
            "Gaming Laptop",
            "Super fast laptop for gaming and stuff. Has RGB lights and runs all the latest games pretty good. My friend has one and says its awesome!",
            "Electronics",
            "$899",
        ),
        ProductCard::new(
            2,
            "Wireless Headphones",
            "These headphones are really cool. They have noise canceling (i think) and the battery lasts like forever. Good for music and calls.",
            "Audio",
            "$149",
        ),
        ProductCard::new(
            3,
            "Smartwatch",
            "This watch can track your steps and heart rate and stuff. Also you can get notifications on it which is handy when your phone is not near you.",
            "Wearables",
            "$299",
        ),
        ProductCard::new(
            4,
            "Portable Charger",
            "Big power bank that charges your phone like 4 times. Really useful when traveling or when you forget to charge overnight lol.",
            "Accessories",
            "$45",
        ),
    ]
}

/// What `initialize_storage` did on this load.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedOutcome {
    pub seeded: bool,
    pub last_visit: DateTime<Utc>,
}

/// Writes the seed catalog if none is stored, then stamps the visit time.
///
/// Any non-empty stored value counts as present, even one that no longer
/// parses. Write failures propagate.
pub fn initialize_storage(store: &mut dyn Storage) -> Result<SeedOutcome> {
    initialize_storage_at(store, Utc::now())
}

pub fn initialize_storage_at(store: &mut dyn Storage, now: DateTime<Utc>) -> Result<SeedOutcome> {
    let stored = store.get_item(CATALOG_KEY)?;
    let seeded = stored.as_deref().is_none_or(str::is_empty);

    if seeded {
        info!("saving products to storage");
        let serialized = serde_json::to_string(&seed_catalog())?;
        store.set_item(CATALOG_KEY, &serialized)?;
    }

    store.set_item(LAST_VISIT_KEY, &format_timestamp(now))?;

    Ok(SeedOutcome {
        seeded,
        last_visit: now,
    })
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Reads the catalog. `None` when the key is missing or holds an empty string.
pub fn load_catalog(store: &dyn Storage) -> Result<Option<Vec<ProductCard>>> {
    let Some(raw) = store.get_item(CATALOG_KEY)? else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }

    // A stored JSON `null` reads as no catalog at all.
    serde_json::from_str::<Option<Vec<ProductCard>>>(&raw).map_err(|source| {
        VitrineError::CorruptValue {
            key: CATALOG_KEY.to_string(),
            source,
        }
    })
}

/// Parsed last-visit stamp, if one is stored and readable.
pub fn last_visit(store: &dyn Storage) -> Result<Option<DateTime<Utc>>> {
    let stamp = store.get_item(LAST_VISIT_KEY)?;
    Ok(stamp
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}
