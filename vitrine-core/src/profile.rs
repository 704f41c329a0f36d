// Remote profile panel: loading, success and error views

use crate::document::Region;
use crate::error::Result;
use crate::render::{render_error_panel, render_profile};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use vitrine_client::{FetchError, ProfileClient, ProfileRecord};

pub const LOADING_HTML: &str = r#"<p class="loading">getting customer info...</p>"#;

/// Which response gets painted when fetches overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaintPolicy {
    /// Only the most recently issued request may paint; older responses are dropped.
    #[default]
    LatestRequest,
    /// Whatever resolves last wins, even if it was issued first.
    LastResolved,
}

impl PaintPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "latest" | "latest-request" => Some(PaintPolicy::LatestRequest),
            "last-resolved" | "last" => Some(PaintPolicy::LastResolved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaintPolicy::LatestRequest => "latest",
            PaintPolicy::LastResolved => "last-resolved",
        }
    }
}

/// Identity of one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintOutcome {
    Success,
    Failure(String),
    /// Response belonged to a superseded request and was not painted.
    Stale,
}

/// Bookkeeping for the profile region across overlapping fetches.
#[derive(Debug, Clone)]
pub struct ProfilePanel {
    policy: PaintPolicy,
    issued: u64,
    state: PanelState,
    last_record: Option<ProfileRecord>,
}

impl ProfilePanel {
    pub fn new(policy: PaintPolicy) -> Self {
        Self {
            policy,
            issued: 0,
            state: PanelState::Idle,
            last_record: None,
        }
    }

    /// A fresh panel whose tickets continue after `issued`, so responses to
    /// requests made by an earlier panel are never taken for the latest one.
    pub fn resume(policy: PaintPolicy, issued: u64) -> Self {
        Self {
            issued,
            ..Self::new(policy)
        }
    }

    pub fn policy(&self) -> PaintPolicy {
        self.policy
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    /// Last successfully fetched record, kept for inspection only.
    pub fn last_record(&self) -> Option<&ProfileRecord> {
        self.last_record.as_ref()
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Paints the loading placeholder and hands out a ticket for the request.
    pub fn begin(&mut self, region: &mut Region) -> FetchTicket {
        info!("getting customer data from server");
        self.issued += 1;
        self.state = PanelState::Loading;
        region.set_inner_html(LOADING_HTML);
        FetchTicket(self.issued)
    }

    /// Paints the outcome of a fetch, unless the policy marks it stale.
    pub fn complete(
        &mut self,
        region: &mut Region,
        ticket: FetchTicket,
        outcome: std::result::Result<ProfileRecord, FetchError>,
    ) -> Result<PaintOutcome> {
        if self.policy == PaintPolicy::LatestRequest && ticket.0 != self.issued {
            debug!(
                "Discarding response for request {} (latest is {})",
                ticket.0, self.issued
            );
            return Ok(PaintOutcome::Stale);
        }

        match outcome {
            Ok(record) => {
                info!("got customer data");
                let html = render_profile(&record)?;
                self.last_record = Some(record);
                region.set_inner_html(html);
                self.state = PanelState::Loaded;
                Ok(PaintOutcome::Success)
            }
            Err(e) => {
                error!("ERROR: {}", e);
                let message = e.to_string();
                region.set_inner_html(render_error_panel(&message)?);
                self.state = PanelState::Failed(message.clone());
                Ok(PaintOutcome::Failure(message))
            }
        }
    }
}

/// The full loading → success|error sequence for one request.
pub async fn fetch_api_data(
    client: &ProfileClient,
    panel: &mut ProfilePanel,
    region: &mut Region,
) -> Result<PaintOutcome> {
    let ticket = panel.begin(region);
    let outcome = client.fetch_profile().await;
    panel.complete(region, ticket, outcome)
}
