//! Referral attribution capture and lookup.
//!
//! On navigation the query string is inspected for a referral marker; a
//! successfully resolved marker is persisted locally and supplied at
//! submission time while still inside its validity window. Capture never
//! blocks rendering: resolution failures are logged and swallowed.

pub mod store;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collaborators::JobStore;

pub use store::{AttributionStore, FileStore, MemoryStore};

/// Query-string parameter carrying the referral marker.
pub const REFERRAL_PARAM: &str = "ref";

/// Days a captured token stays eligible for attribution.
pub const ATTRIBUTION_WINDOW_DAYS: i64 = 30;

/// Persisted referral record. Wire shape is fixed:
/// `{"listingId": ..., "slug": ..., "timestamp": epoch-millis}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionToken {
    pub listing_id: String,
    pub slug: String,
    /// Capture time, epoch milliseconds.
    pub timestamp: i64,
}

impl AttributionToken {
    /// Whether the token is still inside the attribution window.
    pub fn eligible(&self, now: DateTime<Utc>) -> bool {
        let age_ms = now.timestamp_millis() - self.timestamp;
        age_ms < Duration::days(ATTRIBUTION_WINDOW_DAYS).num_milliseconds()
    }
}

/// Extract the referral marker from a query string (with or without a
/// leading `?`).
pub fn referral_marker(query: &str) -> Option<&str> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == REFERRAL_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Capture a referral from the query string, if one is present.
///
/// Resolves the marker to its listing and overwrites any previously stored
/// token (most-recent-referral-wins). Failures never propagate: an
/// unresolvable marker simply leaves attribution as it was.
pub async fn capture_from_query(
    store: &dyn AttributionStore,
    jobs: &dyn JobStore,
    query: &str,
    now: DateTime<Utc>,
) {
    let Some(marker) = referral_marker(query) else {
        return;
    };
    match jobs.resolve_referral(marker).await {
        Ok(listing) => {
            let token = AttributionToken {
                listing_id: listing.id,
                slug: marker.to_string(),
                timestamp: now.timestamp_millis(),
            };
            // Serializing a flat struct cannot fail; storage errors are
            // swallowed like resolution errors.
            let raw = serde_json::to_string(&token).unwrap_or_default();
            if let Err(e) = store.write_raw(&raw) {
                debug!(marker, error = %e, "attribution write failed");
            }
        }
        Err(e) => {
            debug!(marker, error = %e, "referral resolution failed");
        }
    }
}

/// The attributed listing id, when a stored token exists, parses, and is
/// still inside the 30-day window. Pure read; corrupt records are treated
/// as absent.
pub fn referred_by_listing_id(store: &dyn AttributionStore, now: DateTime<Utc>) -> Option<String> {
    let raw = store.read_raw()?;
    let token: AttributionToken = serde_json::from_str(&raw).ok()?;
    token.eligible(now).then_some(token.listing_id)
}
