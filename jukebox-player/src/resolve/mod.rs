//! Track discovery collaborators
//!
//! Turning a query into playable tracks is delegated: a [`TrackResolver`]
//! resolves one text query or URL, and a [`catalog::CatalogExpander`] turns
//! a catalog link into search queries. Only the narrow interfaces live here.

pub mod catalog;
pub mod ytdlp;

pub use catalog::{CatalogExpander, CatalogKind, CatalogLink, DisabledCatalog};
pub use ytdlp::YtDlpResolver;

use crate::error::Result;
use crate::session::Track;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

/// Resolves one query into a playable track
#[async_trait]
pub trait TrackResolver: Send + Sync {
    /// # Returns
    /// * `Ok(track)` - First match, with `requester` recorded on it
    /// * `Err(Error::Resolution)` - Nothing playable for this query
    async fn resolve(&self, query: &str, requester: &str) -> Result<Track>;
}

/// Resolve `queries` with at most `concurrency` lookups in flight
///
/// Results keep the order of `queries`. Failed queries are skipped with a
/// warning; an empty result is for the caller to report.
pub async fn resolve_batch(
    resolver: &dyn TrackResolver,
    queries: &[String],
    requester: &str,
    concurrency: usize,
) -> Vec<Track> {
    let tracks: Vec<Track> = stream::iter(queries.iter().cloned())
        .map(|query: String| async move {
            match resolver.resolve(&query, requester).await {
                Ok(track) => Some(track),
                Err(e) => {
                    warn!(%query, error = %e, "Skipping query that failed to resolve");
                    None
                }
            }
        })
        .buffered(concurrency.max(1))
        .filter_map(|track| async move { track })
        .collect()
        .await;

    debug!(requested = queries.len(), resolved = tracks.len(), "Batch resolved");
    tracks
}
