//! Catalog links (track / album / playlist pages of a streaming catalog)
//!
//! Recognising a catalog link is local; expanding it into search queries
//! needs the catalog's API and is left to a [`CatalogExpander`].

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

const CATALOG_HOST: &str = "open.spotify.com";

/// What a catalog link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Track,
    Album,
    Playlist,
}

impl CatalogKind {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "track" => Some(CatalogKind::Track),
            "album" => Some(CatalogKind::Album),
            "playlist" => Some(CatalogKind::Playlist),
            _ => None,
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CatalogKind::Track => "track",
            CatalogKind::Album => "album",
            CatalogKind::Playlist => "playlist",
        })
    }
}

/// A parsed catalog link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogLink {
    pub kind: CatalogKind,
    pub id: String,
}

impl CatalogLink {
    /// Classify user input
    ///
    /// # Returns
    /// * `Ok(None)` - Not a catalog link; use it as a plain query
    /// * `Ok(Some(link))` - A recognised catalog link
    /// * `Err(Error::CatalogLink)` - Catalog host, but unusable path
    pub fn parse(input: &str) -> Result<Option<Self>> {
        let input = input.trim();
        let without_scheme = input
            .strip_prefix("https://")
            .or_else(|| input.strip_prefix("http://"))
            .unwrap_or(input);

        let Some(path) = without_scheme.strip_prefix(CATALOG_HOST) else {
            return Ok(None);
        };

        // Query string and fragment never carry the id
        let path = path.split(['?', '#']).next().unwrap_or_default();

        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let mut kind_segment = segments.next();
        // Locale prefixes such as /intl-fr/
        if kind_segment.is_some_and(|s| s.starts_with("intl-")) {
            kind_segment = segments.next();
        }

        let kind = kind_segment
            .and_then(CatalogKind::from_segment)
            .ok_or_else(|| Error::CatalogLink(format!("unsupported catalog link: {input}")))?;

        let id = segments
            .next()
            .filter(|id| id.chars().all(|c| c.is_ascii_alphanumeric()))
            .ok_or_else(|| Error::CatalogLink(format!("missing {kind} id in {input}")))?;

        Ok(Some(Self {
            kind,
            id: id.to_string(),
        }))
    }
}

impl fmt::Display for CatalogLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "https://{}/{}/{}", CATALOG_HOST, self.kind, self.id)
    }
}

/// Expands a catalog link into "title artist" search queries
#[async_trait]
pub trait CatalogExpander: Send + Sync {
    async fn expand(&self, link: &CatalogLink) -> Result<Vec<String>>;
}

/// Expander used when no catalog credentials are configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCatalog;

#[async_trait]
impl CatalogExpander for DisabledCatalog {
    async fn expand(&self, link: &CatalogLink) -> Result<Vec<String>> {
        Err(Error::CatalogLink(format!(
            "catalog integration is not configured ({link})"
        )))
    }
}
