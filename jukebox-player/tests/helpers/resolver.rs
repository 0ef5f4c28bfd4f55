//! In-memory resolver and catalog

use async_trait::async_trait;
use jukebox_player::resolve::{CatalogExpander, CatalogLink, TrackResolver};
use jukebox_player::session::Track;
use jukebox_player::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Resolves only the queries it was taught
#[derive(Default)]
pub struct StaticResolver {
    known: Mutex<HashMap<String, (String, u64, String)>>,
    pub calls: Mutex<Vec<String>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Teach `query` to resolve to a track titled `title`
    pub fn with(self, query: &str, title: &str, seconds: u64) -> Self {
        self.known.lock().unwrap().insert(
            query.to_string(),
            (title.to_string(), seconds, "Uploader".to_string()),
        );
        self
    }
}

#[async_trait]
impl TrackResolver for StaticResolver {
    async fn resolve(&self, query: &str, requester: &str) -> Result<Track> {
        self.calls.lock().unwrap().push(query.to_string());
        let known = self.known.lock().unwrap().get(query).cloned();
        match known {
            Some((title, seconds, uploader)) => Ok(Track::new(
                format!("https://media.test/{}", query.replace(' ', "_")),
                title,
                seconds,
                requester,
                uploader,
            )),
            None => Err(Error::Resolution {
                query: query.to_string(),
                reason: "no match".to_string(),
            }),
        }
    }
}

/// Expands every catalog link to a fixed list of queries
pub struct StaticCatalog(pub Vec<String>);

#[async_trait]
impl CatalogExpander for StaticCatalog {
    async fn expand(&self, _link: &CatalogLink) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}
