//! Test helper modules for jukebox-player integration tests
//!
//! Provides reusable test infrastructure components:
//! - ScriptedVoiceGateway: voice backend whose streams end on command
//! - RecordingChat: chat surface that records posts, reactions, announcements
//! - StaticResolver / StaticCatalog: in-memory discovery collaborators
//! - TestJukebox: everything wired together, plus wait helpers

#![allow(dead_code)]

pub mod chat;
pub mod resolver;
pub mod voice;

pub use chat::{PostedCard, RecordingChat};
pub use resolver::{StaticCatalog, StaticResolver};
pub use voice::{PlayRecord, ScriptedVoiceGateway};

use jukebox_common::{EventBus, PlaybackPhase, SessionId};
use jukebox_player::control::ReactionHub;
use jukebox_player::playback::{ControllerSettings, PlaybackServices, SessionHandle};
use jukebox_player::resolve::{CatalogExpander, DisabledCatalog};
use jukebox_player::session::SessionRegistry;
use jukebox_player::Jukebox;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for anything a test waits on
pub const WAIT: Duration = Duration::from_secs(5);

/// Fully wired jukebox over test doubles
pub struct TestJukebox {
    pub gateway: ScriptedVoiceGateway,
    pub chat: Arc<RecordingChat>,
    pub resolver: Arc<StaticResolver>,
    pub events: EventBus,
    pub reactions: ReactionHub,
    pub registry: SessionRegistry,
    pub jukebox: Jukebox,
}

impl TestJukebox {
    pub fn new(resolver: StaticResolver) -> Self {
        Self::build(resolver, Arc::new(DisabledCatalog), ControllerSettings::default())
    }

    pub fn with_catalog(resolver: StaticResolver, catalog: Arc<dyn CatalogExpander>) -> Self {
        Self::build(resolver, catalog, ControllerSettings::default())
    }

    pub fn build(
        resolver: StaticResolver,
        catalog: Arc<dyn CatalogExpander>,
        settings: ControllerSettings,
    ) -> Self {
        let gateway = ScriptedVoiceGateway::new();
        let chat = Arc::new(RecordingChat::new());
        let resolver = Arc::new(resolver);
        let events = EventBus::new(1024);
        let reactions = ReactionHub::new(64);

        let registry = SessionRegistry::new(PlaybackServices {
            gateway: Arc::new(gateway.clone()),
            chat: chat.clone(),
            reactions: reactions.clone(),
            events: events.clone(),
            settings,
        });
        let jukebox = Jukebox::new(registry.clone(), resolver.clone(), catalog, 4);

        Self {
            gateway,
            chat,
            resolver,
            events,
            reactions,
            registry,
            jukebox,
        }
    }

    pub async fn session(&self, session_id: SessionId) -> SessionHandle {
        self.registry.get_or_create(session_id).await
    }
}

/// Wait until the session publishes `phase`
pub async fn wait_for_phase(handle: &SessionHandle, phase: PlaybackPhase) {
    let mut status = handle.status();
    tokio::time::timeout(WAIT, status.wait_for(|s| s.phase == phase))
        .await
        .unwrap_or_else(|_| panic!("session never reached {}", phase))
        .expect("controller alive");
}

/// Poll `condition` until it holds
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Wait until `count` streams were started overall
pub async fn wait_for_plays(gateway: &ScriptedVoiceGateway, count: usize) {
    wait_until(&format!("{} plays", count), || gateway.log().plays.len() >= count).await;
}
