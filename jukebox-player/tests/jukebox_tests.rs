//! Command facade tests: discovery, enqueue summaries and session lookups

mod helpers;

use helpers::{wait_for_plays, StaticCatalog, StaticResolver, TestJukebox};
use jukebox_common::{ChannelId, PlaybackPhase, SessionId};
use jukebox_player::presentation::EnqueueSummary;
use jukebox_player::{Error, PlayRequest};
use std::sync::Arc;

const S1: SessionId = SessionId(1);
const CH: ChannelId = ChannelId(10);

fn request(query: &str) -> PlayRequest {
    PlayRequest {
        session_id: S1,
        channel_id: Some(CH),
        requester: "alice".to_string(),
        query: query.to_string(),
    }
}

#[tokio::test]
async fn test_single_track_starts_playback() {
    let tj = TestJukebox::new(StaticResolver::new().with("never gonna", "Never Gonna", 213));

    let outcome = tj.jukebox.play(request("never gonna")).await.unwrap();
    assert!(outcome.started_playback);
    assert_eq!(outcome.queue_length, 0);

    match &outcome.summary {
        EnqueueSummary::Single { playing, card } => {
            assert!(*playing);
            assert_eq!(card.title, "Never Gonna");
            assert_eq!(card.requester, "alice");
            assert_eq!(card.duration, "3:33");
            assert_eq!(card.volume_percent, 100);
        }
        other => panic!("expected single summary, got {:?}", other),
    }

    let play = tj.gateway.log().plays[0].clone();
    assert_eq!(play.title, "Never Gonna");
    assert_eq!(play.channel, CH);
}

#[tokio::test]
async fn test_second_play_is_queued_behind_current() {
    let tj = TestJukebox::new(
        StaticResolver::new()
            .with("first", "First", 100)
            .with("second", "Second", 100),
    );

    tj.jukebox.play(request("first")).await.unwrap();
    let outcome = tj.jukebox.play(request("second")).await.unwrap();
    assert!(!outcome.started_playback);
    assert_eq!(outcome.queue_length, 1);
    assert!(outcome.summary.to_string().starts_with("➕ Added to queue"));

    let listing = tj.jukebox.queue(S1).await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing.entries[0].title, "Second");
    assert_eq!(listing.entries[0].position, 1);
}

#[tokio::test]
async fn test_blank_query_finds_nothing() {
    let tj = TestJukebox::new(StaticResolver::new());
    let err = tj.jukebox.play(request("   ")).await.unwrap_err();
    assert!(matches!(err, Error::NothingFound(_)));
    assert!(tj.resolver.calls.lock().unwrap().is_empty());
    assert!(tj.registry.is_empty().await);
}

#[tokio::test]
async fn test_requester_outside_voice_is_rejected_before_resolution() {
    let tj = TestJukebox::new(StaticResolver::new().with("song", "Song", 100));
    let mut req = request("song");
    req.channel_id = None;

    let err = tj.jukebox.play(req).await.unwrap_err();
    assert!(matches!(err, Error::NotInVoiceChannel));
    assert_eq!(err.user_message(), "You need to be in a voice channel.");
    assert!(tj.resolver.calls.lock().unwrap().is_empty());
    assert!(tj.gateway.log().connects.is_empty());
}

#[tokio::test]
async fn test_unresolvable_query_enqueues_nothing() {
    let tj = TestJukebox::new(StaticResolver::new());

    let err = tj.jukebox.play(request("no such song")).await.unwrap_err();
    assert!(matches!(err, Error::NothingFound(ref q) if q == "no such song"));
    assert!(tj.gateway.log().connects.is_empty());
    assert_eq!(
        tj.jukebox.state(S1).await.unwrap().phase,
        PlaybackPhase::Idle
    );
}

#[tokio::test]
async fn test_catalog_playlist_keeps_order_and_skips_failures() {
    let resolver = StaticResolver::new()
        .with("artist - one", "One", 100)
        .with("artist - three", "Three", 100);
    let catalog = StaticCatalog(vec![
        "artist - one".to_string(),
        "artist - two".to_string(),
        "artist - three".to_string(),
    ]);
    let tj = TestJukebox::with_catalog(resolver, Arc::new(catalog));

    let outcome = tj
        .jukebox
        .play(request("https://open.spotify.com/playlist/37i9dQZF1DX?si=abc"))
        .await
        .unwrap();

    match &outcome.summary {
        EnqueueSummary::Playlist { total, preview, more } => {
            assert_eq!(*total, 2);
            assert_eq!(*more, 0);
            let titles: Vec<&str> = preview.iter().map(|l| l.title.as_str()).collect();
            assert_eq!(titles, vec!["One", "Three"]);
        }
        other => panic!("expected playlist summary, got {:?}", other),
    }
    assert!(outcome.started_playback);
    assert_eq!(outcome.queue_length, 1);

    assert_eq!(tj.resolver.calls.lock().unwrap().len(), 3);
    assert_eq!(tj.gateway.log().titles(), vec!["One"]);
}

#[tokio::test]
async fn test_first_query_fails_second_is_the_only_track() {
    let catalog = StaticCatalog(vec!["missing".to_string(), "found".to_string()]);
    let tj = TestJukebox::with_catalog(
        StaticResolver::new().with("found", "Found", 90),
        Arc::new(catalog),
    );

    let outcome = tj
        .jukebox
        .play(request("https://open.spotify.com/album/abc"))
        .await
        .unwrap();

    // A single survivor is summarised like a single track
    assert!(matches!(outcome.summary, EnqueueSummary::Single { playing: true, .. }));
    assert_eq!(outcome.queue_length, 0);

    let state = tj.jukebox.state(S1).await.unwrap();
    assert_eq!(state.current.unwrap().title, "Found");
    assert!(state.upcoming.is_empty());
    assert_eq!(tj.gateway.log().titles(), vec!["Found"]);
}

#[tokio::test]
async fn test_catalog_expansion_where_every_lookup_fails() {
    let catalog = StaticCatalog(vec!["a".to_string(), "b".to_string()]);
    let tj = TestJukebox::with_catalog(StaticResolver::new(), Arc::new(catalog));

    let err = tj
        .jukebox
        .play(request("https://open.spotify.com/album/1DFixLWuPkv3KT3TnV35m3"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NothingFound(_)));
    assert!(tj.gateway.log().plays.is_empty());
}

#[tokio::test]
async fn test_large_playlist_summary_is_truncated() {
    let mut resolver = StaticResolver::new();
    let mut queries = Vec::new();
    for i in 1..=13 {
        let query = format!("song {i}");
        resolver = resolver.with(&query, &format!("Song {i}"), 60);
        queries.push(query);
    }
    let tj = TestJukebox::with_catalog(resolver, Arc::new(StaticCatalog(queries)));

    let outcome = tj
        .jukebox
        .play(request("https://open.spotify.com/intl-de/playlist/abc123"))
        .await
        .unwrap();

    match &outcome.summary {
        EnqueueSummary::Playlist { total, preview, more } => {
            assert_eq!(*total, 13);
            assert_eq!(preview.len(), 10);
            assert_eq!(preview[9].title, "Song 10");
            assert_eq!(*more, 3);
        }
        other => panic!("expected playlist summary, got {:?}", other),
    }
    assert!(outcome.summary.to_string().ends_with("…and 3 more"));
    assert_eq!(outcome.queue_length, 12);
}

#[tokio::test]
async fn test_malformed_catalog_link_is_reported() {
    let tj = TestJukebox::with_catalog(
        StaticResolver::new(),
        Arc::new(StaticCatalog(vec!["x".to_string()])),
    );

    for link in [
        "https://open.spotify.com/artist/0OdUWJ0sBjDrqHygGUXeCF",
        "https://open.spotify.com/track/",
        "https://open.spotify.com/playlist/bad-id!",
    ] {
        let err = tj.jukebox.play(request(link)).await.unwrap_err();
        assert!(matches!(err, Error::CatalogLink(_)), "{} gave {:?}", link, err);
    }
    assert!(tj.resolver.calls.lock().unwrap().is_empty());
    assert!(tj.registry.is_empty().await);
}

#[tokio::test]
async fn test_catalog_links_need_an_expander() {
    let tj = TestJukebox::new(StaticResolver::new());
    let err = tj
        .jukebox
        .play(request("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CatalogLink(_)));
    assert_eq!(err.user_message(), "Unable to read this catalog link.");
}

#[tokio::test]
async fn test_queue_and_controls_without_session() {
    let tj = TestJukebox::new(StaticResolver::new());

    assert!(matches!(tj.jukebox.queue(S1).await, Err(Error::EmptyQueue)));
    assert!(matches!(tj.jukebox.skip(S1).await, Err(Error::InvalidControl(_))));
    assert!(matches!(tj.jukebox.pause(S1).await, Err(Error::InvalidControl(_))));
    assert!(matches!(tj.jukebox.resume(S1).await, Err(Error::InvalidControl(_))));

    let report = tj.jukebox.stop(S1).await.unwrap();
    assert_eq!(report.cleared, 0);
    assert!(!report.disconnected);

    let state = tj.jukebox.state(S1).await.unwrap();
    assert_eq!(state.phase, PlaybackPhase::Idle);
    assert_eq!(state.volume, 1.0);

    // Read-only lookups never create sessions
    assert!(tj.registry.is_empty().await);
}

#[tokio::test]
async fn test_volume_before_first_play_applies_to_it() {
    let tj = TestJukebox::new(StaticResolver::new().with("song", "Song", 100));

    assert_eq!(tj.jukebox.volume(S1, 35).await.unwrap(), 35);
    assert!(matches!(
        tj.jukebox.volume(S1, 250).await,
        Err(Error::InvalidVolume(250))
    ));

    let outcome = tj.jukebox.play(request("song")).await.unwrap();
    match outcome.summary {
        EnqueueSummary::Single { card, .. } => assert_eq!(card.volume_percent, 35),
        other => panic!("expected single summary, got {:?}", other),
    }
    assert_eq!(tj.gateway.log().plays[0].gain, 0.35);
}

#[tokio::test]
async fn test_skip_through_facade_reports_title() {
    let tj = TestJukebox::new(
        StaticResolver::new()
            .with("a", "A", 100)
            .with("b", "B", 100),
    );
    tj.jukebox.play(request("a")).await.unwrap();
    tj.jukebox.play(request("b")).await.unwrap();

    assert_eq!(tj.jukebox.skip(S1).await.unwrap(), "A");
    wait_for_plays(&tj.gateway, 2).await;
    assert!(matches!(tj.jukebox.queue(S1).await, Err(Error::EmptyQueue)));
}
