// Integration tests (native) for the `scuha-portal` crate.
// These tests drive whole page flows against an in-memory store so they can
// run under `cargo test` on the host.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use scuha_portal::launch::focus_href;
use scuha_portal::protocol::InboundMessage;
use scuha_portal::session::{Effect, ErrorReason, LoadPhase};
use scuha_portal::settings::{Appearance, Theme};
use scuha_portal::{
    Catalog, CatalogView, KeyValueStore, MemoryStore, PortalConfig, SessionController, Settings,
    SettingsController, Tracker,
};

struct NoPage;

impl Appearance for NoPage {
    fn set_class(&self, _class: &str, _enabled: bool) {}
}

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[test]
fn browse_play_and_return_records_history() {
    let config = PortalConfig::default();
    let store = MemoryStore::new();
    let catalog = Catalog::builtin();

    // Catalog page: narrow to puzzles and pick the word game.
    let mut view = CatalogView::new(catalog, config.page_size);
    view.load();
    view.set_category("puzzle");
    view.set_search("Word");
    let picked = view.visible();
    assert_eq!(picked.len(), 1);
    assert!(!view.has_more());
    let href = focus_href(&config.focus_url, picked[0]);
    let (_, query) = href.split_once('?').unwrap();

    // Focus page: load, play for a while, go back.
    let settings = Settings::load(&store, &config.settings_key);
    let tracker = Tracker::new(store.clone(), &config);
    let mut session = SessionController::new(&config, tracker, settings, true);
    let fx = session.enter(query, Some(catalog), t0());
    assert!(fx.contains(&Effect::SetTitle("Word Hunt - SCUHA".into())));
    assert_eq!(session.phase(), LoadPhase::Loading);

    session.frame_loaded(t0() + Duration::seconds(2));
    assert_eq!(session.phase(), LoadPhase::Ready);
    assert!(session.pending_timers().is_empty());

    session.message(
        InboundMessage::GameComplete {
            data: json!({"score": 42}).as_object().unwrap().clone(),
        },
        t0() + Duration::seconds(60),
    );
    let fx = session.return_to_catalog(t0() + Duration::seconds(90));
    assert_eq!(fx.last(), Some(&Effect::Navigate(config.catalog_url.clone())));

    let tracker = Tracker::new(store.clone(), &config);
    assert_eq!(tracker.recently_played()[0].id, "word-hunt");
    assert_eq!(tracker.completions("word-hunt").len(), 1);
    let record = tracker.session("word-hunt").unwrap();
    assert_eq!(record.session_duration, 90_000);
}

#[test]
fn clearing_game_data_keeps_preferences() {
    let config = PortalConfig::default();
    let store = MemoryStore::new();
    let mut settings = SettingsController::new(store.clone(), NoPage, &config.settings_key);
    settings.update("theme", json!("light")).unwrap();
    settings.update("autoFullscreen", json!(true)).unwrap();

    let tracker = Tracker::new(store.clone(), &config);
    tracker.toggle_favorite("tetris").unwrap();
    let slope = Catalog::builtin().game_by_id("slope").unwrap();
    tracker
        .record_played(scuha_portal::tracker::RecentEntry::from_game(slope, t0()))
        .unwrap();
    store.set_item("tetris-highscore", "9000").unwrap();

    let removed = settings.clear_game_data().unwrap();
    assert_eq!(removed, 3);
    assert!(tracker.favorites().is_empty());
    assert!(tracker.recently_played().is_empty());

    let reloaded = Settings::load(&store, &config.settings_key);
    assert_eq!(reloaded.theme, Theme::Light);
    assert!(reloaded.auto_fullscreen);
    assert_eq!(store.keys().unwrap(), [config.settings_key.clone()]);
}

#[test]
fn unknown_game_without_source_fails_without_timers() {
    let config = PortalConfig::default();
    let tracker = Tracker::new(MemoryStore::new(), &config);
    let mut session = SessionController::new(&config, tracker, Settings::default(), false);
    let fx = session.enter("?game=not-in-catalog", Some(Catalog::builtin()), t0());
    assert_eq!(session.phase(), LoadPhase::Error);
    assert!(fx.contains(&Effect::ShowError(ErrorReason::MissingParameters)));
    assert!(session.pending_timers().is_empty());
    assert!(session.reload().is_empty());
}

#[test]
fn stored_auto_fullscreen_applies_on_ready() {
    let config = PortalConfig::default();
    let store = MemoryStore::new();
    store
        .set_item(&config.settings_key, r#"{"autoFullscreen":true}"#)
        .unwrap();
    let settings = Settings::load(&store, &config.settings_key);
    let mut session = SessionController::new(&config, Tracker::new(store, &config), settings, false);
    session.enter("game=snake", Some(Catalog::builtin()), t0());
    session.frame_loaded(t0());
    assert!(session.fullscreen().is_active());
    assert!(session.fullscreen().is_simulated());
}
