//! Runtime configuration shared by every page.
//!
//! A `PortalConfig` is built once by the page entry point and handed down by
//! reference; nothing reads it through a global.

/// Prefix shared by every key that holds per-user game data. `clear_game_data`
/// relies on it, so new game-data keys must start with it.
pub const GAME_DATA_PREFIX: &str = "game-";

/// Messages cycled on the loading overlay while a game frame loads.
pub const LOADING_MESSAGES: &[&str] = &[
    "Loading Game...",
    "Preparing Assets...",
    "Initializing...",
    "Almost Ready...",
];

#[derive(Clone, Debug, PartialEq)]
pub struct PortalConfig {
    /// Cards revealed per "load more" step.
    pub page_size: usize,
    pub load_timeout_ms: u32,
    pub status_rotation_ms: u32,
    pub recent_capacity: usize,
    /// Delay between successive card insertions in one reveal.
    pub card_stagger_ms: u32,
    pub notification_ms: u32,
    pub settings_key: String,
    pub favorites_key: String,
    pub recent_key: String,
    pub completions_key: String,
    pub catalog_url: String,
    pub focus_url: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            page_size: 6,
            load_timeout_ms: 30_000,
            status_rotation_ms: 2_000,
            recent_capacity: 10,
            card_stagger_ms: 100,
            notification_ms: 3_000,
            settings_key: "scuhameds-settings".to_string(),
            favorites_key: format!("{GAME_DATA_PREFIX}favorites"),
            recent_key: format!("{GAME_DATA_PREFIX}recent"),
            completions_key: format!("{GAME_DATA_PREFIX}completions"),
            catalog_url: "projects.html".to_string(),
            focus_url: "focus.html".to_string(),
        }
    }
}

impl PortalConfig {
    /// Storage key of the session-duration record for one game.
    pub fn session_key(&self, game_id: &str) -> String {
        format!("{GAME_DATA_PREFIX}session-{game_id}")
    }
}
