//! User preferences: one JSON record under a fixed key, merged over
//! compiled-in defaults and reflected on the page as body classes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::GAME_DATA_PREFIX;
use crate::error::{SettingsError, StorageError};
use crate::storage::{KeyValueStore, read_json, write_json};

pub const LIGHT_THEME_CLASS: &str = "light-theme";
pub const NO_ANIMATIONS_CLASS: &str = "no-animations";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performance {
    Low,
    #[default]
    High,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub animations: bool,
    pub performance: Performance,
    pub auto_fullscreen: bool,
    pub sound: bool,
    pub analytics: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            animations: true,
            performance: Performance::High,
            auto_fullscreen: false,
            sound: true,
            analytics: false,
        }
    }
}

impl Settings {
    /// Stored values merged key by key over the defaults. Unknown keys and
    /// values of the wrong shape are skipped; a missing or unreadable record
    /// yields the defaults.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Self {
        let mut settings = Settings::default();
        let Some(stored) = read_json::<S, Map<String, Value>>(store, key) else {
            return settings;
        };
        for (name, value) in stored {
            if let Err(err) = settings.set(&name, value) {
                warn!(error = %err, "ignoring stored setting");
            }
        }
        settings
    }

    /// Sets one option by its wire name.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        fn parse<T: serde::de::DeserializeOwned>(key: &str, value: Value) -> Result<T, SettingsError> {
            serde_json::from_value(value).map_err(|e| SettingsError::InvalidValue {
                key: key.to_string(),
                reason: e.to_string(),
            })
        }
        match key {
            "theme" => self.theme = parse(key, value)?,
            "animations" => self.animations = parse(key, value)?,
            "performance" => self.performance = parse(key, value)?,
            "autoFullscreen" => self.auto_fullscreen = parse(key, value)?,
            "sound" => self.sound = parse(key, value)?,
            "analytics" => self.analytics = parse(key, value)?,
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Current value of a boolean option.
    pub fn flag(&self, key: &str) -> Result<bool, SettingsError> {
        match key {
            "animations" => Ok(self.animations),
            "autoFullscreen" => Ok(self.auto_fullscreen),
            "sound" => Ok(self.sound),
            "analytics" => Ok(self.analytics),
            "theme" | "performance" => Err(SettingsError::InvalidValue {
                key: key.to_string(),
                reason: "not a toggle".to_string(),
            }),
            _ => Err(SettingsError::UnknownKey(key.to_string())),
        }
    }
}

/// Where settings become visible: class toggles on the page body.
pub trait Appearance {
    fn set_class(&self, class: &str, enabled: bool);
}

pub fn apply_appearance<A: Appearance + ?Sized>(settings: &Settings, appearance: &A) {
    appearance.set_class(LIGHT_THEME_CLASS, settings.theme == Theme::Light);
    appearance.set_class(NO_ANIMATIONS_CLASS, !settings.animations);
}

/// Keys holding per-user game data, as opposed to preferences.
pub fn is_game_data_key(key: &str) -> bool {
    key.starts_with(GAME_DATA_PREFIX) || key.contains("score") || key.contains("progress")
}

pub struct SettingsController<S, A> {
    store: S,
    appearance: A,
    key: String,
    settings: Settings,
}

impl<S: KeyValueStore, A: Appearance> SettingsController<S, A> {
    /// Loads the stored record and applies it.
    pub fn new(store: S, appearance: A, key: &str) -> Self {
        let settings = Settings::load(&store, key);
        apply_appearance(&settings, &appearance);
        Self {
            store,
            appearance,
            key: key.to_string(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn appearance(&self) -> &A {
        &self.appearance
    }

    /// Re-reads the stored record and applies it.
    pub fn load(&mut self) -> &Settings {
        self.settings = Settings::load(&self.store, &self.key);
        apply_appearance(&self.settings, &self.appearance);
        &self.settings
    }

    /// Changes one option, applies it, then writes the record. A failed write
    /// leaves the change applied in memory and is returned to the caller.
    pub fn update(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.settings.set(key, value)?;
        apply_appearance(&self.settings, &self.appearance);
        self.save()?;
        Ok(())
    }

    /// Flips a boolean option. Returns the new value.
    pub fn toggle(&mut self, key: &str) -> Result<bool, SettingsError> {
        let next = !self.settings.flag(key)?;
        self.update(key, Value::Bool(next))?;
        Ok(next)
    }

    pub fn save(&self) -> Result<(), StorageError> {
        write_json(&self.store, &self.key, &self.settings)
    }

    /// Restores the compiled-in defaults, applies and stores them.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.settings = Settings::default();
        apply_appearance(&self.settings, &self.appearance);
        self.save()
    }

    /// Removes every game-data key and leaves preferences alone. Returns the
    /// number of keys removed.
    pub fn clear_game_data(&self) -> Result<usize, StorageError> {
        let doomed: Vec<String> = self
            .store
            .keys()?
            .into_iter()
            .filter(|k| *k != self.key && is_game_data_key(k))
            .collect();
        for key in &doomed {
            self.store.remove_item(key)?;
        }
        info!(removed = doomed.len(), "game data cleared");
        Ok(doomed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::BTreeSet;

    const KEY: &str = "scuhameds-settings";

    #[derive(Default)]
    struct Body(RefCell<BTreeSet<String>>);

    impl Appearance for Body {
        fn set_class(&self, class: &str, enabled: bool) {
            let mut classes = self.0.borrow_mut();
            if enabled {
                classes.insert(class.to_string());
            } else {
                classes.remove(class);
            }
        }
    }

    impl Body {
        fn has(&self, class: &str) -> bool {
            self.0.borrow().contains(class)
        }
    }

    #[test]
    fn empty_store_loads_defaults() {
        assert_eq!(Settings::load(&MemoryStore::new(), KEY), Settings::default());
    }

    #[test]
    fn partial_record_overrides_only_its_keys() {
        let store = MemoryStore::new();
        store.set_item(KEY, r#"{"theme":"light"}"#).unwrap();
        let loaded = Settings::load(&store, KEY);
        assert_eq!(
            loaded,
            Settings {
                theme: Theme::Light,
                ..Settings::default()
            }
        );
    }

    #[test]
    fn malformed_values_fall_back_per_key() {
        let store = MemoryStore::new();
        store
            .set_item(KEY, r#"{"theme":"purple","sound":false,"extra":1}"#)
            .unwrap();
        let loaded = Settings::load(&store, KEY);
        assert_eq!(loaded.theme, Theme::Dark);
        assert!(!loaded.sound);
        store.set_item(KEY, "not json at all").unwrap();
        assert_eq!(Settings::load(&store, KEY), Settings::default());
    }

    #[test]
    fn update_applies_and_persists_immediately() {
        let store = MemoryStore::new();
        let mut ctl = SettingsController::new(store.clone(), Body::default(), KEY);
        assert!(!ctl.appearance().has(LIGHT_THEME_CLASS));
        ctl.update("theme", json!("light")).unwrap();
        assert!(ctl.appearance().has(LIGHT_THEME_CLASS));
        assert_eq!(ctl.toggle("animations").unwrap(), false);
        assert!(ctl.appearance().has(NO_ANIMATIONS_CLASS));
        let stored = Settings::load(&store, KEY);
        assert_eq!(stored.theme, Theme::Light);
        assert!(!stored.animations);
    }

    #[test]
    fn update_rejects_unknown_keys_and_bad_values() {
        let mut ctl = SettingsController::new(MemoryStore::new(), Body::default(), KEY);
        assert!(matches!(
            ctl.update("volume", json!(3)),
            Err(SettingsError::UnknownKey(_))
        ));
        assert!(matches!(
            ctl.update("performance", json!("ultra")),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert_eq!(ctl.settings(), &Settings::default());
    }

    #[test]
    fn failed_write_keeps_change_applied() {
        let store = MemoryStore::new();
        let mut ctl = SettingsController::new(store.clone(), Body::default(), KEY);
        store.set_read_only(true);
        let err = ctl.update("theme", json!("light")).unwrap_err();
        assert!(matches!(err, SettingsError::Storage(_)));
        assert!(ctl.appearance().has(LIGHT_THEME_CLASS));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut ctl = SettingsController::new(MemoryStore::new(), Body::default(), KEY);
        ctl.update("theme", json!("light")).unwrap();
        ctl.reset().unwrap();
        assert_eq!(ctl.settings(), &Settings::default());
        assert!(!ctl.appearance().has(LIGHT_THEME_CLASS));
        assert_eq!(ctl.load(), &Settings::default());
    }

    #[test]
    fn clear_game_data_leaves_settings_untouched() {
        let store = MemoryStore::new();
        let mut ctl = SettingsController::new(store.clone(), Body::default(), KEY);
        ctl.update("sound", json!(false)).unwrap();
        for key in ["game-favorites", "game-session-snake", "tetris-highscore", "slope_progress", "theme"] {
            store.set_item(key, "1").unwrap();
        }
        let before = ctl.settings().clone();
        assert_eq!(ctl.clear_game_data().unwrap(), 4);
        assert_eq!(ctl.load(), &before);
        assert_eq!(store.keys().unwrap(), ["scuhameds-settings", "theme"]);
    }
}
