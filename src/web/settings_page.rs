//! Settings page: selects, toggle buttons and the save / reset / clear-data
//! actions.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tracing::warn;
use web_sys::{Document, Element, HtmlSelectElement};

use super::{BodyAppearance, BrowserStore, NoticeKind, document, listen, notify, optional_element, set_class, window};
use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::settings::{Settings, SettingsController, apply_appearance};

/// Toggle button id and the setting it flips.
const TOGGLES: [(&str, &str); 4] = [
    ("animations-toggle", "animations"),
    ("fullscreen-toggle", "autoFullscreen"),
    ("sound-toggle", "sound"),
    ("analytics-toggle", "analytics"),
];

/// Select id and the setting it chooses.
const SELECTS: [(&str, &str); 2] = [("theme-select", "theme"), ("performance-select", "performance")];

struct SettingsPage {
    controller: SettingsController<BrowserStore, BodyAppearance>,
    doc: Document,
    notice_ms: u32,
}

type Shared = Rc<RefCell<SettingsPage>>;

impl SettingsPage {
    fn notify(&self, message: &str, kind: NoticeKind) {
        notify(&self.doc, message, kind, self.notice_ms);
    }

    /// Brings every control in line with the current settings.
    fn refresh(&self) {
        let settings = self.controller.settings();
        for (id, key) in SELECTS {
            if let Some(select) = optional_element::<HtmlSelectElement>(&self.doc, id) {
                select.set_value(&select_value(settings, key));
            }
        }
        for (id, key) in TOGGLES {
            if let (Some(button), Ok(on)) = (self.doc.get_element_by_id(id), settings.flag(key)) {
                render_toggle(&button, on);
            }
        }
    }
}

fn select_value(settings: &Settings, key: &str) -> String {
    serde_json::to_value(settings)
        .ok()
        .and_then(|v| v.get(key).and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default()
}

fn render_toggle(button: &Element, enabled: bool) {
    button.set_attribute("data-enabled", if enabled { "true" } else { "false" }).ok();
    if enabled {
        button.set_inner_html(r#"<i class="fas fa-check"></i> Enabled"#);
    } else {
        button.set_inner_html(r#"<i class="fas fa-times"></i> Disabled"#);
    }
    set_class(button, "disabled", !enabled);
}

fn confirmed(message: &str) -> bool {
    window()
        .and_then(|w| w.confirm_with_message(message).map_err(PortalError::from))
        .unwrap_or(false)
}

pub fn start(config: PortalConfig) -> Result<(), PortalError> {
    let doc = document()?;
    let controller = SettingsController::new(BrowserStore::open(), BodyAppearance::new(&doc), &config.settings_key);
    let page: Shared = Rc::new(RefCell::new(SettingsPage {
        controller,
        doc: doc.clone(),
        notice_ms: config.notification_ms,
    }));
    page.borrow().refresh();

    for (id, key) in SELECTS {
        let Some(select) = optional_element::<HtmlSelectElement>(&doc, id) else { continue };
        let page = page.clone();
        let field = select.clone();
        listen(&select, "change", move |_| {
            let mut p = page.borrow_mut();
            if let Err(err) = p.controller.update(key, Value::String(field.value())) {
                warn!(error = %err, key, "setting not stored");
                p.notify("Failed to save settings", NoticeKind::Error);
            }
        })?;
    }

    for (id, key) in TOGGLES {
        let Some(button) = doc.get_element_by_id(id) else { continue };
        let page = page.clone();
        let this = button.clone();
        listen(&button, "click", move |_| {
            let mut p = page.borrow_mut();
            let result = p.controller.toggle(key);
            if let Ok(on) = p.controller.settings().flag(key) {
                render_toggle(&this, on);
            }
            if let Err(err) = result {
                warn!(error = %err, key, "setting not stored");
                p.notify("Failed to save settings", NoticeKind::Error);
            }
        })?;
    }

    wire_actions(&page, &doc)
}

fn wire_actions(page: &Shared, doc: &Document) -> Result<(), PortalError> {
    if let Some(button) = doc.get_element_by_id("save-btn") {
        let page = page.clone();
        listen(&button, "click", move |_| {
            let p = page.borrow();
            match p.controller.save() {
                Ok(()) => p.notify("Settings saved successfully!", NoticeKind::Success),
                Err(err) => {
                    warn!(error = %err, "could not save settings");
                    p.notify("Failed to save settings", NoticeKind::Error);
                }
            }
        })?;
    }

    if let Some(button) = doc.get_element_by_id("reset-btn") {
        let page = page.clone();
        listen(&button, "click", move |_| {
            if !confirmed("Are you sure you want to reset all settings to their default values?") {
                return;
            }
            let mut p = page.borrow_mut();
            let result = p.controller.reset();
            p.refresh();
            match result {
                Ok(()) => p.notify("Settings reset to defaults", NoticeKind::Success),
                Err(err) => {
                    warn!(error = %err, "defaults applied but not stored");
                    p.notify("Failed to save settings", NoticeKind::Warning);
                }
            }
        })?;
    }

    if let Some(button) = doc.get_element_by_id("clear-data-btn") {
        let page = page.clone();
        listen(&button, "click", move |_| {
            if !confirmed("Are you sure you want to clear all game data? This action cannot be undone.") {
                return;
            }
            let p = page.borrow();
            match p.controller.clear_game_data() {
                Ok(_) => p.notify("Game data cleared successfully", NoticeKind::Success),
                Err(err) => {
                    warn!(error = %err, "could not clear game data");
                    p.notify("Failed to clear game data", NoticeKind::Error);
                }
            }
        })?;
    }

    if let Some(button) = doc.get_element_by_id("keybinds-btn") {
        let page = page.clone();
        listen(&button, "click", move |_| {
            page.borrow().notify("Keybind configuration coming soon!", NoticeKind::Info);
        })?;
    }
    Ok(())
}

/// Landing page: apply stored preferences without any controls.
pub fn apply_saved(config: &PortalConfig) -> Result<(), PortalError> {
    let doc = document()?;
    let settings = Settings::load(&BrowserStore::open(), &config.settings_key);
    apply_appearance(&settings, &BodyAppearance::new(&doc));
    Ok(())
}
