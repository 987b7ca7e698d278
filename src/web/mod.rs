//! Browser glue: local storage, body classes, notifications and DOM helpers
//! shared by the page controllers.

use chrono::{DateTime, Utc};
use gloo_timers::callback::Timeout;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, EventTarget, HtmlElement, Storage, Window};

use crate::error::{PortalError, StorageError};
use crate::format::escape_html;
use crate::settings::Appearance;
use crate::storage::KeyValueStore;

pub mod catalog_page;
pub mod focus_page;
pub mod settings_page;

pub fn window() -> Result<Window, PortalError> {
    web_sys::window().ok_or(PortalError::NoWindow)
}

pub fn document() -> Result<Document, PortalError> {
    window()?.document().ok_or(PortalError::NoDocument)
}

pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

pub fn element<T: JsCast>(doc: &Document, id: &str) -> Result<T, PortalError> {
    doc.get_element_by_id(id)
        .ok_or_else(|| PortalError::MissingElement(id.to_string()))?
        .dyn_into::<T>()
        .map_err(|_| PortalError::MissingElement(id.to_string()))
}

pub fn optional_element<T: JsCast>(doc: &Document, id: &str) -> Option<T> {
    doc.get_element_by_id(id)?.dyn_into::<T>().ok()
}

pub fn create<T: JsCast>(doc: &Document, tag: &str) -> Result<T, PortalError> {
    doc.create_element(tag)?
        .dyn_into::<T>()
        .map_err(|_| PortalError::Js(format!("<{tag}> has an unexpected type")))
}

/// Registers `f` for `event` on `target` for the lifetime of the page.
pub fn listen<F>(target: &EventTarget, event: &str, f: F) -> Result<(), PortalError>
where
    F: FnMut(web_sys::Event) + 'static,
{
    let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

pub fn set_display(el: &HtmlElement, value: &str) {
    el.style().set_property("display", value).ok();
}

pub fn set_class(el: &Element, class: &str, enabled: bool) {
    el.class_list().toggle_with_force(class, enabled).ok();
}

// -----------------------------------------------------------------------------
// Storage
// -----------------------------------------------------------------------------

/// `window.localStorage`. Clones share the same underlying storage object.
#[derive(Clone, Debug)]
pub struct BrowserStore {
    storage: Option<Storage>,
}

impl BrowserStore {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            warn!("local storage unavailable; preferences will not persist");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStore for BrowserStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|_| StorageError::Read { key: key.to_string() })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: e.as_string().unwrap_or_else(|| "quota exceeded".to_string()),
            })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: e.as_string().unwrap_or_default(),
            })
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let storage = self.storage()?;
        let len = storage.length().map_err(|_| StorageError::Read {
            key: "*".to_string(),
        })?;
        Ok((0..len)
            .filter_map(|i| storage.key(i).ok().flatten())
            .collect())
    }
}

// -----------------------------------------------------------------------------
// Body classes and notifications
// -----------------------------------------------------------------------------

/// Applies settings as classes on `<body>`.
pub struct BodyAppearance {
    body: Option<HtmlElement>,
}

impl BodyAppearance {
    pub fn new(doc: &Document) -> Self {
        Self { body: doc.body() }
    }
}

impl Appearance for BodyAppearance {
    fn set_class(&self, class: &str, enabled: bool) {
        if let Some(body) = &self.body {
            set_class(body, class, enabled);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
    Warning,
}

impl NoticeKind {
    fn class(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
            NoticeKind::Info => "info",
            NoticeKind::Warning => "warning",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            NoticeKind::Success => "fa-check-circle",
            NoticeKind::Error => "fa-exclamation-circle",
            NoticeKind::Info => "fa-info-circle",
            NoticeKind::Warning => "fa-exclamation-triangle",
        }
    }
}

/// Shows a toast that slides in and removes itself after `visible_ms`.
pub fn notify(doc: &Document, message: &str, kind: NoticeKind, visible_ms: u32) {
    let Some(body) = doc.body() else { return };
    let Ok(toast) = doc.create_element("div") else { return };
    toast.set_class_name(&format!("notification notification-{}", kind.class()));
    toast.set_inner_html(&format!(
        r#"<i class="fas {}"></i><span>{}</span>"#,
        kind.icon(),
        escape_html(message)
    ));
    if body.append_child(&toast).is_err() {
        return;
    }
    let shown = toast.clone();
    Timeout::new(100, move || set_class(&shown, "notification-show", true)).forget();
    Timeout::new(visible_ms, move || {
        set_class(&toast, "notification-show", false);
        Timeout::new(300, move || toast.remove()).forget();
    })
    .forget();
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn browser_store_lists_and_removes_keys() {
        let store = BrowserStore::open();
        store.set_item("game-test-key", "1").unwrap();
        assert!(store.keys().unwrap().iter().any(|k| k == "game-test-key"));
        assert_eq!(store.get_item("game-test-key").unwrap().as_deref(), Some("1"));
        store.remove_item("game-test-key").unwrap();
        assert_eq!(store.get_item("game-test-key").unwrap(), None);
    }

    #[wasm_bindgen_test]
    fn body_appearance_toggles_classes() {
        let doc = document().unwrap();
        let body = BodyAppearance::new(&doc);
        body.set_class("light-theme", true);
        assert!(doc.body().unwrap().class_list().contains("light-theme"));
        body.set_class("light-theme", false);
        assert!(!doc.body().unwrap().class_list().contains("light-theme"));
    }
}
