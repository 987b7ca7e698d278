//! Focus page: hosts one game in an iframe and carries out the effects the
//! [`SessionController`] asks for.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use gloo_timers::callback::{Interval, Timeout};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlIFrameElement, KeyboardEvent, MessageEvent};

use super::{BrowserStore, document, element, listen, now, set_class, set_display, window};
use crate::catalog::Catalog;
use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::fullscreen::FullscreenEffect;
use crate::protocol::{InboundMessage, OutboundMessage};
use crate::session::{Effect, SessionController, TimerId};
use crate::settings::Settings;
use crate::tracker::Tracker;

const SIMULATED_FULLSCREEN_CLASS: &str = "fullscreen";
const FOCUSED_BODY_CLASS: &str = "game-focused";

enum Pending {
    Timeout(Timeout),
    // Held only so dropping it clears the interval.
    Interval(#[allow(dead_code)] Interval),
}

struct Dom {
    doc: Document,
    frame: HtmlIFrameElement,
    loading: Option<HtmlElement>,
    status: Option<Element>,
    error_screen: Option<HtmlElement>,
    error_message: Option<Element>,
    title: Option<Element>,
    container: Option<HtmlElement>,
    fullscreen_btn: Option<Element>,
}

struct FocusPage {
    dom: Dom,
    session: RefCell<SessionController<BrowserStore>>,
    timers: RefCell<HashMap<TimerId, Pending>>,
}

type Shared = Rc<FocusPage>;

fn query<T: JsCast>(doc: &Document, selector: &str) -> Option<T> {
    doc.query_selector(selector).ok().flatten()?.dyn_into::<T>().ok()
}

pub fn start(config: PortalConfig) -> Result<(), PortalError> {
    let search = window()?.location().search()?;
    start_with_query(config, &search)
}

/// Builds the page for an explicit query string. Every listener owns a
/// strong handle, so the page lives as long as the document.
pub(crate) fn start_with_query(config: PortalConfig, search: &str) -> Result<(), PortalError> {
    let win = window()?;
    let doc = document()?;
    let store = BrowserStore::open();
    let settings = Settings::load(&store, &config.settings_key);
    let tracker = Tracker::new(store, &config);

    let dom = Dom {
        frame: element(&doc, "gameFrame")?,
        loading: query(&doc, "#loadingScreen"),
        status: query(&doc, ".loading-content h2"),
        error_screen: query(&doc, "#errorScreen"),
        error_message: query(&doc, "#errorMessage"),
        title: query(&doc, "#gameTitle"),
        container: query(&doc, ".game-container"),
        fullscreen_btn: query(&doc, "#fullscreenBtn"),
        doc: doc.clone(),
    };
    let native = doc.fullscreen_enabled();
    let page: Shared = Rc::new(FocusPage {
        dom,
        session: RefCell::new(SessionController::new(&config, tracker, settings, native)),
        timers: RefCell::new(HashMap::new()),
    });

    wire_frame(&page)?;
    wire_buttons(&page, &doc)?;
    wire_document(&page, &doc)?;
    wire_window(&page, &win)?;

    dispatch(&page, |s| s.enter(search, Some(Catalog::builtin()), now()));
    Ok(())
}

/// Runs one controller event and applies its effects once the controller is
/// no longer borrowed.
fn dispatch<F>(page: &Shared, event: F)
where
    F: FnOnce(&mut SessionController<BrowserStore>) -> Vec<Effect>,
{
    let effects = {
        let Ok(mut session) = page.session.try_borrow_mut() else {
            warn!("session busy; dropping re-entrant event");
            return;
        };
        event(&mut session)
    };
    for effect in effects {
        apply(page, effect);
    }
}

fn apply(page: &Shared, effect: Effect) {
    let dom = &page.dom;
    match effect {
        Effect::SetTitle(title) => {
            dom.doc.set_title(&title);
            if let (Some(el), Some(request)) = (&dom.title, page.session.borrow().request()) {
                el.set_text_content(Some(&request.title));
            }
        }
        Effect::LoadFrame(src) => dom.frame.set_src(&src),
        Effect::FocusFrame => {
            dom.frame.focus().ok();
        }
        Effect::ShowLoading => {
            if let Some(el) = &dom.loading {
                el.style().set_property("opacity", "1").ok();
                set_display(el, "flex");
            }
        }
        Effect::HideLoading => {
            if let Some(el) = &dom.loading {
                el.style().set_property("opacity", "0").ok();
                let el = el.clone();
                Timeout::new(300, move || set_display(&el, "none")).forget();
            }
        }
        Effect::SetStatus(text) => {
            if let Some(el) = &dom.status {
                el.set_text_content(Some(text));
            }
        }
        Effect::ShowError(reason) => {
            if let Some(el) = &dom.error_message {
                el.set_text_content(Some(reason.message()));
            }
            if let Some(el) = &dom.error_screen {
                set_display(el, "flex");
            }
        }
        Effect::HideError => {
            if let Some(el) = &dom.error_screen {
                set_display(el, "none");
            }
        }
        Effect::StartTimeout { id, ms } => {
            let weak = Rc::downgrade(page);
            let handle = Timeout::new(ms, move || timer_fired(&weak, id));
            page.timers.borrow_mut().insert(id, Pending::Timeout(handle));
        }
        Effect::StartInterval { id, ms } => {
            let weak = Rc::downgrade(page);
            let handle = Interval::new(ms, move || timer_fired(&weak, id));
            page.timers.borrow_mut().insert(id, Pending::Interval(handle));
        }
        Effect::CancelTimer(id) => {
            page.timers.borrow_mut().remove(&id);
        }
        Effect::Post(msg) => post(&dom.frame, &msg),
        Effect::Fullscreen(fx) => apply_fullscreen(page, fx),
        Effect::Navigate(href) => {
            if let Some(el) = &dom.container {
                el.style().set_property("opacity", "0").ok();
                el.style().set_property("transform", "scale(0.95)").ok();
            }
            Timeout::new(300, move || {
                if let Some(w) = web_sys::window() {
                    w.location().set_href(&href).ok();
                }
            })
            .forget();
        }
    }
}

fn timer_fired(page: &Weak<FocusPage>, id: TimerId) {
    let Some(page) = page.upgrade() else { return };
    // A fired timeout is done; leak its closure rather than drop it mid-call.
    if let Some(Pending::Timeout(handle)) = page.timers.borrow_mut().remove(&id) {
        handle.forget();
    }
    dispatch(&page, |s| s.timer_fired(id));
}

fn apply_fullscreen(page: &Shared, fx: FullscreenEffect) {
    let dom = &page.dom;
    match fx {
        FullscreenEffect::RequestNative => {
            let requested = dom
                .container
                .as_ref()
                .map(|el| el.request_fullscreen().is_ok())
                .unwrap_or(false);
            if !requested {
                dispatch(page, |s| s.native_fullscreen_failed());
            }
        }
        FullscreenEffect::ExitNative => dom.doc.exit_fullscreen(),
        FullscreenEffect::Simulate(on) => {
            if let Some(el) = &dom.container {
                set_class(el, SIMULATED_FULLSCREEN_CLASS, on);
            }
        }
        FullscreenEffect::Button(on) => {
            let Some(btn) = &dom.fullscreen_btn else { return };
            if let Ok(Some(icon)) = btn.query_selector("i") {
                icon.set_class_name(if on { "fas fa-compress" } else { "fas fa-expand" });
            }
            btn.set_attribute("title", if on { "Exit Fullscreen" } else { "Fullscreen" })
                .ok();
        }
        FullscreenEffect::BodyFocused(on) => {
            if let Some(body) = dom.doc.body() {
                set_class(&body, FOCUSED_BODY_CLASS, on);
            }
        }
    }
}

fn post(frame: &HtmlIFrameElement, msg: &OutboundMessage) {
    let Some(target) = frame.content_window() else {
        debug!("no frame window to post to");
        return;
    };
    let value = match serde_wasm_bindgen::to_value(msg) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "could not encode frame message");
            return;
        }
    };
    if let Err(err) = target.post_message(&value, "*") {
        warn!(error = ?err, "postMessage failed");
    }
}

fn wire_frame(page: &Shared) -> Result<(), PortalError> {
    let frame = page.dom.frame.clone();
    {
        let page = page.clone();
        listen(&frame, "load", move |_| dispatch(&page, |s| s.frame_loaded(now())))?;
    }
    let page = page.clone();
    listen(&frame, "error", move |_| dispatch(&page, |s| s.frame_failed()))
}

fn wire_buttons(page: &Shared, doc: &Document) -> Result<(), PortalError> {
    type Action = fn(&mut SessionController<BrowserStore>) -> Vec<Effect>;
    let buttons: [(&str, Action); 3] = [
        ("homeBtn", |s| s.return_to_catalog(now())),
        ("fullscreenBtn", |s| s.toggle_fullscreen()),
        ("reloadBtn", |s| s.reload()),
    ];
    for (id, action) in buttons {
        let Some(button) = doc.get_element_by_id(id) else {
            debug!(id, "button not on page");
            continue;
        };
        let page = page.clone();
        listen(&button, "click", move |_| dispatch(&page, action))?;
    }
    Ok(())
}

fn wire_document(page: &Shared, doc: &Document) -> Result<(), PortalError> {
    {
        let page = page.clone();
        let d = doc.clone();
        listen(doc, "fullscreenchange", move |_| {
            let active = d.fullscreen_element().is_some();
            dispatch(&page, |s| s.fullscreen_changed(active));
        })?;
    }
    {
        let page = page.clone();
        listen(doc, "fullscreenerror", move |_| {
            dispatch(&page, |s| s.native_fullscreen_failed())
        })?;
    }
    {
        let page = page.clone();
        let d = doc.clone();
        listen(doc, "visibilitychange", move |_| {
            let hidden = d.hidden();
            dispatch(&page, |s| s.visibility_changed(hidden));
        })?;
    }
    let page = page.clone();
    listen(doc, "keydown", move |evt| {
        let Some(key) = evt.dyn_ref::<KeyboardEvent>() else { return };
        match key.key().as_str() {
            "Escape" => dispatch(&page, |s| s.escape(now())),
            "F11" => {
                evt.prevent_default();
                dispatch(&page, |s| s.toggle_fullscreen());
            }
            "F5" => {
                evt.prevent_default();
                dispatch(&page, |s| s.reload());
            }
            "Home" if key.ctrl_key() => {
                evt.prevent_default();
                dispatch(&page, |s| s.return_to_catalog(now()));
            }
            _ => {}
        }
    })
}

fn wire_window(page: &Shared, win: &web_sys::Window) -> Result<(), PortalError> {
    {
        let page = page.clone();
        listen(win, "beforeunload", move |_| {
            if let Ok(mut session) = page.session.try_borrow_mut() {
                session.leave(now());
            }
        })?;
    }
    let page = page.clone();
    listen(win, "message", move |evt| {
        let Some(event) = evt.dyn_ref::<MessageEvent>() else { return };
        let from_frame = match (event.source(), page.dom.frame.content_window()) {
            (Some(source), Some(frame)) => js_sys::Object::is(&source, &frame),
            _ => false,
        };
        let data = match serde_wasm_bindgen::from_value::<serde_json::Value>(event.data()) {
            Ok(data) => data,
            Err(err) => {
                debug!(error = %err, "undecodable message payload");
                return;
            }
        };
        if let Some(msg) = InboundMessage::accept(from_frame, data) {
            dispatch(&page, |s| s.message(msg, now()));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KeyValueStore;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    /// Replaces the body with the focus page skeleton.
    fn fixture() -> Document {
        let doc = document().unwrap();
        doc.body().unwrap().set_inner_html(
            r#"<div class="game-container">
                <iframe id="gameFrame"></iframe>
                <div id="loadingScreen"><div class="loading-content"><h2></h2></div></div>
                <div id="errorScreen" style="display: none"><p id="errorMessage"></p></div>
            </div>"#,
        );
        doc
    }

    fn style_of(doc: &Document, id: &str, property: &str) -> String {
        element::<HtmlElement>(doc, id)
            .unwrap()
            .style()
            .get_property_value(property)
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn frame_load_hides_overlay_and_records_recent() {
        let doc = fixture();
        let config = PortalConfig::default();
        let store = BrowserStore::open();
        store.remove_item(&config.recent_key).unwrap();

        start_with_query(config.clone(), "?game=snake&src=about%3Ablank&title=Snake+Game").unwrap();
        assert_eq!(style_of(&doc, "loadingScreen", "display"), "flex");

        let frame = element::<HtmlIFrameElement>(&doc, "gameFrame").unwrap();
        frame.dispatch_event(&web_sys::Event::new("load").unwrap()).unwrap();

        assert_eq!(style_of(&doc, "loadingScreen", "opacity"), "0");
        assert_eq!(style_of(&doc, "errorScreen", "display"), "none");
        let recent = store.get_item(&config.recent_key).unwrap().unwrap_or_default();
        assert!(recent.contains("\"id\":\"snake\""), "recents: {recent}");
        assert_eq!(doc.title(), "Snake Game - SCUHA");
    }

    #[wasm_bindgen_test]
    fn missing_source_shows_error_screen() {
        let doc = fixture();
        start_with_query(PortalConfig::default(), "?title=Nothing").unwrap();
        assert_eq!(style_of(&doc, "errorScreen", "display"), "flex");
        assert_eq!(
            doc.get_element_by_id("errorMessage").unwrap().text_content().as_deref(),
            Some("No game specified")
        );
    }
}
