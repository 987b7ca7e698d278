//! Catalog ("projects") page: search box, category buttons, card grid and
//! the "load more" control.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use tracing::{info, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlLinkElement, KeyboardEvent};

use super::{BrowserStore, NoticeKind, create, document, listen, notify, now, optional_element, set_class, set_display};
use crate::cards::{CARD_CLASS, EMPTY_STATE_HTML, FAVORITE_BUTTON_CLASS, FAVORITED_CLASS, card_inner_html, load_more_html};
use crate::catalog::{ALL_CATEGORIES, Catalog, CatalogView, GameDescriptor, ViewStatus};
use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::launch::focus_href;
use crate::tracker::{RecentEntry, Tracker};

const GRID_ID: &str = "projectsGrid";
const SEARCH_ID: &str = "searchInput";
const LOAD_MORE_ID: &str = "loadMoreBtn";

struct CatalogPage {
    config: PortalConfig,
    doc: Document,
    grid: Element,
    load_more: Option<HtmlElement>,
    view: CatalogView<'static>,
    tracker: Tracker<BrowserStore>,
    /// Bumped on every full re-render so staggered inserts from an older
    /// render are dropped.
    generation: u32,
}

type Shared = Rc<RefCell<CatalogPage>>;

pub fn start(config: PortalConfig) -> Result<(), PortalError> {
    let doc = document()?;
    let grid = doc
        .get_element_by_id(GRID_ID)
        .ok_or_else(|| PortalError::MissingElement(GRID_ID.to_string()))?;
    let tracker = Tracker::new(BrowserStore::open(), &config);
    let page: Shared = Rc::new(RefCell::new(CatalogPage {
        load_more: optional_element(&doc, LOAD_MORE_ID),
        view: CatalogView::new(Catalog::builtin(), config.page_size),
        config,
        doc: doc.clone(),
        grid,
        tracker,
        generation: 0,
    }));

    wire_search(&page, &doc)?;
    wire_filters(&page, &doc)?;
    wire_load_more(&page)?;

    let first: Vec<usize> = page.borrow_mut().view.load().to_vec();
    rerender(&page, &first);
    info!(games = Catalog::builtin().len(), "catalog page ready");
    Ok(())
}

fn wire_search(page: &Shared, doc: &Document) -> Result<(), PortalError> {
    let Some(input) = optional_element::<HtmlInputElement>(doc, SEARCH_ID) else {
        return Ok(());
    };
    {
        let page = page.clone();
        let field = input.clone();
        listen(&input, "input", move |_| {
            let revealed = page.borrow_mut().view.set_search(&field.value()).to_vec();
            rerender(&page, &revealed);
        })?;
    }
    {
        let page = page.clone();
        let field = input.clone();
        listen(&input, "keydown", move |evt| {
            let Some(key) = evt.dyn_ref::<KeyboardEvent>() else { return };
            if key.key() == "Escape" {
                field.set_value("");
                let revealed = page.borrow_mut().view.set_search("").to_vec();
                rerender(&page, &revealed);
            }
        })?;
    }
    // F3 / Ctrl+F jump to the search box.
    listen(doc, "keydown", move |evt| {
        let Some(key) = evt.dyn_ref::<KeyboardEvent>() else { return };
        if key.key() == "F3" || (key.ctrl_key() && key.key() == "f") {
            evt.prevent_default();
            input.focus().ok();
        }
    })
}

fn wire_filters(page: &Shared, doc: &Document) -> Result<(), PortalError> {
    let buttons = doc.query_selector_all(".filter-btn")?;
    let all: Vec<Element> = (0..buttons.length())
        .filter_map(|i| buttons.get(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect();
    for button in &all {
        let page = page.clone();
        let group = all.clone();
        let this = button.clone();
        listen(button, "click", move |_| {
            for b in &group {
                set_class(b, "active", false);
            }
            set_class(&this, "active", true);
            let category = this.get_attribute("data-filter").unwrap_or_else(|| ALL_CATEGORIES.to_string());
            let revealed = page.borrow_mut().view.set_category(&category).to_vec();
            rerender(&page, &revealed);
        })?;
    }
    Ok(())
}

fn wire_load_more(page: &Shared) -> Result<(), PortalError> {
    let Some(button) = page.borrow().load_more.clone() else {
        return Ok(());
    };
    let page = page.clone();
    listen(&button, "click", move |_| {
        let added: Vec<usize> = page.borrow_mut().view.reveal_page().to_vec();
        insert_cards(&page, &added);
        update_load_more(&page.borrow());
    })
}

/// Full re-render after a filter change: clear the grid, then either show the
/// empty state or insert the newly revealed first page.
fn rerender(page: &Shared, revealed: &[usize]) {
    {
        let mut p = page.borrow_mut();
        p.generation += 1;
        p.grid.set_inner_html("");
        if p.view.status() == ViewStatus::Empty {
            p.grid.set_inner_html(EMPTY_STATE_HTML);
        }
    }
    insert_cards(page, revealed);
    update_load_more(&page.borrow());
}

/// Inserts cards one by one with a short stagger.
fn insert_cards(page: &Shared, catalog_indices: &[usize]) {
    let (generation, stagger) = {
        let p = page.borrow();
        (p.generation, p.config.card_stagger_ms)
    };
    for (n, &index) in catalog_indices.iter().enumerate() {
        let page = page.clone();
        Timeout::new(n as u32 * stagger, move || {
            let p = page.borrow();
            if p.generation != generation {
                return;
            }
            let Some(game) = p.view.game(index) else { return };
            if let Err(err) = append_card(&page, &p, game) {
                warn!(error = %err, id = %game.id, "could not render card");
            }
        })
        .forget();
    }
}

fn append_card(page: &Shared, p: &CatalogPage, game: &'static GameDescriptor) -> Result<(), PortalError> {
    let card: HtmlElement = create(&p.doc, "div")?;
    card.set_class_name(CARD_CLASS);
    card.set_attribute("data-game-id", &game.id)?;
    card.set_inner_html(&card_inner_html(game, p.tracker.is_favorite(&game.id)));

    {
        let page = page.clone();
        let this = card.clone();
        listen(&card, "click", move |evt| {
            let on_favorite = evt
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(&format!(".{FAVORITE_BUTTON_CLASS}")).ok().flatten())
                .is_some();
            if !on_favorite {
                play(&page, &this, game);
            }
        })?;
    }

    if let Some(fav) = card.query_selector(&format!(".{FAVORITE_BUTTON_CLASS}"))? {
        let page = page.clone();
        let button = fav.clone();
        listen(&fav, "click", move |evt| {
            evt.stop_propagation();
            let p = page.borrow();
            match p.tracker.toggle_favorite(&game.id) {
                Ok(on) => set_class(&button, FAVORITED_CLASS, on),
                Err(err) => {
                    warn!(error = %err, "favorite not saved");
                    notify(&p.doc, "Could not save favorite", NoticeKind::Error, p.config.notification_ms);
                }
            }
        })?;
    }

    {
        let doc = p.doc.clone();
        listen(&card, "mouseenter", move |_| prefetch(&doc, &game.source_url))?;
    }

    p.grid.append_child(&card)?;
    let shown = card.clone();
    Timeout::new(50, move || set_class(&shown, "fade-in-up", true)).forget();
    Ok(())
}

fn play(page: &Shared, card: &HtmlElement, game: &GameDescriptor) {
    let href = {
        let p = page.borrow();
        if let Err(err) = p.tracker.record_played(RecentEntry::from_game(game, now())) {
            warn!(error = %err, "could not update recently played");
        }
        focus_href(&p.config.focus_url, game)
    };
    let style = card.style();
    style.set_property("transform", "scale(0.95)").ok();
    style.set_property("opacity", "0.8").ok();
    Timeout::new(150, move || {
        if let Some(w) = web_sys::window() {
            w.location().set_href(&href).ok();
        }
    })
    .forget();
}

fn prefetch(doc: &Document, href: &str) {
    let Some(head) = doc.head() else { return };
    let Ok(link) = create::<HtmlLinkElement>(doc, "link") else { return };
    link.set_rel("prefetch");
    link.set_href(href);
    head.append_child(&link).ok();
}

fn update_load_more(p: &CatalogPage) {
    let Some(button) = &p.load_more else { return };
    if p.view.has_more() {
        set_display(button, "inline-flex");
        button.set_inner_html(&load_more_html(p.view.next_page_len()));
    } else {
        set_display(button, "none");
    }
}
