//! Game catalog and the filtered, paginated view over it.
//!
//! The catalog is compiled in and never mutated. `CatalogView` owns the
//! mutable browse state (search term, category, revealed count) and derives
//! the visible slice from it. Filtering keeps catalog order; there is no
//! relevance or rating ranking.

use std::collections::HashSet;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::PortalError;

/// Category value that matches every game.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameDescriptor {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: String,
    /// 0.0 ..= 5.0
    pub rating: f32,
    pub players: u32,
    /// 1 ..= 5
    pub difficulty: u8,
    pub image: String,
    pub source_url: String,
}

impl GameDescriptor {
    /// Category filter predicate. `"all"` matches everything; otherwise the
    /// value must equal the game's category or one of its tags.
    pub fn in_category(&self, category: &str) -> bool {
        category == ALL_CATEGORIES
            || self.category == category
            || self.tags.iter().any(|t| t == category)
    }

    /// Search predicate. `needle` must already be lowercase; an empty needle
    /// matches everything.
    pub fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

// -----------------------------------------------------------------------------
// Built-in catalog
// Ratings are out of 5, difficulty 1 (easy) – 5 (hard).
// -----------------------------------------------------------------------------

pub struct CatalogEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub category: &'static str,
    pub rating: f32,
    pub players: u32,
    pub difficulty: u8,
}

pub const BUILTIN_GAMES: &[CatalogEntry] = &[
    CatalogEntry {
        id: "2048",
        title: "2048",
        description: "Slide numbered tiles on a 4x4 grid and merge them to reach the 2048 tile.",
        tags: &["puzzle", "numbers"],
        category: "puzzle",
        rating: 4.5,
        players: 2340,
        difficulty: 3,
    },
    CatalogEntry {
        id: "1v1.space",
        title: "1v1.Space",
        description: "Challenge your mind with increasingly difficult puzzles that will test your logic and creativity.",
        tags: &["puzzle", "brain"],
        category: "strategy",
        rating: 4.8,
        players: 1850,
        difficulty: 4,
    },
    CatalogEntry {
        id: "neon-racer",
        title: "Neon Racer",
        description: "Race through cyberpunk cities on neon-lit tracks in futuristic cars.",
        tags: &["racing", "arcade"],
        category: "racing",
        rating: 4.3,
        players: 3420,
        difficulty: 2,
    },
    CatalogEntry {
        id: "slope",
        title: "Slope",
        description: "Steer a ball down an endless slope while avoiding obstacles.",
        tags: &["arcade", "endless", "physics"],
        category: "arcade",
        rating: 4.6,
        players: 12_800,
        difficulty: 3,
    },
    CatalogEntry {
        id: "titan-run",
        title: "Titan Run",
        description: "Jump, slide and smash through obstacles with powerful titan abilities.",
        tags: &["runner", "action", "adventure"],
        category: "action",
        rating: 4.1,
        players: 980,
        difficulty: 3,
    },
    CatalogEntry {
        id: "snake",
        title: "Snake Game",
        description: "Eat food to grow longer while avoiding the walls and your own tail.",
        tags: &["classic", "arcade", "retro"],
        category: "arcade",
        rating: 4.0,
        players: 1_520_000,
        difficulty: 1,
    },
    CatalogEntry {
        id: "tetris",
        title: "Tetris",
        description: "The timeless game of falling blocks. Clear lines by completing horizontal rows.",
        tags: &["puzzle", "classic", "strategy"],
        category: "puzzle",
        rating: 4.9,
        players: 45_300,
        difficulty: 2,
    },
    CatalogEntry {
        id: "word-hunt",
        title: "Word Hunt",
        description: "Find hidden words in a grid of letters before the timer runs out.",
        tags: &["puzzle", "letters"],
        category: "puzzle",
        rating: 3.5,
        players: 640,
        difficulty: 2,
    },
];

impl From<&CatalogEntry> for GameDescriptor {
    fn from(e: &CatalogEntry) -> Self {
        Self {
            id: e.id.to_string(),
            title: e.title.to_string(),
            description: e.description.to_string(),
            tags: e.tags.iter().map(|t| t.to_string()).collect(),
            category: e.category.to_string(),
            rating: e.rating,
            players: e.players,
            difficulty: e.difficulty,
            image: format!("../files/{}/thumb.png", e.id),
            source_url: format!("../files/{}/index.html", e.id),
        }
    }
}

/// The catalog store: an ordered list of games with unique ids.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    games: Vec<GameDescriptor>,
}

impl Catalog {
    pub fn new(games: Vec<GameDescriptor>) -> Result<Self, PortalError> {
        let mut seen = HashSet::new();
        for g in &games {
            if !seen.insert(g.id.as_str()) {
                return Err(PortalError::DuplicateGameId(g.id.clone()));
            }
        }
        Ok(Self { games })
    }

    /// The compiled-in catalog, built on first use.
    pub fn builtin() -> &'static Catalog {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(|| Catalog {
            games: BUILTIN_GAMES.iter().map(GameDescriptor::from).collect(),
        })
    }

    pub fn games(&self) -> &[GameDescriptor] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn game_by_id(&self, id: &str) -> Option<&GameDescriptor> {
        self.games.iter().find(|g| g.id == id)
    }

    /// Resolves ids to games in the order given, skipping unknown ids.
    pub fn resolve<'a, I>(&self, ids: I) -> Vec<&GameDescriptor>
    where
        I: IntoIterator<Item = &'a str>,
    {
        ids.into_iter().filter_map(|id| self.game_by_id(id)).collect()
    }
}

/// Games matching both the category and the (case-insensitive) search term,
/// in catalog order.
pub fn filter_games<'a>(
    games: &'a [GameDescriptor],
    search_term: &str,
    category: &str,
) -> Vec<&'a GameDescriptor> {
    filter_indices(games, search_term, category)
        .into_iter()
        .map(|i| &games[i])
        .collect()
}

/// Positions in `games` of the entries [`filter_games`] keeps.
pub fn filter_indices(games: &[GameDescriptor], search_term: &str, category: &str) -> Vec<usize> {
    let needle = search_term.to_lowercase();
    games
        .iter()
        .enumerate()
        .filter(|(_, g)| g.in_category(category) && g.matches_search(&needle))
        .map(|(i, _)| i)
        .collect()
}

/// What the catalog grid should currently show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewStatus {
    /// No filter has been applied yet.
    NotLoaded,
    /// The current filter matched nothing.
    Empty,
    Showing { visible: usize, total: usize },
}

/// Filter / paginate engine over a catalog.
pub struct CatalogView<'c> {
    catalog: &'c Catalog,
    search_term: String,
    active_category: String,
    page_size: usize,
    /// Indices into `catalog.games()`.
    filtered: Vec<usize>,
    revealed: usize,
    loaded: bool,
}

impl<'c> CatalogView<'c> {
    pub fn new(catalog: &'c Catalog, page_size: usize) -> Self {
        Self {
            catalog,
            search_term: String::new(),
            active_category: ALL_CATEGORIES.to_string(),
            page_size: page_size.max(1),
            filtered: Vec::new(),
            revealed: 0,
            loaded: false,
        }
    }

    /// Applies the current filter and reveals the first page.
    pub fn load(&mut self) -> &[usize] {
        self.refilter();
        self.reveal_page()
    }

    /// Sets the search term and re-renders from the first page.
    pub fn set_search(&mut self, term: &str) -> &[usize] {
        self.search_term = term.to_string();
        self.load()
    }

    pub fn set_category(&mut self, category: &str) -> &[usize] {
        self.active_category = category.to_string();
        self.load()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn active_category(&self) -> &str {
        &self.active_category
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Increases the revealed count by at most `n`, never past the filtered
    /// length. Returns the catalog indices of the newly revealed games.
    pub fn reveal(&mut self, n: usize) -> &[usize] {
        let start = self.revealed;
        let step = n.min(self.filtered.len() - self.revealed);
        self.revealed += step;
        &self.filtered[start..self.revealed]
    }

    pub fn reveal_page(&mut self) -> &[usize] {
        self.reveal(self.page_size)
    }

    pub fn remaining(&self) -> usize {
        self.filtered.len() - self.revealed
    }

    pub fn has_more(&self) -> bool {
        self.remaining() > 0
    }

    /// Size of the next "load more" step.
    pub fn next_page_len(&self) -> usize {
        self.remaining().min(self.page_size)
    }

    pub fn visible(&self) -> Vec<&'c GameDescriptor> {
        let games = self.catalog.games();
        self.filtered[..self.revealed]
            .iter()
            .map(|&i| &games[i])
            .collect()
    }

    pub fn filtered(&self) -> Vec<&'c GameDescriptor> {
        let games = self.catalog.games();
        self.filtered.iter().map(|&i| &games[i]).collect()
    }

    /// Looks up a game by catalog index, as returned from `reveal`.
    pub fn game(&self, index: usize) -> Option<&'c GameDescriptor> {
        self.catalog.games().get(index)
    }

    pub fn status(&self) -> ViewStatus {
        if !self.loaded {
            ViewStatus::NotLoaded
        } else if self.filtered.is_empty() {
            ViewStatus::Empty
        } else {
            ViewStatus::Showing {
                visible: self.revealed,
                total: self.filtered.len(),
            }
        }
    }

    fn refilter(&mut self) {
        self.filtered = filter_indices(
            self.catalog.games(),
            &self.search_term,
            &self.active_category,
        );
        self.revealed = 0;
        self.loaded = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: &str, title: &str, tags: &[&str], category: &str) -> GameDescriptor {
        GameDescriptor {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{title} description"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category: category.to_string(),
            rating: 4.0,
            players: 10,
            difficulty: 2,
            image: String::new(),
            source_url: format!("games/{id}/index.html"),
        }
    }

    fn many(n: usize) -> Catalog {
        Catalog::new(
            (0..n)
                .map(|i| game(&format!("g{i}"), &format!("Game {i}"), &["arcade"], "arcade"))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn filter_matches_tag_or_category_and_keeps_order() {
        let games = vec![
            game("a", "Alpha", &["puzzle"], "arcade"),
            game("b", "Beta", &["racing"], "puzzle"),
            game("c", "Gamma", &["racing"], "racing"),
        ];
        let ids: Vec<_> = filter_games(&games, "", "puzzle")
            .iter()
            .map(|g| g.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(filter_games(&games, "", ALL_CATEGORIES).len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_over_title_description_and_tags() {
        let games = vec![
            game("a", "Alpha", &["Puzzle"], "arcade"),
            game("b", "Beta", &["racing"], "racing"),
        ];
        assert_eq!(filter_games(&games, "ALPHA", "all").len(), 1);
        assert_eq!(filter_games(&games, "beta desc", "all")[0].id, "b");
        assert_eq!(filter_games(&games, "puzz", "all")[0].id, "a");
        assert!(filter_games(&games, "zzz", "all").is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Catalog::new(vec![game("x", "X", &[], "a"), game("x", "Y", &[], "b")]);
        assert!(matches!(err, Err(PortalError::DuplicateGameId(id)) if id == "x"));
    }

    #[test]
    fn reveal_never_passes_filtered_length() {
        let catalog = many(8);
        let mut view = CatalogView::new(&catalog, 6);
        assert_eq!(view.status(), ViewStatus::NotLoaded);
        assert_eq!(view.load().len(), 6);
        assert_eq!(view.next_page_len(), 2);
        assert_eq!(view.reveal(100).len(), 2);
        assert_eq!(view.revealed_count(), 8);
        assert!(view.reveal_page().is_empty());
        assert!(!view.has_more());
    }

    #[test]
    fn filter_change_resets_to_first_page() {
        let catalog = many(14);
        let mut view = CatalogView::new(&catalog, 6);
        view.load();
        view.reveal_page();
        assert_eq!(view.revealed_count(), 12);
        view.set_search("game 1");
        // "Game 1", "Game 10".."Game 13"
        assert_eq!(view.filtered_len(), 5);
        assert_eq!(view.revealed_count(), 5);
        view.set_search("");
        assert_eq!(view.revealed_count(), 6);
    }

    #[test]
    fn empty_result_is_distinct_from_not_loaded() {
        let catalog = many(3);
        let mut view = CatalogView::new(&catalog, 6);
        view.load();
        view.set_category("racing");
        assert_eq!(view.status(), ViewStatus::Empty);
        assert!(view.visible().is_empty());
    }

    #[test]
    fn builtin_puzzle_word_search_finds_single_game() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 8);
        let mut view = CatalogView::new(catalog, 6);
        view.load();
        view.set_category("puzzle");
        view.set_search("word");
        let visible = view.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "word-hunt");
        assert_eq!(view.revealed_count(), view.filtered_len());
        assert!(!view.has_more());
    }

    #[test]
    fn view_filters_exactly_like_filter_games() {
        let catalog = Catalog::builtin();
        let mut view = CatalogView::new(catalog, 6);
        view.load();
        for category in [ALL_CATEGORIES, "puzzle", "arcade", "classic", "racing", "rpg"] {
            for term in ["", "a", "Word", "CLASSIC", "nothing-matches"] {
                view.set_category(category);
                view.set_search(term);
                let expected = filter_games(catalog.games(), term, category);
                assert_eq!(view.filtered(), expected, "category {category:?}, term {term:?}");
            }
        }
    }

    #[test]
    fn resolve_skips_unknown_ids() {
        let catalog = Catalog::builtin();
        let found = catalog.resolve(["snake", "missing", "2048"]);
        let ids: Vec<_> = found.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["snake", "2048"]);
    }
}
