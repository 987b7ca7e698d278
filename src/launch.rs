//! Hand-off between the catalog and the focus page: the focus page URL is
//! built from a game and parsed back into a launch request.

use url::form_urlencoded;

use crate::catalog::{Catalog, GameDescriptor};
use crate::error::PortalError;

/// The game a focus page was asked to play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Catalog id, when the link carried one. Recents and session records
    /// are keyed by it; without it the session is not recorded.
    pub game_id: Option<String>,
    pub source_url: String,
    pub title: String,
}

/// `focus.html?game=<id>&src=<source>&title=<title>`
pub fn focus_href(focus_url: &str, game: &GameDescriptor) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("game", &game.id)
        .append_pair("src", &game.source_url)
        .append_pair("title", &game.title)
        .finish();
    format!("{focus_url}?{query}")
}

impl LaunchRequest {
    /// Parses a query string (with or without the leading `?`).
    ///
    /// `src` and `title` may be omitted when `game` names a catalog entry;
    /// they are then taken from the catalog. Anything still missing is a
    /// [`PortalError::MissingParameters`].
    pub fn from_query(query: &str, catalog: Option<&Catalog>) -> Result<Self, PortalError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut game_id = None;
        let mut source_url = None;
        let mut title = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "game" => game_id = Some(value.into_owned()),
                "src" => source_url = Some(value.into_owned()),
                "title" => title = Some(value.into_owned()),
                _ => {}
            }
        }

        let known = game_id
            .as_deref()
            .and_then(|id| catalog.and_then(|c| c.game_by_id(id)));
        if let Some(game) = known {
            source_url.get_or_insert_with(|| game.source_url.clone());
            title.get_or_insert_with(|| game.title.clone());
        }

        match (source_url, title) {
            (Some(source_url), Some(title)) => Ok(Self {
                game_id,
                source_url,
                title,
            }),
            _ => Err(PortalError::MissingParameters),
        }
    }
}
