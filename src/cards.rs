//! Card, empty-state and "load more" markup for the catalog grid.

use crate::catalog::GameDescriptor;
use crate::format::{Star, category_icon, difficulty_dots, escape_html, format_player_count, rating_stars};

pub const CARD_CLASS: &str = "project-card";
pub const FAVORITE_BUTTON_CLASS: &str = "favorite-btn";
pub const FAVORITED_CLASS: &str = "favorited";

pub const EMPTY_STATE_HTML: &str = r#"<div class="empty-state" style="grid-column: 1 / -1;">
    <i class="fas fa-search"></i>
    <h3>No Games Found</h3>
    <p>Try adjusting your search terms or filters</p>
</div>"#;

/// Inner markup of one catalog card. The caller creates the wrapping element
/// (class [`CARD_CLASS`], `data-game-id`) so it can attach listeners to it.
pub fn card_inner_html(game: &GameDescriptor, favorite: bool) -> String {
    let id = escape_html(&game.id);
    let title = escape_html(&game.title);
    let dots: String = difficulty_dots(game.difficulty)
        .iter()
        .map(|&on| {
            if on {
                r#"<div class="difficulty-dot active"></div>"#
            } else {
                r#"<div class="difficulty-dot"></div>"#
            }
        })
        .collect();
    let tags: String = game
        .tags
        .iter()
        .map(|t| format!(r#"<span class="project-tag">{}</span>"#, escape_html(t)))
        .collect();
    format!(
        r#"<div class="project-image">
    <img src="{image}" alt="{title}">
    <div class="play-icon"><i class="fas fa-play"></i></div>
    <div class="category-icon"><i class="fas {icon}"></i></div>
    <button class="{fav_btn}{fav_state}" data-game-id="{id}"><i class="fas fa-heart"></i></button>
    <div class="difficulty-indicator">{dots}</div>
</div>
<div class="project-content">
    <h3 class="project-title">{title}</h3>
    <p class="project-description">{description}</p>
    <div class="project-tags">{tags}</div>
    <div class="project-meta">
        <div class="project-rating"><span class="stars">{stars}</span><span>{rating}</span></div>
        <div class="project-players"><i class="fas fa-users"></i><span>{players}</span></div>
    </div>
</div>"#,
        image = escape_html(&game.image),
        icon = category_icon(&game.category),
        fav_btn = FAVORITE_BUTTON_CLASS,
        fav_state = if favorite { " favorited" } else { "" },
        description = escape_html(&game.description),
        stars = stars_html(game.rating),
        rating = game.rating,
        players = format_player_count(game.players),
    )
}

pub fn stars_html(rating: f32) -> String {
    rating_stars(rating)
        .into_iter()
        .map(|s| match s {
            Star::Full => r#"<i class="fas fa-star"></i>"#,
            Star::Half => r#"<i class="fas fa-star-half-alt"></i>"#,
            Star::Empty => r#"<i class="far fa-star"></i>"#,
        })
        .collect()
}

/// Label of the "load more" control for the next step of `n` cards.
pub fn load_more_html(n: usize) -> String {
    format!(r#"<i class="fas fa-plus"></i> Load {n} More Games"#)
}
