//! Small display helpers shared by the card markup.

/// `999`, `2.3K`, `1.5M`. Truncates to one decimal and drops a trailing `.0`.
pub fn format_player_count(count: u32) -> String {
    fn tenths(value: u32, unit: u32, suffix: char) -> String {
        let t = value / (unit / 10);
        if t % 10 == 0 {
            format!("{}{suffix}", t / 10)
        } else {
            format!("{}.{}{suffix}", t / 10, t % 10)
        }
    }
    match count {
        0..=999 => count.to_string(),
        1_000..=999_999 => tenths(count, 1_000, 'K'),
        _ => tenths(count, 1_000_000, 'M'),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Star {
    Full,
    Half,
    Empty,
}

/// Five stars for a 0–5 rating; any fractional part shows as one half star.
pub fn rating_stars(rating: f32) -> Vec<Star> {
    let rating = rating.clamp(0.0, 5.0);
    let full = rating.floor() as usize;
    let half = rating.fract() != 0.0;
    let empty = 5 - rating.ceil() as usize;
    let mut stars = vec![Star::Full; full];
    if half {
        stars.push(Star::Half);
    }
    stars.extend(std::iter::repeat_n(Star::Empty, empty));
    stars
}

/// Five dots, the first `difficulty` of them active.
pub fn difficulty_dots(difficulty: u8) -> [bool; 5] {
    std::array::from_fn(|i| i < difficulty as usize)
}

pub fn category_icon(category: &str) -> &'static str {
    match category {
        "action" => "fa-sword",
        "puzzle" => "fa-puzzle-piece",
        "arcade" => "fa-gamepad",
        "strategy" => "fa-chess",
        "racing" => "fa-flag-checkered",
        "rpg" => "fa-dragon",
        "sports" => "fa-futbol",
        "adventure" => "fa-compass",
        _ => "fa-gamepad",
    }
}

/// Escapes text for use in element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
