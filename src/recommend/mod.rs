// Movie recommendation prompt and response parsing
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// First `(...)` group, matched only when it is exactly four digits.
    static ref YEAR_IN_PARENS: Regex = Regex::new(r"^[^(]*\((\d{4})\)").unwrap();
}

/// Build the recommendation prompt from the user's answers.
///
/// Blank additional preferences are sent as "None specified".
pub fn recommendation_prompt(
    movie_genres: &str,
    music_genres: &str,
    additional_prefs: Option<&str>,
) -> String {
    let additional = additional_prefs
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("None specified");

    format!(
        "I need movie recommendations for a user with the following preferences:
- Favorite Movie Genres: {}
- Favorite Music Genres: {}
- Additional Preferences: {}

Please provide a curated list of 10 movie recommendations that match these preferences. For each recommendation, include:
1. The movie title with its release year in parentheses
2. A brief 1-2 sentence explanation of why it matches the user's taste.

Format each recommendation in a clean, consistent way without using markdown or special formatting.",
        movie_genres.trim(),
        music_genres.trim(),
        additional
    )
}

/// Split a model answer into numbered recommendations.
///
/// An item starts on a line beginning with a digit followed by `". "`,
/// `"- "` or `") "`; later lines are folded into the current item. Text
/// before the first item is ignored.
pub fn parse_recommendations(text: &str) -> Vec<String> {
    let mut recommendations = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if starts_numbered_item(line) {
            if let Some(done) = current.take() {
                recommendations.push(done);
            }
            current = Some(line.to_string());
        } else if let Some(rec) = current.as_mut() {
            rec.push(' ');
            rec.push_str(line);
        }
    }

    recommendations.extend(current);
    recommendations
}

fn starts_numbered_item(line: &str) -> bool {
    let mut chars = line.chars();
    let first_is_digit = chars.next().is_some_and(|c| c.is_ascii_digit());
    let marker: String = chars.take(2).collect();
    first_is_digit && matches!(marker.as_str(), ". " | "- " | ") ")
}

/// Release year of a recommendation, taken from its first parenthesized group.
///
/// A `)` before the first `(` does not end the group, so list markers such
/// as `2)` are skipped: `"2) The Matrix (1999)"` yields 1999. Pairing the
/// first `(` with the first `)` anywhere in the line would reject it.
pub fn release_year(recommendation: &str) -> Option<u16> {
    YEAR_IN_PARENS
        .captures(recommendation)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Fraction of recommendations that carry a `(YYYY)` release year.
///
/// Returns 0.0 for an empty list.
pub fn year_format_ratio(recommendations: &[String]) -> f64 {
    if recommendations.is_empty() {
        return 0.0;
    }
    let with_year = recommendations
        .iter()
        .filter(|r| release_year(r).is_some())
        .count();
    with_year as f64 / recommendations.len() as f64
}
