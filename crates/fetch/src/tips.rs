//! Smart tips and headline helpers.

use mastery_core::Article;
use regex::Regex;
use tracing::warn;

/// Shown when the insights text yields no tip.
pub const NO_TIP: &str = "No tip available.";

/// Headlines shown on the news card.
pub const DEFAULT_HEADLINES: usize = 5;

/// Split free-text advice into tips.
///
/// Items are separated by numbered (`1. `), bullet (`• `) or dash (`- `)
/// markers. Each tip is trimmed; empty pieces are dropped.
pub fn split_tips(text: &str) -> Vec<String> {
    let pieces: Vec<&str> = match Regex::new(r"\d\.\s|•\s|-\s") {
        Ok(re) => re.split(text).collect(),
        Err(e) => {
            warn!("Tip marker pattern failed to compile: {}", e);
            vec![text]
        }
    };

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|tip| !tip.is_empty())
        .map(str::to_string)
        .collect()
}

/// The first tip, or [`NO_TIP`].
pub fn first_tip(tips: &[String]) -> &str {
    tips.first().map(String::as_str).unwrap_or(NO_TIP)
}

/// The first `limit` articles.
pub fn headlines(articles: &[Article], limit: usize) -> &[Article] {
    &articles[..articles.len().min(limit)]
}
