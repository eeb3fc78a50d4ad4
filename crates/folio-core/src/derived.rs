//! Rules for post fields computed from other fields.

use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use regex::Regex;

/// Average reading speed used for the read-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Characters of stripped content kept in a derived excerpt.
pub const EXCERPT_CHARS: usize = 200;

static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Lowercase the title and collapse every run of characters outside
/// `[a-z0-9]` into one hyphen, trimming hyphens at both ends.
pub fn slug_base(title: &str) -> String {
    let lowered = title.to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Full slug: base plus uniqueness token.
pub fn slugify(title: &str, token: &str) -> String {
    let base = slug_base(title);
    if base.is_empty() {
        format!("post-{token}")
    } else {
        format!("{base}-{token}")
    }
}

/// Minutes to read `content`, never less than one.
pub fn read_time(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

pub fn strip_html(content: &str) -> String {
    HTML_TAG.replace_all(content, "").into_owned()
}

/// Excerpt used when the author did not write one.
pub fn derive_excerpt(content: &str) -> String {
    let text = strip_html(content);
    let head: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", head.trim())
}

pub fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Issues base-36 millisecond timestamps that never repeat within a process,
/// even when two slugs are requested in the same millisecond.
#[derive(Debug, Default)]
pub struct SlugTokens {
    last: AtomicU64,
}

impl SlugTokens {
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    pub fn next(&self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis().max(0) as u64;
        let previous = match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(millis.max(last + 1))
            }) {
            Ok(v) | Err(v) => v,
        };
        to_base36(millis.max(previous + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slug_base("Hello World!!!"), "hello-world");
        assert_eq!(slug_base("  --Rust & Actix: a primer-- "), "rust-actix-a-primer");
        assert_eq!(slug_base("Café au lait"), "caf-au-lait");
    }

    #[test]
    fn slug_has_base36_token() {
        let tokens = SlugTokens::new();
        let slug = slugify("Hello World!!!", &tokens.next(Utc::now()));
        let token = slug.strip_prefix("hello-world-").unwrap();
        assert!(!token.is_empty());
        assert!(token.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn slug_for_symbol_only_title() {
        assert_eq!(slugify("!!!!!", "abc"), "post-abc");
    }

    #[test]
    fn tokens_are_unique_within_a_millisecond() {
        let tokens = SlugTokens::new();
        let now = Utc::now();
        let a = tokens.next(now);
        let b = tokens.next(now);
        assert_ne!(a, b);
    }

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn read_time_rounds_up_with_floor_of_one() {
        assert_eq!(read_time(""), 1);
        assert_eq!(read_time("one two three"), 1);
        assert_eq!(read_time(&vec!["w"; 200].join(" ")), 1);
        assert_eq!(read_time(&vec!["w"; 201].join(" ")), 2);
        assert_eq!(read_time(&vec!["w"; 1000].join("\n\t ")), 5);
    }

    #[test]
    fn excerpt_strips_tags_and_truncates() {
        let content = format!("<p>{}</p>", "a".repeat(300));
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt, format!("{}...", "a".repeat(200)));

        assert_eq!(derive_excerpt("<b>Short</b> text "), "Short text...");
    }
}
