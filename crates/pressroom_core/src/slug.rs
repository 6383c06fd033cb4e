//! Slug derivation for URL-safe identifiers.
//!
//! # Responsibility
//! - Normalize titles into lowercase hyphenated ASCII.
//! - Compose post slugs from the storage-assigned row id and the title.
//!
//! # Invariants
//! - Normalized output contains only `a-z`, `0-9` and `-`.
//! - Composed post slugs never exceed `SLUG_MAX_LEN` characters.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length of a composed post slug, in characters.
pub const SLUG_MAX_LEN: usize = 50;

static NON_SLUG_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug filter regex"));
static VALID_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug shape regex"));

/// Normalizes a title into a URL-safe slug fragment.
///
/// Rules:
/// - Lowercase, Cyrillic transliterated to Latin.
/// - Every run of other characters collapses to a single hyphen.
/// - No leading or trailing hyphens.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let transliterated = transliterate(&lowered);
    let hyphenated = NON_SLUG_RUN_RE.replace_all(&transliterated, "-");
    hyphenated.trim_matches('-').to_string()
}

/// Composes the canonical post slug `"<id>-<normalized-title>"`.
///
/// The row id prefix keeps slugs resolvable even when titles collide; the
/// result is capped at `SLUG_MAX_LEN` characters.
pub fn compose_post_slug(id: i64, title: &str) -> String {
    format!("{id}-{}", slugify(title))
        .chars()
        .take(SLUG_MAX_LEN)
        .collect()
}

/// Returns whether a caller-provided slug is shaped like a slug at all
/// (letters, digits, hyphens, underscores).
pub fn is_valid_slug(value: &str) -> bool {
    VALID_SLUG_RE.is_match(value)
}

fn transliterate(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match cyrillic_to_latin(ch) {
            Some(mapped) => out.push_str(mapped),
            None => out.push(ch),
        }
    }
    out
}

fn cyrillic_to_latin(ch: char) -> Option<&'static str> {
    Some(match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'ю' => "ju",
        'я' => "ja",
        _ => return None,
    })
}
