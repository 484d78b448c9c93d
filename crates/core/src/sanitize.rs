use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

pub const MAX_TITLE_LENGTH: usize = 80;
pub const UNTITLED: &str = "untitled";

static DISALLOWED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N} _-]").expect("disallowed pattern is valid"));
static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("spaces pattern is valid"));

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Reduce a display title to a filename-safe token.
///
/// Accents are decomposed and dropped, anything other than letters, digits, space, `_` and `-`
/// is removed, space runs become a single `_`, and the result is capped at
/// [`MAX_TITLE_LENGTH`] characters. An empty result becomes [`UNTITLED`].
pub fn sanitize_title(title: &str) -> String {
    let decomposed: String = title.nfkd().filter(|c| !is_combining_diacritic(*c)).collect();
    let kept = DISALLOWED_RE.replace_all(&decomposed, "");
    let joined = SPACES_RE.replace_all(&kept, "_");
    let truncated: String = joined.chars().take(MAX_TITLE_LENGTH).collect();

    if truncated.is_empty() {
        UNTITLED.to_string()
    } else {
        truncated
    }
}
