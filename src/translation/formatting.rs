/*!
 * Format preservation for translated text.
 *
 * Subtitle text can start with override or positioning tags (`{\an8}`,
 * `{\i1}`) that services tend to drop or mangle. The tags are split off
 * before the call and put back afterwards. Entries made only of markup are
 * never sent to a service.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading override blocks, e.g. `{\an8}{\i1}`
static LEADING_TAGS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\{\\[^}]*\}\s*)+").unwrap()
});

/// Any markup: override blocks and HTML-style tags
static MARKUP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[^}]*\}|</?[a-zA-Z][^>]*>").unwrap()
});

/// Format preserver for maintaining text formatting during translation
pub struct FormatPreserver;

impl FormatPreserver {
    /// Split text into its leading override tags and the remaining body
    pub fn split_leading_tags(text: &str) -> (&str, &str) {
        match LEADING_TAGS_REGEX.find(text) {
            Some(tags) => (&text[..tags.end()], &text[tags.end()..]),
            None => ("", text),
        }
    }

    /// Whether the text carries nothing but markup and whitespace
    pub fn is_markup_only(text: &str) -> bool {
        MARKUP_REGEX.replace_all(text, "").trim().is_empty()
    }

    /// Put the original's leading tags back if the translation lost them
    pub fn restore_leading_tags(original: &str, translated: &str) -> String {
        let (tags, _) = Self::split_leading_tags(original);
        if tags.is_empty() || translated.starts_with(tags) {
            return translated.to_string();
        }

        let (_, translated_body) = Self::split_leading_tags(translated);
        format!("{}{}", tags, translated_body)
    }
}
