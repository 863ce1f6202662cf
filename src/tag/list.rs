//! Tag lists: parsing, serialization, normalization
//!
//! A `TagList` is the transient unit exchanged between parsing and
//! reconciliation: ordered, deduplicated, non-blank names. Raw strings are
//! stored as ground truth by the host; these transforms are an interpretive
//! layer and never touch storage.

use super::config::TagConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from strict tag-list parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated quote opened at byte {offset}")]
    UnterminatedQuote { offset: usize },
}

/// An ordered list of distinct tag names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagList {
    names: Vec<String>,
}

impl TagList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from names, trimming whitespace, dropping blanks, and
    /// deduplicating while preserving first-occurrence order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new();
        for name in names {
            list.push(name.into());
        }
        list
    }

    /// Parse a raw delimited string, recovering from malformed quoting.
    ///
    /// Splits on the configured delimiter; delimiter text inside a `"…"` or
    /// `'…'` quoted segment does not split, which lets a tag name contain
    /// the delimiter. An unterminated quote falls back to the literal
    /// interpretation (quote characters treated as content) rather than
    /// failing, so a malformed string never loses the caller's data.
    ///
    /// The config's `force_lowercase` / `force_parameterize` options are
    /// applied to the result.
    pub fn parse(raw: &str, config: &TagConfig) -> Self {
        let list = match Self::parse_strict(raw, config) {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(error = %err, "malformed tag list, using literal interpretation");
                Self::literal_split(raw, config)
            }
        };
        list.normalize(config.force_lowercase, config.force_parameterize)
    }

    /// Parse a raw delimited string, reporting malformed quoting.
    ///
    /// Unlike [`TagList::parse`] this surfaces `ParseError` instead of
    /// recovering, and applies no normalization.
    pub fn parse_strict(raw: &str, config: &TagConfig) -> Result<Self, ParseError> {
        let delimiter = config.delimiter.as_str();
        let mut segments: Vec<String> = Vec::new();
        let mut buf = String::new();
        // (quote char, byte offset of the opener)
        let mut quote: Option<(char, usize)> = None;
        // Set once a quoted segment has closed: content until the next
        // delimiter is ignored, CSV-style.
        let mut closed = false;
        let mut i = 0;

        while i < raw.len() {
            let rest = &raw[i..];
            let Some(ch) = rest.chars().next() else { break };

            if let Some((q, _)) = quote {
                if ch == q {
                    if rest[ch.len_utf8()..].starts_with(q) {
                        // Doubled quote: escaped literal
                        buf.push(q);
                        i += ch.len_utf8() * 2;
                    } else {
                        quote = None;
                        closed = true;
                        i += ch.len_utf8();
                    }
                } else {
                    buf.push(ch);
                    i += ch.len_utf8();
                }
            } else if !delimiter.is_empty() && rest.starts_with(delimiter) {
                Self::flush_segment(&mut segments, &mut buf, closed);
                closed = false;
                i += delimiter.len();
            } else if (ch == '"' || ch == '\'') && !closed && buf.trim().is_empty() {
                // A quote opens a segment only at segment start; leading
                // whitespace before it is discarded.
                buf.clear();
                quote = Some((ch, i));
                i += ch.len_utf8();
            } else {
                if !closed {
                    buf.push(ch);
                }
                i += ch.len_utf8();
            }
        }

        if let Some((_, offset)) = quote {
            return Err(ParseError::UnterminatedQuote { offset });
        }
        Self::flush_segment(&mut segments, &mut buf, closed);

        let mut list = Self::new();
        for segment in segments {
            list.push_exact(segment);
        }
        Ok(list)
    }

    /// The literal fallback: split on the delimiter with no quote handling.
    fn literal_split(raw: &str, config: &TagConfig) -> Self {
        if config.delimiter.is_empty() {
            return Self::from_names([raw]);
        }
        Self::from_names(raw.split(config.delimiter.as_str()))
    }

    fn flush_segment(segments: &mut Vec<String>, buf: &mut String, quoted: bool) {
        let segment = if quoted {
            // Quoted content is kept verbatim, interior whitespace included.
            std::mem::take(buf)
        } else {
            let trimmed = buf.trim().to_string();
            buf.clear();
            trimmed
        };
        segments.push(segment);
    }

    /// Map names to lowercase and/or a slug form, re-deduplicating.
    ///
    /// Two distinct inputs may collide after the transform; the first
    /// occurrence wins. Applying the same transform twice is a no-op.
    pub fn normalize(&self, lowercase: bool, parameterize: bool) -> Self {
        if !lowercase && !parameterize {
            return self.clone();
        }
        let mut out = Self::new();
        for name in &self.names {
            let name = if lowercase {
                name.to_lowercase()
            } else {
                name.clone()
            };
            let name = if parameterize {
                slugify(&name)
            } else {
                name
            };
            out.push_exact(name);
        }
        out
    }

    /// Join names into a single string using the config's glue.
    ///
    /// A name containing the delimiter or a quote character is wrapped in
    /// double quotes, with interior double quotes doubled, so it survives a
    /// later [`TagList::parse`].
    pub fn serialize(&self, config: &TagConfig) -> String {
        let glue = config.glue();
        self.names
            .iter()
            .map(|name| quote_if_needed(name, config))
            .collect::<Vec<_>>()
            .join(&glue)
    }

    /// Append a name, trimming whitespace; blanks and duplicates are ignored.
    pub fn push(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.push_exact(name.trim().to_string());
    }

    /// Append a name verbatim; blanks and duplicates are ignored.
    fn push_exact(&mut self, name: String) {
        if name.is_empty() || self.names.contains(&name) {
            return;
        }
        self.names.push(name);
    }

    /// Remove a name if present; returns whether it was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.names.iter().position(|n| n == name) {
            Some(idx) => {
                self.names.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl IntoIterator for TagList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}

impl<S: Into<String>> FromIterator<S> for TagList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_names(iter)
    }
}

/// Slug transform: lowercase, non-alphanumeric runs collapsed to a single
/// `-`, edges trimmed.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn quote_if_needed(name: &str, config: &TagConfig) -> String {
    let has_delimiter = !config.delimiter.is_empty() && name.contains(config.delimiter.as_str());
    if has_delimiter || name.contains('"') || name.contains('\'') {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TagConfig {
        TagConfig::default()
    }

    fn names(list: &TagList) -> Vec<&str> {
        list.iter().collect()
    }

    #[test]
    fn test_parse_basic() {
        let list = TagList::parse("ruby, rails, crafting", &config());
        assert_eq!(names(&list), vec!["ruby", "rails", "crafting"]);
    }

    #[test]
    fn test_parse_drops_empty_segments() {
        let list = TagList::parse("ruby,, ,rails,", &config());
        assert_eq!(names(&list), vec!["ruby", "rails"]);
    }

    #[test]
    fn test_parse_dedupes_preserving_first_occurrence() {
        let list = TagList::parse("ruby, rails, ruby", &config());
        assert_eq!(names(&list), vec!["ruby", "rails"]);
    }

    #[test]
    fn test_parse_double_quoted_delimiter() {
        let list = TagList::parse(r#"ruby, "rails, 3.0", crafting"#, &config());
        assert_eq!(names(&list), vec!["ruby", "rails, 3.0", "crafting"]);
    }

    #[test]
    fn test_parse_single_quoted_delimiter() {
        let list = TagList::parse("ruby, 'rails, 3.0', crafting", &config());
        assert_eq!(names(&list), vec!["ruby", "rails, 3.0", "crafting"]);
    }

    #[test]
    fn test_parse_doubled_quote_is_literal() {
        let list = TagList::parse(r#""say ""hi""", other"#, &config());
        assert_eq!(names(&list), vec![r#"say "hi""#, "other"]);
    }

    #[test]
    fn test_parse_quote_mid_segment_is_literal() {
        let list = TagList::parse("rock'n'roll, jazz", &config());
        assert_eq!(names(&list), vec!["rock'n'roll", "jazz"]);
    }

    #[test]
    fn test_parse_strict_reports_unterminated_quote() {
        let err = TagList::parse_strict(r#"ruby, "rails"#, &config()).unwrap_err();
        assert_eq!(err, ParseError::UnterminatedQuote { offset: 6 });
    }

    #[test]
    fn test_parse_recovers_from_unterminated_quote() {
        // Literal fallback: the quote becomes content, the delimiter splits.
        let list = TagList::parse(r#"ruby, "rails, 3.0"#, &config());
        assert_eq!(names(&list), vec!["ruby", "\"rails", "3.0"]);
    }

    #[test]
    fn test_parse_multichar_delimiter() {
        let cfg = TagConfig::new().with_delimiter("||");
        let list = TagList::parse("ruby || rails||crafting", &cfg);
        assert_eq!(names(&list), vec!["ruby", "rails", "crafting"]);
    }

    #[test]
    fn test_parse_applies_config_normalization() {
        let cfg = TagConfig::new().with_lowercase();
        let list = TagList::parse("Ruby, Rails", &cfg);
        assert_eq!(names(&list), vec!["ruby", "rails"]);
    }

    #[test]
    fn test_serialize_joins_with_glue() {
        let list = TagList::from_names(["ruby", "rails"]);
        assert_eq!(list.serialize(&config()), "ruby, rails");
    }

    #[test]
    fn test_serialize_quotes_names_containing_delimiter() {
        let list = TagList::from_names(["rails, 3.0", "ruby"]);
        assert_eq!(list.serialize(&config()), r#""rails, 3.0", ruby"#);
    }

    #[test]
    fn test_serialize_doubles_interior_quotes() {
        let list = TagList::from_names([r#"say "hi""#]);
        assert_eq!(list.serialize(&config()), r#""say ""hi""""#);
    }

    #[test]
    fn test_round_trip_plain_names() {
        let list = TagList::from_names(["ruby", "rails", "crafting"]);
        let cfg = config();
        assert_eq!(TagList::parse(&list.serialize(&cfg), &cfg), list);
    }

    #[test]
    fn test_round_trip_name_equal_to_delimiter() {
        let list = TagList::from_names([","]);
        let cfg = config();
        let raw = list.serialize(&cfg);
        assert_eq!(raw, r#"",""#);
        assert_eq!(TagList::parse(&raw, &cfg), list);
    }

    #[test]
    fn test_round_trip_quoted_and_apostrophe_names() {
        let list = TagList::from_names([r#"say "hi""#, "rock'n'roll", "a, b"]);
        let cfg = config();
        assert_eq!(TagList::parse(&list.serialize(&cfg), &cfg), list);
    }

    #[test]
    fn test_normalize_lowercase() {
        let list = TagList::from_names(["Ruby", "RAILS"]).normalize(true, false);
        assert_eq!(names(&list), vec!["ruby", "rails"]);
    }

    #[test]
    fn test_normalize_parameterize() {
        let list = TagList::from_names(["Ruby on Rails", "C++", "  spaced  out  "])
            .normalize(false, true);
        assert_eq!(names(&list), vec!["ruby-on-rails", "c", "spaced-out"]);
    }

    #[test]
    fn test_normalize_collision_first_wins() {
        let list = TagList::from_names(["Ruby", "ruby", "RUBY"]).normalize(true, false);
        assert_eq!(names(&list), vec!["ruby"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = TagList::from_names(["Ruby on Rails", "C++", "jazz"]).normalize(true, true);
        let twice = once.normalize(true, true);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_push_and_remove() {
        let mut list = TagList::new();
        list.push("  ruby  ");
        list.push("ruby");
        list.push("   ");
        assert_eq!(names(&list), vec!["ruby"]);
        assert!(list.remove("ruby"));
        assert!(!list.remove("ruby"));
        assert!(list.is_empty());
    }
}
