//! `js:"..."` annotation tags carried in doc comments.
//!
//! A declaration may carry a struct-tag style annotation anywhere in its doc comment:
//!
//! ```text
//! // WebKitPoint struct
//! // js:"WebKitPoint,omit"
//! ```
//!
//! The first comma-separated field renames the emitted symbol (empty keeps the source name); the remaining fields are
//! flags. `omit` is the only flag the compiler understands; unknown flags are kept so callers can warn about them.

use super::conventions::{ANNOTATION_KEY, OMIT_FLAG};

/// Parsed annotation tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub rename: Option<String>,
    pub omit: bool,
    pub unknown_flags: Vec<String>,
}

/// Find and parse the first `js:"..."` tag in a doc comment.
///
/// Returns `None` when the doc has no tag or the tag is unterminated.
pub fn parse(doc: &str) -> Option<Annotation> {
    let needle = format!("{ANNOTATION_KEY}:\"");
    for line in doc.lines() {
        let Some(start) = line.find(&needle) else {
            continue;
        };
        // Reject `xjs:"..."`: the key must not be the tail of a longer word.
        let preceded_by_word = line[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if preceded_by_word {
            continue;
        }
        let rest = &line[start + needle.len()..];
        let end = rest.find('"')?;
        return Some(parse_fields(&rest[..end]));
    }
    None
}

fn parse_fields(body: &str) -> Annotation {
    let mut fields = body.split(',').map(str::trim);
    let rename = fields.next().filter(|name| !name.is_empty()).map(str::to_string);
    let mut annotation = Annotation {
        rename,
        ..Annotation::default()
    };
    for flag in fields.filter(|f| !f.is_empty()) {
        if flag == OMIT_FLAG {
            annotation.omit = true;
        } else {
            annotation.unknown_flags.push(flag.to_string());
        }
    }
    annotation
}
