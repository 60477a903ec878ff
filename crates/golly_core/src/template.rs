//! Intrinsic template parsing and substitution.
//!
//! Templates are literal JavaScript fragments with two kinds of placeholders:
//!
//! - `$_` – the rendered receiver expression (empty when there is none)
//! - `$1`..`$n` – the rendered argument expressions, 1-based, in call order
//!
//! Any other `$` is literal text, so templates can mention JavaScript identifiers such as `$el` or `jQuery.$`.
//!
//! ## Examples
//! ```rust
//! use golly_core::Template;
//!
//! let template = Template::parse("$_.x = $1");
//! assert_eq!(template.render("obj", &["5"]).unwrap(), "obj.x = 5");
//! ```

use thiserror::Error;

/// Failure while substituting a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template references `$index` but only `supplied` arguments were bound.
    #[error("template references ${index} but only {supplied} argument(s) were supplied")]
    MissingArgument { index: usize, supplied: usize },
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Receiver,
    /// 1-based positional argument.
    Arg(usize),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Split a template string into text and placeholder segments.
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            if c != '$' {
                text.push(c);
                continue;
            }
            match chars.peek().map(|&(_, next)| next) {
                Some('_') => {
                    chars.next();
                    flush(&mut text, &mut segments);
                    segments.push(Segment::Receiver);
                }
                Some(d) if d.is_ascii_digit() && d != '0' => {
                    let mut index = 0usize;
                    while let Some(&(_, d)) = chars.peek() {
                        let Some(digit) = d.to_digit(10) else { break };
                        index = index.saturating_mul(10).saturating_add(digit as usize);
                        chars.next();
                    }
                    flush(&mut text, &mut segments);
                    segments.push(Segment::Arg(index));
                }
                _ => text.push('$'),
            }
        }
        flush(&mut text, &mut segments);

        Self {
            source: source.to_string(),
            segments,
        }
    }

    /// The original template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the template mentions `$_`.
    pub fn uses_receiver(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Receiver))
    }

    /// Highest positional placeholder referenced, or 0.
    pub fn max_arg(&self) -> usize {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Arg(i) => Some(*i),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Substitute the receiver and arguments into the template.
    ///
    /// Arguments beyond the highest placeholder are ignored; a placeholder beyond the supplied arguments is an error.
    pub fn render<S: AsRef<str>>(&self, receiver: &str, args: &[S]) -> Result<String, TemplateError> {
        let max = self.max_arg();
        if max > args.len() {
            return Err(TemplateError::MissingArgument {
                index: max,
                supplied: args.len(),
            });
        }

        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Receiver => out.push_str(receiver),
                Segment::Arg(i) => out.push_str(args[i - 1].as_ref()),
            }
        }
        Ok(out)
    }
}

fn flush(text: &mut String, segments: &mut Vec<Segment>) {
    if !text.is_empty() {
        segments.push(Segment::Text(std::mem::take(text)));
    }
}
