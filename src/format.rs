//! Printf-style link templates (`#L%d`, `%s?at=%[2]d`) compiled once at startup.
//!
//! Supported directives: `%d` (integer), `%s` (string), `%v` (either), `%%`,
//! and explicit one-based argument indexes such as `%[2]d`. After an indexed
//! directive, plain directives continue from the following argument.

use std::fmt::Write as _;

use crate::error::Error;

/// Expected type of a positional template argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Integer argument (line, selection bound).
    Int,
    /// String argument (file path).
    Str,
}

/// A runtime argument handed to [`LinkTemplate::render`].
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    /// Integer value.
    Int(i64),
    /// String value.
    Str(&'a str),
}

/// Conversion directive after the `%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    /// `%d`
    Decimal,
    /// `%s`
    Str,
    /// `%v`
    Value,
}

/// One piece of a compiled template.
#[derive(Debug, Clone)]
enum Segment {
    /// Text copied as-is.
    Literal(String),
    /// Zero-based argument slot. The directive was checked against the
    /// argument kind at compile time, so every kind prints as itself.
    Arg(usize),
}

/// A validated template. Construction fails on unknown directives, out of
/// range argument indexes, and directives whose type does not fit the argument.
#[derive(Debug, Clone)]
pub struct LinkTemplate {
    /// Number of argument directives (`%%` excluded).
    placeholders: usize,
    /// Compiled pieces in output order.
    segments: Vec<Segment>,
}

impl LinkTemplate {
    /// Compile `source` against the argument signature `params`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLinkFormat` when the template cannot be
    /// rendered with arguments of the given kinds.
    pub fn compile(source: &str, params: &[ArgKind]) -> Result<Self, Error> {
        let invalid = |reason: String| {
            return Error::InvalidLinkFormat {
                format: source.to_string(),
                reason,
            };
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut next_arg = 0_usize;
        let mut placeholders = 0_usize;
        let mut chars = source.chars();

        while let Some(ch) = chars.next() {
            if ch != '%' {
                literal.push(ch);
                continue;
            }

            let mut directive = chars.next();
            let mut index = next_arg;
            if directive == Some('%') {
                literal.push('%');
                continue;
            }
            if directive == Some('[') {
                index = parse_explicit_index(&mut chars).map_err(&invalid)?;
                directive = chars.next();
            }

            let verb = match directive {
                Some('d') => Verb::Decimal,
                Some('s') => Verb::Str,
                Some('v') => Verb::Value,
                Some(other) => return Err(invalid(format!("unsupported directive `%{other}`"))),
                None => return Err(invalid("dangling `%` at end of format".to_string())),
            };

            let Some(kind) = params.get(index) else {
                let position = index.saturating_add(1);
                let available = params.len();
                return Err(invalid(format!(
                    "directive refers to argument {position} but only {available} are available"
                )));
            };
            check_verb_fits(verb, *kind).map_err(&invalid)?;

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Arg(index));
            next_arg = index.saturating_add(1);
            placeholders = placeholders.saturating_add(1);
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        return Ok(Self { placeholders, segments });
    }

    /// Number of argument directives in the template.
    pub const fn placeholder_count(&self) -> usize {
        return self.placeholders;
    }

    /// Append the rendered template to `out`. Arguments missing at render time
    /// print nothing; compile-time validation keeps that from happening in practice.
    pub fn render_into(&self, out: &mut String, args: &[Arg<'_>]) {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Arg(index) => match args.get(*index) {
                    Some(Arg::Int(n)) => {
                        let _ = write!(out, "{n}");
                    },
                    Some(Arg::Str(s)) => out.push_str(s),
                    None => {},
                },
            }
        }
    }

    /// Render the template to a fresh string.
    pub fn render(&self, args: &[Arg<'_>]) -> String {
        let mut out = String::new();
        self.render_into(&mut out, args);
        return out;
    }
}

/// Read the digits of `%[n]` after the opening bracket, through the closing bracket.
/// Returns the zero-based index.
fn parse_explicit_index(chars: &mut std::str::Chars<'_>) -> Result<usize, String> {
    let mut digits = String::new();
    for ch in chars.by_ref() {
        if ch == ']' {
            let position: usize = digits
                .parse()
                .map_err(|_err| return format!("bad argument index `[{digits}]`"))?;
            return position
                .checked_sub(1)
                .ok_or_else(|| return "argument indexes start at 1".to_string());
        }
        digits.push(ch);
    }
    return Err(format!("unterminated argument index `[{digits}`"));
}

/// Reject `%d` on a string argument and `%s` on an integer argument.
fn check_verb_fits(verb: Verb, kind: ArgKind) -> Result<(), String> {
    return match (verb, kind) {
        (Verb::Decimal, ArgKind::Str) => Err("`%d` used for the path argument".to_string()),
        (Verb::Str, ArgKind::Int) => Err("`%s` used for an integer argument".to_string()),
        _ => Ok(()),
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use super::*;

    const LINK_PARAMS: [ArgKind; 4] = [ArgKind::Str, ArgKind::Int, ArgKind::Int, ArgKind::Int];

    #[test]
    fn renders_github_hash() {
        let t = LinkTemplate::compile("#L%d", &[ArgKind::Int]).unwrap();
        assert_eq!(t.placeholder_count(), 1);
        assert_eq!(t.render(&[Arg::Int(42)]), "#L42");
    }

    #[test]
    fn percent_escape_is_literal() {
        let t = LinkTemplate::compile("100%%#%d", &[ArgKind::Int]).unwrap();
        assert_eq!(t.placeholder_count(), 1);
        assert_eq!(t.render(&[Arg::Int(3)]), "100%#3");
    }

    #[test]
    fn sequential_directives_consume_arguments_in_order() {
        let t = LinkTemplate::compile("%s#lines-%d:%d-%d", &LINK_PARAMS).unwrap();
        let out = t.render(&[Arg::Str("/a.go"), Arg::Int(7), Arg::Int(1), Arg::Int(9)]);
        assert_eq!(out, "/a.go#lines-7:1-9");
    }

    #[test]
    fn explicit_index_resets_the_cursor() {
        let t = LinkTemplate::compile("%[2]d@%[1]s#%d", &LINK_PARAMS).unwrap();
        let out = t.render(&[Arg::Str("x.go"), Arg::Int(5), Arg::Int(0), Arg::Int(0)]);
        assert_eq!(out, "5@x.go#5");
    }

    #[test]
    fn value_directive_accepts_any_kind() {
        let t = LinkTemplate::compile("%v:%v", &LINK_PARAMS).unwrap();
        assert_eq!(t.render(&[Arg::Str("p"), Arg::Int(2), Arg::Int(0), Arg::Int(0)]), "p:2");
    }

    #[test]
    fn rejects_unknown_directive() {
        let err = LinkTemplate::compile("#L%x", &[ArgKind::Int]).unwrap_err();
        assert!(matches!(err, Error::InvalidLinkFormat { .. }));
    }

    #[test]
    fn rejects_too_many_directives() {
        assert!(LinkTemplate::compile("#L%d-%d", &[ArgKind::Int]).is_err());
        assert!(LinkTemplate::compile("%[5]d", &LINK_PARAMS).is_err());
        assert!(LinkTemplate::compile("%[0]d", &LINK_PARAMS).is_err());
    }

    #[test]
    fn rejects_mismatched_kinds() {
        assert!(LinkTemplate::compile("%d", &LINK_PARAMS).is_err());
        assert!(LinkTemplate::compile("#L%s", &[ArgKind::Int]).is_err());
    }

    #[test]
    fn rejects_dangling_percent() {
        assert!(LinkTemplate::compile("#L%", &[ArgKind::Int]).is_err());
        assert!(LinkTemplate::compile("%[2d", &LINK_PARAMS).is_err());
    }
}
