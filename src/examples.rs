//! Runnable examples: matching them to declarations and formatting them as markdown.
//!
//! Examples are tied to declarations by name. `Foo` and `Foo_second` both
//! document `Foo`; `Foo_Bar` documents the method or declaration `Foo_Bar`.

use std::fmt::Write as _;

use crate::model::CodeComment;

/// Read-only view of an example, as provided by the documentation model.
pub trait ExampleSource {
    /// Printed example body.
    fn code(&self) -> &str;

    /// Comments to interleave with the body.
    fn comments(&self) -> &[CodeComment];

    /// Declared name without the `Example` prefix.
    fn name(&self) -> &str;

    /// Expected output, if the example declares one.
    fn output(&self) -> Option<&str> {
        return None;
    }
}

/// Turns an example body and its comments into source text.
pub trait CodePrinter {
    /// Print `code` with `comments` reinserted.
    fn print(&self, code: &str, comments: &[CodeComment]) -> String;
}

/// Prints code with comments placed before the line they belong to and
/// leading tabs expanded to spaces.
#[derive(Debug, Clone, Copy)]
pub struct SpacePrinter {
    /// Spaces per leading tab.
    pub tab_width: usize,
}

impl CodePrinter for SpacePrinter {
    /// In a braced body, comments stay between the braces: a comment on the
    /// opening line moves after `{` and one past the end moves before `}`.
    fn print(&self, code: &str, comments: &[CodeComment]) -> String {
        let closing = closing_brace_line(code);
        let placement = |comment: &CodeComment| -> usize {
            return match closing {
                Some(end) => comment.line.clamp(1, end),
                None => comment.line,
            };
        };

        let mut ordered: Vec<&CodeComment> = comments.iter().collect();
        ordered.sort_by_key(|c| return c.line);
        let mut pending = ordered.into_iter().peekable();

        let mut lines: Vec<String> = Vec::new();
        let mut body_indent = "";
        for (index, line) in code.split('\n').enumerate() {
            let is_closing = closing == Some(index);
            let indent = if is_closing { body_indent } else { leading_whitespace(line) };
            while let Some(comment) = pending.next_if(|c| return placement(*c) <= index) {
                push_comment(&mut lines, indent, &comment.text);
            }
            if !is_closing && index > 0 && !line.trim().is_empty() {
                body_indent = leading_whitespace(line);
            }
            lines.push(line.to_string());
        }
        for comment in pending {
            push_comment(&mut lines, "", &comment.text);
        }

        return lines
            .iter()
            .map(|line| return self.expand_leading_tabs(line))
            .collect::<Vec<_>>()
            .join("\n");
    }
}

impl SpacePrinter {
    /// Replace each leading tab with `tab_width` spaces.
    fn expand_leading_tabs(&self, line: &str) -> String {
        let body = line.trim_start_matches('\t');
        let tabs = line.len().saturating_sub(body.len());
        let mut out = " ".repeat(tabs.saturating_mul(self.tab_width));
        out.push_str(body);
        return out;
    }
}

/// Index of the line holding the closing `}` when `code` is a multi-line `{ ... }` block.
fn closing_brace_line(code: &str) -> Option<usize> {
    if !code.starts_with('{') || !code.ends_with('}') {
        return None;
    }
    let last = code.split('\n').count().saturating_sub(1);
    return (last > 0).then_some(last);
}

/// Push every line of a comment, indented like the code it precedes.
fn push_comment(lines: &mut Vec<String>, indent: &str, text: &str) {
    for comment_line in text.lines() {
        lines.push(format!("{indent}{}", comment_line.trim_start()));
    }
}

/// The run of spaces and tabs at the start of `line`.
fn leading_whitespace(line: &str) -> &str {
    let body = line.trim_start_matches([' ', '\t']);
    return line.strip_suffix(body).unwrap_or("");
}

/// The declaration name an example documents.
///
/// Drops the last `_suffix` when it is non-empty and does not start with an
/// uppercase letter. Only the last underscore is considered.
pub fn example_match_key(name: &str) -> &str {
    let Some((stem, suffix)) = name.rsplit_once('_') else {
        return name;
    };
    let starts_upper = suffix.chars().next().is_some_and(char::is_uppercase);
    if suffix.is_empty() || starts_upper {
        return name;
    }
    return stem;
}

/// Whether the example named `example_name` documents `declaration`. Case-sensitive.
pub fn matches_declaration(example_name: &str, declaration: &str) -> bool {
    return example_match_key(example_name) == declaration;
}

/// Render every example documenting `declaration` as a titled Go code block.
///
/// Returns empty text when `show_examples` is off or nothing matches. Blocks
/// keep the order of `examples` and are separated by one blank line.
pub fn format_examples<E: ExampleSource>(
    examples: &[E],
    declaration: &str,
    show_examples: bool,
    printer: &dyn CodePrinter,
) -> String {
    if !show_examples {
        return String::new();
    }

    let title = declaration.replace('_', ".");
    let mut out = String::new();
    let mut matched = 0_usize;

    for example in examples.iter().filter(|e| return matches_declaration(e.name(), declaration)) {
        matched = matched.saturating_add(1);

        let printed = printer.print(example.code(), example.comments());
        let body = normalize_example_body(&printed);
        if body.is_empty() {
            tracing::warn!(example = example.name(), "example body is empty, skipping");
            continue;
        }

        if title.is_empty() {
            out.push_str("##### Example:\n");
        } else {
            let _ = writeln!(out, "##### Example {title}:");
        }
        let _ = write!(out, "``` go\n{body}\n```\n\n");

        if let Some(output) = example.output().map(str::trim).filter(|o| return !o.is_empty()) {
            let _ = write!(out, "Output:\n\n```\n{output}\n```\n\n");
        }
    }

    if matched == 0 {
        tracing::debug!(declaration, "no examples");
    } else if out.is_empty() {
        tracing::warn!(declaration, matched, "examples matched but rendered nothing");
    }

    return out;
}

/// Strip an enclosing `{ }` pair, blank edge lines, and the common indentation.
fn normalize_example_body(printed: &str) -> String {
    let unbraced = printed
        .strip_prefix('{')
        .and_then(|inner| return inner.strip_suffix('}'))
        .unwrap_or(printed);
    let trimmed = unbraced.trim_matches('\n');

    let indent = trimmed
        .lines()
        .filter(|line| return !line.trim().is_empty())
        .map(|line| return leading_whitespace(line).len())
        .min()
        .unwrap_or(0);

    return trimmed
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                return "";
            }
            return line.get(indent..).unwrap_or(line);
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_string();
}
