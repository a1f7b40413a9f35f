//! Doc comment text to markdown.

/// Converts raw doc comment text into markdown.
pub trait CommentRenderer {
    /// Render `text` as markdown.
    fn render(&self, text: &str) -> String;
}

/// Plain-text doc comment conventions mapped onto markdown: blank-line
/// separated paragraphs, indented blocks as code, and standalone capitalized
/// lines between paragraphs as headings.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownComments;

/// A run of comment lines of one kind.
#[derive(Debug, PartialEq, Eq)]
enum Block<'a> {
    /// Indented lines, possibly with blank lines between them.
    Code(Vec<&'a str>),
    /// Unindented, non-blank lines.
    Paragraph(Vec<&'a str>),
}

impl CommentRenderer for MarkdownComments {
    fn render(&self, text: &str) -> String {
        let blocks = split_blocks(text);
        let mut rendered: Vec<String> = Vec::with_capacity(blocks.len());

        for (index, block) in blocks.iter().enumerate() {
            let out = match block {
                Block::Code(lines) => render_code(lines),
                Block::Paragraph(lines) => match heading_text(&blocks, index) {
                    Some(heading) => format!("### {heading}"),
                    None => lines
                        .iter()
                        .map(|line| return line.trim_end())
                        .collect::<Vec<_>>()
                        .join("\n"),
                },
            };
            rendered.push(out);
        }

        if rendered.is_empty() {
            return String::new();
        }
        let mut out = rendered.join("\n\n");
        out.push('\n');
        return out;
    }
}

/// Whether a line is part of a preformatted block.
fn is_indented(line: &str) -> bool {
    return line.starts_with(' ') || line.starts_with('\t');
}

/// Group lines into paragraphs and code blocks; blank lines only separate.
fn split_blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }
        if is_indented(line) {
            let mut code = vec![line];
            while let Some(next) = lines.next_if(|n| return is_indented(n) || n.trim().is_empty()) {
                code.push(next);
            }
            blocks.push(Block::Code(code));
        } else {
            let mut paragraph = vec![line];
            while let Some(next) = lines.next_if(|n| return !n.trim().is_empty() && !is_indented(n)) {
                paragraph.push(next);
            }
            blocks.push(Block::Paragraph(paragraph));
        }
    }

    return blocks;
}

/// Fence a code block after removing its common indentation and trailing blank lines.
fn render_code(lines: &[&str]) -> String {
    let mut end = lines.len();
    while end > 0 && lines.get(end.saturating_sub(1)).is_some_and(|l| return l.trim().is_empty()) {
        end = end.saturating_sub(1);
    }
    let body = lines.get(..end).unwrap_or(lines);

    let indent = body
        .iter()
        .filter(|line| return !line.trim().is_empty())
        .map(|line| return line.len().saturating_sub(line.trim_start_matches([' ', '\t']).len()))
        .min()
        .unwrap_or(0);

    let dedented: Vec<&str> = body
        .iter()
        .map(|line| return line.get(indent..).unwrap_or("").trim_end())
        .collect();
    return format!("``` go\n{}\n```", dedented.join("\n"));
}

/// The heading text when block `index` is a one-line paragraph that reads like
/// a title and sits between two paragraphs.
fn heading_text<'a>(blocks: &[Block<'a>], index: usize) -> Option<&'a str> {
    let Some(Block::Paragraph(lines)) = blocks.get(index) else {
        return None;
    };
    let [line] = lines.as_slice() else {
        return None;
    };
    let line: &'a str = *line;

    let prev = index.checked_sub(1).and_then(|i| return blocks.get(i));
    let next = blocks.get(index.saturating_add(1));
    if !matches!(prev, Some(Block::Paragraph(_))) || !matches!(next, Some(Block::Paragraph(_))) {
        return None;
    }

    let line = line.trim();
    return looks_like_heading(line).then_some(line);
}

/// Capitalized, no sentence punctuation, ends in a letter or digit.
fn looks_like_heading(line: &str) -> bool {
    let starts_upper = line.chars().next().is_some_and(char::is_uppercase);
    let ends_well = line.chars().last().is_some_and(char::is_alphanumeric);
    let plain = line
        .chars()
        .all(|c| return c.is_alphanumeric() || matches!(c, ' ' | '(' | ')' | ',' | '\''));
    return starts_upper && ends_well && plain;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(text: &str) -> String {
        return MarkdownComments.render(text);
    }

    #[test]
    fn empty_comment_renders_nothing() {
        assert_eq!(render(""), "");
        assert_eq!(render("\n\n"), "");
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        assert_eq!(
            render("Package tool does things.\nIt is small.\n\nSecond paragraph.\n"),
            "Package tool does things.\nIt is small.\n\nSecond paragraph.\n"
        );
    }

    #[test]
    fn indented_blocks_become_fenced_code() {
        let out = render("Usage:\n\n    tool -v $PKG\n      nested\n\nDone.\n");
        assert_eq!(out, "Usage:\n\n``` go\ntool -v $PKG\n  nested\n```\n\nDone.\n");
    }

    #[test]
    fn title_line_between_paragraphs_is_a_heading() {
        let out = render("Intro text.\n\nUsage Notes\n\nMore text.\n");
        assert_eq!(out, "Intro text.\n\n### Usage Notes\n\nMore text.\n");
    }

    #[test]
    fn heading_needs_surrounding_paragraphs() {
        assert_eq!(render("Usage Notes\n\nMore text.\n"), "Usage Notes\n\nMore text.\n");
    }

    #[test]
    fn sentences_are_not_headings() {
        let out = render("Intro.\n\nThis ends with a period.\n\nMore.\n");
        assert!(!out.contains("###"));
    }

    #[test]
    fn trailing_parenthesis_is_not_a_heading() {
        let out = render("Intro.\n\nConfiguration (advanced)\n\nMore.\n");
        assert!(!out.contains("###"), "{out}");
        assert!(render("Intro.\n\nVersion 2\n\nMore.\n").contains("### Version 2"));
    }

    #[test]
    fn unicode_space_after_indent_keeps_the_line() {
        let out = render("Intro.\n\n \u{a0}keep me\n  other\n");
        assert_eq!(out, "Intro.\n\n``` go\n\u{a0}keep me\n other\n```\n");
    }

    #[test]
    fn list_lines_are_kept() {
        let out = render("Options:\n- fast\n- small\n");
        assert_eq!(out, "Options:\n- fast\n- small\n");
    }
}
