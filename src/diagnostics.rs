use std::path::Path;

use crate::config::DEFAULT_CONFIG_FILE;
use crate::error::Error;

/// ANSI bold, used for headings on stderr.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened and,
/// where there is one, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::ConfigNotFound { path } => render_config_not_found(path),
        Error::InvalidLinkFormat { format, reason } => render_invalid_link_format(format, reason),
        Error::InvalidPattern { pattern, reason } => render_invalid_pattern(pattern, reason),
        Error::PatternGroups { pattern, found } => render_pattern_groups(pattern, *found),
        Error::ModelNotFound { path } => format!(
            "\
# Error: Model Not Found

`{}` does not exist.

## Fix

Point `pkgdoc-md render` at the JSON model written by your extractor.
",
            path.display()
        ),
        Error::ModelCorrupt { path, reason } => format!(
            "\
# Error: Model Corrupt

`{}` is not a package model: {reason}
",
            path.display()
        ),
        Error::Template { name, reason } => format!(
            "\
# Error: Template

`{name}` failed: {reason}
"
        ),
        Error::TemplateNotFound { path } => format!(
            "\
# Error: Template Not Found

`{}` does not exist.

## Fix

Check `--template` or the `template` key in `{DEFAULT_CONFIG_FILE}`.
",
            path.display()
        ),
        Error::Io(err) => format!(
            "\
# Error: I/O

{err}
"
        ),
        Error::TomlDe(err) => format!(
            "\
# Error: Invalid TOML

{err}
"
        ),
    };
}

/// An explicit `--config` path that does not exist.
fn render_config_not_found(path: &Path) -> String {
    return format!(
        "\
# Error: Config Not Found

`{}` does not exist.

## Fix

Drop `--config` to use `{DEFAULT_CONFIG_FILE}` from the working directory,
or create the file.
",
        path.display()
    );
}

/// A hash or source link format that cannot be compiled.
fn render_invalid_link_format(format: &str, reason: &str) -> String {
    return format!(
        "\
# Error: Invalid Link Format

`{format}`: {reason}

## Supported directives

- `%d` integer, `%s` string, `%v` either, `%%` literal percent
- `%[n]d` picks argument `n` (1-based)

Hash formats take one argument, the line: `#L%d`.
Source link formats take path, line, low, high: `%s#L%d`.
"
    );
}

/// A platform regex that does not compile.
fn render_invalid_pattern(pattern: &str, reason: &str) -> String {
    return format!(
        "\
# Error: Invalid Platform Pattern

`{pattern}` does not compile:

    {reason}
"
    );
}

/// A platform regex with the wrong number of capture groups.
fn render_pattern_groups(pattern: &str, found: usize) -> String {
    return format!(
        "\
# Error: Invalid Platform Pattern

`{pattern}` has {found} capture groups.

## Fix

Capture exactly four groups: host, owner, repo, and an optional subpath:

    ^(git\\.example\\.com)/([\\w.-]+)/([\\w.-]+)(/.*)?$
"
    );
}
