//! Source position links: the path, selection query and line hash appended to a source URL.

use std::fmt::Write as _;

use crate::error::Error;
use crate::format::{Arg, ArgKind, LinkTemplate};
use crate::text;

/// Default line hash, GitHub style.
pub const DEFAULT_HASH_FORMAT: &str = "#L%d";

/// Directory the extraction engine mounts package sources under.
const MOUNT_PREFIX: &str = "/target";

/// Argument signature of a custom link format: path, line, low, high.
const CUSTOM_LINK_PARAMS: [ArgKind; 4] = [ArgKind::Str, ArgKind::Int, ArgKind::Int, ArgKind::Int];

/// How position links are composed. Chosen once when settings are built.
#[derive(Debug, Clone)]
pub enum LinkStyle {
    /// Cleaned path, optional `?s=low:high`, then the hash format applied to the line.
    BuiltIn {
        /// Template with exactly one integer directive.
        hash: LinkTemplate,
    },
    /// User template receiving (path, line, low, high), output used verbatim.
    Custom(LinkTemplate),
}

impl LinkStyle {
    /// Pick the link style from the configured formats.
    /// A non-empty custom format wins over the hash format.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLinkFormat` if the hash format does not contain
    /// exactly one integer directive, or the custom format does not fit
    /// (path, line, low, high).
    pub fn from_formats(hash_format: &str, custom: Option<&str>) -> Result<Self, Error> {
        if let Some(custom) = custom.filter(|c| return !c.is_empty()) {
            return Ok(Self::Custom(LinkTemplate::compile(custom, &CUSTOM_LINK_PARAMS)?));
        }

        let hash = LinkTemplate::compile(hash_format, &[ArgKind::Int])?;
        if hash.placeholder_count() != 1 {
            return Err(Error::InvalidLinkFormat {
                format: hash_format.to_string(),
                reason: format!(
                    "hash format needs exactly one line directive, found {}",
                    hash.placeholder_count()
                ),
            });
        }
        return Ok(Self::BuiltIn { hash });
    }

    /// Build the link for a position in `file_path`.
    ///
    /// `line <= 0` means no line; `low < high` marks a selection, which forces
    /// the line to at least 1.
    pub fn position_link(&self, file_path: &str, line: i64, low: i64, high: i64) -> String {
        let hash = match self {
            Self::Custom(template) => {
                return template.render(&[
                    Arg::Str(file_path),
                    Arg::Int(line),
                    Arg::Int(low),
                    Arg::Int(high),
                ]);
            },
            Self::BuiltIn { hash } => hash,
        };

        let mut out = text::html_escape(&repository_path(file_path));
        let mut line = line;
        if low < high {
            let _ = write!(out, "?s={low}:{high}");
            line = line.max(1);
        }
        if line > 0 {
            hash.render_into(&mut out, &[Arg::Int(line)]);
        }
        return out;
    }
}

/// Clean `"/" + path` lexically and strip the mount prefix, leaving the
/// repository-relative path with a leading slash. The mount root itself maps
/// to the empty string.
pub fn repository_path(path: &str) -> String {
    let cleaned = clean_rooted(path);
    return match cleaned.strip_prefix(MOUNT_PREFIX) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.to_string(),
        _ => cleaned,
    };
}

/// Lexical clean of a path treated as rooted: collapses repeated slashes,
/// drops `.`, resolves `..` without climbing above the root.
fn clean_rooted(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            other => parts.push(other),
        }
    }
    return format!("/{}", parts.join("/"));
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use super::*;

    fn github() -> LinkStyle {
        return LinkStyle::from_formats(DEFAULT_HASH_FORMAT, None).unwrap();
    }

    #[test]
    fn no_line_no_range_has_no_query_or_hash() {
        let link = github().position_link("/target/tool.go", 0, 0, 0);
        assert_eq!(link, "/tool.go");
        assert_eq!(github().position_link("/target", 0, 0, 0), "");
    }

    #[test]
    fn line_only_adds_hash() {
        assert_eq!(github().position_link("/target/tool.go", 42, 0, 0), "/tool.go#L42");
    }

    #[test]
    fn selection_adds_query_and_coerces_line() {
        assert_eq!(github().position_link("/target/tool.go", 0, 5, 10), "/tool.go?s=5:10#L1");
        assert_eq!(github().position_link("/target/tool.go", -3, 5, 10), "/tool.go?s=5:10#L1");
        assert_eq!(github().position_link("/target/tool.go", 8, 5, 10), "/tool.go?s=5:10#L8");
    }

    #[test]
    fn inverted_or_empty_selection_is_ignored() {
        assert_eq!(github().position_link("/target/a.go", 3, 10, 5), "/a.go#L3");
        assert_eq!(github().position_link("/target/a.go", 0, 7, 7), "/a.go");
    }

    #[test]
    fn custom_hash_format() {
        let style = LinkStyle::from_formats("#%d", None).unwrap();
        assert_eq!(style.position_link("/target/a.go", 12, 0, 0), "/a.go#12");
    }

    #[test]
    fn custom_link_format_bypasses_everything() {
        let style = LinkStyle::from_formats("#L%d", Some("%s#lines-%d")).unwrap();
        assert_eq!(style.position_link("/target/../a b.go", 0, 5, 10), "/target/../a b.go#lines-0");
    }

    #[test]
    fn empty_custom_format_means_builtin() {
        let style = LinkStyle::from_formats("#L%d", Some("")).unwrap();
        assert!(matches!(style, LinkStyle::BuiltIn { .. }));
    }

    #[test]
    fn hash_format_needs_exactly_one_directive() {
        assert!(LinkStyle::from_formats("#line", None).is_err());
        assert!(LinkStyle::from_formats("#L%d-%d", None).is_err());
    }

    #[test]
    fn path_is_cleaned_and_escaped() {
        let link = github().position_link("target//pkg/./x/../<a>.go", 1, 0, 0);
        assert_eq!(link, "/pkg/&lt;a&gt;.go#L1");
    }

    #[test]
    fn mount_prefix_only_stripped_on_segment_boundary() {
        assert_eq!(repository_path("/targets/a.go"), "/targets/a.go");
        assert_eq!(repository_path("/target/a.go"), "/a.go");
        assert_eq!(repository_path("../../target/a.go"), "/a.go");
    }
}
