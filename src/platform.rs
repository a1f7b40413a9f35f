//! Import path to browsable source URL, via an ordered table of hosting-platform rules.

use regex::Regex;

use crate::error::Error;

/// Default base for import paths no rule recognizes.
pub const DEFAULT_FALLBACK_URL: &str = "https://golang.org/src/";

/// Built-in rules as (pattern, browse-path suffix), most specific first.
/// The last entry is the catch-all for any `name.tld/owner/repo` host.
const BUILTIN_RULES: [(&str, &str); 3] = [
    (
        r"^(github\.com)/(?P<owner>[a-z0-9A-Z_.\-]+)/(?P<repo>[a-z0-9A-Z_.\-]+)(?P<dir>/.*)?$",
        "tree/master",
    ),
    (
        r"^(bitbucket\.org)/(?P<owner>[a-z0-9A-Z_.\-]+)/(?P<repo>[a-z0-9A-Z_.\-]+)(?P<dir>/[a-z0-9A-Z_.\-/]*)?$",
        "src/master",
    ),
    (
        r"^(?P<domain>[a-z0-9A-Z_.\-]+\.[a-z]+)/(?P<owner>[a-z0-9A-Z_.\-]+)/(?P<repo>[a-z0-9A-Z_.\-]+)(?P<dir>/[a-z0-9A-Z_.\-/]*)?$",
        "src",
    ),
];

/// Built-in namespace aliases as (from, to).
const BUILTIN_ALIASES: [(&str, &str); 1] = [("golang.org/x", "github.com/golang")];

/// One hosting platform: a pattern capturing host, owner, repo and optional
/// subpath, and the path segment the platform puts between repo and subpath.
#[derive(Debug, Clone)]
pub struct PlatformRule {
    /// Compiled pattern with exactly four capture groups.
    pattern: Regex,
    /// Browse-path suffix such as `tree/master`.
    suffix: String,
}

impl PlatformRule {
    /// Compile a rule.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if the regex does not compile, or
    /// `Error::PatternGroups` if it does not have exactly four capture groups.
    pub fn new(pattern: &str, suffix: &str) -> Result<Self, Error> {
        let compiled = Regex::new(pattern).map_err(|e| {
            return Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            };
        })?;

        // captures_len counts the implicit whole-match group.
        let found = compiled.captures_len().saturating_sub(1);
        if found != 4 {
            return Err(Error::PatternGroups {
                found,
                pattern: pattern.to_string(),
            });
        }

        return Ok(Self {
            pattern: compiled,
            suffix: suffix.to_string(),
        });
    }

    /// Rewrite `path` into `https://host/owner/repo/suffix[/subpath]`, or `None` if the rule does not match.
    fn rewrite(&self, path: &str) -> Option<String> {
        let caps = self.pattern.captures(path)?;
        let group = |i: usize| return caps.get(i).map_or("", |m| return m.as_str());

        let mut url = format!("https://{}/{}/{}/{}", group(1), group(2), group(3), self.suffix);
        url.push_str(group(4));
        return Some(url);
    }
}

/// Rewrites an umbrella namespace to the hosting namespace that actually serves it.
#[derive(Debug, Clone)]
pub struct NamespaceAlias {
    /// Leading path segments to replace.
    from: String,
    /// Replacement segments.
    to: String,
}

impl NamespaceAlias {
    /// Create an alias. Trailing slashes on either side are ignored.
    pub fn new(from: &str, to: &str) -> Self {
        return Self {
            from: from.trim_end_matches('/').to_string(),
            to: to.trim_end_matches('/').to_string(),
        };
    }

    /// Apply the alias when `path` starts with `from` on a segment boundary.
    fn apply(&self, path: &str) -> Option<String> {
        let rest = path.strip_prefix(self.from.as_str())?;
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }
        return Some(format!("{}{rest}", self.to));
    }
}

/// Ordered rule table. Rules are tried in order and the first match wins;
/// nothing reorders them, so the generic catch-all must stay last.
#[derive(Debug, Clone)]
pub struct PlatformTable {
    /// Aliases, first applicable one wins.
    aliases: Vec<NamespaceAlias>,
    /// Base URL for paths no rule matches; the import path is appended.
    fallback: String,
    /// Rules in evaluation order.
    rules: Vec<PlatformRule>,
}

impl PlatformTable {
    /// The built-in table: GitHub, Bitbucket, then any `host.tld/owner/repo`.
    ///
    /// # Errors
    ///
    /// Propagates rule compilation errors.
    #[cfg(test)]
    pub fn builtin() -> Result<Self, Error> {
        return Self::with_overrides(Vec::new(), Vec::new(), None);
    }

    /// Build a table with user rules and aliases evaluated before the built-in ones.
    ///
    /// # Errors
    ///
    /// Propagates rule compilation errors from the built-in rules.
    pub fn with_overrides(
        mut rules: Vec<PlatformRule>,
        mut aliases: Vec<NamespaceAlias>,
        fallback: Option<String>,
    ) -> Result<Self, Error> {
        for (pattern, suffix) in BUILTIN_RULES {
            rules.push(PlatformRule::new(pattern, suffix)?);
        }
        for (from, to) in BUILTIN_ALIASES {
            aliases.push(NamespaceAlias::new(from, to));
        }

        return Ok(Self {
            aliases,
            fallback: fallback.unwrap_or_else(|| return DEFAULT_FALLBACK_URL.to_string()),
            rules,
        });
    }

    /// Resolve an import path to a browsable base URL.
    /// Never empty: unrecognized paths fall back to `fallback + import_path`.
    pub fn resolve(&self, import_path: &str) -> String {
        let normalized = self
            .aliases
            .iter()
            .find_map(|alias| return alias.apply(import_path))
            .unwrap_or_else(|| return import_path.to_string());

        if let Some(url) = self.rules.iter().find_map(|rule| return rule.rewrite(&normalized)) {
            return url;
        }

        tracing::debug!(import_path, "no platform rule matched, using fallback");
        return format!("{}{import_path}", self.fallback);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use super::*;

    fn table() -> PlatformTable {
        return PlatformTable::builtin().unwrap();
    }

    #[test]
    fn github_subpath_is_kept_after_suffix() {
        assert_eq!(
            table().resolve("github.com/acme/proj/cmd/tool"),
            "https://github.com/acme/proj/tree/master/cmd/tool"
        );
    }

    #[test]
    fn github_repo_root_has_no_trailing_subpath() {
        assert_eq!(table().resolve("github.com/acme/proj"), "https://github.com/acme/proj/tree/master");
    }

    #[test]
    fn bitbucket_uses_src_master() {
        assert_eq!(
            table().resolve("bitbucket.org/team/repo/pkg/sub"),
            "https://bitbucket.org/team/repo/src/master/pkg/sub"
        );
    }

    #[test]
    fn other_hosts_use_generic_rule() {
        assert_eq!(
            table().resolve("gitlab.com/group/project/internal"),
            "https://gitlab.com/group/project/src/internal"
        );
    }

    #[test]
    fn umbrella_namespace_is_rewritten_before_matching() {
        assert_eq!(
            table().resolve("golang.org/x/tools/godoc"),
            "https://github.com/golang/tools/tree/master/godoc"
        );
    }

    #[test]
    fn alias_requires_segment_boundary() {
        let alias = NamespaceAlias::new("golang.org/x", "github.com/golang");
        assert!(alias.apply("golang.org/xerrors").is_none());
        assert_eq!(alias.apply("golang.org/x/net").unwrap(), "github.com/golang/net");
    }

    #[test]
    fn unmatched_paths_fall_back_and_are_never_empty() {
        assert_eq!(table().resolve("fmt"), "https://golang.org/src/fmt");
        assert_eq!(table().resolve("net/http"), "https://golang.org/src/net/http");
        assert!(!table().resolve("").is_empty());
    }

    #[test]
    fn disallowed_characters_fall_through_to_fallback() {
        assert_eq!(
            table().resolve("bitbucket.org/team/repo/has space"),
            "https://golang.org/src/bitbucket.org/team/repo/has space"
        );
    }

    #[test]
    fn user_rules_take_precedence() {
        let rule = PlatformRule::new(
            r"^(git\.corp\.example)/([a-z]+)/([a-z]+)(/.*)?$",
            "-/tree/main",
        )
        .unwrap();
        let table = PlatformTable::with_overrides(vec![rule], Vec::new(), None).unwrap();
        assert_eq!(
            table.resolve("git.corp.example/infra/tools/cli"),
            "https://git.corp.example/infra/tools/-/tree/main/cli"
        );
    }

    #[test]
    fn synthetic_rule_composes_url() {
        let rule = PlatformRule::new(r"^(github\.com)/([^/]+)/([^/]+)(/.*)?$", "tree/master").unwrap();
        let table = PlatformTable::with_overrides(vec![rule], Vec::new(), None).unwrap();
        assert_eq!(
            table.resolve("github.com/acme/proj/cmd/tool"),
            "https://github.com/acme/proj/tree/master/cmd/tool"
        );
    }

    #[test]
    fn rejects_wrong_group_count() {
        let err = PlatformRule::new(r"^(github\.com)/(\w+)$", "tree/master").unwrap_err();
        assert!(matches!(err, Error::PatternGroups { found: 2, .. }));
    }

    #[test]
    fn rejects_invalid_regex() {
        let err = PlatformRule::new(r"^(github\.com", "tree/master").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn resolution_is_deterministic() {
        let t = table();
        assert_eq!(t.resolve("github.com/a/b/c"), t.resolve("github.com/a/b/c"));
    }
}
