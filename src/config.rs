use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::platform::{NamespaceAlias, PlatformRule, PlatformTable};
use crate::position::{DEFAULT_HASH_FORMAT, LinkStyle};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".pkgdoc.toml";

/// Default tab width for printed example code.
const DEFAULT_TAB_WIDTH: usize = 4;

/// Project configuration loaded from `.pkgdoc.toml`. Every key is optional;
/// command-line flags override whatever is set here.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extra namespace aliases, tried before the built-in ones.
    aliases: Vec<AliasEntry>,
    /// Base URL for import paths no platform rule recognizes.
    fallback_url: Option<String>,
    /// Line hash format, one integer directive.
    hash_format: Option<String>,
    /// Extra platform rules, tried before the built-in ones.
    platforms: Vec<PlatformEntry>,
    /// Render examples under their declarations.
    show_examples: Option<bool>,
    /// Full position link format taking (path, line, low, high).
    src_link: Option<String>,
    /// Spaces per tab in example code.
    tab_width: Option<usize>,
    /// Template file replacing the built-in package template.
    template: Option<PathBuf>,
}

/// `[[aliases]]` table.
#[derive(Debug, serde::Deserialize)]
struct AliasEntry {
    /// Import path prefix to rewrite.
    from: String,
    /// Replacement prefix.
    to: String,
}

/// `[[platforms]]` table.
#[derive(Debug, serde::Deserialize)]
struct PlatformEntry {
    /// Regex capturing host, owner, repo and optional subpath.
    pattern: String,
    /// Browse-path suffix placed between repo and subpath.
    suffix: String,
}

/// Values from command-line flags. `None` (or `false` for switches) defers to the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// `--hashformat`
    pub hash_format: Option<String>,
    /// `--examples`
    pub show_examples: bool,
    /// `--srclink`
    pub src_link: Option<String>,
    /// `--tabwidth`
    pub tab_width: Option<usize>,
    /// `--template`
    pub template: Option<PathBuf>,
}

/// Immutable settings for a whole run, compiled and validated up front.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Position link composition.
    pub link_style: LinkStyle,
    /// Source URL resolution.
    pub platforms: PlatformTable,
    /// Whether example blocks are rendered.
    pub show_examples: bool,
    /// Spaces per tab in example code.
    pub tab_width: usize,
    /// User template, `None` for the built-in one.
    pub template: Option<PathBuf>,
}

impl Config {
    /// Load config from `path`.
    /// A missing file yields defaults unless `explicit` is set, meaning the
    /// user named the file and expects it to exist. A malformed file is
    /// always an error, never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` for a missing explicit file,
    /// `Error::Io` if reading fails, or `Error::TomlDe` if the TOML is malformed.
    pub fn load(path: &Path, explicit: bool) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if explicit {
                    return Err(Error::ConfigNotFound { path: path.to_path_buf() });
                }
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        return Ok(toml::from_str(&content)?);
    }
}

impl Settings {
    /// Merge file values with flag overrides and compile everything.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLinkFormat`, `Error::InvalidPattern` or
    /// `Error::PatternGroups` when a format or pattern cannot be used.
    pub fn build(config: Config, overrides: Overrides) -> Result<Self, Error> {
        let hash_format = overrides
            .hash_format
            .or(config.hash_format)
            .unwrap_or_else(|| return DEFAULT_HASH_FORMAT.to_string());
        let src_link = overrides.src_link.or(config.src_link);
        let link_style = LinkStyle::from_formats(&hash_format, src_link.as_deref())?;

        let rules = config
            .platforms
            .iter()
            .map(|p| return PlatformRule::new(&p.pattern, &p.suffix))
            .collect::<Result<Vec<_>, _>>()?;
        let aliases = config
            .aliases
            .iter()
            .map(|a| return NamespaceAlias::new(&a.from, &a.to))
            .collect();
        let platforms = PlatformTable::with_overrides(rules, aliases, config.fallback_url)?;

        return Ok(Self {
            link_style,
            platforms,
            show_examples: overrides.show_examples || config.show_examples.unwrap_or(false),
            tab_width: overrides.tab_width.or(config.tab_width).unwrap_or(DEFAULT_TAB_WIDTH),
            template: overrides.template.or(config.template),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, content).unwrap();
        return (dir, path);
    }

    #[test]
    fn missing_default_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(DEFAULT_CONFIG_FILE), false).unwrap();
        let settings = Settings::build(config, Overrides::default()).unwrap();
        assert_eq!(settings.tab_width, 4);
        assert!(!settings.show_examples);
        assert_eq!(settings.link_style.position_link("/target/a.go", 3, 0, 0), "/a.go#L3");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("custom.toml"), true).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let (_dir, path) = write_config("tab_width = \"wide\"");
        assert!(matches!(Config::load(&path, false).unwrap_err(), Error::TomlDe(_)));
    }

    #[test]
    fn file_values_are_applied() {
        let (_dir, path) = write_config(
            r##"
tab_width = 2
show_examples = true
hash_format = "#%d"
fallback_url = "https://pkg.go.dev/"

[[platforms]]
pattern = '^(git\.corp\.example)/([a-z]+)/([a-z]+)(/.*)?$'
suffix = "-/tree/main"

[[aliases]]
from = "go.corp.example"
to = "git.corp.example"
"##,
        );
        let settings = Settings::build(Config::load(&path, true).unwrap(), Overrides::default()).unwrap();
        assert_eq!(settings.tab_width, 2);
        assert!(settings.show_examples);
        assert_eq!(settings.link_style.position_link("/target/a.go", 3, 0, 0), "/a.go#3");
        assert_eq!(
            settings.platforms.resolve("go.corp.example/infra/tools/cmd"),
            "https://git.corp.example/infra/tools/-/tree/main/cmd"
        );
        assert_eq!(settings.platforms.resolve("fmt"), "https://pkg.go.dev/fmt");
    }

    #[test]
    fn flags_override_file() {
        let (_dir, path) = write_config("tab_width = 2\nhash_format = \"#%d\"\n");
        let overrides = Overrides {
            hash_format: Some("#L%d".to_string()),
            tab_width: Some(8),
            ..Overrides::default()
        };
        let settings = Settings::build(Config::load(&path, true).unwrap(), overrides).unwrap();
        assert_eq!(settings.tab_width, 8);
        assert_eq!(settings.link_style.position_link("/target/a.go", 3, 0, 0), "/a.go#L3");
    }

    #[test]
    fn custom_src_link_wins() {
        let overrides = Overrides {
            src_link: Some("%s?line=%d".to_string()),
            ..Overrides::default()
        };
        let settings = Settings::build(Config::default(), overrides).unwrap();
        assert_eq!(settings.link_style.position_link("a.go", 9, 0, 0), "a.go?line=9");
    }

    #[test]
    fn bad_formats_and_patterns_fail_fast() {
        let (_dir, path) = write_config("hash_format = \"#L\"\n");
        let err = Settings::build(Config::load(&path, true).unwrap(), Overrides::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidLinkFormat { .. }));

        let (_dir, path) = write_config("[[platforms]]\npattern = '^(a)/(b)$'\nsuffix = \"src\"\n");
        let err = Settings::build(Config::load(&path, true).unwrap(), Overrides::default()).unwrap_err();
        assert!(matches!(err, Error::PatternGroups { .. }));
    }
}
