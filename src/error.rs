/// Crate-level error types for pkgdoc-md diagnostics.
use std::path::PathBuf;

/// Every error names the file, pattern, or format string at fault so the
/// diagnostic can point the user at the line to change. Configuration errors
/// surface before any package is rendered.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A config file named on the command line does not exist on disk.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// A hash format or custom source-link format cannot be used.
    #[error("invalid link format `{format}`: {reason}")]
    InvalidLinkFormat {
        /// The format string as written by the user.
        format: String,
        /// Why the format was rejected.
        reason: String,
    },

    /// A platform rule regex failed to compile.
    #[error("invalid platform pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The regex source.
        pattern: String,
        /// Compiler message from the regex crate.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// A package model file exists but is not a valid model document.
    #[error("model corrupt: {}: {reason}", path.display())]
    ModelCorrupt {
        /// Model file that failed to deserialize.
        path: PathBuf,
        /// Deserializer message.
        reason: String,
    },

    /// A package model file does not exist on disk.
    #[error("model not found: {}", path.display())]
    ModelNotFound {
        /// Path to the missing model file.
        path: PathBuf,
    },

    /// A platform rule regex compiled but does not capture host, owner, repo and subpath.
    #[error("platform pattern `{pattern}` has {found} capture groups, expected 4")]
    PatternGroups {
        /// Number of explicit capture groups in the pattern.
        found: usize,
        /// The regex source.
        pattern: String,
    },

    /// Tera failed to parse or render a template.
    #[error("template `{name}`: {reason}")]
    Template {
        /// Template name (file path or the built-in name).
        name: String,
        /// Tera error chain, flattened.
        reason: String,
    },

    /// A user template file named in config or flags does not exist.
    #[error("template not found: {}", path.display())]
    TemplateNotFound {
        /// Path to the missing template.
        path: PathBuf,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}

impl Error {
    /// Build a `Template` error from a tera error, keeping the whole source chain.
    /// Tera hides the useful part (line, filter name) in nested sources.
    pub fn template(name: &str, err: &tera::Error) -> Self {
        let mut reason = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(inner) = source {
            reason.push_str(": ");
            reason.push_str(&inner.to_string());
            source = inner.source();
        }
        return Self::Template {
            name: name.to_string(),
            reason,
        };
    }
}
