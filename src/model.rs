//! Documentation model: the already-extracted package facts the templates render.
//!
//! Models are JSON documents written by an external extractor. Every
//! collection is optional and unknown fields are ignored, so extractors can
//! carry extra data without breaking rendering.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::examples::ExampleSource;

/// One documented package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    /// Known bugs (`BUG(who): ...` notes), raw comment text.
    pub bugs: Vec<String>,
    /// Package-level constant groups.
    pub consts: Vec<ValueDecl>,
    /// Package comment, raw text.
    pub doc: String,
    /// All runnable examples of the package, in source order.
    pub examples: Vec<Example>,
    /// Source file paths as seen by the extractor (under the `/target` mount).
    pub filenames: Vec<String>,
    /// Package-level functions that are not constructors of a listed type.
    pub funcs: Vec<FuncDecl>,
    /// Canonical import path, e.g. `github.com/acme/proj/cmd/tool`.
    pub import_path: String,
    /// Package name.
    pub name: String,
    /// Exported types with their associated declarations.
    pub types: Vec<TypeDecl>,
    /// Package-level variable groups.
    pub vars: Vec<ValueDecl>,
}

/// Where a declaration lives in its file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    /// File path under the extractor's mount.
    pub file: String,
    /// Selection end offset; `low >= high` means no selection.
    pub high: i64,
    /// One-based line, `0` when unknown.
    pub line: i64,
    /// Selection start offset.
    pub low: i64,
}

/// A `const` or `var` group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueDecl {
    /// Printed declaration source.
    pub decl: String,
    /// Doc comment, raw text.
    pub doc: String,
    /// Names declared by the group.
    pub names: Vec<String>,
    /// Source position of the group.
    pub pos: Position,
}

/// A function or method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuncDecl {
    /// Printed signature, e.g. `func (t *T) Close() error`.
    pub decl: String,
    /// Doc comment, raw text.
    pub doc: String,
    /// Function or method name.
    pub name: String,
    /// Source position of the declaration.
    pub pos: Position,
    /// Receiver type for methods (`*T`), empty for functions.
    pub recv: String,
}

/// A type with everything documented under it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDecl {
    /// Constants whose type is this type.
    pub consts: Vec<ValueDecl>,
    /// Printed type declaration.
    pub decl: String,
    /// Doc comment, raw text.
    pub doc: String,
    /// Constructors returning this type.
    pub funcs: Vec<FuncDecl>,
    /// Methods, receiver set.
    pub methods: Vec<FuncDecl>,
    /// Type name.
    pub name: String,
    /// Source position of the declaration.
    pub pos: Position,
    /// Variables whose type is this type.
    pub vars: Vec<ValueDecl>,
}

/// A runnable example as extracted from a test file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Example {
    /// Printed example body, usually a brace-delimited block.
    pub code: String,
    /// Comments attached to the body, keyed by the code line they precede.
    pub comments: Vec<CodeComment>,
    /// Name without the `Example` prefix: `Foo`, `Foo_second`, `T_Method`.
    pub name: String,
    /// Expected output, when the example declares one.
    pub output: Option<String>,
}

/// A comment to reinsert into printed example code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeComment {
    /// Zero-based line of `code` the comment is printed before.
    pub line: usize,
    /// Comment text including its `//` or `/* */` markers.
    pub text: String,
}

impl ExampleSource for Example {
    fn code(&self) -> &str {
        return &self.code;
    }

    fn comments(&self) -> &[CodeComment] {
        return &self.comments;
    }

    fn name(&self) -> &str {
        return &self.name;
    }

    fn output(&self) -> Option<&str> {
        return self.output.as_deref();
    }
}

impl Package {
    /// Read and parse a package model from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures,
    /// or `Error::ModelCorrupt` if the content is not a valid model.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ModelNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content).map_err(|reason| {
            return Error::ModelCorrupt {
                path: path.to_path_buf(),
                reason,
            };
        });
    }

    /// Parse a package model from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the deserializer message when the JSON does not describe a package.
    pub fn parse(content: &str) -> Result<Self, String> {
        return serde_json::from_str(content).map_err(|e| return e.to_string());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_collections_default_to_empty() {
        let pkg = Package::parse(r#"{"import_path": "github.com/a/b", "name": "b"}"#).unwrap();
        assert_eq!(pkg.name, "b");
        assert!(pkg.funcs.is_empty());
        assert!(pkg.examples.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let pkg = Package::parse(r#"{"name": "b", "synopsis": "extra"}"#).unwrap();
        assert_eq!(pkg.name, "b");
    }

    #[test]
    fn parses_examples_with_comments() {
        let pkg = Package::parse(
            r#"{"examples": [{"name": "Foo_second", "code": "{\n\tx()\n}",
                "comments": [{"line": 1, "text": "// call x"}], "output": "ok"}]}"#,
        )
        .unwrap();
        let example = pkg.examples.first().unwrap();
        assert_eq!(example.name(), "Foo_second");
        assert_eq!(example.comments().len(), 1);
        assert_eq!(example.output.as_deref(), Some("ok"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Package::load(&PathBuf::from("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, Error::ModelNotFound { .. }));
    }

    #[test]
    fn load_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pkg.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Package::load(&path).unwrap_err();
        assert!(matches!(err, Error::ModelCorrupt { .. }));
    }
}
