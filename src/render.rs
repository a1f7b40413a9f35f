//! Template rendering for package models.
//!
//! The link resolvers, example formatter, comment renderer and text helpers
//! are registered on one Tera instance as filters and functions:
//!
//! - `example_md(name=...)`: examples array to example blocks for `name`
//! - `comment_md`: doc comment to markdown
//! - `src_url`: import path to source URL
//! - `src_pos_link(path=, line=, low=, high=)`: position link
//! - `base`, `md`, `pre`, `kebab`, `bitscape`, `clean_link`, `trim_prefix(prefix=...)`
//!
//! The instance is built once per run; the template is parsed up front so a
//! broken template fails before any package is rendered.

use std::collections::HashMap;
use std::sync::Arc;

use tera::{Context, Tera, Value};

use crate::comment::{CommentRenderer as _, MarkdownComments};
use crate::config::Settings;
use crate::error::Error;
use crate::examples::{self, SpacePrinter};
use crate::model::{Example, Package};
use crate::text;

/// Name the built-in template is registered under.
const BUILTIN_TEMPLATE_NAME: &str = "package.md";

/// The built-in README template.
const BUILTIN_TEMPLATE: &str = include_str!("../templates/package.md.tera");

/// A parsed template with all callbacks registered.
pub struct Renderer {
    /// Shared run settings, also exposed to the template.
    settings: Arc<Settings>,
    /// Tera instance holding the template.
    tera: Tera,
    /// Registered template name.
    template_name: String,
}

impl Renderer {
    /// Load and parse the configured template and register the callbacks.
    ///
    /// # Errors
    ///
    /// Returns `Error::TemplateNotFound` if a user template file is missing,
    /// `Error::Io` on other read failures, or `Error::Template` if it does not parse.
    pub fn new(settings: Arc<Settings>) -> Result<Self, Error> {
        let (template_name, source) = match &settings.template {
            None => (BUILTIN_TEMPLATE_NAME.to_string(), BUILTIN_TEMPLATE.to_string()),
            Some(path) => {
                let source = match std::fs::read_to_string(path) {
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        return Err(Error::TemplateNotFound { path: path.clone() });
                    },
                    Err(e) => return Err(Error::Io(e)),
                    Ok(s) => s,
                };
                (path.display().to_string(), source)
            },
        };

        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        register_callbacks(&mut tera, &settings);
        tera.add_raw_template(&template_name, &source)
            .map_err(|e| return Error::template(&template_name, &e))?;

        tracing::debug!(template = %template_name, "template loaded");
        return Ok(Self {
            settings,
            tera,
            template_name,
        });
    }

    /// Render one package.
    ///
    /// # Errors
    ///
    /// Returns `Error::Template` if rendering fails, e.g. a template refers to
    /// a missing field or passes a wrong argument type to a callback.
    pub fn render(&self, package: &Package) -> Result<String, Error> {
        let mut context = Context::new();
        context.insert("pkg", package);
        context.insert("show_examples", &self.settings.show_examples);

        tracing::debug!(package = %package.import_path, "rendering");
        return self
            .tera
            .render(&self.template_name, &context)
            .map_err(|e| return Error::template(&self.template_name, &e));
    }
}

/// Register every filter and function on `tera`.
fn register_callbacks(tera: &mut Tera, settings: &Arc<Settings>) {
    tera.register_filter("example_md", example_filter(Arc::clone(settings)));
    tera.register_filter("comment_md", string_filter("comment_md", |s| return MarkdownComments.render(s)));
    tera.register_filter("src_url", source_url_filter(Arc::clone(settings)));
    tera.register_function("src_pos_link", position_link_function(Arc::clone(settings)));

    tera.register_filter("base", string_filter("base", |s| return text::base(s).to_string()));
    tera.register_filter("md", string_filter("md", text::md_escape));
    tera.register_filter("pre", string_filter("pre", text::pre));
    tera.register_filter("kebab", string_filter("kebab", text::kebab));
    tera.register_filter("bitscape", string_filter("bitscape", text::bitscape));
    tera.register_filter("clean_link", string_filter("clean_link", text::clean_link));
    tera.register_filter("trim_prefix", trim_prefix_filter());
}

/// Read a filter input as text. `null` reads as empty so optional model
/// fields render as nothing.
fn input_text<'a>(value: &'a Value, filter: &str) -> tera::Result<&'a str> {
    return match value {
        Value::Null => Ok(""),
        Value::String(s) => Ok(s.as_str()),
        other => Err(tera::Error::msg(format!("`{filter}` expects a string, got {other}"))),
    };
}

/// Read an optional string keyword argument.
fn string_arg<'a>(args: &'a HashMap<String, Value>, key: &str, callback: &str) -> tera::Result<&'a str> {
    return match args.get(key) {
        None | Some(Value::Null) => Ok(""),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(tera::Error::msg(format!("`{callback}`: `{key}` must be a string, got {other}"))),
    };
}

/// Read an optional integer keyword argument, `0` when absent.
fn int_arg(args: &HashMap<String, Value>, key: &str, callback: &str) -> tera::Result<i64> {
    return match args.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| return tera::Error::msg(format!("`{callback}`: `{key}` must be an integer, got {value}"))),
    };
}

/// Filter applying a plain string transform.
fn string_filter(name: &'static str, transform: fn(&str) -> String) -> impl tera::Filter + 'static {
    return move |value: &Value, _args: &HashMap<String, Value>| -> tera::Result<Value> {
        let input = input_text(value, name)?;
        return Ok(Value::String(transform(input)));
    };
}

/// `trim_prefix(prefix=...)`
fn trim_prefix_filter() -> impl tera::Filter + 'static {
    return |value: &Value, args: &HashMap<String, Value>| -> tera::Result<Value> {
        let input = input_text(value, "trim_prefix")?;
        let prefix = string_arg(args, "prefix", "trim_prefix")?;
        return Ok(Value::String(text::trim_prefix(input, prefix).to_string()));
    };
}

/// `examples | example_md(name=...)`
fn example_filter(settings: Arc<Settings>) -> impl tera::Filter + 'static {
    return move |value: &Value, args: &HashMap<String, Value>| -> tera::Result<Value> {
        let declaration = string_arg(args, "name", "example_md")?;
        if !settings.show_examples || value.is_null() {
            return Ok(Value::String(String::new()));
        }

        let examples: Vec<Example> = tera::from_value(value.clone())
            .map_err(|e| return tera::Error::msg(format!("`example_md` expects a list of examples: {e}")))?;
        let printer = SpacePrinter {
            tab_width: settings.tab_width,
        };
        let out = examples::format_examples(&examples, declaration, settings.show_examples, &printer);
        return Ok(Value::String(out));
    };
}

/// `import_path | src_url`
fn source_url_filter(settings: Arc<Settings>) -> impl tera::Filter + 'static {
    return move |value: &Value, _args: &HashMap<String, Value>| -> tera::Result<Value> {
        let import_path = input_text(value, "src_url")?;
        return Ok(Value::String(settings.platforms.resolve(import_path)));
    };
}

/// `src_pos_link(path=..., line=..., low=..., high=...)`
fn position_link_function(settings: Arc<Settings>) -> impl tera::Function + 'static {
    return move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let path = string_arg(args, "path", "src_pos_link")?;
        let line = int_arg(args, "line", "src_pos_link")?;
        let low = int_arg(args, "low", "src_pos_link")?;
        let high = int_arg(args, "high", "src_pos_link")?;
        return Ok(Value::String(settings.link_style.position_link(path, line, low, high)));
    };
}
