mod comment;
mod config;
mod diagnostics;
mod error;
mod examples;
mod format;
mod model;
mod platform;
mod position;
mod render;
mod text;

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, Overrides, Settings};
use crate::model::Package;
use crate::render::Renderer;

#[derive(Parser)]
#[command(name = "pkgdoc-md", version, about = "Render package documentation models as README markdown")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Config file (defaults to .pkgdoc.toml in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render package model files to markdown
    Render(RenderArgs),
    /// Print the source URL for an import path, optionally with a position link
    Url(UrlArgs),
}

/// Flags shared by every command that builds settings.
#[derive(Args)]
struct SettingsArgs {
    /// Render examples under their declarations
    #[arg(long = "examples")]
    examples: bool,
    /// Line hash format, e.g. "#L%d" (GitHub) or "#%d" (Bitbucket Server)
    #[arg(long = "hashformat")]
    hash_format: Option<String>,
    /// Full position link format taking path, line, low, high
    #[arg(long = "srclink")]
    src_link: Option<String>,
    /// Spaces per tab in example code
    #[arg(long = "tabwidth")]
    tab_width: Option<usize>,
    /// Template replacing the built-in package template
    #[arg(long)]
    template: Option<PathBuf>,
}

#[derive(Args)]
struct RenderArgs {
    /// Package model JSON files, rendered in order
    #[arg(required = true)]
    models: Vec<PathBuf>,
    /// Output file; stdout when absent or "-"
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[command(flatten)]
    settings: SettingsArgs,
}

#[derive(Args)]
struct UrlArgs {
    /// Import path such as github.com/owner/repo/pkg
    import_path: String,
    /// File to link to (under the extractor mount)
    #[arg(long)]
    file: Option<String>,
    /// Selection end offset
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    high: i64,
    /// Line to link to
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    line: i64,
    /// Selection start offset
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    low: i64,
    #[command(flatten)]
    settings: SettingsArgs,
}

impl From<SettingsArgs> for Overrides {
    fn from(args: SettingsArgs) -> Self {
        return Self {
            hash_format: args.hash_format,
            show_examples: args.examples,
            src_link: args.src_link,
            tab_width: args.tab_width,
            template: args.template,
        };
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Render(args) => cmd_render(cli.config, args),
        Commands::Url(args) => cmd_url(cli.config, args),
    };

    return match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}

/// Log to stderr. `RUST_LOG` wins when set; otherwise warnings only, or
/// debug with `--verbose`.
fn init_logging(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load the config file and merge the command-line overrides into run settings.
///
/// # Errors
///
/// Returns config loading errors and format or pattern compilation errors.
fn load_settings(config_path: Option<PathBuf>, args: SettingsArgs) -> Result<Settings, error::Error> {
    let explicit = config_path.is_some();
    let path = config_path.unwrap_or_else(|| return PathBuf::from(config::DEFAULT_CONFIG_FILE));
    let config = Config::load(&path, explicit)?;
    return Settings::build(config, Overrides::from(args));
}

/// Render every model and write the concatenated markdown.
/// Settings and template are validated before the first model is read.
///
/// # Errors
///
/// Returns configuration, model, template, or output errors.
fn cmd_render(config_path: Option<PathBuf>, args: RenderArgs) -> Result<(), error::Error> {
    let settings = Arc::new(load_settings(config_path, args.settings)?);
    let renderer = Renderer::new(settings)?;

    let mut out = String::new();
    for path in &args.models {
        let package = Package::load(path)?;
        out.push_str(&renderer.render(&package)?);
    }

    match args.output.filter(|p| return p.as_os_str() != "-") {
        Some(path) => {
            std::fs::write(&path, out)?;
            tracing::debug!(path = %path.display(), "wrote output");
        },
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(out.as_bytes())?;
            stdout.flush()?;
        },
    }

    return Ok(());
}

/// Print the resolved source URL, plus the position link when a file is given.
///
/// # Errors
///
/// Returns configuration errors.
fn cmd_url(config_path: Option<PathBuf>, args: UrlArgs) -> Result<(), error::Error> {
    let settings = load_settings(config_path, args.settings)?;
    let mut url = settings.platforms.resolve(&args.import_path);
    if let Some(file) = &args.file {
        url.push_str(&settings.link_style.position_link(file, args.line, args.low, args.high));
    }
    println!("{url}");
    return Ok(());
}
