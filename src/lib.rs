pub mod catalog;
pub mod config;
pub mod export;
pub mod finder;
pub mod logging;
pub mod model;
pub mod search;
pub mod ui;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use catalog::{CatalogLoader, CatalogSource, LoadError};
use config::{AppConfig, ConfigError};
use export::{ExportFormat, ExportOptions};
use finder::ProductFinder;
use search::filter::{PriceInputError, parse_price_input};

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "product-finder",
    version,
    about = "Browse a product catalog with full-text search and a price ceiling"
)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "PRODUCT_FINDER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Catalog location: http(s) URL, file:// URL, or path
    #[arg(long, env = "PRODUCT_FINDER_CATALOG_URL", global = true)]
    pub catalog_url: Option<String>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// When to use colors on stderr
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn enabled(self) -> bool {
        match self {
            Self::Auto => std::io::stderr().is_terminal(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch interactive TUI (default)
    Tui,
    /// Filter the catalog once and print the visible products
    Search {
        /// Free-text query; omit to filter by price only
        query: Option<String>,

        /// Only keep products priced at or below this amount
        #[arg(long, value_parser = validate_price)]
        max_price: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Plain)]
        format: ExportFormat,

        /// Print at most this many products
        #[arg(long)]
        limit: Option<usize>,

        /// Leave descriptions out of the output
        #[arg(long)]
        no_description: bool,
    },
    /// Print the effective configuration as TOML
    Config,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Render the man page to stdout
    Man,
}

/// Failures that map to a dedicated exit code.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("TUI is disabled: stdout is not a terminal (use `product-finder search`)")]
    TuiDisabled,
}

fn validate_price(raw: &str) -> Result<String, PriceInputError> {
    match parse_price_input(raw)? {
        Some(_) => Ok(raw.trim().to_string()),
        None => Err(PriceInputError::NotANumber(raw.to_string())),
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let color = cli.color.enabled();
    colored::control::set_override(color);

    match &cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "product-finder", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Man) => {
            let man = clap_mangen::Man::new(Cli::command());
            man.render(&mut std::io::stdout())?;
            Ok(())
        }
        Some(Commands::Config) => {
            logging::init_stderr(cli.verbose, color)?;
            let config = resolve_config(&cli)?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Some(Commands::Search {
            query,
            max_price,
            format,
            limit,
            no_description,
        }) => {
            logging::init_stderr(cli.verbose, color)?;
            let config = resolve_config(&cli)?;
            let opts = SearchOptions {
                query: query.clone().unwrap_or_default(),
                max_price: max_price.clone(),
                format: *format,
                limit: *limit,
                include_description: !no_description,
            };
            run_search(&config, &opts).await
        }
        Some(Commands::Tui) | None => run_tui(&cli).await,
    }
}

/// Exit status for an error returned by [`run`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(AppError::TuiDisabled) = err.downcast_ref::<AppError>() {
        2
    } else if err.downcast_ref::<LoadError>().is_some() {
        3
    } else if err.downcast_ref::<ConfigError>().is_some() {
        4
    } else {
        1
    }
}

/// File config overlaid with command-line and environment overrides.
pub fn resolve_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.catalog_url {
        config.catalog_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub query: String,
    pub max_price: Option<String>,
    pub format: ExportFormat,
    pub limit: Option<usize>,
    pub include_description: bool,
}

/// Load the catalog, apply one query, and print the visible set to stdout.
pub async fn run_search(config: &AppConfig, opts: &SearchOptions) -> Result<()> {
    let source = CatalogSource::from_location(&config.catalog_url, config.request_timeout())?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message(format!("loading {}", source.describe()));
    spinner.enable_steady_tick(Duration::from_millis(120));
    let loaded = finder::load_catalog(&source, &config.load_settings()).await;
    spinner.finish_and_clear();

    let mut finder = ProductFinder::new();
    finder.begin_loading()?;
    let (catalog, index) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            finder.fail_loading(err.to_string())?;
            return Err(err.into());
        }
    };
    finder.finish_loading(catalog, Box::new(index))?;

    finder.set_query(opts.query.clone());
    if let Some(raw) = &opts.max_price {
        finder.set_price_input(raw)?;
    }

    let visible = finder.visible()?;
    let shown: Vec<_> = match opts.limit {
        Some(limit) => visible.into_iter().take(limit).collect(),
        None => visible,
    };

    let export_opts = ExportOptions {
        query: Some(opts.query.clone()).filter(|q| !q.trim().is_empty()),
        max_price: finder.query().max_price,
        include_description: opts.include_description,
        ..ExportOptions::default()
    };
    print!("{}", export::export_products(&shown, opts.format, &export_opts));
    Ok(())
}

async fn run_tui(cli: &Cli) -> Result<()> {
    if !std::io::stdout().is_terminal() {
        return Err(AppError::TuiDisabled.into());
    }
    let config = resolve_config(cli)?;
    let _log_guard = logging::init_file(&config.log_dir()?, cli.verbose)?;

    let source = CatalogSource::from_location(&config.catalog_url, config.request_timeout())?;
    let settings = config.load_settings();
    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let outcome = finder::load_catalog(&source, &settings).await;
        // The receiver is gone only if the UI already quit.
        let _ = tx.send(outcome);
    });

    tokio::task::block_in_place(|| ui::tui::run_tui(rx))
}
