//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use worldcruise_core::{ProgressReporter, RunConfig, RunResult, SilentProgress};
use worldcruise_loader::{DocumentSource, LoadOptions};
use worldcruise_shared::{
    AppConfig, DEFAULT_ARTICLE_URL, ExtractConfig, init_config, load_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// worldcruise: turn the world cruise roundup article into JSON.
#[derive(Parser)]
#[command(
    name = "worldcruise",
    version,
    about = "Extract world cruise itineraries from a saved article into a JSON catalog.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `extract` with no flags.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Extract the article into a JSON catalog.
    Extract(ExtractArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `extract`. Unset flags fall back to the config file.
#[derive(Args, Debug, Default)]
pub(crate) struct ExtractArgs {
    /// Local HTML file to read.
    #[arg(short, long, conflicts_with = "url")]
    pub input: Option<PathBuf>,

    /// Fetch the article instead of reading a file (defaults to the
    /// Cruise Critic article when given without a value).
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_ARTICLE_URL)]
    pub url: Option<String>,

    /// Output JSON path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML file replacing the built-in override tables.
    #[arg(long)]
    pub overrides: Option<PathBuf>,

    /// Maximum sibling nodes examined per marker search.
    #[arg(long)]
    pub max_lookahead: Option<usize>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "worldcruise=info",
        1 => "worldcruise=debug",
        _ => "worldcruise=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let show_progress = matches!(cli.log_format, LogFormat::Text);
    match cli.command.unwrap_or(Command::Extract(ExtractArgs::default())) {
        Command::Extract(args) => cmd_extract(args, show_progress).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

async fn cmd_extract(args: ExtractArgs, show_progress: bool) -> Result<()> {
    let config = resolve_run_config(args, load_config()?)?;

    info!(
        source = %config.source,
        output = %config.output.display(),
        max_lookahead = config.extract.max_lookahead,
        "extracting world cruises"
    );

    let result = if show_progress {
        worldcruise_core::run(&config, &CliProgress::new()).await?
    } else {
        worldcruise_core::run(&config, &SilentProgress).await?
    };

    println!();
    println!("  World cruises extracted!");
    println!("  Source:  {}", config.source);
    println!("  Records: {}", result.record_count);
    println!("  Output:  {}", result.output_path.display());
    println!("  Time:    {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

/// Merge CLI flags over the file config.
fn resolve_run_config(args: ExtractArgs, mut app: AppConfig) -> Result<RunConfig> {
    if let Some(path) = &args.overrides {
        app.extract.overrides = Some(path.to_string_lossy().into_owned());
    }
    if let Some(max_lookahead) = args.max_lookahead {
        app.extract.max_lookahead = max_lookahead;
    }
    let extract = ExtractConfig::from_app_config(&app)?;

    let source = match (args.input, args.url.or(app.source.url)) {
        (Some(path), _) => DocumentSource::File(path),
        (None, Some(url)) => DocumentSource::url(&url)?,
        (None, None) => DocumentSource::File(PathBuf::from(app.source.path)),
    };

    Ok(RunConfig {
        source,
        output: args
            .output
            .unwrap_or_else(|| PathBuf::from(app.output.path)),
        extract,
        load: LoadOptions {
            timeout_secs: app.http.timeout_secs,
        },
    })
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner that turns into a bar
/// once the heading count is known.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn headings_found(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_style(
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap(),
        );
    }

    fn record_extracted(&self, title: &str, current: usize, _total: usize) {
        self.bar.set_position(current as u64);
        self.bar.set_message(title.to_string());
    }

    fn done(&self, _result: &RunResult) {
        self.bar.finish_and_clear();
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
