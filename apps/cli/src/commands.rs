//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use mergedown_analyzer::{FileAnalyzer, statistics};
use mergedown_core::{MergeEngine, MergeObserver, MergeProgress, RunControl};
use mergedown_shared::{
    AppConfig, MergeConfig, SortOrder, config_file_path, init_config, load_config, preset,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// mergedown — combine markdown files into one document.
#[derive(Parser)]
#[command(
    name = "mergedown",
    version,
    about = "Merge many markdown documents into a single annotated artifact.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Sort order flag, mapped onto the engine's closed enum.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum SortArg {
    Alphabetical,
    Natural,
    Date,
    Size,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Alphabetical => SortOrder::Alphabetical,
            SortArg::Natural => SortOrder::Natural,
            SortArg::Date => SortOrder::Date,
            SortArg::Size => SortOrder::Size,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Merge input files/directories into one output document.
    Merge {
        /// Files or directories to merge.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output path (defaults to the configured default).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Apply a built-in preset before other options.
        #[arg(short, long)]
        preset: Option<String>,

        /// Sort order for discovered files.
        #[arg(long)]
        sort: Option<SortArg>,

        /// Sort descending instead of ascending.
        #[arg(long)]
        descending: bool,

        /// Process everything but write nothing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Discover input files and show statistics and duplicates.
    Scan {
        /// Files or directories to scan.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Apply a built-in preset before other options.
        #[arg(short, long)]
        preset: Option<String>,
    },

    /// Show a bounded preview of the merge output.
    Preview {
        /// Files or directories to preview.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Apply a built-in preset before other options.
        #[arg(short, long)]
        preset: Option<String>,

        /// Maximum preview lines.
        #[arg(long, default_value = "50")]
        lines: usize,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
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
        0 => "mergedown=info",
        1 => "mergedown=debug",
        _ => "mergedown=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Merge {
            inputs,
            out,
            preset,
            sort,
            descending,
            dry_run,
        } => cmd_merge(&inputs, out, preset.as_deref(), sort, descending, dry_run),
        Command::Scan { inputs, preset } => cmd_scan(&inputs, preset.as_deref()),
        Command::Preview {
            inputs,
            preset,
            lines,
        } => cmd_preview(&inputs, preset.as_deref(), lines),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Resolve the effective merge config: preset (flag or configured default)
/// overridden by the config file's `[merge]` table only when no preset is
/// in play.
fn resolve_config(app: &AppConfig, preset_flag: Option<&str>) -> Result<MergeConfig> {
    let preset_name = preset_flag
        .map(str::to_string)
        .or_else(|| (!app.defaults.preset.is_empty()).then(|| app.defaults.preset.clone()));

    let config = match preset_name {
        Some(name) => preset(&name)?,
        None => app.merge.clone(),
    };
    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_merge(
    inputs: &[PathBuf],
    out: Option<PathBuf>,
    preset_flag: Option<&str>,
    sort: Option<SortArg>,
    descending: bool,
    dry_run: bool,
) -> Result<()> {
    let app = load_config()?;
    let mut config = resolve_config(&app, preset_flag)?;
    if let Some(sort) = sort {
        config.sort_order = sort.into();
    }
    if descending {
        config.sort_ascending = false;
    }

    let output = out.unwrap_or_else(|| PathBuf::from(&app.defaults.output));

    info!(inputs = inputs.len(), output = %output.display(), dry_run, "starting merge");

    let analyzer = FileAnalyzer::new(&config)?;
    let report = analyzer.discover(inputs);
    for warning in &report.warnings {
        eprintln!("  warning: {warning}");
    }
    if report.files.is_empty() {
        println!("No matching files found.");
        return Ok(());
    }

    let mut files = report.files;
    let duplicates = analyzer.detect_duplicates(&mut files);
    for group in &duplicates {
        let listed: Vec<String> = group.paths.iter().map(|p| p.display().to_string()).collect();
        eprintln!("  warning: duplicate content: {}", listed.join(" == "));
    }

    let engine = MergeEngine::new(config)?;
    let control = RunControl::new();
    let observer = CliProgress::new(files.len() as u64);
    let result = engine.merge(&files, &output, &control, &observer, dry_run);
    observer.finish();

    println!();
    println!("  {}", result.summary());
    if let Some(path) = &result.output_path {
        println!("  Output: {}", path.display());
    }
    println!("  Files:  {}", result.files_merged);
    println!("  Bytes:  {}", result.total_bytes);
    for warning in &result.warnings {
        println!("  warning: {warning}");
    }
    println!();

    if result.success {
        Ok(())
    } else {
        for error in &result.errors {
            eprintln!("  error: {error}");
        }
        Err(eyre!("merge finished with {} error(s)", result.errors.len()))
    }
}

fn cmd_scan(inputs: &[PathBuf], preset_flag: Option<&str>) -> Result<()> {
    let app = load_config()?;
    let config = resolve_config(&app, preset_flag)?;

    let analyzer = FileAnalyzer::new(&config)?;
    let mut report = analyzer.discover(inputs);
    for warning in &report.warnings {
        eprintln!("  warning: {warning}");
    }

    let stats = statistics(&report.files);
    println!();
    println!("  Files:        {}", stats.count);
    println!("  Total size:   {}", stats.total_size_formatted());
    println!("  Average size: {}", stats.average_size_formatted());
    if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
        println!("  Oldest:       {}", oldest.format("%Y-%m-%d %H:%M"));
        println!("  Newest:       {}", newest.format("%Y-%m-%d %H:%M"));
    }
    println!();

    for record in &report.files {
        println!(
            "  {}  {:>10}  {}",
            record.modified_formatted(),
            record.size_formatted(),
            record.path.display()
        );
    }

    let duplicates = analyzer.detect_duplicates(&mut report.files);
    if !duplicates.is_empty() {
        println!();
        println!("  Duplicate groups:");
        for group in &duplicates {
            println!("    {}", &group.hash[..group.hash.len().min(12)]);
            for path in &group.paths {
                println!("      {}", path.display());
            }
        }
    }

    Ok(())
}

fn cmd_preview(inputs: &[PathBuf], preset_flag: Option<&str>, lines: usize) -> Result<()> {
    let app = load_config()?;
    let config = resolve_config(&app, preset_flag)?;

    let analyzer = FileAnalyzer::new(&config)?;
    let report = analyzer.discover(inputs);
    let engine = MergeEngine::new(config)?;

    println!("{}", engine.preview(&report.files, lines));
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let path = config_file_path()?;
    let app = load_config()?;
    println!("# {}", path.display());
    println!("{}", toml_pretty(&app)?);
    Ok(())
}

fn toml_pretty(app: &AppConfig) -> Result<String> {
    toml::to_string_pretty(app).map_err(|e| eyre!("could not render config: {e}"))
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Progress bar observer for merge runs.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("{bar:36.cyan/blue} {pos}/{len} {msg}")
                .expect("valid template"),
        );
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl MergeObserver for CliProgress {
    fn progress(&self, progress: &MergeProgress) {
        self.bar.set_position(progress.current_index as u64);
        self.bar.set_message(progress.current_file.clone());
    }
}
