// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use subtrans::app_config::{Config, LogLevel};
use subtrans::app_controller::{Controller, RunOptions};
use subtrans::jobs::JobStatus;
use subtrans::language_utils;
use subtrans::providers::ProviderRegistry;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate subtitle files or directories
    Translate(TranslateArgs),

    /// List the translation services and their availability
    Services,

    /// List the languages offered for translation
    Languages,

    /// Generate shell completions for subtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Subtitle files or directories to translate
    #[arg(value_name = "INPUT_PATH", required = true)]
    input_paths: Vec<PathBuf>,

    /// Source language code (e.g., 'en', 'auto')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'ar', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translation service (google, gemini, deepl, yandex)
    #[arg(long)]
    service: Option<String>,

    /// Pass previous lines as context to services that support it
    #[arg(long, overrides_with = "no_context")]
    context: bool,

    /// Translate every line on its own
    #[arg(long, overrides_with = "context")]
    no_context: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

/// subtrans - subtitle translation jobs
///
/// Translates SRT, VTT, ASS, SUB, SBV and STL subtitle files with online
/// translation services while keeping timing and formatting intact.
#[derive(Parser, Debug)]
#[command(name = "subtrans")]
#[command(version)]
#[command(about = "Subtitle translation tool")]
#[command(long_about = "subtrans translates subtitle files with online translation services.

EXAMPLES:
    subtrans translate movie.srt                       # Translate using default config
    subtrans translate -s en -t fr movie.srt           # Translate from English to French
    subtrans translate --service gemini --context dir/ # Context-aware translation of a directory
    subtrans services                                  # Show available services
    subtrans completions bash > subtrans.bash          # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. API keys can also be provided through
    GEMINI_API_KEY, DEEPL_API_KEY and YANDEX_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("subtrans")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    if let Some(level) = &cli.log_level {
        log::set_max_level(LogLevel::from(level.clone()).to_level_filter());
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtrans", &mut std::io::stdout());
            Ok(())
        }
        Commands::Languages => {
            for (code, name) in language_utils::supported_languages() {
                println!("{:<4} {}", code, name);
            }
            Ok(())
        }
        Commands::Services => {
            let config = load_config(&cli.config, cli.log_level.is_none())?;
            let registry = ProviderRegistry::from_config(&config.translation);
            for service in registry.services() {
                println!(
                    "{:<8} {:<4} available={} context={}",
                    service.name,
                    service.service_type.to_string(),
                    service.available,
                    service.supports_context
                );
            }
            Ok(())
        }
        Commands::Translate(args) => run_translate(&cli.config, cli.log_level.is_none(), args).await,
    }
}

fn load_config(path: &Path, use_config_level: bool) -> Result<Config> {
    let mut config = Config::load_or_create(path)
        .with_context(|| format!("Failed to load config file: {:?}", path))?;
    config.apply_env_overrides();
    if use_config_level {
        log::set_max_level(config.log_level.to_level_filter());
    }
    Ok(config)
}

async fn run_translate(config_path: &Path, use_config_level: bool, args: TranslateArgs) -> Result<()> {
    let mut config = load_config(config_path, use_config_level)?;
    if let Some(source_language) = args.source_language {
        config.source_language = source_language;
    }
    if let Some(target_language) = args.target_language {
        config.target_language = target_language;
    }

    let use_context = if args.context {
        Some(true)
    } else if args.no_context {
        Some(false)
    } else {
        None
    };

    let controller = Controller::with_config(config)?;
    let job = controller
        .run(
            &args.input_paths,
            RunOptions {
                service: args.service,
                use_context,
                quiet: args.quiet,
            },
        )
        .await?;

    if job.status == JobStatus::Failed {
        anyhow::bail!(job.error.unwrap_or_else(|| "Translation failed".to_string()));
    }
    info!("Done");
    Ok(())
}
