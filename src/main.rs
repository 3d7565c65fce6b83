// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anuvad::app_config::{self, BackendProvider, Config};
use anuvad::detection::WhatlangDetector;
use anuvad::language_utils::{FriendlyName, LanguageCodeRegistry, ShortCode};
use anuvad::providers::ModelLoader;
use anuvad::providers::inference_server::InferenceServerLoader;
use anuvad::providers::phrasebook::PhrasebookLoader;
use anuvad::translation::{
    CacheSettings, ManualOverrideDictionary, PipelineCache, RetryPolicy, TextChunker, TranslationOrchestrator,
};

/// CLI Wrapper for BackendProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliBackend {
    Phrasebook,
    InferenceServer,
}

impl From<CliBackend> for BackendProvider {
    fn from(cli_backend: CliBackend) -> Self {
        match cli_backend {
            CliBackend::Phrasebook => BackendProvider::Phrasebook,
            CliBackend::InferenceServer => BackendProvider::InferenceServer,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a text
    Translate {
        /// Text to translate
        #[arg(value_name = "TEXT")]
        text: String,

        /// Source language short code ('en', 'hi') or 'auto'
        #[arg(short, long, default_value = "auto")]
        source: String,

        /// Target language name (e.g. 'Hindi', 'Tamil')
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Translate every line of a file in one batch
    Batch {
        /// File with one text per line
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Source language short code ('en', 'hi') or 'auto'
        #[arg(short, long, default_value = "auto")]
        source: String,

        /// Target language name (e.g. 'Hindi', 'Tamil')
        #[arg(short, long)]
        target: Option<String>,
    },

    /// List supported languages
    Languages,

    /// Show pipeline status for every target language
    Status {
        /// Source language short code
        #[arg(short, long, default_value = "en")]
        source: String,

        /// Target languages to load before reporting
        #[arg(short, long, value_name = "TARGET")]
        load: Vec<String>,
    },

    /// Generate shell completions for anuvad
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Anuvad - translation into Indian languages
#[derive(Parser, Debug)]
#[command(name = "anuvad")]
#[command(version)]
#[command(about = "Translate English and Hindi text into Indian languages")]
#[command(long_about = "Anuvad translates English and Hindi text into twelve Indian languages.

EXAMPLES:
    anuvad translate \"How are you?\" -t Tamil      # Detect source, translate to Tamil
    anuvad translate -s hi \"आप कैसे हैं\" -t Bengali # Hindi to Bengali
    anuvad batch phrases.txt -s en -t Hindi        # One text per line
    anuvad status -s en --load Hindi               # Load a pair, then show status
    anuvad completions bash > anuvad.bash          # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

BACKENDS:
    phrasebook       - Offline placeholder, translates a few common phrases
    inference_server - Model server over HTTP (default: http://localhost:8000)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: String,

    /// Translation backend to use
    #[arg(short, long, global = true, value_enum)]
    backend: Option<CliBackend>,

    /// Set logging level
    #[arg(long, global = true, value_enum)]
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
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and marker for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌"),
            Level::Warn => ("1;33", "🚧"),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍"),
            Level::Trace => ("1;35", "📋"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                marker,
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
    // Accept everything here; the effective level is set through set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "anuvad", &mut std::io::stdout());
            Ok(())
        }
        Commands::Languages => {
            print_languages(LanguageCodeRegistry::standard());
            Ok(())
        }
        command => {
            let config = load_config(&cli.config, cli.backend, cli.log_level)?;
            match config.backend.provider {
                BackendProvider::Phrasebook => run(PhrasebookLoader::new(), &config, command).await,
                BackendProvider::InferenceServer => {
                    let loader = InferenceServerLoader::new(
                        &config.backend.endpoint,
                        Duration::from_secs(config.backend.timeout_secs),
                    )
                    .context("Failed to create inference server client")?;
                    run(loader, &config, command).await
                }
            }
        }
    }
}

/// Load the configuration, creating a default one if missing, and apply CLI overrides
fn load_config(config_path: &str, backend: Option<CliBackend>, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path).context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if let Some(backend) = backend {
        config.backend.provider = backend.into();
    }
    if let Some(log_level) = log_level {
        config.log_level = log_level.into();
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    Ok(config)
}

/// Composition root: build the cache and orchestrator for one backend and run a command
async fn run<L: ModelLoader>(loader: L, config: &Config, command: Commands) -> Result<()> {
    let registry = Arc::new(LanguageCodeRegistry::standard().clone());
    let dictionary = match &config.dictionary_path {
        Some(path) => ManualOverrideDictionary::builtin_with_file(path)?,
        None => ManualOverrideDictionary::builtin(),
    };
    let settings = CacheSettings::from_config(&config.model, RetryPolicy::from_config(&config.retry));
    let cache = Arc::new(PipelineCache::new(loader, settings));
    let orchestrator = TranslationOrchestrator::new(
        cache,
        registry,
        Arc::new(dictionary),
        TextChunker::from_config(&config.chunking),
        WhatlangDetector::new(),
    );
    info!("Using {} backend", config.backend.provider.display_name());

    let default_target = || config.default_target_language.clone();

    match command {
        Commands::Translate { text, source, target } => {
            let target = FriendlyName::from(target.unwrap_or_else(default_target));
            let translation = orchestrator
                .translate(&text, &ShortCode::from(source), &target)
                .await?;
            println!("{}", translation);
        }
        Commands::Batch { file, source, target } => {
            let content =
                std::fs::read_to_string(&file).context(format!("Failed to read batch file: {:?}", file))?;
            let texts: Vec<String> = content.lines().map(str::to_string).collect();
            let target = FriendlyName::from(target.unwrap_or_else(default_target));
            let translations = orchestrator
                .translate_batch(&texts, &ShortCode::from(source), &target)
                .await?;
            for line in translations {
                println!("{}", line);
            }
        }
        Commands::Status { source, load } => {
            let source = ShortCode::from(source);
            let loads = load.iter().map(|target| {
                let orchestrator = orchestrator.clone();
                let source = source.clone();
                let target = FriendlyName::from(target.as_str());
                async move {
                    // Any short text forces the pair's pipeline to load
                    if let Err(e) = orchestrator.translate("Hello.", &source, &target).await {
                        error!("Could not load {}: {}", target, e);
                    }
                }
            });
            futures::future::join_all(loads).await;

            for (name, status) in orchestrator.model_status(&source)? {
                println!("{:<12} {}", name, status);
            }
        }
        Commands::Languages | Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Print the language table
fn print_languages(registry: &LanguageCodeRegistry) {
    println!("Target languages:");
    for entry in registry.target_languages() {
        let voice = registry
            .tts_short_code_for_friendly_name(&entry.friendly)
            .map_or("no speech output", |_| "speech output");
        println!("  {:<12} {:<10} {:<4} {}", entry.friendly, entry.model, entry.short, voice);
    }
    println!("Source languages:");
    for entry in registry.source_languages() {
        let english = entry.short.english_name().unwrap_or("-");
        println!("  {:<12} {:<10} {} ({})", entry.short, entry.model, entry.friendly, english);
    }
}
