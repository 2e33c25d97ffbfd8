// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use yaltwai::app_config::{self, Config, TranslationProvider};
use yaltwai::app_controller::{Controller, RunReport};
use yaltwai::errors::AppError;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "deepseek")]
    DeepSeek,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::DeepSeek => TranslationProvider::DeepSeek,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
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
    /// Translate locale files (a file or every file directly inside a directory)
    Translate(TranslateArgs),

    /// Generate shell completions for yaltwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Locale file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Provider base URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// API key for hosted providers
    #[arg(long, env = "YALTWAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Additional attempts for a failed batch
    #[arg(long)]
    max_retries: Option<u32>,

    /// Delay before the first retry in milliseconds, doubled for each further retry
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Maximum number of entries per oracle request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

/// yaltwai - Yet Another Locale Translation with AI
///
/// Translates the string values of TypeScript/JavaScript locale modules and
/// JSON locale files with an LLM, keeping keys, comments and layout intact.
#[derive(Parser, Debug)]
#[command(name = "yaltwai")]
#[command(version)]
#[command(about = "AI-powered locale file translation tool")]
#[command(long_about = "yaltwai reads locale files whose names carry a language tag (messages.en-US.ts, zh-HK.json),
translates their string values with an AI provider and writes the result to a dist/ directory.

EXAMPLES:
    yaltwai translate src/locales/                    # Translate every tagged file in a directory
    yaltwai translate messages.fr-FR.ts               # Translate one file into dist/messages.fr-FR.ts
    yaltwai translate -p ollama -m qwen2.5 locales/   # Use a specific provider and model
    yaltwai translate --json locales/                 # Machine-readable run report
    yaltwai completions bash > yaltwai.bash           # Generate bash completions

CONFIGURATION:
    Configuration is read from conf.json by default (see --config). A missing file
    means built-in defaults. The API key may also come from YALTWAI_API_KEY.

SUPPORTED PROVIDERS:
    deepseek  - DeepSeek API (default, requires API key)
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    ollama    - Local Ollama server
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
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
    // The logger accepts everything; the effective level is lowered once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "yaltwai", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => {
            let json = args.json;
            match run_translate(args).await {
                Ok(report) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
                    }
                    if report.is_success() {
                        Ok(())
                    } else {
                        Err(anyhow!(report.message()))
                    }
                }
                Err(e) => {
                    if json {
                        let envelope = serde_json::json!({
                            "message": format!("{:#}", e),
                            "success": false,
                            "files": [],
                        });
                        println!("{}", serde_json::to_string_pretty(&envelope)?);
                    }
                    Err(e.into())
                }
            }
        }
    }
}

async fn run_translate(options: TranslateArgs) -> Result<RunReport, AppError> {
    let mut config = Config::load_or_default(&options.config)?;
    apply_overrides(&mut config, &options);

    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    Ok(controller.run(&options.input_path).await)
}

/// Command line values win over the configuration file
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    if let Some(max_retries) = options.max_retries {
        config.translation.common.retry_count = max_retries;
    }

    if let Some(retry_delay_ms) = options.retry_delay_ms {
        config.translation.common.retry_backoff_ms = retry_delay_ms;
    }

    if let Some(batch_size) = options.batch_size {
        config.pipeline.code_batch_size = batch_size;
        config.pipeline.json_batch_size = batch_size;
    }

    let provider_config = config.translation.active_provider_config_mut();
    if let Some(model) = &options.model {
        provider_config.model = model.clone();
    }
    if let Some(endpoint) = &options.endpoint {
        provider_config.endpoint = endpoint.clone();
    }
    if let Some(api_key) = &options.api_key {
        provider_config.api_key = api_key.clone();
    }
    if let Some(timeout_ms) = options.timeout_ms {
        provider_config.timeout_ms = timeout_ms;
    }
}
