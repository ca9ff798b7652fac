#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, LevelFilter};
use std::path::PathBuf;

use tesstrain::app_config::{self, Config};
use tesstrain::command_runner::ProcessRunner;
use tesstrain::context::{PolicyFlags, RunContext, TrainingOptions};
use tesstrain::language_params::BuiltinLanguageTable;
use tesstrain::logging::{self, PipelineLogger};
use tesstrain::pipeline::TrainingPipeline;

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
    /// Generate training data for a language (default command)
    Train(TrainArgs),

    /// Generate shell completions for tesstrain
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct TrainArgs {
    /// Language code to train (e.g. 'eng', 'chi_sim')
    #[arg(long = "lang")]
    lang_code: Option<String>,

    /// Directory with the language data files
    #[arg(long)]
    langdata_dir: Option<PathBuf>,

    /// Directory with existing traineddata files
    #[arg(long, env = "TESSDATA_PREFIX")]
    tessdata_dir: Option<PathBuf>,

    /// Fonts to render (repeat the flag or separate with '+')
    #[arg(long = "fontlist", num_args = 1.., value_delimiter = '+')]
    fonts: Option<Vec<String>>,

    /// Directory the renderer loads fonts from
    #[arg(long)]
    fonts_dir: Option<PathBuf>,

    /// Parent of the scratch directory
    #[arg(long)]
    tmp_dir: Option<PathBuf>,

    /// Where the training data and starter model are written
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Text to render
    #[arg(long)]
    training_text: Option<PathBuf>,

    /// Word list for the starter model
    #[arg(long = "wordlist")]
    wordlist_file: Option<PathBuf>,

    /// Exposure levels to render
    #[arg(long, num_args = 1.., allow_negative_numbers = true)]
    exposures: Option<Vec<i32>>,

    /// Maximum pages rendered per font, 0 for no limit
    #[arg(long = "maxpages")]
    max_pages: Option<u32>,

    /// Replace an existing starter model in the output directory
    #[arg(long)]
    overwrite: bool,

    /// Keep box/tiff pairs next to the training data
    #[arg(long)]
    save_box_tiff: bool,

    /// Only generate line-level training data
    #[arg(long)]
    linedata_only: bool,

    /// Skip font-property extraction
    #[arg(long = "noextract-font-properties")]
    no_extract_font_properties: bool,

    /// Render distorted images
    #[arg(long)]
    distort_image: bool,

    /// Parallel rendering jobs
    #[arg(long)]
    render_workers: Option<usize>,

    /// Parallel feature extraction jobs
    #[arg(long)]
    feature_workers: Option<usize>,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "tesstrain.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// tesstrain - Tesseract training data generation
///
/// Renders a training text in the requested fonts and runs the Tesseract
/// training tools to produce line-level training data and a starter model.
#[derive(Parser, Debug)]
#[command(name = "tesstrain")]
#[command(version)]
#[command(about = "Generate Tesseract LSTM training data")]
#[command(long_about = "tesstrain renders a training text with the Tesseract training tools and builds
line-level training data plus a starter model for a language.

EXAMPLES:
    tesstrain --lang eng --linedata-only --langdata-dir ./langdata --tessdata-dir ./tessdata
    tesstrain --lang eng --linedata-only --langdata-dir ./langdata \\
        --fontlist 'Arial' 'Times New Roman, Bold' --exposures -1 0 1
    tesstrain completions bash > tesstrain.bash

CONFIGURATION:
    Worker limits, tool lookup and timeouts are read from tesstrain.json when it
    exists. Command line flags override it. TESSDATA_PREFIX is used when
    --tessdata-dir is not given.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    train: TrainArgs,
}

#[tokio::main]
async fn main() {
    // Filtering is done through the max level, which is set once the config is known
    if let Err(e) = PipelineLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialise logging: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "tesstrain", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Train(args)) => run_train(args).await,
        None => run_train(cli.train).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run_train(args: TrainArgs) -> Result<()> {
    let mut config = Config::load_or_default(&args.config_path)?;

    if let Some(level) = &args.log_level {
        config.log_level = level.clone().into();
    }
    if let Some(workers) = args.render_workers {
        config.render_workers = workers;
    }
    if let Some(workers) = args.feature_workers {
        config.feature_workers = workers;
    }
    if let Some(max_pages) = args.max_pages {
        config.max_pages = max_pages;
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let options = TrainingOptions {
        lang_code: args.lang_code.unwrap_or_default(),
        langdata_dir: args.langdata_dir,
        tessdata_dir: args.tessdata_dir,
        fonts: args.fonts,
        fonts_dir: args.fonts_dir,
        tmp_dir: args.tmp_dir,
        output_dir: args.output_dir,
        training_text: args.training_text,
        wordlist_file: args.wordlist_file,
        exposures: args.exposures,
        max_pages: config.max_pages,
        flags: PolicyFlags {
            overwrite: args.overwrite,
            save_box_tiff: args.save_box_tiff,
            extract_font_properties: !args.no_extract_font_properties,
            distort_image: args.distort_image,
            linedata_only: args.linedata_only,
        },
    };

    let ctx = RunContext::new(options, &BuiltinLanguageTable)?;
    let scratch_dir = ctx.training_dir.clone();
    let log_file = ctx.log_file.clone();

    logging::attach_run_log(&log_file)
        .with_context(|| format!("Failed to open run log {}", log_file.display()))?;
    info!("Log file location: {}", log_file.display());

    let runner = ProcessRunner::from_config(&config);
    match TrainingPipeline::new(ctx, &runner, &config).run().await {
        Ok(report) => {
            println!("Output directory: {}", report.output_dir.display());
            println!("Starter model:    {}", report.starter_model.display());
            println!("Manifest:         {} ({} files)", report.manifest.display(), report.feature_files);
            if let Some(log) = &report.log_file {
                println!("Log file:         {}", log.display());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Scratch directory kept for inspection: {}", scratch_dir.display());
            eprintln!("Log file: {}", log_file.display());
            Err(e.context("Training run failed"))
        }
    }
}
