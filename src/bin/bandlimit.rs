// src/bin/bandlimit.rs
//! Command-line front end for bandlimit-core

use bandlimit_core::batch::{BatchJob, BatchProcessor};
use bandlimit_core::codec::{AudioCodec, WavCodec};
use bandlimit_core::config::constants::env::DEFAULT_LOG_FILTER;
use bandlimit_core::config::{BandlimitConfig, ConfigLoader, OutputFormat};
use bandlimit_core::error::{BandlimitErrorBuilder, BandlimitResult};
use bandlimit_core::processing::{FilterSpec, SignalPipeline};
use bandlimit_core::SampleBuffer;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "bandlimit",
    version,
    about = "Zero-phase highpass/lowpass filtering with spectral previews"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Extra TOML configuration file, applied after the standard search paths
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print sample rate, channels and duration of a WAV file
    Info(InfoArgs),
    /// Time series and spectrum of an unfiltered WAV file
    Analyze(AnalyzeArgs),
    /// Filter one WAV file
    Process(ProcessArgs),
    /// Filter every WAV file of one or more directories
    Batch(BatchArgs),
    /// Print the effective configuration, or check a configuration file
    Config(ConfigArgs),
}

#[derive(Args)]
struct InfoArgs {
    input: PathBuf,
}

#[derive(Args)]
struct AnalyzeArgs {
    input: PathBuf,

    /// Print the full preview as JSON instead of a short summary
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CutoffArgs {
    /// Highpass cutoff in Hz
    #[arg(long)]
    highpass: Option<f64>,

    /// Lowpass cutoff in Hz
    #[arg(long)]
    lowpass: Option<f64>,
}

#[derive(Args)]
struct StageToggleArgs {
    /// Skip the highpass stage even if the configuration sets one
    #[arg(long, conflicts_with = "highpass")]
    no_highpass: bool,

    /// Skip the lowpass stage even if the configuration sets one
    #[arg(long, conflicts_with = "lowpass")]
    no_lowpass: bool,
}

#[derive(Args)]
struct ProcessArgs {
    input: PathBuf,

    /// Output WAV path
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    cutoffs: CutoffArgs,

    /// Sample encoding of the output file
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Write the before/after preview as JSON to this path
    #[arg(long)]
    preview: Option<PathBuf>,
}

#[derive(Args)]
struct BatchArgs {
    /// Input directory; repeat together with --output for several jobs
    #[arg(short, long, required = true)]
    input: Vec<PathBuf>,

    /// Output directory, paired with --input by position
    #[arg(short, long, required = true)]
    output: Vec<PathBuf>,

    #[command(flatten)]
    cutoffs: CutoffArgs,

    #[command(flatten)]
    toggles: StageToggleArgs,

    /// Worker threads (0 = one per CPU)
    #[arg(long)]
    threads: Option<usize>,

    /// Abort on the first failing file
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Args)]
struct ConfigArgs {
    /// Validate this file instead of printing the merged configuration
    #[arg(long)]
    check: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Pcm16,
    Float32,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pcm16 => OutputFormat::Pcm16,
            FormatArg::Float32 => OutputFormat::Float32,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!(kind = ?e.kind(), "{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> BandlimitResult<ExitCode> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Info(args) => {
            let buffer = read_wav(&args.input, &config)?;
            let info = SignalPipeline::describe(&buffer);
            println!("{}", to_json(&info)?);
        }
        Command::Analyze(args) => {
            let buffer = read_wav(&args.input, &config)?;
            let summary = SignalPipeline::from_config(&config).analyze(&buffer)?;
            if args.json {
                println!("{}", to_json(&summary)?);
            } else {
                println!(
                    "{} time points, {} spectrum points, peak {:.1} Hz",
                    summary.time_series.len(),
                    summary.spectrum.len(),
                    summary.peak_frequency_hz().unwrap_or(0.0)
                );
            }
        }
        Command::Process(args) => {
            let mut config = config;
            if let Some(format) = args.format {
                config.codec.output_format = format.into();
            }
            let buffer = read_wav(&args.input, &config)?;
            let spec = FilterSpec {
                highpass_hz: args.cutoffs.highpass,
                lowpass_hz: args.cutoffs.lowpass,
            };

            let result = SignalPipeline::from_config(&config).process(&buffer, &spec)?;
            let encoded = WavCodec::from_config(&config.codec).encode(&result.filtered)?;
            std::fs::write(&args.output, encoded)
                .map_err(|e| BandlimitErrorBuilder::new("cli", "write_output").io(&args.output, e))?;

            if let Some(path) = args.preview {
                std::fs::write(&path, to_json(&result.preview())?)
                    .map_err(|e| BandlimitErrorBuilder::new("cli", "write_preview").io(&path, e))?;
            }
            info!(output = %args.output.display(), time_us = result.processing_time_us, "wrote filtered file");
        }
        Command::Batch(args) => {
            if args.input.len() != args.output.len() {
                return Err(BandlimitErrorBuilder::new("cli", "batch")
                    .invalid_input("output", "each --input needs a matching --output"));
            }

            let mut config = config;
            if let Some(threads) = args.threads {
                config.batch.worker_threads = threads;
            }
            if args.fail_fast {
                config.batch.continue_on_error = false;
            }
            let mut spec = config.filter.to_spec();
            if args.cutoffs.highpass.is_some() {
                spec.highpass_hz = args.cutoffs.highpass;
            }
            if args.cutoffs.lowpass.is_some() {
                spec.lowpass_hz = args.cutoffs.lowpass;
            }
            if args.toggles.no_highpass {
                spec.highpass_hz = None;
            }
            if args.toggles.no_lowpass {
                spec.lowpass_hz = None;
            }

            let jobs: Vec<BatchJob> = args
                .input
                .into_iter()
                .zip(args.output)
                .map(|(input, output)| BatchJob::new(input, output))
                .collect();

            let report = BatchProcessor::with_spec(&config, spec)?.run_jobs(&jobs)?;
            let totals = report.totals();
            for failure in &totals.failures {
                eprintln!("failed: {} ({})", failure.input.display(), failure.message);
            }
            for job in &report.failed_jobs {
                eprintln!("job failed: {} ({})", job.input_dir.display(), job.message);
            }
            println!("processed {} files, {} failed", totals.succeeded(), totals.failed());

            if totals.failed() > 0 || !report.failed_jobs.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Config(args) => match args.check {
            Some(path) => {
                ConfigLoader::with_paths(Vec::new()).validate_config_file(&path)?;
                println!("{}: ok", path.display());
            }
            None => {
                let rendered = toml::to_string_pretty(&config)
                    .map_err(|e| BandlimitErrorBuilder::new("cli", "config").encode(e.to_string()))?;
                print!("{}", rendered);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(extra: Option<&Path>) -> BandlimitResult<BandlimitConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = extra {
        if !path.is_file() {
            return Err(BandlimitErrorBuilder::new("cli", "load_config").io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "configuration file not found"),
            ));
        }
        let mut paths = loader.config_paths().to_vec();
        paths.push(path.to_path_buf());
        loader = ConfigLoader::with_paths(paths);
    }
    let config = loader.load()?;
    debug!(summary = ?config.get_summary(), "configuration loaded");
    Ok(config)
}

fn read_wav(path: &Path, config: &BandlimitConfig) -> BandlimitResult<SampleBuffer> {
    let bytes = std::fs::read(path).map_err(|e| BandlimitErrorBuilder::new("cli", "read_input").io(path, e))?;
    WavCodec::from_config(&config.codec).decode(&bytes)
}

fn to_json<T: serde::Serialize>(value: &T) -> BandlimitResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BandlimitErrorBuilder::new("cli", "serialize").encode(e.to_string()))
}
