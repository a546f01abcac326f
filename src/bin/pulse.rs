//! Pulse CLI - Command-line interface for Synheart Pulse
//!
//! Commands:
//! - analyze: Replay recorded frame samples into a scan report
//! - synth: Generate a synthetic scan recording
//! - config: Print the default or a loaded configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::f64::consts::PI;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use synheart_pulse::encoder::ReportEncoder;
use synheart_pulse::pipeline::replay;
use synheart_pulse::samples::{SampleAdapter, ScanInput};
use synheart_pulse::types::{FrameSample, ScanReport};
use synheart_pulse::{ScanConfig, ScanError, PULSE_VERSION};

/// Pulse - On-device rPPG engine for HRV and wellness signals
#[derive(Parser)]
#[command(name = "pulse")]
#[command(author = "Synheart AI Inc")]
#[command(version = PULSE_VERSION)]
#[command(about = "Turn recorded camera samples into HRV reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recorded samples through a scan session and print the report
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Load configuration from file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate a synthetic red-channel recording
    Synth {
        /// Simulated heart rate (bpm)
        #[arg(long, default_value = "72")]
        bpm: f64,

        /// Frame rate (Hz)
        #[arg(long, default_value = "30")]
        rate: f64,

        /// Recording length (seconds)
        #[arg(long, default_value = "20")]
        seconds: f64,

        /// Pulse amplitude on the red channel
        #[arg(long, default_value = "20")]
        amplitude: f64,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Print the scan configuration
    Config {
        /// Load and validate configuration from file instead of printing defaults
        #[arg(long)]
        load: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one sample per line)
    Ndjson,
    /// JSON array of samples
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Single-line JSON followed by a newline
    Ndjson,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PulseCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            input_format,
            output_format,
            config,
        } => cmd_analyze(&input, &output, input_format, output_format, config.as_deref()),

        Commands::Synth {
            bpm,
            rate,
            seconds,
            amplitude,
            output,
        } => cmd_synth(bpm, rate, seconds, amplitude, &output),

        Commands::Config { load } => cmd_config(load.as_deref()),
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
) -> Result<(), PulseCliError> {
    let config = load_config(config)?;

    let input_data = if is_stdio(input) {
        if atty::is(atty::Stream::Stdin) {
            log::warn!("reading samples from an interactive terminal, end input with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let inputs = match input_format {
        InputFormat::Ndjson => SampleAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => SampleAdapter::parse_array(&input_data)?,
    };

    if SampleAdapter::frames(&inputs).is_empty() {
        return Err(PulseCliError::NoSamples);
    }

    let session = replay(&inputs, config)?;
    let report = ReportEncoder::new().encode(&session)?;
    let output_data = format_output(&report, &output_format)?;

    write_output(output, &output_data)
}

fn cmd_synth(
    bpm: f64,
    rate: f64,
    seconds: f64,
    amplitude: f64,
    output: &Path,
) -> Result<(), PulseCliError> {
    if !(bpm > 0.0 && rate > 0.0 && seconds > 0.0) {
        return Err(PulseCliError::InvalidArgument(
            "bpm, rate and seconds must be positive".to_string(),
        ));
    }

    let count = (rate * seconds).round() as usize;
    let beat_hz = bpm / 60.0;

    let mut lines: Vec<String> = Vec::with_capacity(count);
    for i in 0..count {
        let t = i as f64 / rate;
        let red = 150.0 + amplitude * (2.0 * PI * beat_hz * t).sin();
        let sample = ScanInput::Frame(FrameSample::from_means(t * 1000.0, red, 80.0, 60.0));
        lines.push(serde_json::to_string(&sample)?);
    }

    write_output(output, &(lines.join("\n") + "\n"))
}

fn cmd_config(load: Option<&Path>) -> Result<(), PulseCliError> {
    let config = load_config(load)?;
    println!("{}", config.to_json()?);
    Ok(())
}

// Helper functions

fn is_stdio(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig, PulseCliError> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(ScanConfig::from_json(&json)?)
        }
        None => Ok(ScanConfig::default()),
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), PulseCliError> {
    if is_stdio(output) {
        print!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_output(report: &ScanReport, format: &OutputFormat) -> Result<String, PulseCliError> {
    match format {
        OutputFormat::Ndjson => Ok(serde_json::to_string(report)? + "\n"),
        OutputFormat::Json => Ok(serde_json::to_string(report)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(report)? + "\n"),
    }
}

// Error types

#[derive(Debug)]
enum PulseCliError {
    Io(io::Error),
    Scan(ScanError),
    Json(serde_json::Error),
    NoSamples,
    InvalidArgument(String),
}

impl From<io::Error> for PulseCliError {
    fn from(e: io::Error) -> Self {
        PulseCliError::Io(e)
    }
}

impl From<ScanError> for PulseCliError {
    fn from(e: ScanError) -> Self {
        PulseCliError::Scan(e)
    }
}

impl From<serde_json::Error> for PulseCliError {
    fn from(e: serde_json::Error) -> Self {
        PulseCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PulseCliError> for CliError {
    fn from(e: PulseCliError) -> Self {
        match e {
            PulseCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PulseCliError::Scan(e) => {
                let (code, hint) = match &e {
                    ScanError::InvalidConfig(_) => {
                        ("CONFIG_ERROR", "Run 'pulse config' to see the expected fields")
                    }
                    ScanError::ParseError(_) | ScanError::JsonError(_) => (
                        "PARSE_ERROR",
                        "Each record must be a frame sample or a motion reading",
                    ),
                    ScanError::NonMonotonicTimestamp { .. } => {
                        ("ORDER_ERROR", "Sort samples by timestamp")
                    }
                    other => match other.failure_reason() {
                        Some(reason) => ("SCAN_FAILED", reason.hint()),
                        None => ("SCAN_ERROR", "Check the recorded input"),
                    },
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            PulseCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PulseCliError::NoSamples => CliError {
                code: "NO_SAMPLES".to_string(),
                message: "No frame samples found in input".to_string(),
                hint: Some("Generate a recording with 'pulse synth'".to_string()),
            },
            PulseCliError::InvalidArgument(msg) => CliError {
                code: "INVALID_ARGUMENT".to_string(),
                message: msg,
                hint: None,
            },
        }
    }
}
