use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use variant_core::logging::{init_logging, LogConfig};
use variant_core::{
    default_profiles, print_summary_report, run_batch, validate_catalog, BatchOptions,
    ConversionReport, Profile, ProgressSink, SUPPORTED_SOURCE_EXTENSIONS,
};

#[derive(Parser)]
#[command(name = "img-variants")]
#[command(version, about = "Batch image resizer producing size-budgeted AVIF renditions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a source tree into one AVIF rendition per output profile
    Run {
        /// Source directory containing the original images
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Destination directory; one subtree per profile is created here
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        /// Scan only the top level of INPUT instead of the whole tree
        #[arg(long)]
        flat: bool,

        /// Output profile as NAME=WIDTH:MAX_KB (repeatable; default: mobile and web)
        #[arg(short, long = "profile", value_name = "NAME=WIDTH:MAX_KB")]
        profiles: Vec<Profile>,

        /// Report format printed after the run
        #[arg(short, long, value_enum, default_value = "human")]
        report: OutputFormat,

        #[arg(short, long)]
        verbose: bool,
    },

    /// List the built-in output profiles
    Profiles,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            output,
            flat,
            profiles,
            report,
            verbose,
        } => {
            let level = if verbose {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            };
            let _ = init_logging("img_variants", LogConfig::default().with_level(level));

            run_conversion(input, output, flat, profiles, report)?;
        }

        Commands::Profiles => {
            println!("Built-in output profiles:");
            for profile in default_profiles() {
                println!(
                    "  {:<8} width {:>5} px, budget {:>6.1} KB",
                    profile.name, profile.target_width, profile.max_size_kb
                );
            }
            println!(
                "\nSupported input extensions: {}",
                SUPPORTED_SOURCE_EXTENSIONS.join(", ")
            );
        }
    }

    Ok(())
}

fn run_conversion(
    input: PathBuf,
    output: PathBuf,
    flat: bool,
    profiles: Vec<Profile>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if !input.is_dir() {
        eprintln!("❌ Error: Input path is not a directory: {}", input.display());
        std::process::exit(1);
    }

    let profiles = if profiles.is_empty() {
        default_profiles()
    } else {
        profiles
    };
    if let Err(e) = validate_catalog(&profiles) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }

    let options = BatchOptions {
        source_root: input.clone(),
        destination_root: output,
        profiles,
        recursive: !flat,
    };

    let start_time = Instant::now();
    let sink = BarSink::new();
    let report = run_batch(&options, &sink);
    sink.finish();

    if report.total == 0 {
        match format {
            OutputFormat::Human => println!("📂 No image files found in {}", input.display()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }
        return Ok(());
    }

    match format {
        OutputFormat::Human => {
            print_summary_report(&report, options.profiles.len(), start_time.elapsed());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    std::process::exit(exit_code(&report));
}

fn exit_code(report: &ConversionReport) -> i32 {
    if report.aborted {
        2
    } else if !report.failures.is_empty() {
        1
    } else {
        0
    }
}

/// Progress bar sink; the bar is created lazily on the first event so an
/// empty batch draws nothing.
struct BarSink {
    bar: ProgressBar,
}

impl BarSink {
    const TEMPLATE: &'static str =
        "{spinner:.green} {prefix:.cyan.bold} ▕{bar:35.green/black}▏ {pos}/{len} • {msg}";
    const PROGRESS_CHARS: &'static str = "█▓░";
    const SPINNER_CHARS: &'static str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

    fn new() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::default_bar()
                .template(Self::TEMPLATE)
                .expect("Invalid progress bar template")
                .progress_chars(Self::PROGRESS_CHARS)
                .tick_chars(Self::SPINNER_CHARS),
        );
        bar.set_prefix("Converting");
        Self { bar }
    }

    fn finish(&self) {
        if self.bar.length().unwrap_or(0) > 0 {
            self.bar.finish_with_message("Complete!");
        }
    }
}

impl ProgressSink for BarSink {
    fn item_started(&self, index: usize, total: usize, filename: &str) {
        if self.bar.length().unwrap_or(0) != total as u64 {
            self.bar.set_length(total as u64);
            self.bar
                .set_draw_target(indicatif::ProgressDrawTarget::stderr());
        }
        self.bar.set_position(index as u64 - 1);
        self.bar.set_message(format!(
            "Processing image {} of {}: {}",
            index, total, filename
        ));
    }
}
