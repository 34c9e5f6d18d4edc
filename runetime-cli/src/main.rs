mod loader;
mod reports;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use runetime_core::{Calculator, EtaRequest, Rune};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use loader::{FileCatalogLoader, load_limits};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable, colored output
    Console,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "runetime", version)]
#[command(about = "Estimate rune acquisition times across astronomically large rates")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Catalog JSON with scale suffixes and runes (defaults to the bundled dataset)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Simulation limits JSON (max_steps, trace_limit)
    #[arg(long, global = true)]
    limits: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console, global = true)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Seed for the placeholder picked for century-plus durations
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a number with the largest fitting suffix
    Format {
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
    /// Parse a suffixed number such as 95QnVt
    Parse { input: String },
    /// Simulate the time to acquire copies of a rune
    Eta {
        #[arg(long)]
        rune: String,
        /// Rune speed, e.g. 1.5M
        #[arg(long)]
        rate: String,
        /// Rune bulk (defaults to 1)
        #[arg(long)]
        bulk: Option<String>,
        /// Copies already owned
        #[arg(long, default_value_t = 0)]
        start: u64,
        /// Target copy count
        #[arg(long)]
        end: u64,
        /// Include the per-copy trace
        #[arg(long)]
        trace: bool,
    },
    /// Constant-rate odds of getting a rune within a time window
    Odds {
        #[arg(long)]
        rune: String,
        #[arg(long)]
        rate: String,
        #[arg(long)]
        seconds: f64,
    },
    /// List catalog runes
    Runes {
        #[arg(long)]
        tag: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let limits = load_limits(args.limits.as_deref())?;
    let calc = Calculator::from_loader(&FileCatalogLoader::new(args.catalog.clone()), limits)
        .context("failed to load catalog")?;
    log::debug!(
        "catalog ready: {} scales, {} runes",
        calc.table().len(),
        calc.catalog().len()
    );

    let mut output_target = OutputTarget::new(args.output.clone())?;
    let mut rng = build_rng(args.seed);
    run_command(&args, &calc, &mut output_target, rng.as_mut())?;
    output_target.flush_inner()?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn build_rng(seed: Option<u64>) -> Box<dyn RngCore> {
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    }
}

fn run_command(
    args: &Args,
    calc: &Calculator,
    out: &mut dyn Write,
    rng: &mut dyn RngCore,
) -> Result<()> {
    match &args.command {
        Command::Format { value } => {
            let rendered = calc.format_value(*value);
            reports::write_format(out, args.report, *value, &rendered)
        }
        Command::Parse { input } => {
            let parsed = calc.parse_value(input);
            reports::write_parse(out, args.report, calc, input, &parsed)
        }
        Command::Eta {
            rune,
            rate,
            bulk,
            start,
            end,
            trace,
        } => {
            let request = EtaRequest {
                rune: rune.clone(),
                rate: rate.clone(),
                bulk: bulk.clone(),
                start: *start,
                end: *end,
            };
            let report = calc
                .eta(&request)
                .with_context(|| format!("cannot project {rune}"))?;
            reports::write_eta(out, args.report, calc, &report, *trace, rng)
        }
        Command::Odds {
            rune,
            rate,
            seconds,
        } => {
            let report = calc
                .odds(rune, rate, *seconds)
                .with_context(|| format!("cannot compute odds for {rune}"))?;
            reports::write_odds(out, args.report, calc, &report, rng)
        }
        Command::Runes { tag } => {
            let runes: Vec<&Rune> = match tag {
                Some(tag) => calc.catalog().with_tag(tag).collect(),
                None => calc.catalog().iter().collect(),
            };
            reports::write_runes(out, args.report, calc, &runes)
        }
    }
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
