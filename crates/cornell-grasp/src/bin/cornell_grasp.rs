use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use cornell_grasp::dataset::{generate, GenerateConfig, GenerationReport, JsonSampleSink, NullSink};
use cornell_grasp::eval::{MatchParams, PredictionSet};
use log::info;

#[derive(Parser, Debug)]
#[command(
    name = "cornell-grasp",
    version,
    about = "Generate augmented Cornell grasp training data and score grasp predictions"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON log lines (tracing builds only).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Turn the raw dataset into augmented samples.
    Generate(GenerateArgs),
    /// Score a prediction file against its ground truth.
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// JSON config; command line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory with the raw `pcdXXXX*` files.
    #[arg(long, required_unless_present = "config")]
    dataset_dir: Option<PathBuf>,
    /// Directory receiving `<n>.json` samples.
    #[arg(long, required_unless_present = "config")]
    output_dir: Option<PathBuf>,
    /// Side of the square output in pixels.
    #[arg(long)]
    image_size: Option<usize>,
    /// Augmentation draws per source image.
    #[arg(long)]
    random_rotations: Option<usize>,
    /// Disable the random zoom.
    #[arg(long)]
    no_zoom: bool,
    #[arg(long)]
    zoom_min: Option<f64>,
    #[arg(long)]
    zoom_max: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Build samples without writing them.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Prediction set written as JSON.
    #[arg(long)]
    predictions: PathBuf,
    /// Peaks taken from each position map.
    #[arg(long, default_value_t = 1)]
    num_grasps: usize,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Evaluate(args) => run_evaluate(args),
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8, _json: bool) {
    let level = cornell_grasp::core::level_for_verbosity(verbose);
    if let Err(e) = cornell_grasp::core::init_with_level(level) {
        eprintln!("failed to install logger: {e}");
    }
}

#[cfg(feature = "tracing")]
fn init_logging(verbose: u8, json: bool) {
    let level = cornell_grasp::core::level_for_verbosity(verbose);
    cornell_grasp::core::init_tracing(level, json);
}

fn build_config(args: GenerateArgs) -> Result<GenerateConfig, Box<dyn std::error::Error>> {
    let mut cfg = match &args.config {
        Some(path) => GenerateConfig::load_json(path)?,
        None => GenerateConfig::new(PathBuf::new(), PathBuf::new()),
    };
    if let Some(dir) = args.dataset_dir {
        cfg.dataset_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        cfg.output_dir = dir;
    }
    let aug = &mut cfg.augmentation;
    if let Some(size) = args.image_size {
        aug.output_size = size;
    }
    if let Some(n) = args.random_rotations {
        aug.random_rotations = n;
    }
    if args.no_zoom {
        aug.random_zoom = false;
    }
    if let Some(v) = args.zoom_min {
        aug.zoom_min = v;
    }
    if let Some(v) = args.zoom_max {
        aug.zoom_max = v;
    }
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    cfg.dry_run |= args.dry_run;
    cfg.validate()?;
    Ok(cfg)
}

fn run_generate(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = build_config(args)?;
    info!(
        "generating from {} (seed {}, {} draws per image)",
        cfg.dataset_dir.display(),
        cfg.seed,
        cfg.augmentation.random_rotations
    );

    let report: GenerationReport = if cfg.dry_run {
        generate(&cfg, &mut NullSink)?
    } else {
        let mut sink = JsonSampleSink::create(&cfg.output_dir)?;
        generate(&cfg, &mut sink)?
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let set = PredictionSet::load_json(&args.predictions)?;
    let params = MatchParams {
        num_grasps: args.num_grasps,
        ..MatchParams::default()
    };
    let outcome = set.evaluate(&params)?;
    info!(
        "{} of {} samples matched",
        outcome.succeeded.len(),
        outcome.total()
    );
    let report = serde_json::json!({
        "succeeded": outcome.succeeded,
        "failed": outcome.failed,
        "success_rate": outcome.success_rate(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
