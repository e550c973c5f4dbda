//! Neurocast Application
//!
//! Command-line front end for building, combining, and inspecting
//! aggregate correlation models.
//!
//! # Usage
//!
//! ```bash
//! # Build a model from 10 simulated subjects and save it
//! neurocast simulate --subjects 10 --output model.mo
//!
//! # Merge two cohort models
//! neurocast combine a.mo b.mo --output merged.mo
//!
//! # Subtract a cohort back out
//! neurocast subtract merged.mo a.mo --output b_again.mo
//!
//! # Fold saved recordings into an existing model
//! neurocast update model.mo subject1.bo subject2.bo --output model2.mo
//!
//! # Inspect a saved model
//! neurocast info model.mo
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use neurocast_core::sim::{simulate_locations, simulate_subject};
use neurocast_core::{LocationRegistry, Model, RbfKernel};
use neurocast_io::{load_model, load_recording, save_model};

/// Neurocast Application
#[derive(Parser, Debug)]
#[command(name = "neurocast")]
#[command(author, version, about = "Sparse-to-dense brain correlation modeling", long_about = None)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a model from simulated subjects
    Simulate {
        /// Number of simulated subjects
        #[arg(short, long, default_value = "10")]
        subjects: usize,

        /// Electrodes observed per subject
        #[arg(short, long, default_value = "10")]
        electrodes: usize,

        /// Time points per subject
        #[arg(short = 'n', long, default_value = "1000")]
        samples: usize,

        /// Reference grid size
        #[arg(short, long, default_value = "50")]
        grid: usize,

        /// Kernel bandwidth (mm squared)
        #[arg(short, long, default_value = "20.0")]
        width: f64,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output model path (.mo or .json)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Merge two models built over the same reference grid
    Combine {
        /// Left model
        left: PathBuf,
        /// Right model
        right: PathBuf,
        /// Output model path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Subtract a cohort model from a larger model
    Subtract {
        /// Minuend model
        left: PathBuf,
        /// Subtrahend model
        right: PathBuf,
        /// Output model path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Fold saved recordings into an existing model
    Update {
        /// Model to update
        model: PathBuf,
        /// Recording files (.bo or .json)
        recordings: Vec<PathBuf>,
        /// Output model path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print summary statistics for a saved model
    Info {
        /// Model path
        model: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Neurocast v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Simulate {
            subjects,
            electrodes,
            samples,
            grid,
            width,
            seed,
            output,
        } => run_simulate(subjects, electrodes, samples, grid, width, seed, &output)?,
        Commands::Combine {
            left,
            right,
            output,
        } => {
            let merged = load_model(&left)?.combine(&load_model(&right)?)?;
            info!(n_subs = merged.n_subs(), "combined models");
            save_model(&merged, &output)?;
        }
        Commands::Subtract {
            left,
            right,
            output,
        } => {
            let difference = load_model(&left)?.remove(&load_model(&right)?)?;
            info!(n_subs = difference.n_subs(), "subtracted model");
            save_model(&difference, &output)?;
        }
        Commands::Update {
            model,
            recordings,
            output,
        } => {
            let base = load_model(&model)?;
            let cohort = recordings
                .iter()
                .map(load_recording)
                .collect::<Result<Vec<_>, _>>()?;
            let updated = base.update(&cohort)?;
            info!(
                before = base.n_subs(),
                after = updated.n_subs(),
                "updated model with new cohort"
            );
            save_model(&updated, &output)?;
        }
        Commands::Info { model } => run_info(&model)?,
    }

    Ok(())
}

/// Build and save a model from simulated subjects.
fn run_simulate(
    subjects: usize,
    electrodes: usize,
    samples: usize,
    grid_size: usize,
    width: f64,
    seed: u64,
    output: &PathBuf,
) -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let grid = simulate_locations(grid_size, &mut rng);
    let registry = LocationRegistry::from_locations(&grid);
    info!(grid = registry.len(), "simulated reference grid");

    let cohort = (0..subjects)
        .map(|_| simulate_subject(&grid, electrodes, samples, &mut rng))
        .collect::<Result<Vec<_>, _>>()?;
    info!(subjects, electrodes, samples, "simulated cohort");

    let model = Model::from_cohort(&cohort, registry, RbfKernel::new(width))?;
    save_model(&model, output)?;
    info!(path = %output.display(), "saved model");
    Ok(())
}

/// Print summary statistics for a saved model.
fn run_info(path: &PathBuf) -> anyhow::Result<()> {
    let model = load_model(path)?;
    let reconstruction = model.reconstruct();

    println!("model:      {}", path.display());
    println!("subjects:   {}", model.n_subs());
    println!("grid size:  {}", model.registry().len());
    println!("kernel:     rbf width {}", model.kernel().width());
    println!(
        "coverage:   {:.1}% of off-diagonal cells defined",
        reconstruction.coverage() * 100.0
    );
    Ok(())
}
