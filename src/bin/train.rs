use anyhow::{Context as _, Error as Anyhow};
use clap::{Args, Parser, Subcommand};
use elman::{evaluate, persist, Logging, Network, Trainer};
use rand::{rngs::StdRng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

type Pattern = (Vec<f64>, Vec<f64>);

fn xor() -> Vec<Pattern> {
    vec![
        (vec![0.0, 0.0], vec![0.0]),
        (vec![0.0, 1.0], vec![1.0]),
        (vec![1.0, 0.0], vec![1.0]),
        (vec![1.0, 1.0], vec![0.0]),
    ]
}

#[derive(Parser)]
#[command(author, version, about)]
struct Opts {
    /// Emit debug events.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only emit warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trains a new network and prints its output for every pattern.
    Train(TrainOpts),
    /// Runs a saved network on one input vector.
    Run {
        /// The saved network.
        network: PathBuf,
        /// Comma separated input values.
        #[arg(value_delimiter = ',', allow_negative_numbers = true, required = true)]
        input: Vec<f64>,
    },
}

#[derive(Args)]
struct TrainOpts {
    /// JSON list of `[input, target]` pairs; defaults to XOR.
    #[arg(long)]
    patterns: Option<PathBuf>,

    /// Number of hidden units.
    #[arg(long, default_value_t = 2)]
    hidden: usize,

    /// Number of context slots; zero trains a feed forward network.
    #[arg(long, default_value_t = 0)]
    contexts: usize,

    /// Leave outputs linear.
    #[arg(long)]
    regression: bool,

    /// Seed for the initial weights.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// JSON trainer configuration, overridden by any flag below.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    iterations: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f64>,

    #[arg(long)]
    momentum: Option<f64>,

    /// Report progress every this many iterations; zero only reports the
    /// summary.
    #[arg(long)]
    report_every: Option<usize>,

    /// Where to save the trained network.
    #[arg(long)]
    save: Option<PathBuf>,
}

impl TrainOpts {
    fn trainer(&self) -> Result<Trainer, Anyhow> {
        let mut trainer = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("invalid configuration in {}", path.display()))?
            }
            None => Trainer::new(),
        };
        if let Some(iterations) = self.iterations {
            trainer = trainer.iterations(iterations);
        }
        if let Some(rate) = self.learning_rate {
            trainer = trainer.learning_rate(rate);
        }
        if let Some(factor) = self.momentum {
            trainer = trainer.momentum(factor);
        }
        match self.report_every {
            Some(0) => trainer = trainer.logging(Logging::Completion),
            Some(n) => trainer = trainer.logging(Logging::Iterations(n)),
            None => {}
        }
        Ok(trainer)
    }

    fn patterns(&self) -> Result<Vec<Pattern>, Anyhow> {
        match &self.patterns {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("invalid patterns in {}", path.display()))
            }
            None => Ok(xor()),
        }
    }
}

fn train(opts: &TrainOpts) -> Result<(), Anyhow> {
    let patterns = opts.patterns()?;
    let (inputs, outputs) = match patterns.first() {
        Some((input, target)) => (input.len(), target.len()),
        None => anyhow::bail!("no training patterns"),
    };

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut network = Network::new(&mut rng, inputs, opts.hidden, outputs, opts.regression)?
        .with_contexts(&mut rng, opts.contexts);
    let errors = opts.trainer()?.train(&mut network, &patterns)?;
    info!(error = errors.last().copied().unwrap_or_default(), "final");

    network.reset_contexts();
    for evaluation in evaluate(&mut network, &patterns)? {
        println!("{}", evaluation);
    }

    if let Some(path) = &opts.save {
        persist::save(path, &network)
            .with_context(|| format!("failed to save network to {}", path.display()))?;
        info!(path = %path.display(), "saved");
    }
    Ok(())
}

fn run(path: &Path, input: &[f64]) -> Result<(), Anyhow> {
    let mut network = persist::load(path)
        .with_context(|| format!("failed to load network from {}", path.display()))?;
    let output = network.forward(input)?;
    println!("{:?}", output);
    Ok(())
}

fn main() -> Result<(), Anyhow> {
    let opts = Opts::parse();

    let level = if opts.verbose {
        Level::DEBUG
    } else if opts.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match &opts.command {
        Command::Train(train_opts) => train(train_opts),
        Command::Run { network, input } => run(network, input),
    }
}
