//! A simple recurrent network that learns to repeat the bit it saw one step
//! earlier, which only its context units can remember.

use elman::{evaluate, Logging, Network, Trainer};
use rand::{rngs::StdRng, SeedableRng};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let bits = [1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0];
    let patterns: Vec<_> = (0..bits.len())
        .map(|i| ([bits[i]], [bits[(i + bits.len() - 1) % bits.len()]]))
        .collect();

    let mut rng = StdRng::seed_from_u64(9);
    let mut network = Network::new(&mut rng, 1, 4, 1, false)?.with_contexts(&mut rng, 1);
    Trainer::new()
        .iterations(2000)
        .learning_rate(0.3)
        .momentum(0.4)
        .logging(Logging::Iterations(500))
        .train(&mut network, &patterns)?;

    // Replay the sequence once so the context holds the last bit again.
    network.reset_contexts();
    evaluate(&mut network, &patterns)?;
    for evaluation in evaluate(&mut network, &patterns)? {
        println!("{}", evaluation);
    }
    Ok(())
}
