//! Trains the classic 2-2-1 XOR network, then saves and reloads it.

use elman::{evaluate, persist, Logging, Network, Trainer};
use rand::{rngs::StdRng, SeedableRng};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let patterns = [
        ([0.0, 0.0], [0.0]),
        ([0.0, 1.0], [1.0]),
        ([1.0, 0.0], [1.0]),
        ([1.0, 1.0], [0.0]),
    ];

    let mut network = Network::new(&mut StdRng::seed_from_u64(0), 2, 2, 1, false)?;
    let errors = Trainer::new()
        .iterations(1000)
        .learning_rate(0.6)
        .momentum(0.4)
        .logging(Logging::Iterations(100))
        .train(&mut network, &patterns[..])?;
    println!("error went from {} to {}", errors[0], errors[errors.len() - 1]);

    for evaluation in evaluate(&mut network, &patterns[..])? {
        println!("{}", evaluation);
    }

    let path = std::env::temp_dir().join("xor.network.json");
    persist::save(&path, &network)?;
    let mut loaded = persist::load(&path)?;
    for (input, _) in &patterns {
        assert_eq!(network.predict(input)?, loaded.predict(input)?);
    }
    println!("reloaded network from {} gives identical outputs", path.display());
    Ok(())
}
