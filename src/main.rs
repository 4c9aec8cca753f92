use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use fdnnet::gates::{Gate, INPUTS};
use fdnnet::graph::{Net, TrainConfig};
use log::info;
use rand::{rngs::StdRng, SeedableRng};

const DEFAULT_ITERATIONS: usize = 20_000;

/// Reads an optional environment variable, failing on unparsable values.
fn env_or<T>(name: &str, default: impl FnOnce() -> T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", name, value)),
        Err(_) => Ok(default()),
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let seed = env_or("FDNNET_SEED", clock_seed)?;
    let iterations = env_or("FDNNET_ITERATIONS", || DEFAULT_ITERATIONS)?;
    info!("seed {}, {} iterations per gate", seed, iterations);

    let mut rng = StdRng::seed_from_u64(seed);
    let config = TrainConfig::default();

    for &gate in &[Gate::And, Gate::Or, Gate::Nand, Gate::Xor] {
        // A non-separable gate needs a wider hidden layer to train reliably
        let layers: &[usize] = if gate.is_linearly_separable() {
            &[2, 1]
        } else {
            &[2, 4, 1]
        };

        let net = Net::new(layers, &mut rng)?;
        println!("{} network before training:\n{}", gate, net);

        let samples = gate.samples();
        let mut trainer = net.build_trainer(config)?;
        let cost = trainer.train(&samples, iterations)?;
        let mut net = trainer.teardown();

        println!("{} network after training (cost {:.6}):", gate, cost);
        let mut outputs = [0.0];
        for inputs in INPUTS.iter() {
            net.process(inputs, &mut outputs)?;
            println!("  {} {} {} = {:.6}", inputs[0], gate, inputs[1], outputs[0]);
        }
        println!("{}", net);
    }

    Ok(())
}
