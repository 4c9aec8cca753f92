use fdnnet::gates::{Gate, INPUTS};
use fdnnet::graph::{Net, SampleSet, TrainConfig};
use rand::{rngs::StdRng, SeedableRng};

const CONFIG: TrainConfig = TrainConfig {
    learning_rate: 1.0,
    epsilon: 1e-3,
    log_every: 0,
};

/// Parameters of a `[2, 4, 1]` network that gradient descent takes to a XOR fit.
const XOR_COEFFICIENTS: [f64; 23] = [
    0.84, 0.76, 0.42, 0.26, 0.51, 0.4, 0.78, 0.3, 0.48, 0.58, 0.91, 0.5, 0.28, 0.76, 0.62, 0.25,
    0.91, 0.98, 0.81, 0.9, 0.31, 0.73, 0.9,
];

fn train(net: Net, samples: &SampleSet, iterations: usize) -> (Net, f64) {
    let mut trainer = net.build_trainer(CONFIG).unwrap();
    let cost = trainer.train(samples, iterations).unwrap();
    (trainer.teardown(), cost)
}

fn assert_predicts(net: &mut Net, gate: Gate) {
    let mut outputs = [0.0];
    for &inputs in INPUTS.iter() {
        net.process(&inputs, &mut outputs).unwrap();
        assert_eq!(
            outputs[0].round(),
            gate.expected(inputs),
            "{} {} {} predicted as {}",
            inputs[0],
            gate,
            inputs[1],
            outputs[0]
        );
    }
}

#[test]
fn and_gate_converges() {
    let net = Net::new(&[2, 1], &mut StdRng::seed_from_u64(2024)).unwrap();
    let samples = Gate::And.samples();

    let (mut net, cost) = train(net, &samples, 5000);

    assert!(cost < 0.05, "final cost {}", cost);
    assert_predicts(&mut net, Gate::And);
}

#[test]
fn separable_gates_converge() {
    let mut rng = StdRng::seed_from_u64(17);
    for &gate in &[Gate::Or, Gate::Nand, Gate::Nor] {
        let net = Net::new(&[2, 1], &mut rng).unwrap();
        let (mut net, cost) = train(net, &gate.samples(), 3000);

        assert!(cost < 0.05, "{} final cost {}", gate, cost);
        assert_predicts(&mut net, gate);
    }
}

#[test]
fn layered_net_fits_xor() {
    let net = Net::with_coefficients(&[2, 4, 1], &XOR_COEFFICIENTS).unwrap();
    let (mut net, cost) = train(net, &Gate::Xor.samples(), 6000);

    assert!(cost < 0.05, "final cost {}", cost);
    assert_predicts(&mut net, Gate::Xor);
}

#[test]
fn single_layer_cannot_fit_xor() {
    // Two independent units over the inputs, both asked for XOR
    let mut samples = SampleSet::new(2, 2);
    for &inputs in INPUTS.iter() {
        let expected = Gate::Xor.expected(inputs);
        samples.push(&inputs, &[expected, expected]).unwrap();
    }

    let net = Net::new(&[2], &mut StdRng::seed_from_u64(5)).unwrap();
    let (_, single_cost) = train(net, &samples, 3000);

    let net = Net::with_coefficients(&[2, 4, 1], &XOR_COEFFICIENTS).unwrap();
    let (_, layered_cost) = train(net, &Gate::Xor.samples(), 3000);

    assert!(single_cost > 0.2, "single layer cost {}", single_cost);
    assert!(layered_cost < single_cost);
}

#[test]
fn cost_stays_in_unit_interval_while_training() {
    let mut rng = StdRng::seed_from_u64(99);
    let samples = Gate::Xnor.samples();
    let mut trainer = Net::new(&[2, 3, 1], &mut rng)
        .unwrap()
        .build_trainer(CONFIG)
        .unwrap();

    for _ in 0..200 {
        let cost = trainer.step(&samples).unwrap();
        assert!((0.0..=1.0).contains(&cost), "cost {}", cost);
    }
}
