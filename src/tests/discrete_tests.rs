use rand::{rngs::StdRng, SeedableRng};
use rand_distr::Distribution;

use crate::core::Discrete;

#[test]
fn discrete_summaries() {
    let d = Discrete::from_weights(&[0., 2., 6., 2.]).unwrap();
    assert_eq!(d.dimension(), 4);
    assert_eq!(d.probabilities(), &[0., 0.2, 0.6, 0.2]);
    assert_eq!(d.probability(2), 0.6);
    assert_eq!(d.probability(10), 0.);
    assert_eq!(d.mode(), 2);
    assert!((d.mean() - 2.).abs() < 1e-12);

    let tie = Discrete::from_weights(&[1., 3., 3.]).unwrap();
    assert_eq!(tie.mode(), 1);

    assert!(Discrete::from_weights(&[]).is_none());
    assert!(Discrete::from_weights(&[1., -1.]).is_none());
    assert!(Discrete::from_weights(&[1., f64::INFINITY]).is_none());
    assert!(Discrete::uniform(0).is_none());
    assert_eq!(Discrete::uniform(4).unwrap().probabilities(), &[0.25; 4]);
}

#[test]
fn discrete_display() {
    let d = Discrete::from_weights(&[
        0.,
        0.4583578864,
        0.2296265583,
        0.1205567636,
        0.0705365375,
        0.0457895568,
        0.0322131319,
        0.0240761657,
        0.0188433999,
    ])
    .unwrap();
    assert_eq!(
        d.to_string(),
        "Discrete(0 0.4584 0.2296 0.1206 0.07054 0.04579 0.03221 0.02408 0.01884)"
    );
    let uniform = Discrete::uniform(8).unwrap();
    assert_eq!(
        uniform.to_string(),
        "Discrete(0.125 0.125 0.125 0.125 0.125 0.125 0.125 0.125)"
    );
    assert_eq!(Discrete::uniform(1).unwrap().to_string(), "Discrete(1)");
}

#[test]
fn discrete_sampling() {
    let mut rng = StdRng::seed_from_u64(7);
    let point = Discrete::from_weights(&[0., 0., 1., 0.]).unwrap();
    assert!((0..100).all(|_| point.sample(&mut rng) == 2));

    let d = Discrete::from_weights(&[1., 3.]).unwrap();
    let samples_number = 20000;
    let ones = (0..samples_number).filter(|_| d.sample(&mut rng) == 1).count();
    let frequency = ones as f64 / samples_number as f64;
    assert!((frequency - 0.75).abs() < 0.02, "Frequency: {frequency}");
}
