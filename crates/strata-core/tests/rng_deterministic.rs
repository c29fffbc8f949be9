use strata_core::rng::{derive_substream_seed, RngHandle};
use strata_core::DrawSource;

#[test]
fn seeded_handles_draw_identical_decisions() {
    let mut rng_a = RngHandle::from_seed(1234);
    let mut rng_b = RngHandle::from_seed(1234);

    let draws = |rng: &mut RngHandle| -> Vec<(bool, usize)> {
        (0..100).map(|step| (rng.bernoulli(0.4), rng.pick(step + 1))).collect()
    };

    assert_eq!(draws(&mut rng_a), draws(&mut rng_b));
}

#[test]
fn substreams_differ_per_index() {
    let seeds: Vec<u64> = (0..8).map(|index| derive_substream_seed(42, index)).collect();
    let mut unique = seeds.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), seeds.len());
    assert_eq!(derive_substream_seed(42, 3), seeds[3]);
}

#[test]
fn draws_respect_degenerate_probabilities() {
    let mut rng = RngHandle::from_seed(9);
    for _ in 0..64 {
        assert!(!rng.bernoulli(0.0));
        assert!(rng.bernoulli(1.0));
        assert!(rng.bernoulli(2.5));
        assert!(!rng.bernoulli(-1.0));
        assert!(rng.pick(5) < 5);
    }
    assert_eq!(rng.pick(0), 0);
}
