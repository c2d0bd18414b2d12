use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Optional display-time shuffle: reorder `items` by `score(item) + u`,
/// `u ~ Uniform[-amplitude, amplitude]`, drawn from a generator seeded with
/// `seed`. Scores themselves are not modified. Same seed, same order.
pub fn diversify<T>(items: Vec<T>, score: impl Fn(&T) -> f64, amplitude: f64, seed: u64) -> Vec<T> {
    let amplitude = amplitude.abs();
    if amplitude == 0.0 || items.len() < 2 { return items; }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut keyed: Vec<(f64, usize, T)> = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| (score(&item) + rng.gen_range(-amplitude..=amplitude), i, item))
        .collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    keyed.into_iter().map(|(_, _, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_amplitude_keeps_order() {
        let items = vec![3.0, 1.0, 2.0];
        assert_eq!(diversify(items.clone(), |x| *x, 0.0, 7), items);
    }

    #[test]
    fn same_seed_same_order() {
        let items: Vec<f64> = (0..50).map(|i| f64::from(i) / 100.0).collect();
        let a = diversify(items.clone(), |x| *x, 0.05, 42);
        let b = diversify(items.clone(), |x| *x, 0.05, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), items.len());
    }

    #[test]
    fn large_gaps_survive_small_jitter() {
        let items = vec![0.9, 0.5, 0.1];
        assert_eq!(diversify(items.clone(), |x| *x, 0.05, 1), vec![0.9, 0.5, 0.1]);
    }
}
