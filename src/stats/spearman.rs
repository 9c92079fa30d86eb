use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Midrank tie assignment: tied values share the average of the ranks
/// they occupy (1-based).
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut out = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j < order.len() && values[order[j]] == values[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j - 1) as f64 / 2.0 + 1.0;
        for &idx in &order[i..j] {
            out[idx] = avg_rank;
        }
        i = j;
    }
    out
}

/// Pearson correlation; `None` on empty input or zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n == 0 || n != y.len() {
        return None;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;
    let mut num = 0.0;
    let mut den_x = 0.0;
    let mut den_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        num += (xi - mean_x) * (yi - mean_y);
        den_x += (xi - mean_x).powi(2);
        den_y += (yi - mean_y).powi(2);
    }
    let den = den_x.sqrt() * den_y.sqrt();
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

/// Spearman's rho: Pearson correlation of midranks.
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.is_empty() {
        return None;
    }
    pearson(&ranks(x), &ranks(y))
}

/// Percentile bootstrap 95% interval for Spearman's rho.
///
/// Resamples term pairs with replacement `draws` times under a seeded RNG;
/// no significance test, just the 2.5/97.5 percentiles.
pub fn bootstrap_spearman(x: &[f64], y: &[f64], draws: usize, seed: u64) -> Option<(f64, f64)> {
    let n = x.len();
    if n == 0 || n != y.len() {
        return None;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rhos = Vec::with_capacity(draws);
    let mut bx = vec![0.0; n];
    let mut by = vec![0.0; n];
    for _ in 0..draws {
        for slot in 0..n {
            let idx = rng.gen_range(0..n);
            bx[slot] = x[idx];
            by[slot] = y[idx];
        }
        if let Some(rho) = spearman(&bx, &by) {
            rhos.push(rho);
        }
    }
    if rhos.is_empty() {
        return None;
    }
    rhos.sort_by(f64::total_cmp);
    let lo = rhos[(rhos.len() as f64 * 0.025) as usize];
    let hi = rhos[((rhos.len() as f64 * 0.975) as usize).min(rhos.len() - 1)];
    Some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_with_ties() {
        let r = ranks(&[10.0, 20.0, 20.0, 30.0]);
        assert_eq!(r, vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn test_spearman_self_is_one() {
        let x = vec![3.0, 1.0, 4.0, 1.5, 5.0, 9.0];
        let rho = spearman(&x, &x).unwrap();
        assert!((rho - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spearman_reverse_is_minus_one() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![5.0, 4.0, 3.0, 2.0, 1.0];
        let rho = spearman(&x, &y).unwrap();
        assert!((rho + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spearman_degenerate() {
        assert!(spearman(&[], &[]).is_none());
        // zero variance
        assert!(spearman(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_bootstrap_deterministic_and_ordered() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let y = vec![2.0, 1.0, 4.0, 3.0, 6.0, 5.0, 8.0, 7.0];
        let a = bootstrap_spearman(&x, &y, 500, 42).unwrap();
        let b = bootstrap_spearman(&x, &y, 500, 42).unwrap();
        assert_eq!(a, b);
        assert!(a.0 <= a.1);
    }

    #[test]
    fn test_bootstrap_interval_brackets_perfect_correlation() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let (lo, hi) = bootstrap_spearman(&x, &x, 200, 7).unwrap();
        assert!((lo - 1.0).abs() < 1e-12);
        assert!((hi - 1.0).abs() < 1e-12);
    }
}
