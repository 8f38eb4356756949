//! Benjamini-Hochberg false-discovery-rate correction.

/// Adjust a batch of p-values with the Benjamini-Hochberg step-up
/// procedure. Returns the adjusted values in the input order, each clamped
/// to at most 1.0. Adjusted values are always >= the raw values.
pub fn benjamini_hochberg(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len();
    if m == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| {
        p_values[a]
            .partial_cmp(&p_values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Step up from the largest p-value, enforcing monotonicity.
    let mut adjusted = vec![0.0; m];
    let mut running_min = 1.0f64;
    for rank in (0..m).rev() {
        let idx = order[rank];
        let scaled = p_values[idx] * m as f64 / (rank + 1) as f64;
        running_min = running_min.min(scaled);
        adjusted[idx] = running_min.min(1.0);
    }

    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch() {
        assert!(benjamini_hochberg(&[]).is_empty());
    }

    #[test]
    fn test_single_p_value_unchanged() {
        let adjusted = benjamini_hochberg(&[0.03]);
        assert!((adjusted[0] - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_known_adjustment() {
        // Classic worked example: sorted scaling gives
        // 0.01*4/1, 0.02*4/2, 0.03*4/3, 0.04*4/4 = 0.04 everywhere.
        let adjusted = benjamini_hochberg(&[0.01, 0.02, 0.03, 0.04]);
        for value in &adjusted {
            assert!((value - 0.04).abs() < 1e-12);
        }
    }

    #[test]
    fn test_mixed_batch() {
        let raw = vec![0.001, 0.8, 0.01, 0.04];
        let adjusted = benjamini_hochberg(&raw);
        // 0.001*4/1 = 0.004; 0.01*4/2 = 0.02; 0.04*4/3 ~= 0.0533; 0.8.
        assert!((adjusted[0] - 0.004).abs() < 1e-12);
        assert!((adjusted[2] - 0.02).abs() < 1e-12);
        assert!((adjusted[3] - 0.04 * 4.0 / 3.0).abs() < 1e-12);
        assert!((adjusted[1] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_adjusted_never_below_raw() {
        let raw = vec![0.04, 0.001, 0.3, 0.007, 0.051, 0.99];
        let adjusted = benjamini_hochberg(&raw);
        for (a, r) in adjusted.iter().zip(raw.iter()) {
            assert!(a >= r, "adjusted {} fell below raw {}", a, r);
        }
    }

    #[test]
    fn test_clamped_to_one() {
        let adjusted = benjamini_hochberg(&[0.9, 0.95, 0.99]);
        for value in &adjusted {
            assert!(*value <= 1.0);
        }
    }
}
