//! Contingency tables and association tests.
//!
//! Chi-square test of independence with Yates continuity correction on
//! single-degree-of-freedom tables, and Fisher's exact test (two-sided,
//! hypergeometric enumeration) for small 2x2 tables.

use statrs::distribution::{ChiSquared, ContinuousCDF, Discrete, Hypergeometric};

/// Relative tolerance when comparing table probabilities in the two-sided
/// Fisher enumeration, guarding against floating-point ties.
const FISHER_REL_TOLERANCE: f64 = 1e-7;

/// Cross-tabulated counts of panel group (rows) by response category
/// (columns).
#[derive(Debug, Clone)]
pub struct ContingencyTable {
    /// Row labels (panel groups), sorted
    pub row_labels: Vec<String>,
    /// Column labels (response categories), sorted
    pub col_labels: Vec<String>,
    /// Observed counts, `counts[row][col]`
    pub counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Cross-tabulate paired observations. Pairs with a missing side are
    /// skipped. Returns `None` when no complete pair exists.
    pub fn from_pairs(pairs: &[(Option<String>, Option<String>)]) -> Option<Self> {
        let mut row_labels: Vec<String> = Vec::new();
        let mut col_labels: Vec<String> = Vec::new();
        for (row, col) in pairs {
            let (Some(row), Some(col)) = (row, col) else {
                continue;
            };
            if !row_labels.contains(row) {
                row_labels.push(row.clone());
            }
            if !col_labels.contains(col) {
                col_labels.push(col.clone());
            }
        }
        if row_labels.is_empty() || col_labels.is_empty() {
            return None;
        }
        row_labels.sort();
        col_labels.sort();

        let mut counts = vec![vec![0u64; col_labels.len()]; row_labels.len()];
        for (row, col) in pairs {
            let (Some(row), Some(col)) = (row, col) else {
                continue;
            };
            let i = row_labels.iter().position(|l| l == row)?;
            let j = col_labels.iter().position(|l| l == col)?;
            counts[i][j] += 1;
        }

        Some(Self {
            row_labels,
            col_labels,
            counts,
        })
    }

    /// Whether the table is exactly 2x2.
    pub fn is_two_by_two(&self) -> bool {
        self.counts.len() == 2 && self.counts[0].len() == 2
    }

    /// Grand total of all cells.
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    fn col_totals(&self) -> Vec<u64> {
        let cols = self.counts[0].len();
        (0..cols)
            .map(|j| self.counts.iter().map(|row| row[j]).sum())
            .collect()
    }
}

/// Result of a chi-square test of independence.
#[derive(Debug, Clone)]
pub struct ChiSquareTest {
    /// Test statistic (continuity-corrected when dof == 1)
    pub statistic: f64,
    /// Upper-tail p-value
    pub p_value: f64,
    /// Degrees of freedom
    pub dof: usize,
    /// Smallest expected cell count under the null
    pub min_expected: f64,
}

/// Chi-square test of independence.
///
/// Returns `None` for degenerate tables (fewer than two rows or columns)
/// where no association is testable. Applies the Yates continuity
/// correction when the table has one degree of freedom.
pub fn chi_square(table: &ContingencyTable) -> Option<ChiSquareTest> {
    let rows = table.counts.len();
    let cols = table.counts[0].len();
    if rows < 2 || cols < 2 {
        return None;
    }

    let total = table.total() as f64;
    if total == 0.0 {
        return None;
    }
    let row_totals = table.row_totals();
    let col_totals = table.col_totals();
    let dof = (rows - 1) * (cols - 1);

    let mut statistic = 0.0;
    let mut min_expected = f64::INFINITY;
    for i in 0..rows {
        for j in 0..cols {
            let expected = row_totals[i] as f64 * col_totals[j] as f64 / total;
            min_expected = min_expected.min(expected);
            let observed = table.counts[i][j] as f64;
            let deviation = if dof == 1 {
                ((observed - expected).abs() - 0.5).max(0.0)
            } else {
                (observed - expected).abs()
            };
            statistic += deviation * deviation / expected;
        }
    }

    let dist = ChiSquared::new(dof as f64).ok()?;
    let p_value = 1.0 - dist.cdf(statistic);

    Some(ChiSquareTest {
        statistic,
        p_value,
        dof,
        min_expected,
    })
}

/// Two-sided Fisher exact test for a 2x2 table.
///
/// Sums hypergeometric probabilities of all tables with the observed
/// margins whose probability does not exceed the observed table's.
/// Returns `None` for non-2x2 tables.
pub fn fisher_exact(table: &ContingencyTable) -> Option<f64> {
    if !table.is_two_by_two() {
        return None;
    }

    let a = table.counts[0][0];
    let b = table.counts[0][1];
    let c = table.counts[1][0];
    let d = table.counts[1][1];

    let population = a + b + c + d;
    let successes = a + b; // first row total
    let draws = a + c; // first column total
    if population == 0 {
        return None;
    }

    let dist = Hypergeometric::new(population, successes, draws).ok()?;
    let p_observed = dist.pmf(a);

    let k_min = draws.saturating_sub(population - successes);
    let k_max = draws.min(successes);

    let cutoff = p_observed * (1.0 + FISHER_REL_TOLERANCE);
    let mut p_value = 0.0;
    for k in k_min..=k_max {
        let p = dist.pmf(k);
        if p <= cutoff {
            p_value += p;
        }
    }

    Some(p_value.min(1.0))
}
