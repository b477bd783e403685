//! Ordinary least squares for the linking step.
//!
//! Gene counts are small, so the centred normal equations are solved directly by
//! Gaussian elimination. Columns that are constant, or that are linear
//! combinations of earlier columns, get a zero coefficient instead of making the
//! system singular.

/// Pivots smaller than this fraction of their original diagonal are treated as zero.
const RELATIVE_PIVOT_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearFit {
    /// Weighted sum of gene outputs plus intercept.
    pub fn link(&self, gene_outputs: &[f64]) -> f64 {
        link(gene_outputs, &self.coefficients, self.intercept)
    }
}

pub fn link(gene_outputs: &[f64], coefficients: &[f64], intercept: f64) -> f64 {
    intercept
        + gene_outputs
            .iter()
            .zip(coefficients)
            .map(|(x, b)| x * b)
            .sum::<f64>()
}

/// Fit `response ≈ intercept + Σ b_j * columns[j]`.
///
/// Every column must have the same length as `response`.
pub fn fit_least_squares(columns: &[Vec<f64>], response: &[f64]) -> LinearFit {
    let k = columns.len();
    let n = response.len();
    if n == 0 {
        return LinearFit {
            coefficients: vec![0.0; k],
            intercept: 0.0,
        };
    }

    let nf = n as f64;
    let y_mean = response.iter().sum::<f64>() / nf;
    let means: Vec<f64> = columns
        .iter()
        .map(|c| c.iter().sum::<f64>() / nf)
        .collect();

    // Centred normal equations: A b = r
    let mut a = vec![vec![0.0; k]; k];
    let mut r = vec![0.0; k];
    for i in 0..k {
        for j in i..k {
            let s: f64 = columns[i]
                .iter()
                .zip(&columns[j])
                .map(|(x, z)| (x - means[i]) * (z - means[j]))
                .sum();
            a[i][j] = s;
            a[j][i] = s;
        }
        r[i] = columns[i]
            .iter()
            .zip(response)
            .map(|(x, y)| (x - means[i]) * (y - y_mean))
            .sum();
    }

    let coefficients = solve_symmetric(a, r);
    let coefficients: Vec<f64> = coefficients
        .into_iter()
        .map(|b| if b.is_finite() { b } else { 0.0 })
        .collect();

    let intercept = y_mean
        - coefficients
            .iter()
            .zip(&means)
            .map(|(b, m)| b * m)
            .sum::<f64>();

    LinearFit {
        coefficients,
        intercept: if intercept.is_finite() { intercept } else { 0.0 },
    }
}

/// Gaussian elimination without row exchanges on a symmetric positive
/// semi-definite system. Degenerate pivots drop their variable (coefficient 0).
fn solve_symmetric(mut a: Vec<Vec<f64>>, mut r: Vec<f64>) -> Vec<f64> {
    let k = r.len();
    let diagonal: Vec<f64> = (0..k).map(|i| a[i][i]).collect();
    let mut active = vec![true; k];

    for p in 0..k {
        let pivot = a[p][p];
        if !(pivot > diagonal[p] * RELATIVE_PIVOT_TOLERANCE) || pivot <= f64::MIN_POSITIVE {
            active[p] = false;
            continue;
        }
        for i in (p + 1)..k {
            let factor = a[i][p] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in p..k {
                a[i][j] -= factor * a[p][j];
            }
            r[i] -= factor * r[p];
        }
    }

    let mut b = vec![0.0; k];
    for p in (0..k).rev() {
        if !active[p] {
            continue;
        }
        let s: f64 = ((p + 1)..k).map(|j| a[p][j] * b[j]).sum();
        b[p] = (r[p] - s) / a[p][p];
    }
    b
}
