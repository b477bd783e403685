use std::collections::HashMap;

pub struct RegressionMetrics;

impl RegressionMetrics {
    pub fn calculate(predicted: &[f64], actual: &[f64]) -> HashMap<String, f64> {
        let mut metrics = HashMap::new();

        metrics.insert("r2".to_string(), Self::r_squared(predicted, actual));
        metrics.insert("rmse".to_string(), Self::rmse(predicted, actual));
        metrics.insert("mae".to_string(), Self::mae(predicted, actual));

        metrics
    }

    /// Coefficient of determination, clamped to [0, 1].
    ///
    /// A constant response has no variance to explain: an exact fit scores 1, anything else 0.
    pub fn r_squared(predicted: &[f64], actual: &[f64]) -> f64 {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return 0.0;
        }

        let mean = actual[..n].iter().sum::<f64>() / n as f64;
        let ss_tot: f64 = actual[..n].iter().map(|y| (y - mean).powi(2)).sum();
        let ss_res: f64 = predicted[..n]
            .iter()
            .zip(&actual[..n])
            .map(|(p, y)| (y - p).powi(2))
            .sum();

        if !ss_res.is_finite() {
            return 0.0;
        }

        if ss_tot <= f64::EPSILON * (1.0 + mean * mean) * n as f64 {
            return if ss_res <= f64::EPSILON * (1.0 + mean * mean) * n as f64 {
                1.0
            } else {
                0.0
            };
        }

        let r2 = 1.0 - ss_res / ss_tot;
        if r2.is_finite() {
            r2.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn rmse(predicted: &[f64], actual: &[f64]) -> f64 {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return 0.0;
        }
        let mse: f64 = predicted
            .iter()
            .zip(actual)
            .map(|(p, y)| (y - p).powi(2))
            .sum::<f64>()
            / n as f64;
        mse.sqrt()
    }

    pub fn mae(predicted: &[f64], actual: &[f64]) -> f64 {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return 0.0;
        }
        predicted
            .iter()
            .zip(actual)
            .map(|(p, y)| (y - p).abs())
            .sum::<f64>()
            / n as f64
    }
}
