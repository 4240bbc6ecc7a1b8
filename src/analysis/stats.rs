//! Numeric helpers over column slices: describe-style summaries with
//! sample standard deviation and linearly interpolated quantiles, and
//! pairwise-complete Pearson correlation.

use serde::Serialize;

/// Summary statistics of one numeric column, nulls excluded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescribeStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; undefined below two observations.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

pub fn describe(values: &[f64]) -> Option<DescribeStats> {
    if values.is_empty() {
        return None;
    }
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let squared: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        Some((squared / (count - 1) as f64).sqrt())
    } else {
        None
    };

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(DescribeStats {
        count,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// `sorted` must be ascending and non-empty. Interpolates linearly between
/// the two closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let low = position.floor() as usize;
    let high = position.ceil() as usize;
    let fraction = position - low as f64;
    sorted[low] + (sorted[high] - sorted[low]) * fraction
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Mean over the present values only; `None` when the slice holds no value.
pub fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    mean(&present)
}

/// Pearson correlation over the rows where both sides are present. `None`
/// when fewer than two complete pairs exist or either side has no variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;
    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    let denominator = (variance_x * variance_y).sqrt();
    if denominator == 0.0 {
        return None;
    }
    Some(covariance / denominator)
}

/// Full symmetric correlation matrix in column order. The diagonal comes
/// out of the same formula, so a constant column is undefined even against
/// itself.
pub fn correlation_matrix(columns: &[Vec<Option<f64>>]) -> Vec<Vec<Option<f64>>> {
    let n = columns.len();
    let mut matrix = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&columns[i], &columns[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}
