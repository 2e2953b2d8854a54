//! Validation metrics.
//!
//! Correlations skip pairs where either side is not finite and return `NaN`
//! when fewer than two pairs remain or one side is constant.

use crate::error::{ModelError, Result};
use crate::pool::Pool;
use chrono::NaiveDate;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scores of a model on a validation pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationScores {
    /// Pearson correlation of predictions and the one-day realized return
    pub r: f64,
    /// Spearman rank correlation of the same pairs
    pub r_rang: f64,
    /// t-statistic of the per-date rank IC series
    pub t: f64,
}

impl ValidationScores {
    /// Score `predictions` against the test label of `pool`.
    pub fn compute(pool: &Pool, predictions: ArrayView1<'_, f64>) -> Result<Self> {
        let realized = pool.test_label().ok_or_else(|| {
            ModelError::InvalidParameter("validation pool has no test label".into())
        })?;
        if predictions.len() != pool.len() {
            return Err(ModelError::DimensionMismatch {
                what: "predictions",
                expected: pool.len(),
                actual: predictions.len(),
            });
        }

        let dates: Vec<NaiveDate> = pool.dates().collect();
        let predicted = predictions.to_vec();
        let realized = realized.to_vec();

        Ok(Self {
            r: pearson(&predicted, &realized),
            r_rang: spearman(&predicted, &realized),
            t: rank_ic_t_stat(&dates, &predicted, &realized),
        })
    }
}

fn finite_pairs(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .unzip()
}

/// Pearson correlation coefficient.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() {
        return f64::NAN;
    }
    let (x, y) = finite_pairs(x, y);
    correlation(&x, &y)
}

/// Spearman rank correlation, ties sharing their average rank.
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() {
        return f64::NAN;
    }
    let (x, y) = finite_pairs(x, y);
    correlation(&ranks(&x), &ranks(&y))
}

fn correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Zero-based ranks, ties sharing their average rank.
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }
        let average = (i + j - 1) as f64 / 2.0;
        for &pos in &order[i..j] {
            ranks[pos] = average;
        }
        i = j;
    }
    ranks
}

/// t-statistic of the per-date Spearman IC series: `mean / std * sqrt(n)`.
///
/// Dates whose IC is undefined are skipped. `NaN` with fewer than two
/// usable dates or a constant series.
pub fn rank_ic_t_stat(dates: &[NaiveDate], predicted: &[f64], realized: &[f64]) -> f64 {
    if dates.len() != predicted.len() || dates.len() != realized.len() {
        return f64::NAN;
    }

    let mut by_date: BTreeMap<NaiveDate, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for ((date, p), r) in dates.iter().zip(predicted).zip(realized) {
        let entry = by_date.entry(*date).or_default();
        entry.0.push(*p);
        entry.1.push(*r);
    }

    let ics: Vec<f64> = by_date
        .values()
        .map(|(p, r)| spearman(p, r))
        .filter(|ic| ic.is_finite())
        .collect();

    let n = ics.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = ics.iter().sum::<f64>() / n as f64;
    let variance = ics.iter().map(|ic| (ic - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = variance.sqrt();

    if std > 0.0 {
        mean / std * (n as f64).sqrt()
    } else {
        f64::NAN
    }
}
