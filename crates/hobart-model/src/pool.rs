//! Example pools.

use crate::error::{ModelError, Result};
use chrono::NaiveDate;
use ndarray::{Array1, Array2, ArrayView1};

/// One block of examples ready for a model.
///
/// Rows are keyed by `(date, security)`. Every row has a positive finite
/// scale, and its weight is `1 / scale²`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    index: Vec<(NaiveDate, String)>,
    data: Array2<f64>,
    label: Option<Array1<f64>>,
    test_label: Option<Array1<f64>>,
    weight: Array1<f64>,
    scale: Array1<f64>,
    cat_features: Vec<usize>,
    feature_names: Vec<String>,
}

impl Pool {
    /// Build an unlabeled pool.
    ///
    /// Fails when the lengths disagree, a categorical position is outside the
    /// feature block or a scale is zero, negative or not finite.
    pub fn new(
        index: Vec<(NaiveDate, String)>,
        data: Array2<f64>,
        scale: Array1<f64>,
        feature_names: Vec<String>,
        cat_features: Vec<usize>,
    ) -> Result<Self> {
        let rows = index.len();
        check_len("data rows", rows, data.nrows())?;
        check_len("scale", rows, scale.len())?;
        check_len("feature names", data.ncols(), feature_names.len())?;

        if let Some(&pos) = cat_features.iter().find(|&&pos| pos >= data.ncols()) {
            return Err(ModelError::InvalidParameter(format!(
                "categorical position {pos} outside {} features",
                data.ncols()
            )));
        }
        if let Some(pos) = scale.iter().position(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "scale of row {pos} must be positive, got {}",
                scale[pos]
            )));
        }

        let weight = scale.mapv(|s| 1.0 / (s * s));
        Ok(Self {
            index,
            data,
            label: None,
            test_label: None,
            weight,
            scale,
            cat_features,
            feature_names,
        })
    }

    /// Attach the regression target.
    pub fn with_label(mut self, label: Array1<f64>) -> Result<Self> {
        check_len("label", self.len(), label.len())?;
        self.label = Some(label);
        Ok(self)
    }

    /// Attach the one-day realized target used for diagnostics.
    pub fn with_test_label(mut self, test_label: Array1<f64>) -> Result<Self> {
        check_len("test label", self.len(), test_label.len())?;
        self.test_label = Some(test_label);
        Ok(self)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the pool has no rows.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of feature columns.
    pub fn num_features(&self) -> usize {
        self.data.ncols()
    }

    /// `(date, security)` of every row.
    pub fn index(&self) -> &[(NaiveDate, String)] {
        &self.index
    }

    /// Date of every row.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.index.iter().map(|(date, _)| *date)
    }

    /// Feature matrix, one row per example.
    pub const fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Regression target, if any.
    pub fn label(&self) -> Option<ArrayView1<'_, f64>> {
        self.label.as_ref().map(Array1::view)
    }

    /// One-day realized target, if any.
    pub fn test_label(&self) -> Option<ArrayView1<'_, f64>> {
        self.test_label.as_ref().map(Array1::view)
    }

    /// Row weights, `1 / scale²`.
    pub fn weight(&self) -> ArrayView1<'_, f64> {
        self.weight.view()
    }

    /// Row scales.
    pub fn scale(&self) -> ArrayView1<'_, f64> {
        self.scale.view()
    }

    /// Positions of categorical columns within the feature block.
    pub fn cat_features(&self) -> &[usize] {
        &self.cat_features
    }

    /// Whether feature column `pos` is categorical.
    pub fn is_categorical(&self, pos: usize) -> bool {
        self.cat_features.contains(&pos)
    }

    /// Feature column names.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(ModelError::DimensionMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn index(n: usize) -> Vec<(NaiveDate, String)> {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        (0..n).map(|i| (day, format!("S{i}"))).collect()
    }

    fn names() -> Vec<String> {
        vec!["Mom1m".to_string(), "Ticker".to_string()]
    }

    #[test]
    fn test_weight_is_inverse_variance() {
        let pool = Pool::new(
            index(2),
            array![[0.1, 0.0], [0.2, 1.0]],
            array![0.5, 0.02],
            names(),
            vec![1],
        )
        .unwrap();

        assert_relative_eq!(pool.weight()[0], 4.0);
        assert_relative_eq!(pool.weight()[1], 2500.0, max_relative = 1e-12);
        assert!(pool.is_categorical(1));
        assert!(!pool.is_categorical(0));
        assert!(pool.label().is_none());
    }

    #[test]
    fn test_rejects_zero_scale() {
        let err = Pool::new(
            index(2),
            array![[0.1, 0.0], [0.2, 1.0]],
            array![0.5, 0.0],
            names(),
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter(_)));
    }

    #[test]
    fn test_rejects_misaligned_label() {
        let pool = Pool::new(
            index(2),
            array![[0.1, 0.0], [0.2, 1.0]],
            array![0.5, 0.5],
            names(),
            vec![],
        )
        .unwrap();
        let err = pool.with_label(array![1.0]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::DimensionMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_categorical_outside_block() {
        let err = Pool::new(
            index(1),
            array![[0.1, 0.0]],
            array![0.5],
            names(),
            vec![2],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter(_)));
    }
}
