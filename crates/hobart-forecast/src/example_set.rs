//! Example Set Builder
//!
//! Assembles leakage-free training, validation and prediction pools from the
//! configured feature providers.
//!
//! Providers are kept in a fixed order:
//!
//! ```text
//! [test label, label, scaler, feature providers...]
//! ```
//!
//! The test label is the production label with a one-day horizon. It is the
//! realized return the validation diagnostics are scored against, and its
//! column is renamed to `TestLabel` in the joined dataset.

use crate::config::ExampleSetConfig;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use hobart_data::QuoteSource;
use hobart_features::frame;
use hobart_features::{
    FeatureProvider, LabelConfig, LabelProvider, ParamSpace, ProviderConfig, ProviderContext,
    ProviderKind, ProviderSpec, build_provider,
};
use hobart_model::Pool;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Test label column of the joined dataset.
pub const TEST_LABEL: &str = "TestLabel";
/// Label column of the joined dataset.
pub const LABEL: &str = "Label";
/// Scale column of the joined dataset.
pub const SCALE: &str = "Scaler";

const TEST_LABEL_POS: usize = 0;
const LABEL_POS: usize = 1;
const SCALE_POS: usize = 2;
const FEATURES_POS: usize = 3;

/// All providers outer-joined on `(date, security)`.
///
/// Rows are sorted by date, then by the position of the security in the
/// requested tuple. Missing values are `NaN`. Columns are
/// `[TestLabel, Label, Scaler, features...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleFrame {
    index: Vec<(NaiveDate, String)>,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl ExampleFrame {
    fn new(index: Vec<(NaiveDate, String)>, columns: Vec<String>, values: Array2<f64>) -> Self {
        assert!(columns.len() >= FEATURES_POS);
        assert_eq!(columns[TEST_LABEL_POS], TEST_LABEL);
        assert_eq!(columns[LABEL_POS], LABEL);
        assert_eq!(columns[SCALE_POS], SCALE);
        assert_eq!(values.dim(), (index.len(), columns.len()));
        Self {
            index,
            columns,
            values,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// `(date, security)` of every row.
    pub fn index(&self) -> &[(NaiveDate, String)] {
        &self.index
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All values, one row per `(date, security)`.
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// One-day realized return.
    pub fn test_label_column(&self) -> ArrayView1<'_, f64> {
        self.values.column(TEST_LABEL_POS)
    }

    /// Forward label.
    pub fn label_column(&self) -> ArrayView1<'_, f64> {
        self.values.column(LABEL_POS)
    }

    /// Normalization scale.
    pub fn scale_column(&self) -> ArrayView1<'_, f64> {
        self.values.column(SCALE_POS)
    }

    /// Feature block.
    pub fn feature_columns(&self) -> ArrayView2<'_, f64> {
        self.values.slice(s![.., FEATURES_POS..])
    }

    /// Names of the feature block.
    pub fn feature_names(&self) -> &[String] {
        &self.columns[FEATURES_POS..]
    }

    /// Whether row `row` has every value and a positive scale.
    pub fn is_complete(&self, row: usize) -> bool {
        self.values.row(row).iter().all(|v| v.is_finite()) && self.values[[row, SCALE_POS]] > 0.0
    }

    /// Whether row `row` can be predicted: features present, positive scale.
    fn is_predictable(&self, row: usize) -> bool {
        let scale = self.values[[row, SCALE_POS]];
        scale.is_finite()
            && scale > 0.0
            && self
                .values
                .slice(s![row, FEATURES_POS..])
                .iter()
                .all(|v| v.is_finite())
    }

    /// Distinct dates of complete rows, ascending.
    pub fn complete_dates(&self) -> Vec<NaiveDate> {
        let dates: BTreeSet<NaiveDate> = (0..self.len())
            .filter(|&row| self.is_complete(row))
            .map(|row| self.index[row].0)
            .collect();
        dates.into_iter().collect()
    }
}

/// Leakage-safe example construction for one security tuple and as-of date.
#[derive(Debug)]
pub struct ExampleSet {
    ctx: Arc<ProviderContext>,
    specs: Vec<ProviderSpec>,
    test_label_spec: ProviderSpec,
    test_label: LabelProvider,
    label: LabelProvider,
    /// Scaler followed by the predictive providers
    providers: Vec<Box<dyn FeatureProvider>>,
    config: ExampleSetConfig,
    dataset: OnceLock<Arc<ExampleFrame>>,
}

impl ExampleSet {
    /// Resolve the providers for `specs`.
    ///
    /// `specs` must start with a Label spec followed by a Scaler spec. Every
    /// other spec is a predictive provider; each kind may appear once.
    pub fn new(
        securities: &[String],
        date: NaiveDate,
        specs: &[ProviderSpec],
        source: Arc<dyn QuoteSource>,
        config: ExampleSetConfig,
    ) -> Result<Self> {
        check_securities(securities)?;
        check_layout(specs)?;

        let label_config = *LabelConfig::expect_from(&specs[0])?;
        let test_label_config = label_config.with_days(1);

        let ctx = Arc::new(ProviderContext::new(securities.to_vec(), date, source));
        let test_label = LabelProvider::new(ctx.clone(), test_label_config)?;
        let label = LabelProvider::new(ctx.clone(), label_config)?;
        let providers = specs[1..]
            .iter()
            .map(|spec| build_provider(spec, ctx.clone()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(
            securities = securities.len(),
            %date,
            providers = providers.len() + 2,
            "built example set"
        );

        Ok(Self {
            ctx,
            specs: specs.to_vec(),
            test_label_spec: test_label_config.into(),
            test_label,
            label,
            providers,
            config,
            dataset: OnceLock::new(),
        })
    }

    /// Requested securities, in order.
    pub fn securities(&self) -> &[String] {
        self.ctx.securities()
    }

    /// As-of date.
    pub fn date(&self) -> NaiveDate {
        self.ctx.date()
    }

    /// Stored provider specs, label first.
    pub fn specs(&self) -> &[ProviderSpec] {
        &self.specs
    }

    /// Production label provider.
    pub const fn label(&self) -> &LabelProvider {
        &self.label
    }

    /// Forward horizon of the production label.
    pub const fn label_days(&self) -> usize {
        self.label.config().days
    }

    fn predictive(&self) -> &[Box<dyn FeatureProvider>] {
        &self.providers[1..]
    }

    /// Every provider in dataset order, with the spec it is evaluated under.
    fn ordered<'a>(
        &'a self,
        specs: &'a [ProviderSpec],
    ) -> impl Iterator<Item = (&'a dyn FeatureProvider, &'a ProviderSpec)> {
        let label: [&dyn FeatureProvider; 2] = [&self.test_label, &self.label];
        label
            .into_iter()
            .chain(self.providers.iter().map(|provider| &**provider))
            .zip(std::iter::once(&self.test_label_spec).chain(specs))
    }

    fn check_specs(&self, specs: &[ProviderSpec]) -> Result<()> {
        if specs.len() != self.specs.len() {
            return Err(ForecastError::Configuration(format!(
                "expected {} provider specs, got {}",
                self.specs.len(),
                specs.len()
            )));
        }
        for (stored, spec) in self.specs.iter().zip(specs) {
            if stored.kind() != spec.kind() {
                return Err(ForecastError::Configuration(format!(
                    "spec {spec} does not match provider {}",
                    stored.kind()
                )));
            }
        }
        Ok(())
    }

    /// Column names of the predictive providers.
    pub fn feature_names(&self) -> Vec<String> {
        self.predictive()
            .iter()
            .flat_map(|provider| provider.col_names())
            .collect()
    }

    /// Positions of categorical columns within the feature block.
    pub fn categorical_feature_positions(
        &self,
        specs: Option<&[ProviderSpec]>,
    ) -> Result<Vec<usize>> {
        let specs = specs.unwrap_or(&self.specs);
        self.check_specs(specs)?;

        let mut positions = Vec::new();
        let mut offset = 0;
        for (provider, spec) in self.predictive().iter().zip(&specs[2..]) {
            let flags = provider.is_categorical(spec)?;
            positions.extend(
                flags
                    .iter()
                    .enumerate()
                    .filter(|(_, categorical)| **categorical)
                    .map(|(i, _)| offset + i),
            );
            offset += flags.len();
        }
        Ok(positions)
    }

    /// Search space of the label, scaler and every predictive provider.
    pub fn params_space(&self) -> Vec<(String, ParamSpace)> {
        let label: &dyn FeatureProvider = &self.label;
        std::iter::once(label)
            .chain(self.providers.iter().map(|provider| &**provider))
            .map(|provider| (provider.name().to_string(), provider.params_space()))
            .collect()
    }

    /// Every provider under `specs`, outer-joined on `(date, security)`.
    ///
    /// The test label always uses its one-day configuration. The frame for
    /// the stored specs is computed once and shared.
    pub fn full_dataset(&self, specs: &[ProviderSpec]) -> Result<Arc<ExampleFrame>> {
        self.check_specs(specs)?;
        if specs == self.specs.as_slice() {
            if let Some(dataset) = self.dataset.get() {
                return Ok(dataset.clone());
            }
            let dataset = Arc::new(self.join(specs)?);
            return Ok(self.dataset.get_or_init(|| dataset).clone());
        }
        Ok(Arc::new(self.join(specs)?))
    }

    fn join(&self, specs: &[ProviderSpec]) -> Result<ExampleFrame> {
        let mut columns: Vec<String> = Vec::new();
        let mut blocks = Vec::new();

        for (provider, spec) in self.ordered(specs) {
            let df = provider.get(spec)?;
            let names = provider.columns_for(spec)?;
            let keys: Vec<Option<(NaiveDate, usize)>> = frame::dates(&df)?
                .into_iter()
                .zip(frame::symbols(&df)?)
                .map(|(date, symbol)| self.ctx.position(&symbol).map(|pos| (date, pos)))
                .collect();
            let values = names
                .iter()
                .map(|name| frame::floats(&df, name))
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let offset = columns.len();
            columns.extend(names);
            blocks.push((offset, keys, values));
        }

        columns[TEST_LABEL_POS] = TEST_LABEL.to_string();
        let mut seen = HashSet::new();
        if let Some(duplicate) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(ForecastError::Configuration(format!(
                "duplicate column {duplicate}"
            )));
        }

        let width = columns.len();
        let mut rows: BTreeMap<(NaiveDate, usize), Vec<f64>> = BTreeMap::new();
        for (offset, keys, values) in blocks {
            for (row, key) in keys.into_iter().enumerate() {
                let Some(key) = key else { continue };
                let target = rows.entry(key).or_insert_with(|| vec![f64::NAN; width]);
                for (j, column) in values.iter().enumerate() {
                    target[offset + j] = column[row];
                }
            }
        }

        let securities = self.ctx.securities();
        let index: Vec<(NaiveDate, String)> = rows
            .keys()
            .map(|(date, pos)| (*date, securities[*pos].clone()))
            .collect();
        let flat: Vec<f64> = rows.into_values().flatten().collect();
        let values = Array2::from_shape_vec((index.len(), width), flat)
            .map_err(|e| ForecastError::Consistency(e.to_string()))?;

        debug!(rows = index.len(), columns = width, "joined dataset");
        Ok(ExampleFrame::new(index, columns, values))
    }

    /// Training and validation pools under `specs` (default: stored specs).
    ///
    /// Only complete rows are used. With `n` distinct dates the validation
    /// block starts at date `floor(n * train_val_split)`. Training rows end
    /// `label_days` distinct dates before that, so no training label overlaps
    /// the validation period.
    pub fn train_validation_pools(&self, specs: Option<&[ProviderSpec]>) -> Result<(Pool, Pool)> {
        let specs = specs.unwrap_or(&self.specs);
        let data = self.full_dataset(specs)?;
        let label_days = LabelConfig::expect_from(&specs[0])?.days;
        let cat_features = self.categorical_feature_positions(Some(specs))?;

        let dates = data.complete_dates();
        let split = (dates.len() as f64 * self.config.train_val_split).floor() as usize;
        let Some(&validation_start) = dates.get(split) else {
            return Err(ForecastError::insufficient(
                "validation",
                self.config.min_validation_rows,
                0,
            ));
        };
        let train_end = split.checked_sub(label_days).map(|end| dates[end]);

        let complete = (0..data.len()).filter(|&row| data.is_complete(row));
        let (validation, train): (Vec<usize>, Vec<usize>) = complete
            .filter(|&row| {
                let date = data.index[row].0;
                date >= validation_start || train_end.is_some_and(|end| date < end)
            })
            .partition(|&row| data.index[row].0 >= validation_start);

        if train.len() < self.config.min_train_rows {
            return Err(ForecastError::insufficient(
                "training",
                self.config.min_train_rows,
                train.len(),
            ));
        }
        if validation.len() < self.config.min_validation_rows {
            return Err(ForecastError::insufficient(
                "validation",
                self.config.min_validation_rows,
                validation.len(),
            ));
        }

        debug!(
            train = train.len(),
            validation = validation.len(),
            %validation_start,
            "split examples"
        );

        Ok((
            labeled_pool(&data, &train, &cat_features)?,
            labeled_pool(&data, &validation, &cat_features)?,
        ))
    }

    /// Training pool of every complete row before the as-of date and the
    /// prediction pool of the as-of date, one row per security in order.
    pub fn production_pools(&self) -> Result<(Pool, Pool)> {
        let data = self.full_dataset(&self.specs)?;
        let cat_features = self.categorical_feature_positions(None)?;
        let date = self.date();

        let train: Vec<usize> = (0..data.len())
            .filter(|&row| data.index[row].0 < date && data.is_complete(row))
            .collect();
        if train.len() < self.config.min_train_rows {
            return Err(ForecastError::insufficient(
                "training",
                self.config.min_train_rows,
                train.len(),
            ));
        }

        let mut predict = Vec::with_capacity(self.securities().len());
        for security in self.securities() {
            let row = data
                .index
                .iter()
                .position(|(d, s)| *d == date && s == security)
                .filter(|&row| data.is_predictable(row))
                .ok_or_else(|| {
                    let stage = format!("prediction of {security} on {date}");
                    ForecastError::insufficient(stage, 1, 0)
                })?;
            predict.push(row);
        }

        let train = labeled_pool(&data, &train, &cat_features)?;
        let predict = pool(&data, &predict, &cat_features)?;
        Ok((train, predict))
    }
}

fn check_securities(securities: &[String]) -> Result<()> {
    if securities.is_empty() {
        return Err(ForecastError::Configuration(
            "no securities requested".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    if let Some(duplicate) = securities.iter().find(|s| !seen.insert(s.as_str())) {
        return Err(ForecastError::Configuration(format!(
            "security {duplicate} requested twice"
        )));
    }
    Ok(())
}

fn check_layout(specs: &[ProviderSpec]) -> Result<()> {
    let expect = |pos: usize, kind: ProviderKind| match specs.get(pos) {
        Some(spec) if spec.kind() == kind => Ok(()),
        Some(spec) => Err(ForecastError::Configuration(format!(
            "provider {pos} must be {kind}, got {}",
            spec.kind()
        ))),
        None => Err(ForecastError::Configuration(format!(
            "provider {pos} must be {kind}, got nothing"
        ))),
    };
    expect(0, ProviderKind::Label)?;
    expect(1, ProviderKind::Scaler)?;

    let mut seen = HashSet::new();
    for spec in &specs[2..] {
        let kind = spec.kind();
        if matches!(kind, ProviderKind::Label | ProviderKind::Scaler) || !seen.insert(kind) {
            return Err(ForecastError::Configuration(format!(
                "provider {kind} is not allowed here"
            )));
        }
    }
    Ok(())
}

fn pool(data: &ExampleFrame, rows: &[usize], cat_features: &[usize]) -> Result<Pool> {
    let index = rows.iter().map(|&row| data.index[row].clone()).collect();
    let features = data.feature_columns().select(Axis(0), rows);
    let scale: Array1<f64> = rows.iter().map(|&row| data.scale_column()[row]).collect();
    Ok(Pool::new(
        index,
        features,
        scale,
        data.feature_names().to_vec(),
        cat_features.to_vec(),
    )?)
}

fn labeled_pool(data: &ExampleFrame, rows: &[usize], cat_features: &[usize]) -> Result<Pool> {
    let label: Array1<f64> = rows.iter().map(|&row| data.label_column()[row]).collect();
    let test_label: Array1<f64> = rows
        .iter()
        .map(|&row| data.test_label_column()[row])
        .collect();
    Ok(pool(data, rows, cat_features)?
        .with_label(label)?
        .with_test_label(test_label)?)
}
