//! Provider configurations.
//!
//! [`ProviderSpec`] is the serialized form of one provider's parameters. It is
//! externally tagged by provider name, so a list of specs reads like
//!
//! ```json
//! [
//!   { "Label": { "days": 20, "div_share": 0.0 } },
//!   { "Scaler": { "days": 150 } },
//!   { "Ticker": {} }
//! ]
//! ```

use crate::error::{FeatureError, Result};
use crate::registry::ProviderKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for the Label provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Forward horizon in rows (default: 20)
    pub days: usize,
    /// Share of dividends counted in the total return (default: 0.0)
    pub div_share: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            days: 20,
            div_share: 0.0,
        }
    }
}

impl LabelConfig {
    /// Same configuration with a different horizon.
    pub const fn with_days(self, days: usize) -> Self {
        Self { days, ..self }
    }
}

/// Configuration for the Scaler provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalerConfig {
    /// Trailing window in rows (default: 150)
    pub days: usize,
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self { days: 150 }
    }
}

/// Configuration for the Ticker provider (no parameters)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerConfig {}

/// Configuration for the Mom12m provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mom12mConfig {
    /// Trailing window in rows (default: 252)
    pub days: usize,
    /// Number of equal sub-windows, one column each (default: 1)
    pub periods: usize,
}

impl Default for Mom12mConfig {
    fn default() -> Self {
        Self {
            days: 252,
            periods: 1,
        }
    }
}

/// Configuration for the Mom1m provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mom1mConfig {
    /// Trailing window in rows (default: 21)
    pub days: usize,
}

impl Default for Mom1mConfig {
    fn default() -> Self {
        Self { days: 21 }
    }
}

/// Configuration for the DivYield provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivYieldConfig {
    /// Trailing window in rows (default: 252)
    pub days: usize,
    /// Number of equal sub-windows, one column each (default: 1)
    pub periods: usize,
}

impl Default for DivYieldConfig {
    fn default() -> Self {
        Self {
            days: 252,
            periods: 1,
        }
    }
}

/// Configuration for the RetMax provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetMaxConfig {
    /// Trailing window in rows (default: 21)
    pub days: usize,
}

impl Default for RetMaxConfig {
    fn default() -> Self {
        Self { days: 21 }
    }
}

/// Configuration for the ChMom6m provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChMom6mConfig {
    /// Full window in rows, split into two halves (default: 126)
    pub days: usize,
}

impl Default for ChMom6mConfig {
    fn default() -> Self {
        Self { days: 126 }
    }
}

/// Parameters of one feature provider, tagged by provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProviderSpec {
    /// Label parameters
    Label(LabelConfig),
    /// Scaler parameters
    Scaler(ScalerConfig),
    /// Ticker parameters
    Ticker(TickerConfig),
    /// Mom12m parameters
    Mom12m(Mom12mConfig),
    /// Mom1m parameters
    Mom1m(Mom1mConfig),
    /// DivYield parameters
    DivYield(DivYieldConfig),
    /// RetMax parameters
    RetMax(RetMaxConfig),
    /// ChMom6m parameters
    ChMom6m(ChMom6mConfig),
}

impl ProviderSpec {
    /// Provider this configuration belongs to.
    pub const fn kind(&self) -> ProviderKind {
        match self {
            Self::Label(_) => ProviderKind::Label,
            Self::Scaler(_) => ProviderKind::Scaler,
            Self::Ticker(_) => ProviderKind::Ticker,
            Self::Mom12m(_) => ProviderKind::Mom12m,
            Self::Mom1m(_) => ProviderKind::Mom1m,
            Self::DivYield(_) => ProviderKind::DivYield,
            Self::RetMax(_) => ProviderKind::RetMax,
            Self::ChMom6m(_) => ProviderKind::ChMom6m,
        }
    }

    /// Default configuration of a provider.
    pub fn default_for(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Label => Self::Label(LabelConfig::default()),
            ProviderKind::Scaler => Self::Scaler(ScalerConfig::default()),
            ProviderKind::Ticker => Self::Ticker(TickerConfig::default()),
            ProviderKind::Mom12m => Self::Mom12m(Mom12mConfig::default()),
            ProviderKind::Mom1m => Self::Mom1m(Mom1mConfig::default()),
            ProviderKind::DivYield => Self::DivYield(DivYieldConfig::default()),
            ProviderKind::RetMax => Self::RetMax(RetMaxConfig::default()),
            ProviderKind::ChMom6m => Self::ChMom6m(ChMom6mConfig::default()),
        }
    }

    /// Parse one tagged spec, resolving the tag through the provider registry.
    ///
    /// An unregistered name fails with [`FeatureError::UnknownProvider`] and
    /// malformed parameters with [`FeatureError::InvalidParameter`].
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let entry = match value {
            serde_json::Value::Object(map) if map.len() == 1 => map.into_iter().next(),
            _ => None,
        };
        let (name, params) = entry.ok_or_else(|| {
            FeatureError::UnknownProvider("expected an object with one provider name".to_string())
        })?;
        let kind: ProviderKind = name.parse()?;

        let tagged = serde_json::Value::Object(std::iter::once((name, params)).collect());
        serde_json::from_value(tagged).map_err(|e| FeatureError::InvalidParameter {
            provider: kind,
            reason: e.to_string(),
        })
    }

    /// Parameters as a JSON object, for search-space checks.
    pub fn params(&self) -> serde_json::Value {
        let tagged = serde_json::to_value(self).unwrap_or_default();
        match tagged {
            serde_json::Value::Object(mut map) => map
                .remove(self.kind().name())
                .unwrap_or(serde_json::Value::Null),
            other => other,
        }
    }
}

impl fmt::Display for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind(), self.params())
    }
}

/// Typed access to the configuration carried by a [`ProviderSpec`].
pub trait ProviderConfig: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Provider the configuration belongs to.
    const KIND: ProviderKind;

    /// Borrow the configuration if `spec` is of this kind.
    fn from_spec(spec: &ProviderSpec) -> Option<&Self>;

    /// Wrap into a [`ProviderSpec`].
    fn into_spec(self) -> ProviderSpec;

    /// Borrow the configuration or report a [`FeatureError::SpecMismatch`].
    fn expect_from(spec: &ProviderSpec) -> Result<&Self> {
        Self::from_spec(spec).ok_or_else(|| FeatureError::SpecMismatch {
            expected: Self::KIND,
            actual: spec.kind(),
        })
    }
}

macro_rules! provider_config {
    ($($config:ty => $variant:ident),+ $(,)?) => {
        $(
            impl ProviderConfig for $config {
                const KIND: ProviderKind = ProviderKind::$variant;

                fn from_spec(spec: &ProviderSpec) -> Option<&Self> {
                    match spec {
                        ProviderSpec::$variant(config) => Some(config),
                        _ => None,
                    }
                }

                fn into_spec(self) -> ProviderSpec {
                    ProviderSpec::$variant(self)
                }
            }

            impl From<$config> for ProviderSpec {
                fn from(config: $config) -> Self {
                    config.into_spec()
                }
            }
        )+
    };
}

provider_config! {
    LabelConfig => Label,
    ScalerConfig => Scaler,
    TickerConfig => Ticker,
    Mom12mConfig => Mom12m,
    Mom1mConfig => Mom1m,
    DivYieldConfig => DivYield,
    RetMaxConfig => RetMax,
    ChMom6mConfig => ChMom6m,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_with_days_is_pure() {
        let label = LabelConfig {
            days: 20,
            div_share: 0.5,
        };
        let test_label = label.with_days(1);

        assert_eq!(label.days, 20);
        assert_eq!(test_label.days, 1);
        assert_eq!(test_label.div_share, 0.5);
    }

    #[test]
    fn test_externally_tagged_json() {
        let spec: ProviderSpec =
            serde_json::from_str(r#"{"Mom12m": {"days": 250, "periods": 2}}"#).unwrap();
        assert_eq!(
            spec,
            ProviderSpec::Mom12m(Mom12mConfig {
                days: 250,
                periods: 2
            })
        );
        assert_eq!(spec.kind(), ProviderKind::Mom12m);

        let ticker: ProviderSpec = serde_json::from_str(r#"{"Ticker": {}}"#).unwrap();
        assert_eq!(ticker, ProviderSpec::Ticker(TickerConfig {}));
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let parsed = serde_json::from_str::<ProviderSpec>(r#"{"Mom3m": {"days": 63}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_from_value_resolves_registry_names() {
        use serde_json::json;

        let spec = ProviderSpec::from_value(json!({"RetMax": {"days": 21}})).unwrap();
        assert_eq!(spec, ProviderSpec::RetMax(RetMaxConfig { days: 21 }));

        let err = ProviderSpec::from_value(json!({"Mom3m": {"days": 63}})).unwrap_err();
        assert!(matches!(err, FeatureError::UnknownProvider(name) if name == "Mom3m"));

        let err = ProviderSpec::from_value(json!({"Mom1m": {"days": "x"}})).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::InvalidParameter {
                provider: ProviderKind::Mom1m,
                ..
            }
        ));

        let err = ProviderSpec::from_value(json!(["Mom1m"])).unwrap_err();
        assert!(matches!(err, FeatureError::UnknownProvider(_)));
    }

    #[test]
    fn test_expect_from_mismatch() {
        let spec = ProviderSpec::from(ScalerConfig::default());
        let err = Mom1mConfig::expect_from(&spec).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::SpecMismatch {
                expected: ProviderKind::Mom1m,
                actual: ProviderKind::Scaler
            }
        ));
        assert_eq!(ScalerConfig::expect_from(&spec).unwrap().days, 150);
    }

    #[test]
    fn test_params_object() {
        let spec = ProviderSpec::from(LabelConfig::default());
        let params = spec.params();
        assert_eq!(params["days"], 20);
        assert_eq!(params["div_share"], 0.0);
    }

    #[test]
    fn test_default_for_matches_kind() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderSpec::default_for(kind).kind(), kind);
        }
    }
}
