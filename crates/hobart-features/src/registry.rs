//! Provider Registry
//!
//! Closed registry of every feature provider. A provider is looked up by its
//! [`ProviderKind`]; free-form names are only accepted at the parsing edge.

use crate::error::FeatureError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Every provider known to the pipeline.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ProviderKind {
    /// Forward mean return (the regression target)
    Label,
    /// Trailing return volatility (weights and normalization)
    Scaler,
    /// Security identity
    Ticker,
    /// Twelve-month momentum
    Mom12m,
    /// One-month momentum
    Mom1m,
    /// Trailing dividend yield
    DivYield,
    /// Maximum daily return
    RetMax,
    /// Change in six-month momentum
    ChMom6m,
}

impl ProviderKind {
    /// All kinds in registry order.
    pub const ALL: [Self; 8] = [
        Self::Label,
        Self::Scaler,
        Self::Ticker,
        Self::Mom12m,
        Self::Mom1m,
        Self::DivYield,
        Self::RetMax,
        Self::ChMom6m,
    ];

    /// Stable provider name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Label => "Label",
            Self::Scaler => "Scaler",
            Self::Ticker => "Ticker",
            Self::Mom12m => "Mom12m",
            Self::Mom1m => "Mom1m",
            Self::DivYield => "DivYield",
            Self::RetMax => "RetMax",
            Self::ChMom6m => "ChMom6m",
        }
    }

    /// Registry metadata of this kind.
    pub const fn info(self) -> ProviderInfo {
        let (category, description, periodic) = match self {
            Self::Label => (
                ProviderCategory::Target,
                "Mean daily total return over the next `days` rows",
                false,
            ),
            Self::Scaler => (
                ProviderCategory::Risk,
                "Standard deviation of daily returns over the trailing `days` rows",
                false,
            ),
            Self::Ticker => (
                ProviderCategory::Identity,
                "Position of the security in the requested tuple",
                false,
            ),
            Self::Mom12m => (
                ProviderCategory::Momentum,
                "Mean daily return over sub-windows of the trailing year",
                true,
            ),
            Self::Mom1m => (
                ProviderCategory::Momentum,
                "Mean daily return over the trailing month",
                false,
            ),
            Self::DivYield => (
                ProviderCategory::Yield,
                "Dividends paid in sub-windows of the trailing year over the current close",
                true,
            ),
            Self::RetMax => (
                ProviderCategory::Momentum,
                "Largest daily return over the trailing `days` rows",
                false,
            ),
            Self::ChMom6m => (
                ProviderCategory::Momentum,
                "Recent half-window momentum minus earlier half-window momentum",
                false,
            ),
        };
        ProviderInfo {
            kind: self,
            category,
            description,
            periodic,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| FeatureError::UnknownProvider(s.to_string()))
    }
}

/// Provider categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderCategory {
    /// Regression targets
    Target,
    /// Risk scale used for weights and normalization
    Risk,
    /// Identity features
    Identity,
    /// Price momentum features
    Momentum,
    /// Dividend yield features
    Yield,
}

/// Provider metadata
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    /// Provider kind
    pub kind: ProviderKind,
    /// Provider category
    pub category: ProviderCategory,
    /// Brief description of what the provider measures
    pub description: &'static str,
    /// Whether the provider emits one column per period
    pub periodic: bool,
}

/// Get all available provider info
pub fn available_providers() -> Vec<ProviderInfo> {
    ProviderKind::ALL.into_iter().map(ProviderKind::info).collect()
}

/// Get providers by category
pub fn providers_by_category(category: ProviderCategory) -> Vec<ProviderInfo> {
    available_providers()
        .into_iter()
        .filter(|p| p.category == category)
        .collect()
}

/// Get provider info by name
pub fn get_provider_info(name: &str) -> Option<ProviderInfo> {
    ProviderKind::from_str(name).ok().map(ProviderKind::info)
}

/// Count providers by category
pub fn count_by_category() -> HashMap<ProviderCategory, usize> {
    let mut counts = HashMap::new();
    for provider in available_providers() {
        *counts.entry(provider.category).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_registered_once() {
        let providers = available_providers();
        assert_eq!(providers.len(), ProviderKind::ALL.len());
        for kind in ProviderKind::ALL {
            assert_eq!(providers.iter().filter(|p| p.kind == kind).count(), 1);
        }
    }

    #[test]
    fn test_providers_by_category() {
        assert_eq!(providers_by_category(ProviderCategory::Momentum).len(), 4);
        assert_eq!(providers_by_category(ProviderCategory::Target).len(), 1);
        assert_eq!(count_by_category()[&ProviderCategory::Yield], 1);
    }

    #[test]
    fn test_name_round_trip() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.name().parse::<ProviderKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn test_unknown_provider() {
        let err = "Mom3m".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, FeatureError::UnknownProvider(name) if name == "Mom3m"));
        assert!(get_provider_info("Mom3m").is_none());
    }

    #[test]
    fn test_get_provider_info() {
        let info = get_provider_info("DivYield").unwrap();
        assert_eq!(info.category, ProviderCategory::Yield);
        assert!(info.periodic);
    }
}
