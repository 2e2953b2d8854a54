#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod covariance;

pub use covariance::{
    CovarianceError, CovarianceEstimator, LedoitWolfConfig, LedoitWolfEstimator,
    ShrinkageEstimate, average_correlation, cholesky_solve, scale_correlation,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
