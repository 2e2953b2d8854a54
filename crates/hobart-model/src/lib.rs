#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod metrics;
pub mod pool;
pub mod regressor;
pub mod ridge;

pub use error::{ModelError, Result};
pub use metrics::{ValidationScores, pearson, rank_ic_t_stat, ranks, spearman};
pub use pool::Pool;
pub use regressor::{ModelParams, Regressor};
pub use ridge::RidgeRegressor;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
