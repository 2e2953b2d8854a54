//! Momentum providers
//!
//! Trailing statistics of daily total returns (dividends fully reinvested).

pub mod ch_mom6m;
pub mod mom12m;
pub mod mom1m;
pub mod ret_max;

pub use ch_mom6m::ChMom6mProvider;
pub use mom1m::Mom1mProvider;
pub use mom12m::Mom12mProvider;
pub use ret_max::RetMaxProvider;
