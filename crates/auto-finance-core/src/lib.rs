pub mod config;
pub mod credit_tier;
pub mod error;
pub mod parse;
pub mod time_value;
pub mod types;

#[cfg(feature = "financing")]
pub mod financing;

#[cfg(feature = "leasing")]
pub mod leasing;

#[cfg(feature = "cash_purchase")]
pub mod cash_purchase;

#[cfg(feature = "affordability")]
pub mod affordability;

#[cfg(feature = "scenario")]
pub mod scenario;

pub use config::EngineConfig;
pub use error::AutoFinanceError;
pub use types::*;

/// Standard result type for all auto-finance operations
pub type AutoFinanceResult<T> = Result<T, AutoFinanceError>;
