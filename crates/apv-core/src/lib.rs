pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "apv")]
pub mod apv;

pub use error::ApvError;
pub use types::*;

/// Standard result type for all APV operations
pub type ApvResult<T> = Result<T, ApvError>;
