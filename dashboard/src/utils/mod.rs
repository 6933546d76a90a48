//! # Utility Functions
//!
//! - **[`validation`]**: Input validation (wallet addresses, journal fields)
//!
//! ## Related Modules
//!
//! - [`shared::utils`]: Cross-crate utilities (wallet abbreviation)
//! - [`crate::core`]: Core abstractions and error types

pub mod validation;
