//! Core types and trait definitions for the safety tracker.
//!
//! Holds the incident record and everything scoped beneath an establishment
//! (locations, annual statistics, corrective actions, root-cause sessions,
//! toolbox talks, job-safety analyses), the validation rules shared by every
//! entry point, and the [`store::SafetyStore`] abstraction.
//!
//! This crate is deliberately free of HTTP and database dependencies.

pub mod action;
pub mod error;
pub mod establishment;
pub mod incident;
pub mod jsa;
pub mod label;
pub mod rca;
pub mod stats;
pub mod store;
pub mod toolbox;
pub mod validate;

pub use error::{Error, Result};
