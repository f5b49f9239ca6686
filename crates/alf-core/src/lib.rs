pub mod catalog;
pub mod coerce;
pub mod completeness;
pub mod config;
pub mod error;
pub mod ids;
pub mod io;
pub mod logistics;
pub mod model;
pub mod paths;
pub mod plan;
pub mod policy;
pub mod reconcile;
pub mod rubric;
pub mod rules;
pub mod session;
pub mod snapshot;
pub mod steps;
pub mod types;
pub mod validation;

pub use error::{AlfError, Result};
