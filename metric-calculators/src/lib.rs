//! Pure functions over PR/release/JIRA fact tables, producing
//! `MetricValue`s with confidence intervals per team/interval.

pub mod error;
pub mod jira;
pub mod pr;
pub mod registry;
pub mod release;
pub mod stats;

pub use error::{MetricError, MetricResult};
pub use registry::{resolve, triage, MetricFamily};
