//! Account heater (SPEC_FULL §4.6): the background job that keeps every
//! active account's precomputed facts warm — PR facts, release facts, the
//! synthetic `Bots` team, deployment-environment joins, and GitHub label
//! drift — without ever serving a live request itself.

pub mod bots;
pub mod config;
pub mod deployments;
pub mod error;
pub mod facts_row;
pub mod label_sync;
pub mod notifier;
pub mod pipeline;
pub mod report;
pub mod teams;

pub use config::Config;
pub use error::{HeaterError, HeaterResult};
pub use notifier::{Event, NullNotifier, Notifier};
pub use pipeline::{heat_account, AccountReport, HeaterStores};
pub use report::{run_heater, HeaterSummary};
