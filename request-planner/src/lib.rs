//! Deduplicates, triages, and dispatches metric requests across the PR,
//! release, and JIRA families, reshaping each family's raw results back
//! into `interval -> metric -> team -> value` (SPEC_FULL §4.1).

pub mod dispatch;
pub mod error;
pub mod model;
pub mod planner;
pub mod simplify;

pub use dispatch::PlannerContext;
pub use error::{PlannerError, PlannerResult};
pub use model::{TeamMetricsRequest, TeamMetricsResult, TimeInterval};
pub use planner::calculate_team_metrics;
pub use simplify::simplify_requests;
