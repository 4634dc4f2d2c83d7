pub mod aggregate;
pub mod report;
pub mod statistics;
pub mod valuation;

pub use aggregate::{aggregate_score, ClosetGrade};
pub use report::{ClosetReport, ItemContribution};
pub use statistics::{statistics, Statistics};
pub use valuation::{explain_valuation, valuate, ValuationBreakdown};
