pub mod aggregator;
pub mod error;
pub mod models;
pub mod utils;

pub use aggregator::{calculate_bill, BillForm};
pub use error::AggregatorError;
pub use models::{BillDetail, BillRecord, BillSummary, MeterSource, UtilityEntry, UtilityKind, ZeroTotalWarning};
