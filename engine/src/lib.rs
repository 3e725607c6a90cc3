// Engine library root: everything between the bill aggregator in `shared`
// and a display layer.

pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod services;

pub use config::EngineSettings;
pub use data::memory_store::MemoryBillStore;
pub use data::sheet_parser::BillSheetParser;
pub use error::EngineError;
pub use models::session::{Role, Session};
pub use services::{BillHistory, BillStore, CalculatorSession, HttpBillStore};
