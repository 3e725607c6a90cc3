// Engine services: persistence client, calculator session and bill history.
pub mod bill_store;
pub mod calculator;
pub mod history;

pub use bill_store::{BillStore, HttpBillStore};
pub use calculator::CalculatorSession;
pub use history::BillHistory;
