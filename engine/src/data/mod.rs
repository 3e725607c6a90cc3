// Local data sources: bill sheets on disk and the in-memory bill store.
pub mod memory_store;
pub mod sheet_parser;
