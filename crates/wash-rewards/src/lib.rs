pub mod config;
pub mod constants;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod logging;
pub mod report;
pub mod types;
