pub mod audit;
pub mod brief;
pub mod dispatch;
pub mod history;
pub mod ingest;
pub mod query;
pub mod shared;
pub mod store;
