pub mod aggregator;
pub mod classify;
pub mod retry;
pub mod summary;
pub mod token;
