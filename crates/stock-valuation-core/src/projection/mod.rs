pub mod scenarios;
pub mod summary;
