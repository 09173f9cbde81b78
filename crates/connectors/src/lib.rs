pub mod clickhouse;
pub mod error;
pub mod stream;
