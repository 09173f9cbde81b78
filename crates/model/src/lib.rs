pub mod geo;
pub mod records;
