pub mod error;
pub mod exporter;
pub mod pipeline;
pub mod telemetry;

#[cfg(test)]
mod tests;
