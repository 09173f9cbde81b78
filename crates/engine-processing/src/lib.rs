pub mod consumer;
pub mod error;
pub mod handoff;
pub mod producer;
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;
