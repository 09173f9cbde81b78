use crate::error::SinkError;
use async_trait::async_trait;

pub mod clickhouse;

/// Destination for flushed batches.
///
/// The sink is owned by a single writer. Every batch goes through its own
/// prepared insert: [`Sink::prepare`] is called once before the first batch
/// and again after every successful [`Sink::write_batch`], which consumes it.
#[async_trait]
pub trait Sink<R>: Send
where
    R: Send + Sync + 'static,
{
    async fn prepare(&mut self) -> Result<(), SinkError>;

    async fn write_batch(&mut self, rows: Vec<R>) -> Result<(), SinkError>;
}
