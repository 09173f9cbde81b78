use crate::{connectors::sink::Sink, error::SinkError};
use async_trait::async_trait;
use clickhouse::insert::Insert;
use connectors::clickhouse::ClickHouseClient;
use model::records::enriched::EnrichedRecord;
use tracing::debug;

/// Writes enriched reports into a ClickHouse table, one `INSERT` per batch.
pub struct ClickHouseSink {
    client: ClickHouseClient,
    table: String,
    pending: Option<Insert<EnrichedRecord>>,
}

impl ClickHouseSink {
    pub fn new(client: ClickHouseClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            pending: None,
        }
    }
}

#[async_trait]
impl Sink<EnrichedRecord> for ClickHouseSink {
    async fn prepare(&mut self) -> Result<(), SinkError> {
        let insert = self
            .client
            .get_client()
            .insert::<EnrichedRecord>(&self.table)
            .await?;
        self.pending = Some(insert);
        debug!(table = %self.table, "Prepared insert");
        Ok(())
    }

    async fn write_batch(&mut self, rows: Vec<EnrichedRecord>) -> Result<(), SinkError> {
        let mut insert = self.pending.take().ok_or(SinkError::NotPrepared)?;

        for row in &rows {
            insert.write(row).await?;
        }
        insert.end().await?;

        debug!(table = %self.table, rows = rows.len(), "Insert committed");
        Ok(())
    }
}
