use crate::error::PipelineError;
use engine_config::Settings;
use engine_core::{
    cancel::CancelCause,
    connectors::{sink::Sink, source::ReportSource},
    metrics::Metrics,
};
use engine_processing::{consumer::BatchWriter, handoff, producer::StreamReader};
use model::records::enriched::EnrichedRecord;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Runs the stream reader and the batch writer until one of them fails or
/// `shutdown` is cancelled from outside.
///
/// The first fatal error is recorded on `shutdown`, which stops the other
/// stage, and is returned once both tasks have finished. An outside
/// cancellation without a cause yields `Ok(())`.
pub async fn run<S, K>(
    settings: &Settings,
    source: S,
    sink: K,
    metrics: Metrics,
    shutdown: CancelCause<PipelineError>,
) -> Result<(), PipelineError>
where
    S: ReportSource + 'static,
    K: Sink<EnrichedRecord> + 'static,
{
    info!(
        queue_capacity = settings.queue_capacity().get(),
        flush_interval_ms = settings.flush_interval().as_millis() as u64,
        "Launching pipeline"
    );

    let (tx, rx) = handoff::channel(settings.queue_capacity());

    let mut reader = StreamReader::new(source, tx, metrics.clone(), shutdown.token());
    let reader_cause = shutdown.clone();
    let reader_handle = tokio::spawn(async move {
        if let Err(err) = reader.run().await {
            error!(error = %err, "Stream reader failed");
            reader_cause.cancel_with(err.into());
        }
    });

    let mut writer = BatchWriter::new(
        rx,
        sink,
        metrics,
        shutdown.token(),
        settings.flush_interval(),
    );
    let writer_cause = shutdown.clone();
    let writer_handle = tokio::spawn(async move {
        if let Err(err) = writer.run().await {
            error!(error = %err, "Batch writer failed");
            writer_cause.cancel_with(err.into());
        }
    });

    tokio::join!(
        supervise(reader_handle, &shutdown),
        supervise(writer_handle, &shutdown)
    );
    info!("Pipeline stopped");

    match shutdown.take_cause() {
        Some(cause) => Err(cause),
        None => Ok(()),
    }
}

/// A stage that panicked still has to bring the other one down.
async fn supervise(handle: JoinHandle<()>, shutdown: &CancelCause<PipelineError>) {
    if let Err(err) = handle.await {
        error!(error = %err, "Pipeline task did not complete");
        shutdown.cancel_with(PipelineError::TaskJoin(err));
    }
}
