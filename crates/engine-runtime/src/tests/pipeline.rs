use crate::{error::PipelineError, pipeline};
use async_trait::async_trait;
use connectors::{
    error::ConnectorError,
    stream::{StatusCode, StreamResponse},
};
use engine_config::{Settings, SettingsBuilder};
use engine_core::{
    cancel::CancelCause,
    connectors::{sink::Sink, source::ReportSource},
    error::SinkError,
    metrics::Metrics,
};
use engine_processing::error::{ConsumerError, ProducerError};
use futures::{StreamExt, stream};
use model::records::enriched::EnrichedRecord;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::time::sleep;
use tokio_util::codec::LinesCodecError;

const LINE: &str = r#"{"sequenceNumber":7,"frequency":14074000,"flowStartSeconds":1700000000,"receiverLocator":"FN20","senderLocator":"JO65"}"#;

/// Answers the first request with `status` and one report, keeping the
/// connection open; later requests never complete.
struct OneShotSource {
    status: StatusCode,
    used: Mutex<bool>,
}

impl OneShotSource {
    fn new(status: StatusCode) -> Self {
        Self {
            status,
            used: Mutex::new(false),
        }
    }
}

#[async_trait]
impl ReportSource for OneShotSource {
    async fn open(&self) -> Result<StreamResponse, ConnectorError> {
        let first = !std::mem::replace(&mut *self.used.lock().unwrap(), true);
        if !first {
            return futures::future::pending().await;
        }
        let lines = stream::iter(vec![Ok::<_, LinesCodecError>(LINE.to_string())])
            .chain(stream::pending())
            .boxed();
        Ok(StreamResponse::new(self.status, lines))
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    fail: bool,
    rows: Arc<Mutex<Vec<EnrichedRecord>>>,
}

#[async_trait]
impl Sink<EnrichedRecord> for RecordingSink {
    async fn prepare(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    async fn write_batch(&mut self, rows: Vec<EnrichedRecord>) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Other("insert rejected".to_string()));
        }
        self.rows.lock().unwrap().extend(rows);
        Ok(())
    }
}

fn settings() -> Settings {
    SettingsBuilder::new()
        .stream_token("token")
        .flush_interval(Duration::from_secs(1))
        .queue_capacity(4)
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_flush_failure_cancels_pipeline_with_cause() {
    let sink = RecordingSink {
        fail: true,
        ..Default::default()
    };
    let metrics = Metrics::new().unwrap();
    let shutdown = CancelCause::new();

    let result = pipeline::run(
        &settings(),
        OneShotSource::new(StatusCode::OK),
        sink,
        metrics.clone(),
        shutdown.clone(),
    )
    .await;

    assert!(matches!(
        result,
        Err(PipelineError::Consumer(ConsumerError::Flush { rows: 1, .. }))
    ));
    assert!(shutdown.is_cancelled());
    assert_eq!(metrics.snapshot().insert_errors, 1);
}

#[tokio::test(start_paused = true)]
async fn test_bad_status_cancels_pipeline_with_cause() {
    let shutdown = CancelCause::new();

    let result = pipeline::run(
        &settings(),
        OneShotSource::new(StatusCode::FORBIDDEN),
        RecordingSink::default(),
        Metrics::new().unwrap(),
        shutdown.clone(),
    )
    .await;

    assert!(matches!(
        result,
        Err(PipelineError::Producer(ProducerError::Status(code))) if code == StatusCode::FORBIDDEN
    ));
    assert!(shutdown.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_outside_cancel_stops_cleanly() {
    let settings = settings();
    let sink = RecordingSink::default();
    let metrics = Metrics::new().unwrap();
    let shutdown = CancelCause::new();

    let stop = {
        let shutdown = shutdown.clone();
        async move {
            sleep(Duration::from_millis(2500)).await;
            shutdown.cancel();
        }
    };
    let (result, ()) = tokio::join!(
        pipeline::run(
            &settings,
            OneShotSource::new(StatusCode::OK),
            sink.clone(),
            metrics.clone(),
            shutdown.clone(),
        ),
        stop
    );

    result.unwrap();
    let rows = sink.rows.lock().unwrap().clone();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 7);
    assert_eq!(rows[0].band, 14);

    let snap = metrics.snapshot();
    assert_eq!(snap.lines_read, 1);
    assert_eq!(snap.batches_sent, 1);
    assert_eq!(snap.status_codes.get(&200), Some(&1));
}
