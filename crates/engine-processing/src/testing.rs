//! In-memory source and sink used by the stage tests.

use async_trait::async_trait;
use connectors::{
    error::ConnectorError,
    stream::{StatusCode, StreamResponse},
};
use engine_core::{
    connectors::{sink::Sink, source::ReportSource},
    error::SinkError,
};
use futures::{StreamExt, stream};
use model::records::enriched::EnrichedRecord;
use std::{
    collections::VecDeque,
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio_util::codec::LinesCodecError;

/// One item of a scripted response body.
pub enum FakeLine {
    Line(String),
    /// The framing layer rejects a line as too long.
    Oversized,
    /// Reading the body fails mid-stream.
    ReadError,
}

impl From<&str> for FakeLine {
    fn from(line: &str) -> Self {
        FakeLine::Line(line.to_string())
    }
}

impl FakeLine {
    fn into_item(self) -> Result<String, LinesCodecError> {
        match self {
            FakeLine::Line(line) => Ok(line),
            FakeLine::Oversized => Err(LinesCodecError::MaxLineLengthExceeded),
            FakeLine::ReadError => Err(LinesCodecError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))),
        }
    }
}

struct Connection {
    status: StatusCode,
    lines: Vec<FakeLine>,
    stay_open: bool,
}

/// Replays scripted connections in order, then never answers again.
pub struct FakeSource {
    connections: Mutex<VecDeque<Connection>>,
    opens: Arc<AtomicUsize>,
    fail: bool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(VecDeque::new()),
            opens: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    /// A connection the remote closes after sending `lines`.
    pub fn with_closed_connection(self, status: StatusCode, lines: &[&str]) -> Self {
        self.push(status, lines.iter().map(|&l| l.into()).collect(), false)
    }

    /// A connection that stays open after sending `lines`.
    pub fn with_open_connection(self, status: StatusCode, lines: &[&str]) -> Self {
        self.push(status, lines.iter().map(|&l| l.into()).collect(), true)
    }

    /// A connection that stays open after replaying `lines`, which may
    /// include framing and read errors.
    pub fn with_scripted_connection(self, status: StatusCode, lines: Vec<FakeLine>) -> Self {
        self.push(status, lines, true)
    }

    /// Every connection attempt fails.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn opens(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.opens)
    }

    fn push(self, status: StatusCode, lines: Vec<FakeLine>, stay_open: bool) -> Self {
        self.connections.lock().unwrap().push_back(Connection {
            status,
            lines,
            stay_open,
        });
        self
    }
}

#[async_trait]
impl ReportSource for FakeSource {
    async fn open(&self) -> Result<StreamResponse, ConnectorError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ConnectorError::InvalidEndpoint {
                url: "fake://".to_string(),
                reason: "connection refused".to_string(),
            });
        }

        let next = self.connections.lock().unwrap().pop_front();
        let Some(conn) = next else {
            return futures::future::pending().await;
        };

        let lines = stream::iter(conn.lines.into_iter().map(FakeLine::into_item));
        let lines = if conn.stay_open {
            lines.chain(stream::pending()).boxed()
        } else {
            lines.boxed()
        };
        Ok(StreamResponse::new(conn.status, lines))
    }
}

#[derive(Default)]
pub struct SinkState {
    pub prepares: usize,
    pub batches: Vec<Vec<EnrichedRecord>>,
    pub failed_writes: usize,
}

/// Records every batch it receives. Clones share state.
#[derive(Clone, Default)]
pub struct FakeSink {
    pub state: Arc<Mutex<SinkState>>,
    fail_writes: bool,
    fail_prepare_after: Option<usize>,
    prepared: bool,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write returns an error.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Prepare succeeds `count` times, then fails.
    pub fn failing_prepare_after(mut self, count: usize) -> Self {
        self.fail_prepare_after = Some(count);
        self
    }

    pub fn batches(&self) -> Vec<Vec<EnrichedRecord>> {
        self.state.lock().unwrap().batches.clone()
    }

    pub fn prepares(&self) -> usize {
        self.state.lock().unwrap().prepares
    }

    pub fn failed_writes(&self) -> usize {
        self.state.lock().unwrap().failed_writes
    }
}

#[async_trait]
impl Sink<EnrichedRecord> for FakeSink {
    async fn prepare(&mut self) -> Result<(), SinkError> {
        let mut state = self.state.lock().unwrap();
        if self.fail_prepare_after.is_some_and(|limit| state.prepares >= limit) {
            return Err(SinkError::Other("sink unavailable".to_string()));
        }
        state.prepares += 1;
        self.prepared = true;
        Ok(())
    }

    async fn write_batch(&mut self, rows: Vec<EnrichedRecord>) -> Result<(), SinkError> {
        if !std::mem::take(&mut self.prepared) {
            return Err(SinkError::NotPrepared);
        }
        let mut state = self.state.lock().unwrap();
        if self.fail_writes {
            state.failed_writes += 1;
            return Err(SinkError::Other("insert rejected".to_string()));
        }
        state.batches.push(rows);
        Ok(())
    }
}
