use crate::error::MetricsError;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder, core::Collector,
};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

/// Prefix shared by every exported metric name.
pub const NAMESPACE: &str = "pskhouse";

/// Content type of [`Metrics::render`] output.
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Label carrying the stream endpoint's HTTP status.
pub const STATUS_LABEL: &str = "http_status";

/// Upper bounds (inclusive) of the batch-size histogram buckets. Sizes above
/// the last bound land in an overflow bucket.
pub const BATCH_SIZE_BOUNDS: [f64; 37] = [
    1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, //
    10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, //
    100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0, 900.0, //
    1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0, 7000.0, 8000.0, 9000.0, //
    10000.0,
];

/// Pipeline counters shared by every stage, backed by a Prometheus registry.
/// Cloning is cheap and clones share the same collectors.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    lines_read: IntCounter,
    invalid_lines: IntCounter,
    batches_sent: IntCounter,
    rows_sent: IntCounter,
    convert_errors: IntCounter,
    insert_errors: IntCounter,
    status_codes: IntCounterVec,
    batch_size: Histogram,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub lines_read: u64,
    pub invalid_lines: u64,
    pub batches_sent: u64,
    pub rows_sent: u64,
    pub convert_errors: u64,
    pub insert_errors: u64,
    /// Responses received from the stream endpoint, by HTTP status.
    pub status_codes: BTreeMap<u16, u64>,
    /// Count per bucket, aligned with [`BATCH_SIZE_BOUNDS`] plus overflow.
    pub batch_sizes: Vec<u64>,
}

impl Metrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new_custom(Some(NAMESPACE.to_string()), None)?;

        let metrics = Metrics {
            lines_read: IntCounter::new(
                "pskreporter_lines_read",
                "Lines read from PSKReporter",
            )?,
            invalid_lines: IntCounter::new(
                "pskreporter_invalid_lines",
                "Invalid lines from PSKReporter",
            )?,
            batches_sent: IntCounter::new("clickhouse_batches", "Batches sent to ClickHouse")?,
            rows_sent: IntCounter::new("clickhouse_rows", "Rows sent to ClickHouse")?,
            convert_errors: IntCounter::new(
                "clickhouse_convert_errors",
                "Errors converting a report to a ClickHouse row",
            )?,
            insert_errors: IntCounter::new(
                "clickhouse_insert_errors",
                "Errors inserting a batch into ClickHouse",
            )?,
            status_codes: IntCounterVec::new(
                Opts::new("pskreporter_status", "PSKReporter stream status codes"),
                &[STATUS_LABEL],
            )?,
            batch_size: Histogram::with_opts(
                HistogramOpts::new(
                    "clickhouse_batch_size",
                    "Number of rows in a batch sent to ClickHouse",
                )
                .buckets(BATCH_SIZE_BOUNDS.to_vec()),
            )?,
            registry,
        };

        metrics.register_all()?;
        Ok(metrics)
    }

    fn register_all(&self) -> Result<(), MetricsError> {
        let counters = [
            &self.lines_read,
            &self.invalid_lines,
            &self.batches_sent,
            &self.rows_sent,
            &self.convert_errors,
            &self.insert_errors,
        ];
        for counter in counters {
            self.registry.register(Box::new(counter.clone()))?;
        }
        self.registry.register(Box::new(self.status_codes.clone()))?;
        self.registry.register(Box::new(self.batch_size.clone()))?;
        Ok(())
    }

    pub fn increment_lines_read(&self, count: u64) {
        self.lines_read.inc_by(count);
    }

    pub fn increment_invalid_lines(&self, count: u64) {
        self.invalid_lines.inc_by(count);
    }

    pub fn increment_convert_errors(&self, count: u64) {
        self.convert_errors.inc_by(count);
    }

    pub fn increment_insert_errors(&self, count: u64) {
        self.insert_errors.inc_by(count);
    }

    pub fn record_status(&self, status: u16) {
        let code = status.to_string();
        self.status_codes.with_label_values(&[code.as_str()]).inc();
    }

    /// Records one successfully sent batch of `rows` rows.
    pub fn record_batch(&self, rows: u64) {
        self.batches_sent.inc();
        self.rows_sent.inc_by(rows);
        self.batch_size.observe(rows as f64);
    }

    /// Renders every registered metric in the Prometheus text format.
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lines_read: self.lines_read.get(),
            invalid_lines: self.invalid_lines.get(),
            batches_sent: self.batches_sent.get(),
            rows_sent: self.rows_sent.get(),
            convert_errors: self.convert_errors.get(),
            insert_errors: self.insert_errors.get(),
            status_codes: self.status_counts(),
            batch_sizes: self.batch_size_buckets(),
        }
    }

    fn status_counts(&self) -> BTreeMap<u16, u64> {
        self.status_codes
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .filter_map(|metric| {
                let code = metric
                    .get_label()
                    .iter()
                    .find(|pair| pair.get_name() == STATUS_LABEL)?
                    .get_value()
                    .parse()
                    .ok()?;
                Some((code, metric.get_counter().get_value() as u64))
            })
            .collect()
    }

    /// Converts the cumulative histogram buckets back into per-bucket counts.
    fn batch_size_buckets(&self) -> Vec<u64> {
        let mut counts = Vec::with_capacity(BATCH_SIZE_BOUNDS.len() + 1);
        let mut below = 0;
        for family in self.batch_size.collect() {
            for metric in family.get_metric() {
                let histogram = metric.get_histogram();
                for bucket in histogram.get_bucket() {
                    let cumulative = bucket.get_cumulative_count();
                    counts.push(cumulative - below);
                    below = cumulative;
                }
                counts.push(histogram.get_sample_count() - below);
            }
        }
        counts
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_batch() {
        let metrics = Metrics::new().unwrap();
        metrics.record_batch(3);
        metrics.record_batch(250);

        let snap = metrics.snapshot();
        assert_eq!(snap.batches_sent, 2);
        assert_eq!(snap.rows_sent, 253);
        assert_eq!(snap.batch_sizes.len(), BATCH_SIZE_BOUNDS.len() + 1);
        assert_eq!(snap.batch_sizes.iter().sum::<u64>(), 2);
        assert_eq!(snap.batch_sizes[2], 1);
        assert_eq!(snap.batch_sizes[20], 1);
    }

    #[test]
    fn test_bucket_boundaries() {
        let metrics = Metrics::new().unwrap();
        metrics.record_batch(10);
        metrics.record_batch(11);
        metrics.record_batch(10_000);
        metrics.record_batch(10_001);

        let snap = metrics.snapshot();
        assert_eq!(snap.batch_sizes[9], 1);
        assert_eq!(snap.batch_sizes[10], 1);
        assert_eq!(snap.batch_sizes[BATCH_SIZE_BOUNDS.len() - 1], 1);
        assert_eq!(snap.batch_sizes[BATCH_SIZE_BOUNDS.len()], 1);
    }

    #[test]
    fn test_status_codes_are_counted_per_code() {
        let metrics = Metrics::new().unwrap();
        metrics.record_status(200);
        metrics.record_status(200);
        metrics.record_status(503);

        let snap = metrics.snapshot();
        assert_eq!(snap.status_codes.get(&200), Some(&2));
        assert_eq!(snap.status_codes.get(&503), Some(&1));
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = Metrics::new().unwrap();
        let clone = metrics.clone();
        clone.increment_lines_read(2);
        clone.increment_invalid_lines(1);

        let snap = metrics.snapshot();
        assert_eq!(snap.lines_read, 2);
        assert_eq!(snap.invalid_lines, 1);
        assert_eq!(
            serde_json::to_value(&snap).unwrap()["lines_read"],
            serde_json::json!(2)
        );
    }

    #[test]
    fn test_render_text_format() {
        let metrics = Metrics::new().unwrap();
        metrics.increment_lines_read(5);
        metrics.record_status(200);
        metrics.record_batch(3);

        let text = metrics.render().unwrap();
        assert!(text.contains("# TYPE pskhouse_pskreporter_lines_read counter"));
        assert!(text.contains("pskhouse_pskreporter_lines_read 5"));
        assert!(text.contains(r#"pskhouse_pskreporter_status{http_status="200"} 1"#));
        assert!(text.contains("# TYPE pskhouse_clickhouse_batch_size histogram"));
        assert!(text.contains(r#"pskhouse_clickhouse_batch_size_bucket{le="2"} 0"#));
        assert!(text.contains(r#"pskhouse_clickhouse_batch_size_bucket{le="3"} 1"#));
        assert!(text.contains(r#"pskhouse_clickhouse_batch_size_bucket{le="+Inf"} 1"#));
        assert!(text.contains("pskhouse_clickhouse_batch_size_count 1"));
    }

    #[test]
    fn test_separate_registries() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();
        first.increment_insert_errors(1);

        assert_eq!(first.snapshot().insert_errors, 1);
        assert_eq!(second.snapshot().insert_errors, 0);
    }
}
