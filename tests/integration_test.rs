use buffer_pipeline::config::PipelineConfig;
use buffer_pipeline::framework::mock::RecordingSink;
use buffer_pipeline::framework::{ProgressRecord, ProgressSink};
use buffer_pipeline::lifecycle::PipelineSystem;
use buffer_pipeline::model::BUFFER_LEN;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn config(batch_size: usize, workers: usize, poll_interval: Duration) -> PipelineConfig {
    PipelineConfig::new(NonZeroUsize::new(batch_size).unwrap())
        .with_workers(workers)
        .with_poll_interval(poll_interval)
        .with_seed(2024)
}

/// A sink that is slow to accept consumer records, so work piles up in the
/// queue while the producer keeps pushing.
struct SlowSink {
    inner: RecordingSink,
    delay: Duration,
}

impl ProgressSink for SlowSink {
    fn emit(&self, record: ProgressRecord) {
        if matches!(record, ProgressRecord::Consumer { .. }) {
            thread::sleep(self.delay);
        }
        self.inner.emit(record);
    }
}

/// Reference settings: n=3, 500 ms interval, one worker, two seconds.
#[test]
fn test_liveness_with_reference_settings() {
    let sink = Arc::new(RecordingSink::new());
    let system = PipelineSystem::start(
        config(3, 1, Duration::from_millis(500)),
        sink.clone(),
    )
    .expect("Failed to start pipeline");

    thread::sleep(Duration::from_secs(2));

    assert!(!sink.producer_records().is_empty());
    assert!(sink.consumer_records().len() >= 3);

    let stats = system.shutdown().expect("Failed to shutdown pipeline");
    assert_eq!(stats.produced, stats.consumed + stats.abandoned);
    assert_eq!(stats.abandoned, 0);
}

#[test]
fn test_every_buffer_consumed_exactly_once() {
    let sink = Arc::new(RecordingSink::new());
    let system = PipelineSystem::start(
        config(5, 4, Duration::from_millis(20)),
        sink.clone(),
    )
    .unwrap();

    assert!(sink.wait_until(Duration::from_secs(10), |records| {
        records
            .iter()
            .filter(|r| matches!(r, ProgressRecord::Consumer { .. }))
            .count()
            >= 40
    }));
    let stats = system.shutdown().unwrap();

    assert_eq!(stats.abandoned, 0);
    assert_eq!(stats.produced, stats.consumed);

    let mut sequences = sink.consumed_sequences();
    sequences.sort_unstable();
    let expected: Vec<u64> = (0..stats.produced).collect();
    assert_eq!(sequences, expected, "each buffer must be reported once");
}

#[test]
fn test_consumer_records_carry_combined_sample_count() {
    let sink = Arc::new(RecordingSink::new());
    let system = PipelineSystem::start(
        config(2, 2, Duration::from_millis(20)),
        sink.clone(),
    )
    .unwrap();

    assert!(sink.wait_until(Duration::from_secs(10), |records| records.len() >= 6));
    system.shutdown().unwrap();

    for record in sink.consumer_records() {
        match record {
            ProgressRecord::Consumer {
                worker_id,
                average,
                sample_count,
                elapsed_seconds,
                ..
            } => {
                assert!(worker_id < 2);
                assert_eq!(sample_count, 2 * BUFFER_LEN);
                assert!((-1.0..1.0).contains(&average));
                assert!(elapsed_seconds >= 0.0);
            }
            other => panic!("unexpected record {other:?}"),
        }
    }
}

#[test]
fn test_single_worker_consumes_in_push_order() {
    let sink = Arc::new(RecordingSink::new());
    let system = PipelineSystem::start(
        config(4, 1, Duration::from_millis(10)),
        sink.clone(),
    )
    .unwrap();

    assert!(sink.wait_until(Duration::from_secs(10), |records| records.len() >= 20));
    system.shutdown().unwrap();

    let sequences = sink.consumed_sequences();
    let expected: Vec<u64> = (0..sequences.len() as u64).collect();
    assert_eq!(sequences, expected);
}

#[test]
fn test_shutdown_drains_queued_buffers() {
    let recording = RecordingSink::new();
    let sink = Arc::new(SlowSink {
        inner: recording,
        delay: Duration::from_millis(5),
    });
    let system = PipelineSystem::start(
        config(40, 1, Duration::from_millis(10)).with_buffer_len(64),
        sink.clone(),
    )
    .unwrap();

    // Wait for the first full batch; the slow worker is now behind.
    assert!(sink.inner.wait_until(Duration::from_secs(10), |records| {
        records
            .iter()
            .any(|r| matches!(r, ProgressRecord::Producer { .. }))
    }));
    assert!(system.stats().abandoned > 0, "queue should hold a backlog");

    let stats = system.shutdown().unwrap();
    assert_eq!(stats.abandoned, 0);
    assert_eq!(stats.produced, stats.consumed);
    assert_eq!(sink.inner.consumer_records().len() as u64, stats.consumed);
    assert_eq!(sink.inner.summary(), Some(stats));
}

#[test]
fn test_shutdown_does_not_wait_for_poll_interval() {
    let sink = Arc::new(RecordingSink::new());
    let system = PipelineSystem::start(
        config(3, 4, Duration::from_secs(30)),
        sink.clone(),
    )
    .unwrap();

    // Let every worker park on the empty queue.
    thread::sleep(Duration::from_millis(100));

    let started = Instant::now();
    let stats = system.shutdown().unwrap();
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "shutdown took {:?}",
        started.elapsed()
    );
    assert_eq!(stats.produced, 0);
    assert!(sink.producer_records().is_empty());
}

/// Large buffers keep the producer inside generation for a long time, so
/// stops regularly land between the token check and the push.
#[test]
fn test_stop_during_generation_never_abandons_buffers() {
    for trial in 0..40u64 {
        let sink = Arc::new(RecordingSink::new());
        let system = PipelineSystem::start(
            config(1000, 4, Duration::from_millis(1))
                .with_buffer_len(1_000_000)
                .with_seed(trial),
            sink.clone(),
        )
        .unwrap();

        thread::sleep(Duration::from_millis(20 + trial % 7 * 5));
        let stats = system.shutdown().unwrap();

        assert_eq!(stats.abandoned, 0, "trial {trial}: {stats:?}");
        assert_eq!(stats.produced, stats.consumed, "trial {trial}: {stats:?}");
        assert_eq!(sink.consumer_records().len() as u64, stats.consumed);
    }
}

#[test]
fn test_external_token_stops_pipeline() {
    let token = buffer_pipeline::framework::CancellationToken::new();
    let system = PipelineSystem::start_with_token(
        config(2, 2, Duration::from_millis(20)),
        Arc::new(RecordingSink::new()),
        token.clone(),
    )
    .unwrap();

    token.request_stop();
    assert_eq!(
        system.state(),
        buffer_pipeline::lifecycle::LifecycleState::Draining
    );
    let stats = system.shutdown().unwrap();
    assert_eq!(stats.produced, stats.consumed);
}

#[tokio::test]
async fn test_run_until_shuts_down_after_signal() {
    let sink = Arc::new(RecordingSink::new());
    let system = PipelineSystem::start(
        config(3, 2, Duration::from_millis(50)),
        sink.clone(),
    )
    .unwrap();

    let stats = system
        .run_until(async {
            tokio::time::sleep(Duration::from_millis(400)).await;
            Ok(())
        })
        .await
        .expect("Failed to shutdown pipeline");

    assert!(stats.produced > 0);
    assert_eq!(stats.produced, stats.consumed);
    assert_eq!(sink.summary(), Some(stats));
}
