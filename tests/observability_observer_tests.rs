mod common;

use common::{AlwaysFails, Flaky};
use framepipe::core::{Frame, FrameKind};
use framepipe::engine::{ExecutionConfig, Pipeline, PipelineRunner, PipelineTask};
use framepipe::observability::{FrameProcessed, ProcessResult, StageObserver};
use framepipe::processors::{Identity, KindFilter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct EventLog {
    starts: AtomicUsize,
    ends: Mutex<Vec<FrameProcessed>>,
}

impl StageObserver for EventLog {
    fn on_process_start(&self, _stage_index: usize, _stage_name: &str, _frame: &Frame) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_process_end(&self, event: &FrameProcessed) {
        self.ends.lock().unwrap().push(event.clone());
    }
}

#[tokio::test]
async fn test_metrics_track_each_stage() {
    let pipeline = Pipeline::new(vec![
        Box::new(Identity::new()),
        Box::new(KindFilter::dropping([FrameKind::Control])),
        Box::new(AlwaysFails),
    ]);
    let task = PipelineTask::new(pipeline, ExecutionConfig::default().with_metrics(true));
    task.enqueue_many(vec![
        Frame::text("a"),
        Frame::control(serde_json::json!({"type": "ping"})),
        Frame::end(),
    ])
    .unwrap();

    let runner = PipelineRunner::new();
    assert!(runner.monitor().is_none());
    assert!(runner.run(task).await.is_completed());

    let monitor = runner.monitor().expect("metrics enabled");
    let snapshot = monitor.collector().snapshot();
    assert_eq!(snapshot.len(), 3);

    assert_eq!(snapshot[0].frames_processed, 3);
    assert_eq!(snapshot[1].frames_processed, 2);
    assert_eq!(snapshot[1].frames_dropped, 1);
    assert_eq!(snapshot[2].frames_processed, 1);
    assert_eq!(snapshot[2].errors_count, 1);

    let report = monitor.generate_report();
    assert!(report.contains("[2] AlwaysFails"));
}

#[tokio::test]
async fn test_observer_sees_every_invocation() {
    let observer = Arc::new(EventLog::default());
    let (flaky, _calls) = Flaky::new(1);
    let pipeline = Pipeline::new(vec![Box::new(flaky), Box::new(Identity::new())]);
    let config = ExecutionConfig::default().with_metrics(true).with_retries(2);
    let task = PipelineTask::new(pipeline, config);
    task.enqueue_many(vec![Frame::text("a"), Frame::end()]).unwrap();

    let runner = PipelineRunner::new();
    runner.add_observer(observer.clone());
    assert!(runner.run(task).await.is_completed());

    let ends = observer.ends.lock().unwrap().clone();
    // Flaky: failed attempt, retried attempt, End. Identity: text, End.
    assert_eq!(ends.len(), 5);
    assert_eq!(observer.starts.load(Ordering::SeqCst), 5);

    assert_eq!(ends[0].stage_name, "Flaky");
    assert_eq!(ends[0].result, ProcessResult::Failed);
    assert_eq!(ends[0].attempt, 0);
    assert_eq!(ends[1].result, ProcessResult::Forwarded(FrameKind::Text));
    assert_eq!(ends[1].attempt, 1);
    assert_eq!(ends[2].input_kind, FrameKind::End);
    assert!(ends[3..].iter().all(|e| e.stage_index == 1));

    let flaky_stats = runner
        .monitor()
        .and_then(|m| m.collector().get_stage_metrics("Flaky"))
        .unwrap();
    assert_eq!(flaky_stats.retries_count(), 1);
    assert_eq!(flaky_stats.errors_count(), 1);
}

#[tokio::test]
async fn test_hooks_skipped_when_metrics_disabled() {
    let observer = Arc::new(EventLog::default());
    let pipeline = Pipeline::new(vec![Box::new(Identity::new())]);
    let task = PipelineTask::new(pipeline, ExecutionConfig::default());
    task.enqueue_many(vec![Frame::text("a"), Frame::end()]).unwrap();

    let runner = PipelineRunner::new();
    runner.add_observer(observer.clone());
    assert!(runner.run(task).await.is_completed());

    assert_eq!(observer.starts.load(Ordering::SeqCst), 0);
    assert!(observer.ends.lock().unwrap().is_empty());
    assert!(runner.monitor().is_none());
}
