use framepipe::core::Frame;
use framepipe::engine::{ExecutionConfig, FrameQueue, Pipeline, PipelineTask};
use framepipe::PipelineError;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_take_all_drains_in_order() {
    let queue = FrameQueue::new();
    queue.push(Frame::text("a")).unwrap();
    queue
        .extend(vec![Frame::text("b"), Frame::end()])
        .unwrap();
    assert_eq!(queue.len(), 3);

    let batch = queue.take_all().unwrap();
    assert_eq!(batch, vec![Frame::text("a"), Frame::text("b"), Frame::end()]);
    assert!(queue.is_empty());
    assert!(queue.take_all().unwrap().is_empty());
}

#[test]
fn test_closed_queue_rejects_frames() {
    let queue = FrameQueue::new();
    queue.push(Frame::text("kept")).unwrap();
    queue.close();

    assert!(queue.is_closed());
    assert!(matches!(queue.push(Frame::end()), Err(PipelineError::TaskClosed)));
    assert!(matches!(
        queue.extend(vec![Frame::end()]),
        Err(PipelineError::TaskClosed)
    ));
    assert_eq!(queue.snapshot(), vec![Frame::text("kept")]);
}

#[tokio::test]
async fn test_push_before_wait_is_not_lost() {
    let queue = FrameQueue::new();
    queue.push(Frame::text("early")).unwrap();

    // The permit left by the push completes the wait immediately
    tokio::time::timeout(Duration::from_millis(100), queue.notified())
        .await
        .expect("wakeup lost");
}

#[tokio::test]
async fn test_push_wakes_waiter() {
    let queue = Arc::new(FrameQueue::new());
    let waiter = {
        let queue = queue.clone();
        tokio::spawn(async move {
            queue.notified().await;
            queue.take_all().unwrap()
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    queue.push(Frame::text("wake")).unwrap();

    let batch = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(batch, vec![Frame::text("wake")]);
}

#[test]
fn test_poisoned_lock_is_queue_state_error() {
    let queue = FrameQueue::new();
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        queue.extend(std::iter::from_fn(|| -> Option<Frame> {
            panic!("producer blew up")
        }))
    }));
    assert!(result.is_err());

    assert!(matches!(queue.push(Frame::end()), Err(PipelineError::QueueState(_))));
    assert!(matches!(queue.take_all(), Err(PipelineError::QueueState(_))));
    assert!(queue.is_closed());
}

#[test]
fn test_empty_extend_is_noop() {
    let queue = FrameQueue::new();
    queue.extend(Vec::new()).unwrap();
    assert!(queue.is_empty());
}

#[test]
fn test_task_enqueue_surface() {
    let task = PipelineTask::new(Pipeline::new(vec![]), ExecutionConfig::default());
    let sender = task.sender();
    assert_eq!(sender.task_id(), task.id());

    task.enqueue_one(Frame::text("a")).unwrap();
    sender.enqueue_many(vec![Frame::text("b"), Frame::text("c")]).unwrap();
    assert_eq!(
        task.pending(),
        vec![Frame::text("a"), Frame::text("b"), Frame::text("c")]
    );
    assert_eq!(sender.pending().len(), 3);

    let other = PipelineTask::new(Pipeline::new(vec![]), ExecutionConfig::default());
    assert_ne!(other.id(), task.id());
}

#[test]
fn test_interruptions_allowed() {
    let config = ExecutionConfig::default().with_interruptions(true);
    let task = PipelineTask::new(Pipeline::new(vec![]), config);
    let sender = task.sender();

    sender.set_response_in_flight(true);
    assert!(sender.is_response_in_flight());
    assert!(sender.enqueue_input(Frame::text("barge in")).unwrap());
    assert_eq!(task.pending().len(), 1);
}
