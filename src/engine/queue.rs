//! FIFO frame queue shared between producers and the runner.
//!
//! Producers append under a short-lived lock and leave a wakeup permit on a
//! [`Notify`]; the runner swaps the whole buffer out in one locked step.
//! Because `Notify` keeps a permit when nobody is waiting, an enqueue that
//! races with the runner going to sleep still wakes it.

use crate::core::Frame;
use crate::error::{PipelineError, Result};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

struct QueueInner {
    frames: VecDeque<Frame>,
    closed: bool,
}

pub struct FrameQueue {
    inner: Mutex<QueueInner>,
    notify: Notify,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                frames: VecDeque::new(),
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, QueueInner>> {
        self.inner
            .lock()
            .map_err(|_| PipelineError::QueueState("frame queue lock poisoned".to_string()))
    }

    pub fn push(&self, frame: Frame) -> Result<()> {
        {
            let mut inner = self.lock()?;
            if inner.closed {
                return Err(PipelineError::TaskClosed);
            }
            inner.frames.push_back(frame);
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Append all frames in order. Either every frame lands or none does.
    pub fn extend<I>(&self, frames: I) -> Result<()>
    where
        I: IntoIterator<Item = Frame>,
    {
        let pushed = {
            let mut inner = self.lock()?;
            if inner.closed {
                return Err(PipelineError::TaskClosed);
            }
            let before = inner.frames.len();
            inner.frames.extend(frames);
            inner.frames.len() > before
        };
        if pushed {
            self.notify.notify_one();
        }
        Ok(())
    }

    /// Swap out the current contents, leaving the queue empty.
    pub fn take_all(&self) -> Result<Vec<Frame>> {
        let mut inner = self.lock()?;
        Ok(std::mem::take(&mut inner.frames).into())
    }

    /// Wait until a frame has been pushed since the last wakeup.
    pub async fn notified(&self) {
        self.notify.notified().await
    }

    /// Refuse further frames. Contents are left as they are.
    pub fn close(&self) {
        match self.inner.lock() {
            Ok(mut inner) => inner.closed = true,
            Err(poisoned) => poisoned.into_inner().closed = true,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().map(|inner| inner.closed).unwrap_or(true)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.frames.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the pending frames, oldest first.
    pub fn snapshot(&self) -> Vec<Frame> {
        self.lock()
            .map(|inner| inner.frames.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}
