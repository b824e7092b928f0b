#![allow(dead_code)]

use async_trait::async_trait;
use framepipe::core::{Frame, Processor};
use framepipe::ProcessorError;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Text content, or the kind name for other frames
pub fn describe(frame: &Frame) -> String {
    match frame.as_text() {
        Some(text) => text.to_string(),
        None => frame.kind().to_string(),
    }
}

/// Appends "<label>:<frame>" for every frame and passes it on
pub struct Recorder {
    label: String,
    log: Log,
}

impl Recorder {
    pub fn boxed(label: &str, log: &Log) -> Box<dyn Processor> {
        Box::new(Self {
            label: label.to_string(),
            log: log.clone(),
        })
    }
}

#[async_trait]
impl Processor for Recorder {
    fn name(&self) -> &str {
        &self.label
    }

    async fn process(&self, frame: Frame) -> Result<Option<Frame>, ProcessorError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.label, describe(&frame)));
        Ok(Some(frame))
    }
}

/// Fails on every text frame whose content is in `bad`, passes the rest
pub struct FailOn {
    bad: Vec<String>,
}

impl FailOn {
    pub fn boxed(bad: &[&str]) -> Box<dyn Processor> {
        Box::new(Self {
            bad: bad.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[async_trait]
impl Processor for FailOn {
    fn name(&self) -> &str {
        "FailOn"
    }

    async fn process(&self, frame: Frame) -> Result<Option<Frame>, ProcessorError> {
        match frame.as_text() {
            Some(text) if self.bad.iter().any(|b| b == text) => {
                Err(ProcessorError::failed(format!("refusing {:?}", text)))
            }
            _ => Ok(Some(frame)),
        }
    }
}

/// Fails on every non-End frame
pub struct AlwaysFails;

#[async_trait]
impl Processor for AlwaysFails {
    fn name(&self) -> &str {
        "AlwaysFails"
    }

    async fn process(&self, frame: Frame) -> Result<Option<Frame>, ProcessorError> {
        if frame.is_end() {
            return Ok(Some(frame));
        }
        Err(ProcessorError::failed("always fails"))
    }
}

/// Fails the first `failures` non-End calls, then passes frames through
pub struct Flaky {
    failures: u32,
    calls: Arc<AtomicU32>,
}

impl Flaky {
    pub fn new(failures: u32) -> (Self, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        (
            Self {
                failures,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl Processor for Flaky {
    fn name(&self) -> &str {
        "Flaky"
    }

    async fn process(&self, frame: Frame) -> Result<Option<Frame>, ProcessorError> {
        if frame.is_end() {
            return Ok(Some(frame));
        }
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(ProcessorError::failed(format!("transient failure #{}", call + 1)));
        }
        Ok(Some(frame))
    }
}

/// Indexes past the end of an empty buffer when it sees the text "bad"
pub struct PanicOnBad;

#[async_trait]
impl Processor for PanicOnBad {
    fn name(&self) -> &str {
        "PanicOnBad"
    }

    async fn process(&self, frame: Frame) -> Result<Option<Frame>, ProcessorError> {
        if let Some(text) = frame.as_text() {
            if text == "bad" {
                let buffer: Vec<u8> = Vec::new();
                let _ = buffer[text.len()];
            }
        }
        Ok(Some(frame))
    }
}

/// Poll `condition` until it holds or `limit` elapses
pub async fn wait_until<F>(limit: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
