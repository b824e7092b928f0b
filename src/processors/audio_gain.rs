use crate::core::{AudioFrame, Frame, Processor};
use crate::error::ProcessorError;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

/// Scales 16-bit little-endian PCM audio. Other frames pass through.
pub struct AudioGain {
    gain: f64,
}

impl Default for AudioGain {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioGain {
    pub fn new() -> Self {
        Self { gain: 1.0 }
    }

    pub fn with_gain(gain: f64) -> Self {
        Self { gain }
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }
}

#[async_trait]
impl Processor for AudioGain {
    fn name(&self) -> &str {
        "AudioGain"
    }

    async fn on_create(&mut self, config: Value) -> Result<(), ProcessorError> {
        if let Some(g) = config["gain"].as_f64() {
            self.gain = g;
        } else if let Some(gain_db) = config["gain_db"].as_f64() {
            // Convert dB to linear
            self.gain = 10_f64.powf(gain_db / 20.0);
        }
        Ok(())
    }

    async fn process(&self, frame: Frame) -> Result<Option<Frame>, ProcessorError> {
        let audio = match frame {
            Frame::Audio(audio) => audio,
            other => return Ok(Some(other)),
        };

        if audio.payload.len() % 2 != 0 {
            return Err(ProcessorError::failed(format!(
                "odd-length PCM payload ({} bytes)",
                audio.payload.len()
            )));
        }

        let mut scaled = Vec::with_capacity(audio.payload.len());
        for pair in audio.payload.chunks_exact(2) {
            let sample = i16::from_le_bytes([pair[0], pair[1]]) as f64 * self.gain;
            let clamped = sample.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16;
            scaled.extend_from_slice(&clamped.to_le_bytes());
        }

        Ok(Some(Frame::Audio(AudioFrame {
            payload: Bytes::from(scaled),
            ..audio
        })))
    }
}
