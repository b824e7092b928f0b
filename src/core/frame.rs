use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Basic data unit passed between processors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frame {
    /// Chunk of raw audio
    Audio(AudioFrame),

    /// Text (transcriptions, LLM output, user input)
    Text(TextFrame),

    /// Opaque control signal
    Control(ControlFrame),

    /// Termination sentinel
    End,
}

/// Payload-free tag of a [`Frame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Audio,
    Text,
    Control,
    End,
}

impl FrameKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Text => "text",
            Self::Control => "control",
            Self::End => "end",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFrame {
    pub payload: Bytes,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioFrame {
    /// Play-out time of the payload, assuming 16-bit linear PCM.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 || self.channels == 0 {
            return Duration::ZERO;
        }
        let samples_per_channel = self.payload.len() as u64 / (2 * self.channels as u64);
        Duration::from_micros(samples_per_channel * 1_000_000 / self.sample_rate as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFrame {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlFrame {
    pub payload: Value,
}

impl Frame {
    pub fn audio(payload: impl Into<Bytes>, sample_rate: u32, channels: u16) -> Self {
        Self::Audio(AudioFrame {
            payload: payload.into(),
            sample_rate,
            channels,
        })
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(TextFrame {
            content: content.into(),
        })
    }

    pub fn control(payload: Value) -> Self {
        Self::Control(ControlFrame { payload })
    }

    pub fn end() -> Self {
        Self::End
    }

    pub fn kind(&self) -> FrameKind {
        match self {
            Self::Audio(_) => FrameKind::Audio,
            Self::Text(_) => FrameKind::Text,
            Self::Control(_) => FrameKind::Control,
            Self::End => FrameKind::End,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio(a) => write!(
                f,
                "Audio({} bytes, {}Hz, {}ch)",
                a.payload.len(),
                a.sample_rate,
                a.channels
            ),
            Self::Text(t) => write!(f, "Text({:?})", t.content),
            Self::Control(c) => write!(f, "Control({})", c.payload),
            Self::End => f.write_str("End"),
        }
    }
}
