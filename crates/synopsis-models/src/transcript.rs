//! Time-coded transcript models and SubRip parsing.

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::timestamp::{parse_srt_timecode, TimestampError};

/// One recognised span of speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Recognised text
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Check the segment bounds.
    pub fn validate(&self) -> Result<(), TranscriptError> {
        if !self.start.is_finite() || !self.end.is_finite() || self.start < 0.0 {
            return Err(TranscriptError::InvalidBounds {
                start: self.start,
                end: self.end,
            });
        }
        if self.end < self.start {
            return Err(TranscriptError::InvalidBounds {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Transcript loading error.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Segment ends before it starts ({start}s -> {end}s)")]
    InvalidBounds { start: f64, end: f64 },

    #[error("Invalid timecode: {0}")]
    Timecode(#[from] TimestampError),

    #[error("Invalid SubRip pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Transcript JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// SubRip (`.srt`) transcript parser.
pub struct SrtParser {
    time_pattern: Regex,
}

impl SrtParser {
    pub fn new() -> Result<Self, TranscriptError> {
        Ok(Self {
            time_pattern: Regex::new(
                r"(\d{1,2}:\d{2}:\d{2}[,.]\d{1,3})\s*-->\s*(\d{1,2}:\d{2}:\d{2}[,.]\d{1,3})",
            )?,
        })
    }

    /// Parse SubRip content into ordered transcript segments.
    ///
    /// Blocks without a timecode line are skipped.
    pub fn parse_content(&self, content: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let normalized = content.replace("\r\n", "\n");
        let mut segments = Vec::new();

        for block in normalized.split("\n\n") {
            if block.trim().is_empty() {
                continue;
            }
            match self.parse_block(block)? {
                Some(segment) => segments.push(segment),
                None => warn!(block = %block.trim(), "Skipping SubRip block without timecode"),
            }
        }

        Ok(segments)
    }

    fn parse_block(&self, block: &str) -> Result<Option<TranscriptSegment>, TranscriptError> {
        let mut lines = block.lines().map(str::trim).filter(|l| !l.is_empty());

        let mut time_line = None;
        for line in lines.by_ref() {
            if let Some(caps) = self.time_pattern.captures(line) {
                time_line = Some((caps[1].to_string(), caps[2].to_string()));
                break;
            }
        }

        let Some((start, end)) = time_line else {
            return Ok(None);
        };

        let text = lines.collect::<Vec<_>>().join(" ");
        let segment = TranscriptSegment::new(parse_srt_timecode(&start)?, parse_srt_timecode(&end)?, text);
        segment.validate()?;
        Ok(Some(segment))
    }
}

/// Parse SubRip content into transcript segments.
pub fn parse_srt(content: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
    SrtParser::new()?.parse_content(content)
}

/// Parse a JSON array of `{start, end, text}` objects.
pub fn parse_json(content: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
    let segments: Vec<TranscriptSegment> = serde_json::from_str(content)?;
    for segment in &segments {
        segment.validate()?;
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:00,000 --> 00:00:02,000\nHello\nworld\n\n2\n00:00:05,000 --> 00:00:07,500\nSecond line\n";

    #[test]
    fn test_parse_srt() {
        let segments = parse_srt(SAMPLE).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], TranscriptSegment::new(0.0, 2.0, "Hello world"));
        assert_eq!(segments[1].text, "Second line");
        assert!((segments[1].end - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_srt_crlf_and_garbage() {
        let content = "1\r\n00:00:01,000 --> 00:00:02,000\r\nA\r\n\r\nnot a block\r\n\r\n";
        let segments = parse_srt(content).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "A");
    }

    #[test]
    fn test_parse_srt_rejects_reversed_bounds() {
        let content = "1\n00:00:05,000 --> 00:00:02,000\nBackwards\n";
        assert!(matches!(
            parse_srt(content),
            Err(TranscriptError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_parse_json() {
        let json = r#"[{"start": 0.0, "end": 2.0, "text": "a"}, {"start": 5.0, "end": 7.0, "text": "b"}]"#;
        let segments = parse_json(json).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].duration(), 2.0);
    }
}
