//! Timestamp parsing and formatting utilities.
//!
//! Transcripts arrive with SubRip timecodes (`HH:MM:SS,mmm`); reports and
//! logs render seconds back as `HH:MM:SS` or `HH:MM:SS.mmm`.

/// Parse a SubRip timecode to total seconds.
///
/// Accepts `HH:MM:SS,mmm` and, leniently, `HH:MM:SS.mmm` or `HH:MM:SS`.
///
/// # Examples
/// ```
/// use synopsis_models::timestamp::parse_srt_timecode;
/// assert_eq!(parse_srt_timecode("00:01:30,000").unwrap(), 90.0);
/// assert_eq!(parse_srt_timecode("01:00:00,500").unwrap(), 3600.5);
/// ```
pub fn parse_srt_timecode(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let (clock, millis) = match ts.split_once([',', '.']) {
        Some((clock, millis)) => (clock, Some(millis)),
        None => (ts, None),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    let hours: u64 = parts[0]
        .parse()
        .map_err(|_| TimestampError::InvalidValue("hours", parts[0].to_string()))?;
    let minutes: u64 = parts[1]
        .parse()
        .map_err(|_| TimestampError::InvalidValue("minutes", parts[1].to_string()))?;
    let seconds: u64 = parts[2]
        .parse()
        .map_err(|_| TimestampError::InvalidValue("seconds", parts[2].to_string()))?;
    if minutes >= 60 || seconds >= 60 {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    let millis: u64 = match millis {
        Some(m) => m
            .parse()
            .map_err(|_| TimestampError::InvalidValue("milliseconds", m.to_string()))?,
        None => 0,
    };

    Ok((hours * 3600 + minutes * 60 + seconds) as f64 + millis as f64 / 1000.0)
}

/// Format seconds into HH:MM:SS or HH:MM:SS.mmm string.
pub fn format_seconds(total_secs: f64) -> String {
    let total_secs = total_secs.max(0.0);
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    if (secs - secs.floor()).abs() > 0.0001 {
        format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampError {
    /// Timestamp string is empty
    Empty,
    /// Invalid numeric value for a component
    InvalidValue(&'static str, String),
    /// Invalid timestamp format
    InvalidFormat(String),
}

impl std::fmt::Display for TimestampError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Timestamp cannot be empty"),
            Self::InvalidValue(component, value) => {
                write!(f, "Invalid {} value: {}", component, value)
            }
            Self::InvalidFormat(ts) => write!(
                f,
                "Invalid timestamp format '{}'. Use HH:MM:SS,mmm",
                ts
            ),
        }
    }
}

impl std::error::Error for TimestampError {}
