/*!
 * Timestamp codec.
 *
 * Converts between canonical milliseconds and the timestamp grammars of the
 * supported subtitle containers. Each grammar is strict: a VTT timestamp is
 * rejected when parsed as SRT and vice versa.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::errors::TimestampError;
use super::SubtitleFormat;

// @const: Largest hour value any grammar can carry
pub const MAX_HOURS: u64 = 99;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_HOUR: u64 = 3_600_000;

static SRT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2}),(\d{3})$").unwrap()
});

static VTT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d{2}):)?(\d{2}):(\d{2})\.(\d{3})$").unwrap()
});

static ASS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2})\.(\d{2})$").unwrap()
});

static SUB_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})[.:](\d{2})$").unwrap()
});

static SBV_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2})\.(\d{3})$").unwrap()
});

static STL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2}):(\d{2})$").unwrap()
});

/// Timestamp grammar of one subtitle container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampGrammar {
    /// `HH:MM:SS,mmm`
    Srt,
    /// `[HH:]MM:SS.mmm`
    Vtt,
    /// `H:MM:SS.cc`
    Ass,
    /// `HH:MM:SS.cc`
    Sub,
    /// `H:MM:SS.mmm`
    Sbv,
    /// `HH:MM:SS:FF` at the given frame rate
    Stl {
        /// Frames per second
        frame_rate: u32,
    },
}

impl TimestampGrammar {
    /// Grammar used by a subtitle format
    pub fn for_format(format: SubtitleFormat, frame_rate: u32) -> Self {
        match format {
            SubtitleFormat::Srt => Self::Srt,
            SubtitleFormat::Vtt => Self::Vtt,
            SubtitleFormat::Ass => Self::Ass,
            SubtitleFormat::Sub => Self::Sub,
            SubtitleFormat::Sbv => Self::Sbv,
            SubtitleFormat::Stl => Self::Stl { frame_rate },
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Ass => "ass",
            Self::Sub => "sub",
            Self::Sbv => "sbv",
            Self::Stl { .. } => "stl",
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            Self::Srt => &SRT_REGEX,
            Self::Vtt => &VTT_REGEX,
            Self::Ass => &ASS_REGEX,
            Self::Sub => &SUB_REGEX,
            Self::Sbv => &SBV_REGEX,
            Self::Stl { .. } => &STL_REGEX,
        }
    }

    fn malformed(&self, input: &str) -> TimestampError {
        TimestampError::MalformedTimestamp {
            input: input.to_string(),
            format: self.name().to_string(),
        }
    }

    /// Parse a timestamp into milliseconds
    pub fn parse(&self, input: &str) -> Result<u64, TimestampError> {
        let trimmed = input.trim();
        let caps = self.regex()
            .captures(trimmed)
            .ok_or_else(|| self.malformed(input))?;

        let hours = capture_u64(&caps, 1);
        let minutes = capture_u64(&caps, 2);
        let seconds = capture_u64(&caps, 3);
        let fraction = capture_u64(&caps, 4);

        if minutes >= 60 || seconds >= 60 {
            return Err(self.malformed(input));
        }

        let fraction_ms = match *self {
            Self::Srt | Self::Vtt | Self::Sbv => fraction,
            Self::Ass | Self::Sub => fraction * 10,
            Self::Stl { frame_rate } => {
                let frame_rate = u64::from(frame_rate);
                if frame_rate == 0 || fraction >= frame_rate {
                    return Err(self.malformed(input));
                }
                (fraction * MS_PER_SECOND + frame_rate / 2) / frame_rate
            }
        };

        Ok(hours * MS_PER_HOUR + minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + fraction_ms)
    }

    /// Format milliseconds as a timestamp of this grammar
    pub fn format(&self, ms: u64) -> Result<String, TimestampError> {
        let hours = ms / MS_PER_HOUR;
        if hours > MAX_HOURS {
            return Err(TimestampError::TimestampOutOfRange {
                value: i64::try_from(ms).unwrap_or(i64::MAX),
            });
        }
        let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
        let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
        let millis = ms % MS_PER_SECOND;

        let formatted = match *self {
            Self::Srt => format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis),
            Self::Vtt => format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis),
            Self::Ass => format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, millis / 10),
            Self::Sub => format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, seconds, millis / 10),
            Self::Sbv => format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis),
            Self::Stl { frame_rate } => {
                let frame_rate = u64::from(frame_rate);
                if frame_rate == 0 {
                    return Err(TimestampError::TimestampOutOfRange {
                        value: i64::try_from(ms).unwrap_or(i64::MAX),
                    });
                }
                let frames = ((millis * frame_rate + MS_PER_SECOND / 2) / MS_PER_SECOND)
                    .min(frame_rate - 1);
                format!("{:02}:{:02}:{:02}:{:02}", hours, minutes, seconds, frames)
            }
        };

        Ok(formatted)
    }
}

fn capture_u64(caps: &Captures, index: usize) -> u64 {
    caps.get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Parse a timestamp in the grammar of `format`
pub fn parse_timestamp(input: &str, format: SubtitleFormat, frame_rate: u32) -> Result<u64, TimestampError> {
    TimestampGrammar::for_format(format, frame_rate).parse(input)
}

/// Format milliseconds in the grammar of `format`
pub fn format_timestamp(ms: u64, format: SubtitleFormat, frame_rate: u32) -> Result<String, TimestampError> {
    TimestampGrammar::for_format(format, frame_rate).format(ms)
}

/// Convert an externally supplied signed value into canonical milliseconds
pub fn from_signed_ms(value: i64) -> Result<u64, TimestampError> {
    let ms = u64::try_from(value)
        .map_err(|_| TimestampError::TimestampOutOfRange { value })?;
    if ms / MS_PER_HOUR > MAX_HOURS {
        return Err(TimestampError::TimestampOutOfRange { value });
    }
    Ok(ms)
}
