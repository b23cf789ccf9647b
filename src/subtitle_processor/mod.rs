/*!
 * Subtitle codec.
 *
 * Parses raw subtitle text into an ordered list of entries and serializes
 * entries back to format-exact text. Supported containers:
 *
 * - `srt`: SubRip
 * - `vtt`: WebVTT
 * - `ass`: Advanced SubStation Alpha
 * - `sub`: SubViewer 2.0
 * - `sbv`: YouTube SBV
 * - `stl`: Spruce STL
 *
 * Entries are kept in file order; the codec never reorders them. Parsing
 * then serializing an unmodified file reproduces the same timestamps and
 * text, with indices renumbered from 1.
 */

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;

pub mod timestamp;

mod ass;
mod sbv;
mod srt;
mod stl;
mod sub;
mod vtt;

pub use timestamp::TimestampGrammar;

// @const: Default frame rate for frame-based timestamps
pub const DEFAULT_FRAME_RATE: u32 = 25;

/// Supported subtitle container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    Srt,
    Vtt,
    Ass,
    Sub,
    Sbv,
    Stl,
}

impl SubtitleFormat {
    /// Every supported format
    pub const ALL: [SubtitleFormat; 6] = [
        Self::Srt,
        Self::Vtt,
        Self::Ass,
        Self::Sub,
        Self::Sbv,
        Self::Stl,
    ];

    /// File extension (without dot)
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Ass => "ass",
            Self::Sub => "sub",
            Self::Sbv => "sbv",
            Self::Stl => "stl",
        }
    }

    /// Detect the format from a file name or path extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .ok_or_else(|| SubtitleError::UnknownFormat(path.display().to_string()))?;
        extension.parse()
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('.').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extension() == normalized)
            .ok_or_else(|| SubtitleError::UnknownFormat(s.to_string()))
    }
}

/// Options that influence parsing and serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Frame rate used for frame-based timestamps (STL)
    pub frame_rate: u32,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

impl CodecOptions {
    /// Timestamp grammar for a format under these options
    pub fn grammar(&self, format: SubtitleFormat) -> TimestampGrammar {
        TimestampGrammar::for_format(format, self.frame_rate)
    }
}

/// Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    /// Sequence number assigned by the source file
    pub index: usize,

    /// Start time in ms
    pub start_ms: u64,

    /// End time in ms
    pub end_ms: u64,

    /// Text lines, in display order; never empty
    pub lines: Vec<String>,

    /// Format-specific event fields other than timing and text, in column
    /// order (ASS `Layer`, `Style`, ...). Empty for other formats.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl SubtitleEntry {
    /// Creates a new entry; `text` is split into lines on `\n`
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: &str) -> Self {
        Self {
            index,
            start_ms,
            end_ms,
            lines: split_lines(text),
            fields: Vec::new(),
        }
    }

    // @creates: Validated subtitle entry
    // @validates: end_ms >= start_ms
    pub fn new_validated(index: usize, start_ms: u64, end_ms: u64, text: &str) -> Result<Self, SubtitleError> {
        let entry = Self::new(index, start_ms, end_ms, text);
        entry.validate()?;
        Ok(entry)
    }

    /// Check the timing invariant
    pub fn validate(&self) -> Result<(), SubtitleError> {
        if self.end_ms < self.start_ms {
            return Err(SubtitleError::InvalidEntry {
                index: self.index,
                reason: format!("end time {} precedes start time {}", self.end_ms, self.start_ms),
            });
        }
        Ok(())
    }

    /// Text with lines joined by `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the text, splitting it into lines on `\n`
    pub fn set_text(&mut self, text: &str) {
        self.lines = split_lines(text);
    }

    /// Whether the entry carries no visible text
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }
}

/// Split text into display lines, dropping blank ones
///
/// Every format treats a blank line as a block separator, so an entry never
/// stores one. Text with no visible line becomes a single empty line.
fn split_lines(text: &str) -> Vec<String> {
    let lines: Vec<String> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if lines.is_empty() { vec![String::new()] } else { lines }
}

/// A parsed subtitle file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleFile {
    /// Name of the file the entries came from
    pub filename: String,

    /// Container format
    pub format: SubtitleFormat,

    /// Verbatim preamble kept for formats that carry one (VTT header, ASS
    /// script info and styles, SubViewer tags, STL directives)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    /// Entries in file order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleFile {
    /// Create an empty file
    pub fn new(filename: impl Into<String>, format: SubtitleFormat) -> Self {
        Self {
            filename: filename.into(),
            format,
            header: None,
            entries: Vec::new(),
        }
    }

    /// Parse decoded text in the declared format
    pub fn parse(
        filename: impl Into<String>,
        content: &str,
        format: SubtitleFormat,
        options: &CodecOptions,
    ) -> Result<Self, SubtitleError> {
        let filename = filename.into();
        let text = normalize_line_endings(content);

        let (header, entries) = match format {
            SubtitleFormat::Srt => srt::parse(&text, options)?,
            SubtitleFormat::Vtt => vtt::parse(&text, options)?,
            SubtitleFormat::Ass => ass::parse(&text, options)?,
            SubtitleFormat::Sub => sub::parse(&text, options)?,
            SubtitleFormat::Sbv => sbv::parse(&text, options)?,
            SubtitleFormat::Stl => stl::parse(&text, options)?,
        };

        debug!("Parsed {} {} entries from {}", entries.len(), format, filename);

        Ok(Self {
            filename,
            format,
            header,
            entries,
        })
    }

    /// Parse a file on disk, detecting the format from its extension
    pub fn parse_path<P: AsRef<Path>>(path: P, options: &CodecOptions) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let format = SubtitleFormat::from_path(path)?;
        let content = std::fs::read(path).map_err(|e| SubtitleError::ParseError {
            block: 1,
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::parse(name, &crate::file_utils::decode_text(&content), format, options)
    }

    /// Serialize to format-exact text
    pub fn serialize(&self, options: &CodecOptions) -> Result<String, SubtitleError> {
        for entry in &self.entries {
            entry.validate()?;
        }

        match self.format {
            SubtitleFormat::Srt => srt::serialize(self, options),
            SubtitleFormat::Vtt => vtt::serialize(self, options),
            SubtitleFormat::Ass => ass::serialize(self, options),
            SubtitleFormat::Sub => sub::serialize(self, options),
            SubtitleFormat::Sbv => sbv::serialize(self, options),
            SubtitleFormat::Stl => stl::serialize(self, options),
        }
    }

    /// Copy of this file carrying different entries
    pub fn with_entries(&self, entries: Vec<SubtitleEntry>) -> Self {
        Self {
            filename: self.filename.clone(),
            format: self.format,
            header: self.header.clone(),
            entries,
        }
    }
}

impl fmt::Display for SubtitleFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle File")?;
        writeln!(f, "Name: {}", self.filename)?;
        writeln!(f, "Format: {}", self.format)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}

// @normalizes: CRLF/CR line endings and a leading BOM
pub(crate) fn normalize_line_endings(content: &str) -> String {
    content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// A run of non-blank lines
pub(crate) struct Block<'a> {
    /// 1-based position of the block in the file
    pub number: usize,
    /// Lines with trailing whitespace removed
    pub lines: Vec<&'a str>,
}

/// Split normalized text into blocks separated by blank lines
pub(crate) fn split_blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(Block {
                    number: blocks.len() + 1,
                    lines: std::mem::take(&mut current),
                });
            }
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        blocks.push(Block {
            number: blocks.len() + 1,
            lines: current,
        });
    }

    blocks
}

pub(crate) fn parse_error(block: usize, reason: impl Into<String>) -> SubtitleError {
    SubtitleError::ParseError {
        block,
        reason: reason.into(),
    }
}

/// Parse a `start <sep> end` pair with the given grammar
pub(crate) fn parse_span(
    grammar: TimestampGrammar,
    start: &str,
    end: &str,
    block: usize,
) -> Result<(u64, u64), SubtitleError> {
    let start_ms = grammar.parse(start).map_err(|e| parse_error(block, e.to_string()))?;
    let end_ms = grammar.parse(end).map_err(|e| parse_error(block, e.to_string()))?;
    if end_ms < start_ms {
        return Err(parse_error(block, "end time precedes start time"));
    }
    Ok((start_ms, end_ms))
}

/// Text lines of an entry; an entry without text keeps one empty line
pub(crate) fn text_lines(lines: &[&str]) -> Vec<String> {
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines.iter().map(|line| line.to_string()).collect()
    }
}
