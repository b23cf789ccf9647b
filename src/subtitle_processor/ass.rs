/*!
 * Advanced SubStation Alpha (`.ass`) codec.
 *
 * Everything up to and including the `Format:` line of the `[Events]`
 * section is kept verbatim as the file header. Each `Dialogue:` line becomes
 * one entry; its non-timing columns are stored in `SubtitleEntry::fields`.
 * Errors report the 1-based line number as the block.
 */

use crate::errors::SubtitleError;

use super::{parse_error, CodecOptions, SubtitleEntry, SubtitleFile, SubtitleFormat};

const EVENTS_SECTION: &str = "[Events]";
const FORMAT_PREFIX: &str = "Format:";
const DIALOGUE_PREFIX: &str = "Dialogue:";
const LINE_BREAK: &str = "\\N";

const DEFAULT_HEADER: &str = "[Script Info]
ScriptType: v4.00+
PlayResX: 384
PlayResY: 288

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Column layout of the `[Events]` section
#[derive(Debug)]
struct EventLayout {
    columns: Vec<String>,
    start: usize,
    end: usize,
}

impl EventLayout {
    fn from_format_line(line: &str, line_number: usize) -> Result<Self, SubtitleError> {
        let columns: Vec<String> = line[FORMAT_PREFIX.len()..]
            .split(',')
            .map(|column| column.trim().to_string())
            .collect();

        let find = |name: &str| {
            columns
                .iter()
                .position(|column| column.eq_ignore_ascii_case(name))
                .ok_or_else(|| parse_error(line_number, format!("event format has no {} column", name)))
        };
        let start = find("Start")?;
        let end = find("End")?;
        let text = find("Text")?;
        if text != columns.len() - 1 {
            return Err(parse_error(line_number, "Text must be the last event column"));
        }

        Ok(Self { columns, start, end })
    }

    fn text_column(&self) -> usize {
        self.columns.len() - 1
    }

    fn is_timing(&self, column: usize) -> bool {
        column == self.start || column == self.end || column == self.text_column()
    }

    /// Value written for a column an entry has no stored field for
    fn default_value(name: &str) -> &'static str {
        match name.to_ascii_lowercase().as_str() {
            "layer" => "0",
            "style" => "Default",
            "marginl" | "marginr" | "marginv" => "0",
            "marked" => "Marked=0",
            _ => "",
        }
    }
}

/// Locate the events `Format:` line in a block of lines
fn find_layout<'a, I>(lines: I) -> Result<Option<(usize, EventLayout)>, SubtitleError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut in_events = false;
    for (position, line) in lines {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_events = trimmed.eq_ignore_ascii_case(EVENTS_SECTION);
        } else if in_events && trimmed.starts_with(FORMAT_PREFIX) {
            return Ok(Some((position, EventLayout::from_format_line(trimmed, position + 1)?)));
        }
    }
    Ok(None)
}

pub(super) fn parse(
    text: &str,
    options: &CodecOptions,
) -> Result<(Option<String>, Vec<SubtitleEntry>), SubtitleError> {
    let grammar = options.grammar(SubtitleFormat::Ass);
    let lines: Vec<&str> = text.split('\n').map(str::trim_end).collect();

    let (format_position, layout) = find_layout(lines.iter().copied().enumerate())?
        .ok_or_else(|| parse_error(1, "missing [Events] section or Format line"))?;
    let header = lines[..=format_position].join("\n");

    let mut entries = Vec::new();
    for (position, line) in lines.iter().enumerate().skip(format_position + 1) {
        let line_number = position + 1;
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            // Sections after [Events] (fonts, graphics) are not carried
            break;
        }
        let Some(body) = trimmed.strip_prefix(DIALOGUE_PREFIX) else {
            continue;
        };

        let values: Vec<&str> = body.trim_start().splitn(layout.columns.len(), ',').collect();
        if values.len() != layout.columns.len() {
            return Err(parse_error(line_number, "unbalanced block"));
        }

        let start_ms = grammar
            .parse(values[layout.start])
            .map_err(|e| parse_error(line_number, e.to_string()))?;
        let end_ms = grammar
            .parse(values[layout.end])
            .map_err(|e| parse_error(line_number, e.to_string()))?;
        if end_ms < start_ms {
            return Err(parse_error(line_number, "end time precedes start time"));
        }

        let fields = values
            .iter()
            .enumerate()
            .filter(|(column, _)| !layout.is_timing(*column))
            .map(|(_, value)| value.to_string())
            .collect();

        entries.push(SubtitleEntry {
            index: entries.len() + 1,
            start_ms,
            end_ms,
            lines: values[layout.text_column()]
                .split(LINE_BREAK)
                .map(str::to_string)
                .collect(),
            fields,
        });
    }

    Ok((Some(header), entries))
}

pub(super) fn serialize(file: &SubtitleFile, options: &CodecOptions) -> Result<String, SubtitleError> {
    let grammar = options.grammar(SubtitleFormat::Ass);
    let header = file.header.as_deref().unwrap_or(DEFAULT_HEADER);
    let (_, layout) = find_layout(header.split('\n').enumerate())?
        .ok_or_else(|| parse_error(1, "missing [Events] section or Format line"))?;
    let stored_columns = layout.columns.len() - 3;

    let mut output = format!("{}\n", header.trim_end());
    for entry in &file.entries {
        let mut stored = entry.fields.iter();
        let use_stored = entry.fields.len() == stored_columns;

        let values: Vec<String> = layout
            .columns
            .iter()
            .enumerate()
            .map(|(column, name)| -> Result<String, SubtitleError> {
                if column == layout.start {
                    Ok(grammar.format(entry.start_ms)?)
                } else if column == layout.end {
                    Ok(grammar.format(entry.end_ms)?)
                } else if column == layout.text_column() {
                    Ok(entry.lines.join(LINE_BREAK))
                } else if use_stored {
                    Ok(stored.next().cloned().unwrap_or_default())
                } else {
                    Ok(EventLayout::default_value(name).to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        output.push_str(&format!("{} {}\n", DIALOGUE_PREFIX, values.join(",")));
    }

    Ok(output)
}
