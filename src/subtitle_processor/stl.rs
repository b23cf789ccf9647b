/*!
 * Spruce STL (`.stl`) codec.
 *
 * Each entry is one line `start , end , text` with frame-based timestamps;
 * `|` separates text lines. Leading `$` directives and `//` comments are
 * kept verbatim as the header.
 */

use crate::errors::SubtitleError;

use super::{parse_error, CodecOptions, SubtitleEntry, SubtitleFile, SubtitleFormat};

const LINE_BREAK: &str = "|";

fn is_preamble(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('$') || trimmed.starts_with("//")
}

pub(super) fn parse(
    text: &str,
    options: &CodecOptions,
) -> Result<(Option<String>, Vec<SubtitleEntry>), SubtitleError> {
    let grammar = options.grammar(SubtitleFormat::Stl);
    let lines: Vec<&str> = text.split('\n').map(str::trim_end).collect();

    let preamble_len = lines
        .iter()
        .position(|line| !is_preamble(line))
        .unwrap_or(lines.len());
    let header = Some(lines[..preamble_len].join("\n").trim().to_string())
        .filter(|header| !header.is_empty());

    let mut entries = Vec::new();
    for (position, line) in lines.iter().enumerate().skip(preamble_len) {
        let line_number = position + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }

        let parts: Vec<&str> = trimmed.splitn(3, ',').collect();
        if parts.len() != 3 {
            return Err(parse_error(line_number, "expected 'start , end , text'"));
        }
        let start_ms = grammar
            .parse(parts[0])
            .map_err(|e| parse_error(line_number, e.to_string()))?;
        let end_ms = grammar
            .parse(parts[1])
            .map_err(|e| parse_error(line_number, e.to_string()))?;
        if end_ms < start_ms {
            return Err(parse_error(line_number, "end time precedes start time"));
        }

        entries.push(SubtitleEntry {
            index: entries.len() + 1,
            start_ms,
            end_ms,
            lines: parts[2]
                .trim()
                .split(LINE_BREAK)
                .map(str::to_string)
                .collect(),
            fields: Vec::new(),
        });
    }

    Ok((header, entries))
}

pub(super) fn serialize(file: &SubtitleFile, options: &CodecOptions) -> Result<String, SubtitleError> {
    let grammar = options.grammar(SubtitleFormat::Stl);
    let mut output = String::new();

    if let Some(header) = &file.header {
        output.push_str(header);
        output.push_str("\n\n");
    }
    for entry in &file.entries {
        output.push_str(&format!(
            "{} , {} , {}\n",
            grammar.format(entry.start_ms)?,
            grammar.format(entry.end_ms)?,
            entry.lines.join(LINE_BREAK),
        ));
    }

    Ok(output)
}
