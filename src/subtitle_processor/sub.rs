/*!
 * SubViewer 2.0 (`.sub`) codec.
 *
 * The `[TAG]` preamble is kept verbatim as the header. Entries are a
 * `start,end` timing line followed by text, with `[br]` separating lines.
 */

use crate::errors::SubtitleError;

use super::{
    parse_error, parse_span, split_blocks, CodecOptions, SubtitleEntry, SubtitleFile,
    SubtitleFormat,
};

const LINE_BREAK: &str = "[br]";

pub(super) fn parse(
    text: &str,
    options: &CodecOptions,
) -> Result<(Option<String>, Vec<SubtitleEntry>), SubtitleError> {
    let grammar = options.grammar(SubtitleFormat::Sub);
    let lines: Vec<&str> = text.split('\n').collect();

    let preamble_len = lines
        .iter()
        .position(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('[')
        })
        .unwrap_or(lines.len());
    let preamble = lines[..preamble_len].join("\n");
    let header = Some(preamble.trim().to_string()).filter(|header| !header.is_empty());
    let block_offset = split_blocks(&preamble).len();

    let body = lines[preamble_len..].join("\n");
    let mut entries = Vec::new();

    for block in split_blocks(&body) {
        let number = block.number + block_offset;
        let mut rest = block.lines.as_slice();

        // A numeric index line is tolerated but not required
        if rest.len() > 1 && rest[0].trim().chars().all(|c| c.is_ascii_digit()) {
            rest = &rest[1..];
        }

        let (timing, text) = rest
            .split_first()
            .ok_or_else(|| parse_error(number, "missing timestamp line"))?;
        let (start, end) = timing
            .split_once(',')
            .ok_or_else(|| parse_error(number, "missing timestamp line"))?;
        let (start_ms, end_ms) = parse_span(grammar, start, end, number)?;

        let mut entry_lines: Vec<String> = text
            .iter()
            .copied()
            .flat_map(|line| line.split(LINE_BREAK))
            .map(str::to_string)
            .collect();
        if entry_lines.is_empty() {
            entry_lines.push(String::new());
        }

        entries.push(SubtitleEntry {
            index: entries.len() + 1,
            start_ms,
            end_ms,
            lines: entry_lines,
            fields: Vec::new(),
        });
    }

    Ok((header, entries))
}

pub(super) fn serialize(file: &SubtitleFile, options: &CodecOptions) -> Result<String, SubtitleError> {
    let grammar = options.grammar(SubtitleFormat::Sub);
    let mut blocks = Vec::with_capacity(file.entries.len() + 1);

    if let Some(header) = &file.header {
        blocks.push(format!("{}\n", header));
    }
    for entry in &file.entries {
        blocks.push(format!(
            "{},{}\n{}\n",
            grammar.format(entry.start_ms)?,
            grammar.format(entry.end_ms)?,
            entry.lines.join(LINE_BREAK),
        ));
    }

    Ok(blocks.join("\n"))
}
