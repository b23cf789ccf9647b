/*!
 * WebVTT (`.vtt`) codec.
 *
 * The `WEBVTT` header block is kept verbatim. `NOTE`, `STYLE` and `REGION`
 * blocks are skipped, cue identifiers and cue settings are dropped.
 */

use crate::errors::SubtitleError;

use super::{
    parse_error, parse_span, split_blocks, text_lines, CodecOptions, SubtitleEntry, SubtitleFile,
    SubtitleFormat,
};

const ARROW: &str = "-->";
const SIGNATURE: &str = "WEBVTT";
const SKIPPED_BLOCKS: [&str; 3] = ["NOTE", "STYLE", "REGION"];

pub(super) fn parse(
    text: &str,
    options: &CodecOptions,
) -> Result<(Option<String>, Vec<SubtitleEntry>), SubtitleError> {
    let grammar = options.grammar(SubtitleFormat::Vtt);
    let blocks = split_blocks(text);

    let header_block = blocks
        .first()
        .filter(|block| block.lines[0].starts_with(SIGNATURE))
        .ok_or_else(|| parse_error(1, "missing WEBVTT header"))?;
    let header = header_block.lines.join("\n");

    let mut entries = Vec::new();
    for block in blocks.iter().skip(1) {
        let first = block.lines[0];
        if SKIPPED_BLOCKS
            .iter()
            .any(|keyword| first == *keyword || first.starts_with(&format!("{} ", keyword)))
        {
            continue;
        }

        let mut lines = block.lines.iter().copied();
        let timing = if first.contains(ARROW) {
            lines.next();
            first
        } else {
            lines.next();
            lines
                .next()
                .filter(|line| line.contains(ARROW))
                .ok_or_else(|| parse_error(block.number, "missing timestamp line"))?
        };

        let (start, rest) = timing
            .split_once(ARROW)
            .ok_or_else(|| parse_error(block.number, "missing timestamp line"))?;
        // Cue settings follow the end timestamp
        let end = rest.split_whitespace().next().unwrap_or("");
        let (start_ms, end_ms) = parse_span(grammar, start, end, block.number)?;

        let body: Vec<&str> = lines.collect();
        entries.push(SubtitleEntry {
            index: entries.len() + 1,
            start_ms,
            end_ms,
            lines: text_lines(&body),
            fields: Vec::new(),
        });
    }

    Ok((Some(header), entries))
}

pub(super) fn serialize(file: &SubtitleFile, options: &CodecOptions) -> Result<String, SubtitleError> {
    let grammar = options.grammar(SubtitleFormat::Vtt);
    let header = file.header.as_deref().unwrap_or(SIGNATURE);

    let mut output = format!("{}\n", header);
    for entry in &file.entries {
        output.push_str(&format!(
            "\n{} {} {}\n{}\n",
            grammar.format(entry.start_ms)?,
            ARROW,
            grammar.format(entry.end_ms)?,
            entry.lines.join("\n"),
        ));
    }

    Ok(output)
}
