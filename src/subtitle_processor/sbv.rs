/*!
 * YouTube SBV (`.sbv`) codec.
 */

use crate::errors::SubtitleError;

use super::{
    parse_error, parse_span, split_blocks, text_lines, CodecOptions, SubtitleEntry, SubtitleFile,
    SubtitleFormat,
};

pub(super) fn parse(
    text: &str,
    options: &CodecOptions,
) -> Result<(Option<String>, Vec<SubtitleEntry>), SubtitleError> {
    let grammar = options.grammar(SubtitleFormat::Sbv);
    let mut entries = Vec::new();

    for block in split_blocks(text) {
        let (timing, body) = block
            .lines
            .split_first()
            .ok_or_else(|| parse_error(block.number, "empty block"))?;
        let (start, end) = timing
            .split_once(',')
            .ok_or_else(|| parse_error(block.number, "missing timestamp line"))?;
        let (start_ms, end_ms) = parse_span(grammar, start, end, block.number)?;

        entries.push(SubtitleEntry {
            index: entries.len() + 1,
            start_ms,
            end_ms,
            lines: text_lines(body),
            fields: Vec::new(),
        });
    }

    Ok((None, entries))
}

pub(super) fn serialize(file: &SubtitleFile, options: &CodecOptions) -> Result<String, SubtitleError> {
    let grammar = options.grammar(SubtitleFormat::Sbv);
    let mut blocks = Vec::with_capacity(file.entries.len());

    for entry in &file.entries {
        blocks.push(format!(
            "{},{}\n{}\n",
            grammar.format(entry.start_ms)?,
            grammar.format(entry.end_ms)?,
            entry.lines.join("\n"),
        ));
    }

    Ok(blocks.join("\n"))
}
