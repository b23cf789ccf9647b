/*!
 * SubRip (`.srt`) codec.
 */

use crate::errors::SubtitleError;

use super::{
    parse_error, parse_span, split_blocks, text_lines, CodecOptions, SubtitleEntry, SubtitleFile,
    SubtitleFormat,
};

const ARROW: &str = "-->";

pub(super) fn parse(
    text: &str,
    options: &CodecOptions,
) -> Result<(Option<String>, Vec<SubtitleEntry>), SubtitleError> {
    let grammar = options.grammar(SubtitleFormat::Srt);
    let mut entries = Vec::new();

    for block in split_blocks(text) {
        let mut lines = block.lines.iter().copied();
        let first = lines
            .next()
            .ok_or_else(|| parse_error(block.number, "empty block"))?;

        // The sequence number is optional; some writers omit it
        let (index, timing) = if first.contains(ARROW) {
            (entries.len() + 1, first)
        } else {
            let index = first
                .trim()
                .parse::<usize>()
                .map_err(|_| parse_error(block.number, format!("invalid sequence number '{}'", first.trim())))?;
            let timing = lines
                .next()
                .filter(|line| line.contains(ARROW))
                .ok_or_else(|| parse_error(block.number, "missing timestamp line"))?;
            (index, timing)
        };

        let (start, end) = timing
            .split_once(ARROW)
            .ok_or_else(|| parse_error(block.number, "missing timestamp line"))?;
        // Anything after the end timestamp (legacy position hints) is ignored
        let end = end.split_whitespace().next().unwrap_or("");
        let (start_ms, end_ms) = parse_span(grammar, start, end, block.number)?;

        let body: Vec<&str> = lines.collect();
        entries.push(SubtitleEntry {
            index,
            start_ms,
            end_ms,
            lines: text_lines(&body),
            fields: Vec::new(),
        });
    }

    Ok((None, entries))
}

pub(super) fn serialize(file: &SubtitleFile, options: &CodecOptions) -> Result<String, SubtitleError> {
    let grammar = options.grammar(SubtitleFormat::Srt);
    let mut blocks = Vec::with_capacity(file.entries.len());

    for (position, entry) in file.entries.iter().enumerate() {
        blocks.push(format!(
            "{}\n{} {} {}\n{}\n",
            position + 1,
            grammar.format(entry.start_ms)?,
            ARROW,
            grammar.format(entry.end_ms)?,
            entry.lines.join("\n"),
        ));
    }

    Ok(blocks.join("\n"))
}
