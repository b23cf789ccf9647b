/*!
 * Tests for the subtitle codec across every supported format
 */

use proptest::prelude::*;

use subtrans::errors::SubtitleError;
use subtrans::subtitle_processor::timestamp::{format_timestamp, parse_timestamp};
use subtrans::subtitle_processor::{CodecOptions, SubtitleEntry, SubtitleFile, SubtitleFormat};

use crate::common;

fn parse(format: SubtitleFormat, content: &str) -> SubtitleFile {
    SubtitleFile::parse(format!("sample.{}", format), content, format, &CodecOptions::default()).unwrap()
}

#[test]
fn test_roundTrip_everyFormat_shouldKeepTimingAndText() {
    for format in SubtitleFormat::ALL {
        let original = parse(format, common::sample_for(format));
        assert!(!original.entries.is_empty(), "{} sample has no entries", format);

        let output = original.serialize(&CodecOptions::default()).unwrap();
        let reparsed = parse(format, &output);

        assert_eq!(reparsed.header, original.header, "{} header changed", format);
        assert_eq!(reparsed.entries.len(), original.entries.len());
        for (before, after) in original.entries.iter().zip(&reparsed.entries) {
            assert_eq!(after.start_ms, before.start_ms, "{} start changed", format);
            assert_eq!(after.end_ms, before.end_ms, "{} end changed", format);
            assert_eq!(after.lines, before.lines, "{} text changed", format);
            assert_eq!(after.fields, before.fields, "{} fields changed", format);
        }
    }
}

#[test]
fn test_serialize_srt_shouldReproduceCanonicalInput() {
    let file = parse(SubtitleFormat::Srt, common::SAMPLE_SRT);
    assert_eq!(file.serialize(&CodecOptions::default()).unwrap(), common::SAMPLE_SRT);
}

#[test]
fn test_parse_withCrlfAndBom_shouldMatchPlainInput() {
    let windows = format!("\u{feff}{}", common::SAMPLE_SRT.replace('\n', "\r\n"));
    let plain = parse(SubtitleFormat::Srt, common::SAMPLE_SRT);
    let decoded = parse(SubtitleFormat::Srt, &windows);
    assert_eq!(decoded.entries, plain.entries);
}

#[test]
fn test_parse_sampleTimings_shouldMatchExpectedMilliseconds() {
    let vtt = parse(SubtitleFormat::Vtt, common::SAMPLE_VTT);
    assert_eq!((vtt.entries[1].start_ms, vtt.entries[1].end_ms), (3000, 5250));
    assert_eq!(vtt.entries[1].lines, vec!["Second cue", "on two lines"]);

    let ass = parse(SubtitleFormat::Ass, common::SAMPLE_ASS);
    assert_eq!((ass.entries[0].start_ms, ass.entries[0].end_ms), (1000, 2500));
    assert_eq!(ass.entries[0].text(), "Hello, world");

    let stl = parse(SubtitleFormat::Stl, common::SAMPLE_STL);
    assert_eq!(stl.entries[0].end_ms, 2480);
    assert_eq!(stl.entries[0].lines, vec!["Hello", "World"]);
    assert_eq!(stl.entries[1].text(), "Second, with comma");

    let sub = parse(SubtitleFormat::Sub, common::SAMPLE_SUB);
    assert_eq!(sub.entries[0].lines, vec!["Hello", "World"]);
}

#[test]
fn test_parse_withMalformedSecondBlock_shouldReportBlockNumber() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nOk\n\n2\n00:00:03.000 --> 00:00:04,000\nBad\n";
    let err = SubtitleFile::parse("bad.srt", content, SubtitleFormat::Srt, &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, SubtitleError::ParseError { block: 2, .. }));
}

#[test]
fn test_withEntries_shouldKeepHeaderAndFormat() {
    let file = parse(SubtitleFormat::Vtt, common::SAMPLE_VTT);
    let replaced = file.with_entries(vec![SubtitleEntry::new(1, 0, 500, "Only")]);
    assert_eq!(replaced.header, file.header);
    assert_eq!(replaced.format, SubtitleFormat::Vtt);

    let output = replaced.serialize(&CodecOptions::default()).unwrap();
    assert!(output.starts_with("WEBVTT"));
    assert!(output.contains("00:00:00.000 --> 00:00:00.500\nOnly"));
}

#[test]
fn test_timestampHelpers_shouldAgreeAcrossFormats() {
    for format in SubtitleFormat::ALL {
        let text = format_timestamp(3_723_040, format, 25).unwrap();
        assert_eq!(parse_timestamp(&text, format, 25).unwrap(), 3_723_040, "{}", format);
    }
}

#[test]
fn test_roundTrip_withBlankLinesInText_shouldKeepOneBlockPerEntry() {
    for format in SubtitleFormat::ALL {
        let entries = vec![
            SubtitleEntry::new(1, 1000, 2000, "First\n\n  \nparagraph"),
            SubtitleEntry::new(2, 3000, 4000, "Second"),
        ];
        let file = SubtitleFile::new(format!("blank.{}", format), format).with_entries(entries);

        let output = file.serialize(&CodecOptions::default()).unwrap();
        let reparsed = parse(format, &output);

        assert_eq!(reparsed.entries.len(), 2, "{} split an entry", format);
        assert_eq!(reparsed.entries[0].lines, vec!["First", "paragraph"], "{}", format);
        assert_eq!(reparsed.entries[1].lines, vec!["Second"], "{}", format);
    }
}

fn subtitle_line() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[A-Za-z][A-Za-z0-9 ,.!?']{0,30}[A-Za-z0-9.!?]",
        1 => "[ \t]{0,4}",
    ]
}

fn subtitle_format() -> impl Strategy<Value = SubtitleFormat> {
    prop::sample::select(SubtitleFormat::ALL.to_vec())
}

proptest! {
    // Timings are whole 25fps frames so every format can represent them exactly
    #[test]
    fn test_roundTrip_withArbitraryEntries_shouldPreserveTimingAndText(
        format in subtitle_format(),
        raw in prop::collection::vec(
            (0u64..8_975_000, 0u64..250, prop::collection::vec(subtitle_line(), 1..4)),
            1..8,
        )
    ) {
        let entries: Vec<SubtitleEntry> = raw
            .iter()
            .enumerate()
            .map(|(i, (frame, frames, lines))| {
                SubtitleEntry::new(i + 1, frame * 40, (frame + frames) * 40, &lines.join("\n"))
            })
            .collect();
        let filename = format!("prop.{}", format);
        let file = SubtitleFile::new(filename.as_str(), format).with_entries(entries.clone());

        let output = file.serialize(&CodecOptions::default()).unwrap();
        let reparsed = SubtitleFile::parse(filename.as_str(), &output, format, &CodecOptions::default()).unwrap();

        prop_assert_eq!(reparsed.entries.len(), entries.len());
        for (after, before) in reparsed.entries.iter().zip(&entries) {
            prop_assert_eq!(after.start_ms, before.start_ms);
            prop_assert_eq!(after.end_ms, before.end_ms);
            prop_assert_eq!(&after.lines, &before.lines);
        }
    }
}
