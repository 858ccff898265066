//! Summation of a newline-delimited file of numbers
//!
//! One number per line. Blank lines are ignored silently; any other line
//! that does not parse as a float is logged and skipped. Values are added
//! in file order with plain `f64` addition.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use crate::error::Result;

/// A line that was not a number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number
    pub line_number: usize,
    /// Offending text, trimmed
    pub text: String,
}

/// Outcome of scanning an addend stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SumReport {
    pub total: f64,
    pub skipped: Vec<SkippedLine>,
}

/// Sum every numeric line of `reader`
///
/// `\n`, `\r\n` and a lone `\r` all end a line. Only fails when the reader
/// itself fails. Lines that are not valid UTF-8 are treated like any other
/// unparsable line.
pub fn sum_lines<R: BufRead>(mut reader: R) -> std::io::Result<SumReport> {
    let mut report = SumReport::default();
    let mut buf = Vec::new();
    let mut line_number = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        // A chunk ends at the first `\n`, so a `\r\n` pair never straddles two chunks
        for raw in split_lines(&buf) {
            line_number += 1;

            let line = String::from_utf8_lossy(raw);
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }

            match parse_number(stripped) {
                Some(value) => report.total += value,
                None => {
                    tracing::warn!(
                        "Line {} is not a valid number: '{}', skipping",
                        line_number,
                        stripped
                    );
                    report.skipped.push(SkippedLine {
                        line_number,
                        text: stripped.to_string(),
                    });
                }
            }
        }
    }

    Ok(report)
}

/// Split on `\r\n`, `\r` and `\n`, dropping the terminators
fn split_lines(chunk: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chunk.len() {
        match chunk[i] {
            b'\r' => {
                lines.push(&chunk[start..i]);
                if chunk.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            b'\n' => {
                lines.push(&chunk[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if start < chunk.len() {
        lines.push(&chunk[start..]);
    }
    lines
}

/// Parse a trimmed line as `f64`
///
/// Single underscores between digits are accepted as digit separators
/// (`1_000`, `0.000_1`); any other underscore makes the line invalid.
fn parse_number(text: &str) -> Option<f64> {
    if !text.contains('_') {
        return text.parse().ok();
    }

    let bytes = text.as_bytes();
    let mut digits = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        if c == '_' {
            let before = i.checked_sub(1).map(|j| bytes[j]);
            let after = bytes.get(i + 1).copied();
            let is_digit = |b: Option<u8>| b.is_some_and(|b| b.is_ascii_digit());
            if !is_digit(before) || !is_digit(after) {
                return None;
            }
        } else {
            digits.push(c);
        }
    }
    digits.parse().ok()
}

/// Render a sum the way it is stored in the output object
///
/// Shortest round-trip digits, integral values keep a trailing `.0`, and
/// very large or very small magnitudes switch to exponent notation
/// (`1e+16`, `1.5e-05`).
pub fn format_sum(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    // `{:e}` yields the shortest mantissa, e.g. "1.5e-5"
    let sci = format!("{:e}", value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if (-4..16).contains(&exponent) {
        let plain = value.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// Sums an input file and writes the result to an output file
#[derive(Debug, Clone)]
pub struct SumTask {
    input_path: PathBuf,
    output_path: PathBuf,
}

impl SumTask {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }

    /// Sum the input file, overwrite the output file with the result and
    /// return the total
    pub fn run(&self) -> Result<f64> {
        let input = File::open(&self.input_path)?;
        let report = sum_lines(BufReader::new(input))?;

        if !report.skipped.is_empty() {
            tracing::debug!(
                "Skipped {} invalid line(s) in {}",
                report.skipped.len(),
                self.input_path.display()
            );
        }

        std::fs::write(&self.output_path, format_sum(report.total))?;
        tracing::info!(
            "Sum written to {}: {}",
            self.output_path.display(),
            format_sum(report.total)
        );

        Ok(report.total)
    }
}
