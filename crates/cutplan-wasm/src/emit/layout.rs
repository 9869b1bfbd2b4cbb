//! Line-level view of a program: preamble, contour blocks, gaps, postamble.

use std::ops::Range;

use crate::error::CutplanError;
use crate::mpf::parser::{leading_line_number, strip_line_number};

/// Raw program lines with the spans of every `HKSTR(` .. `HKSTO` block.
///
/// Lines keep their terminators, so concatenating any run of them
/// reproduces the source bytes.
#[derive(Debug)]
pub(crate) struct ProgramLayout<'a> {
    lines: Vec<&'a str>,
    blocks: Vec<Range<usize>>,
}

impl<'a> ProgramLayout<'a> {
    /// Split `text` into lines and locate its contour blocks.
    ///
    /// A block opens on a line containing `HKSTR(` and closes on the next
    /// line containing `HKSTO`. A second `HKSTR(` before that, or end of
    /// input, is an unterminated block.
    pub(crate) fn scan(text: &'a str) -> Result<Self, CutplanError> {
        let lines = split_lines(text);
        let mut blocks = Vec::new();
        let mut open: Option<usize> = None;

        for (index, line) in lines.iter().enumerate() {
            let upper = line.trim().to_ascii_uppercase();
            if upper.contains("HKSTR(") {
                if let Some(start) = open {
                    return Err(CutplanError::UnterminatedBlock { line: start + 1 });
                }
                open = Some(index);
            } else if upper.contains("HKSTO") {
                if let Some(start) = open.take() {
                    blocks.push(start..index + 1);
                }
            }
        }

        if let Some(start) = open {
            return Err(CutplanError::UnterminatedBlock { line: start + 1 });
        }

        Ok(Self { lines, blocks })
    }

    pub(crate) fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Lines before the first block (the whole file when there are none).
    pub(crate) fn preamble(&self) -> &[&'a str] {
        let end = self.blocks.first().map_or(self.lines.len(), |b| b.start);
        self.slice(0..end)
    }

    /// Lines of block `index` (0-based), `HKSTR` through `HKSTO`.
    pub(crate) fn block(&self, index: usize) -> &[&'a str] {
        match self.blocks.get(index) {
            Some(span) => self.slice(span.clone()),
            None => &[],
        }
    }

    /// Lines between block `index` and block `index + 1`.
    pub(crate) fn gap_after(&self, index: usize) -> &[&'a str] {
        match (self.blocks.get(index), self.blocks.get(index + 1)) {
            (Some(this), Some(next)) => self.slice(this.end..next.start),
            _ => &[],
        }
    }

    /// Lines after the last block.
    pub(crate) fn postamble(&self) -> &[&'a str] {
        match self.blocks.last() {
            Some(last) => self.slice(last.end..self.lines.len()),
            None => &[],
        }
    }

    fn slice(&self, range: Range<usize>) -> &[&'a str] {
        self.lines.get(range).unwrap_or_default()
    }
}

/// Lines with their terminators attached.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// `"\r\n"` if the text uses CRLF anywhere, otherwise `"\n"`.
pub(crate) fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Append `line`, first terminating the previous line if it lacks a newline.
pub(crate) fn push_line(out: &mut String, line: &str, eol: &str) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(eol);
    }
    out.push_str(line);
}

/// Every `N<number>` used as a line label in `lines`.
pub(crate) fn line_numbers(lines: &[&str]) -> Vec<i64> {
    lines
        .iter()
        .filter_map(|line| leading_line_number(&line.trim().to_ascii_uppercase()))
        .collect()
}

/// Whether `line` marks the end of the program body (`HKEND` or `M30`).
pub(crate) fn is_program_end(line: &str) -> bool {
    let upper = line.trim().to_ascii_uppercase();
    upper.contains("HKEND") || strip_line_number(&upper).starts_with("M30")
}
