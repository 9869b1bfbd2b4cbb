//! HK MPF program parser.
//!
//! Walks the program line by line, simulating the cutter head (position,
//! cutting flag, open part and contours) and records every cut move as
//! geometry. Unknown commands and commands with missing arguments are
//! skipped; parsing never fails.

use tracing::{debug, trace};

use crate::config::{ArcSettings, CutplanConfig};

use super::arc::{tessellate_arc, ArcDirection};
use super::placement::{apply_offset, PartHandle, Placement, PlacementTable};
use super::types::{Contour, ContourKind, Part, Point, Program, Segment, Sheet};

/// A contour currently receiving segments, with the offset of its placement.
#[derive(Debug, Clone, Copy)]
struct OpenContour {
    part: PartHandle,
    contour: usize,
    offset: Point,
}

#[derive(Debug)]
struct ParserState<'a> {
    arc: &'a ArcSettings,
    cursor: Point,
    cutting: bool,
    sheet: Option<Sheet>,
    parts: Vec<Part>,
    part_offsets: Vec<Point>,
    current_part: Option<PartHandle>,
    open: Vec<OpenContour>,
    placements: PlacementTable,
}

impl<'a> ParserState<'a> {
    fn new(arc: &'a ArcSettings) -> Self {
        Self {
            arc,
            cursor: Point::default(),
            cutting: false,
            sheet: None,
            parts: Vec::new(),
            part_offsets: Vec::new(),
            current_part: None,
            open: Vec::new(),
            placements: PlacementTable::new(),
        }
    }
}

/// Parse program text with default settings.
pub fn parse(text: &str) -> Program {
    parse_with_config(text, &CutplanConfig::default())
}

/// Parse raw program bytes, replacing invalid UTF-8 sequences.
pub fn parse_bytes(data: &[u8]) -> Program {
    parse(&String::from_utf8_lossy(data))
}

/// Parse program text using `config` for arc tessellation.
pub fn parse_with_config(text: &str, config: &CutplanConfig) -> Program {
    let mut state = ParserState::new(&config.arc);

    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let upper = line.to_ascii_uppercase();
        apply_line(&mut state, &upper, index + 1);
    }

    finish(state)
}

fn apply_line(state: &mut ParserState<'_>, line: &str, line_index: usize) {
    let line_number = leading_line_number(line);

    if line.contains("HKINI(") {
        init_sheet(state, line, line_index);
        return;
    }

    if line.contains("HKOST(") {
        start_part(state, line);
        return;
    }

    if line.contains("HKSTR(") {
        start_contours(state, line, line_number);
        return;
    }

    if line.contains("HKCUT") {
        state.cutting = true;
        return;
    }

    if line.contains("HKSTO") {
        state.cutting = false;
        state.open.clear();
        return;
    }

    if line.contains("HKPED") {
        state.current_part = None;
        state.open.clear();
        state.cutting = false;
        return;
    }

    if line.starts_with("WHEN") {
        return;
    }

    if !state.cutting || state.open.is_empty() {
        trace!(line = line_index, "not cutting; line ignored");
        return;
    }

    let body = strip_line_number(line);
    match motion_code(body) {
        Some(1) => linear_move(state, body),
        Some(2) => arc_move(state, body, ArcDirection::Clockwise, line_index),
        Some(3) => arc_move(state, body, ArcDirection::CounterClockwise, line_index),
        _ => {}
    }
}

fn init_sheet(state: &mut ParserState<'_>, line: &str, line_index: usize) {
    let args = call_args(line, "HKINI");
    let (Some(&width), Some(&height)) = (args.get(1), args.get(2)) else {
        debug!(line = line_index, "HKINI with fewer than 3 arguments skipped");
        return;
    };

    if state.sheet.is_some() {
        debug!(line = line_index, "repeated HKINI ignored; sheet already set");
        return;
    }

    state.sheet = Some(Sheet { width, height });
}

fn start_part(state: &mut ParserState<'_>, line: &str) {
    let args = call_args(line, "HKOST");
    let offset = Point::new(
        args.first().copied().unwrap_or(0.0),
        args.get(1).copied().unwrap_or(0.0),
    );
    let program_id = args.get(3).copied().and_then(to_integer);
    let tech = args.get(4).copied().and_then(to_integer);

    let handle = push_part(state, program_id, tech, offset);
    state.current_part = Some(handle);

    if let Some(id) = program_id {
        state.placements.register(
            id,
            Placement {
                part: handle,
                offset,
            },
        );
    }
}

fn push_part(
    state: &mut ParserState<'_>,
    program_id: Option<i64>,
    tech: Option<i64>,
    offset: Point,
) -> PartHandle {
    let handle = state.parts.len();
    state.parts.push(Part {
        program_id,
        tech,
        contours: Vec::new(),
    });
    state.part_offsets.push(offset);
    handle
}

fn start_contours(state: &mut ParserState<'_>, line: &str, line_number: Option<i64>) {
    let args = call_args(line, "HKSTR");
    if let Some(&x) = args.get(2) {
        state.cursor.x = x;
    }
    if let Some(&y) = args.get(3) {
        state.cursor.y = y;
    }

    let kind = match args.first().copied().and_then(to_integer) {
        Some(0) | None => ContourKind::Outer,
        Some(_) => ContourKind::Hole,
    };

    let mut targets = state.placements.lookup(line_number).to_vec();
    if targets.is_empty() {
        let part = match state.current_part {
            Some(part) => part,
            None => {
                let part = push_part(state, None, None, Point::default());
                state.current_part = Some(part);
                part
            }
        };
        let offset = state.part_offsets.get(part).copied().unwrap_or_default();
        targets.push(Placement { part, offset });
    }

    state.open.clear();
    for placement in targets {
        let Some(part) = state.parts.get_mut(placement.part) else {
            continue;
        };
        part.contours.push(Contour {
            id: 0,
            kind,
            segments: Vec::new(),
        });
        state.open.push(OpenContour {
            part: placement.part,
            contour: part.contours.len() - 1,
            offset: placement.offset,
        });
    }
}

fn linear_move(state: &mut ParserState<'_>, body: &str) {
    let target = Point::new(
        address_value(body, b'X').unwrap_or(state.cursor.x),
        address_value(body, b'Y').unwrap_or(state.cursor.y),
    );

    let from = state.cursor;
    for open in &state.open {
        let segment = Segment::Line {
            a: apply_offset(from, open.offset),
            b: apply_offset(target, open.offset),
        };
        push_segment(&mut state.parts, open, segment);
    }
    state.cursor = target;
}

fn arc_move(state: &mut ParserState<'_>, body: &str, direction: ArcDirection, line_index: usize) {
    let (Some(x), Some(y), Some(i), Some(j)) = (
        address_value(body, b'X'),
        address_value(body, b'Y'),
        address_value(body, b'I'),
        address_value(body, b'J'),
    ) else {
        debug!(line = line_index, "arc without X/Y/I/J skipped");
        return;
    };

    let target = Point::new(x, y);
    let center_offset = Point::new(i, j);
    let from = state.cursor;
    for open in &state.open {
        let points = tessellate_arc(
            apply_offset(from, open.offset),
            apply_offset(target, open.offset),
            center_offset,
            direction,
            state.arc,
        );
        push_segment(&mut state.parts, open, Segment::Polyline { points });
    }
    state.cursor = target;
}

fn push_segment(parts: &mut [Part], open: &OpenContour, segment: Segment) {
    if let Some(contour) = parts
        .get_mut(open.part)
        .and_then(|part| part.contours.get_mut(open.contour))
    {
        contour.segments.push(segment);
    }
}

fn finish(state: ParserState<'_>) -> Program {
    let mut parts = state.parts;

    let mut next_id: u32 = 1;
    for contour in parts.iter_mut().flat_map(|part| part.contours.iter_mut()) {
        contour.id = next_id;
        next_id = next_id.saturating_add(1);
    }

    debug!(
        parts = parts.len(),
        contours = next_id - 1,
        "parsed program"
    );

    Program {
        sheet: state.sheet.unwrap_or_default(),
        parts,
    }
}

/// Numeric arguments of `KEYWORD(...)` in order, or empty if the call is absent.
fn call_args(line: &str, keyword: &str) -> Vec<f64> {
    let opener = format!("{keyword}(");
    let Some(start) = line.find(&opener) else {
        return Vec::new();
    };
    let rest = line.get(start + opener.len()..).unwrap_or_default();
    let Some((inner, _)) = rest.split_once(')') else {
        return Vec::new();
    };

    let mut values = Vec::new();
    let mut offset = 0;
    while offset < inner.len() {
        match inner.get(offset..).and_then(scan_number) {
            Some((value, consumed)) => {
                values.push(value);
                offset += consumed;
            }
            None => offset += 1,
        }
    }
    values
}

/// Match `[-+]?(\d+\.?\d*|\.\d+)` at the start of `text`.
fn scan_number(text: &str) -> Option<(f64, usize)> {
    let bytes = text.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let digits_from = |start: usize| {
        bytes
            .get(start..)
            .map_or(0, |tail| tail.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let integer_digits = digits_from(end);
    end += integer_digits;

    if bytes.get(end) == Some(&b'.') {
        let fraction_digits = digits_from(end + 1);
        if integer_digits == 0 && fraction_digits == 0 {
            return None;
        }
        end += 1 + fraction_digits;
    } else if integer_digits == 0 {
        return None;
    }

    let value = text.get(..end)?.parse::<f64>().ok()?;
    Some((value, end))
}

/// Value of the address word `letter` (e.g. `X1.5`), if present.
///
/// The letter must not be preceded by another letter, so `HKSTO` never
/// yields an `O` word and packed words like `G1X1Y2` still resolve.
fn address_value(body: &str, letter: u8) -> Option<f64> {
    let bytes = body.as_bytes();
    bytes.iter().enumerate().find_map(|(index, &byte)| {
        if byte != letter {
            return None;
        }
        let preceded_by_letter = index
            .checked_sub(1)
            .and_then(|prev| bytes.get(prev))
            .is_some_and(u8::is_ascii_alphabetic);
        if preceded_by_letter {
            return None;
        }
        body.get(index + 1..)
            .and_then(scan_number)
            .map(|(value, _)| value)
    })
}

/// Leading `N<digits>` line number.
pub(crate) fn leading_line_number(line: &str) -> Option<i64> {
    let digits = line.strip_prefix('N')?;
    let end = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    digits.get(..end)?.parse().ok()
}

pub(crate) fn strip_line_number(line: &str) -> &str {
    let Some(rest) = line.strip_prefix('N') else {
        return line;
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return line;
    }
    rest.get(digits..).map_or(line, str::trim_start)
}

/// `G` code number at the start of a motion line (`G1`, `G01`, ...).
fn motion_code(body: &str) -> Option<u32> {
    let rest = body.strip_prefix('G')?;
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    rest.get(..end)?.parse().ok()
}

#[allow(clippy::cast_possible_truncation)]
fn to_integer(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.trunc() as i64)
}
