//! Skeleton cuts as a synthetic part appended to a program.

use tracing::{debug, warn};

use crate::config::EmitSettings;
use crate::skeleton::SkeletonCut;

use super::layout::{is_program_end, line_ending, line_numbers, push_line, split_lines};

/// Insert `cuts` as one extra part ahead of the program's end marker.
///
/// Uses the default [`EmitSettings`].
pub fn append_skeleton(original: &str, cuts: &[SkeletonCut]) -> String {
    append_skeleton_with_config(original, cuts, &EmitSettings::default())
}

/// [`append_skeleton`] with explicit ids, line numbering and precision.
///
/// Everything before the first `HKEND` / `M30` line is copied unchanged,
/// followed by an `HKOST` header, one `HKSTR` .. `HKSTO` block per cut in
/// id order, an `HKPED`, and then the untouched tail of the original.
pub fn append_skeleton_with_config(
    original: &str,
    cuts: &[SkeletonCut],
    settings: &EmitSettings,
) -> String {
    let lines = split_lines(original);
    let insert_at = lines
        .iter()
        .position(|line| is_program_end(line))
        .unwrap_or(lines.len());
    let (head, tail) = lines.split_at(insert_at);
    let eol = line_ending(original);

    let mut ordered: Vec<&SkeletonCut> = cuts.iter().collect();
    ordered.sort_by_key(|cut| cut.id);

    let mut numbers = LineNumbers::new(&lines, settings);
    let mut out = String::with_capacity(original.len() + 128 * (ordered.len() + 2));
    for line in head {
        push_line(&mut out, line, eol);
    }

    let mut emit = |text: String| {
        push_line(&mut out, &text, eol);
        out.push_str(eol);
    };
    emit(format!(
        "N{} HKOST(0.0,0.0,0.0,{},{},0,0,0)",
        numbers.next_number(),
        settings.program_id,
        settings.tech
    ));
    for cut in &ordered {
        for line in cut_block(cut, numbers.next_number(), settings.precision) {
            emit(line);
        }
    }
    emit(format!("N{} HKPED(0,0,0)", numbers.next_number()));

    for line in tail {
        push_line(&mut out, line, eol);
    }

    debug!(cuts = ordered.len(), insert_at, "appended skeleton part");
    out
}

/// Lines of one skeleton contour block.
fn cut_block(cut: &SkeletonCut, number: u64, precision: usize) -> Vec<String> {
    let (a, b) = (cut.a, cut.b);
    vec![
        format!(
            "N{number} HKSTR(0,1,{:.precision$},{:.precision$},0,0,0,0)",
            a.x, a.y
        ),
        "HKPIE(0,0,0)".to_string(),
        "HKLEA(0,0,0)".to_string(),
        "HKCUT(0,0,0)".to_string(),
        format!("G1 X{:.precision$} Y{:.precision$}", a.x, a.y),
        format!("G1 X{:.precision$} Y{:.precision$}", b.x, b.y),
        "HKSTO(0,0,0)".to_string(),
    ]
}

/// Line labels for the synthetic part, clear of every label in the file.
struct LineNumbers {
    next: u64,
    step: u64,
}

impl LineNumbers {
    fn new(lines: &[&str], settings: &EmitSettings) -> Self {
        let step = settings.line_step.max(1);
        let highest = line_numbers(lines)
            .into_iter()
            .filter_map(|n| u64::try_from(n).ok())
            .max();

        let next = match highest {
            Some(highest) if highest >= settings.line_base => {
                let moved = (highest / step).saturating_add(1).saturating_mul(step);
                warn!(
                    base = settings.line_base,
                    highest, moved, "existing line numbers reach the skeleton range; moved up"
                );
                moved
            }
            _ => settings.line_base,
        };
        Self { next, step }
    }

    fn next_number(&mut self) -> u64 {
        let number = self.next;
        self.next = self.next.saturating_add(self.step);
        number
    }
}
