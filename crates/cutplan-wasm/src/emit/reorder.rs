//! Contour block reordering.

use tracing::debug;

use crate::error::CutplanError;

use super::layout::{line_ending, push_line, ProgramLayout};

/// Rewrite `original` with its contour blocks in `order`.
///
/// `order` holds 1-based indices into the original block list and must name
/// every block exactly once. The preamble, the postamble and the lines
/// between blocks stay where they are; only block contents move.
///
/// # Errors
///
/// [`CutplanError::OrderLengthMismatch`] if `order` and the block list differ
/// in length, [`CutplanError::InvalidOrder`] for an out-of-range or repeated
/// entry, [`CutplanError::UnterminatedBlock`] if a block has no `HKSTO`.
pub fn reorder(original: &str, order: &[u32]) -> Result<String, CutplanError> {
    let layout = ProgramLayout::scan(original)?;
    let picks = validate_order(order, layout.block_count())?;
    let eol = line_ending(original);

    let mut out = String::with_capacity(original.len() + eol.len());
    for line in layout.preamble() {
        push_line(&mut out, line, eol);
    }
    for (slot, &pick) in picks.iter().enumerate() {
        for line in layout.block(pick) {
            push_line(&mut out, line, eol);
        }
        for line in layout.gap_after(slot) {
            push_line(&mut out, line, eol);
        }
    }
    for line in layout.postamble() {
        push_line(&mut out, line, eol);
    }

    debug!(blocks = picks.len(), "reordered contour blocks");
    Ok(out)
}

/// 0-based block indices for a 1-based permutation of `blocks` entries.
fn validate_order(order: &[u32], blocks: usize) -> Result<Vec<usize>, CutplanError> {
    if order.len() != blocks {
        return Err(CutplanError::OrderLengthMismatch {
            expected: blocks,
            actual: order.len(),
        });
    }

    let mut seen = vec![false; blocks];
    let mut picks = Vec::with_capacity(blocks);
    for &entry in order {
        let index = usize::try_from(entry)
            .ok()
            .and_then(|one_based| one_based.checked_sub(1))
            .filter(|&index| index < blocks)
            .ok_or_else(|| {
                CutplanError::InvalidOrder(format!("entry {entry} is outside 1..={blocks}"))
            })?;
        match seen.get_mut(index) {
            Some(flag) if !*flag => *flag = true,
            _ => {
                return Err(CutplanError::InvalidOrder(format!(
                    "entry {entry} appears more than once"
                )))
            }
        }
        picks.push(index);
    }
    Ok(picks)
}
