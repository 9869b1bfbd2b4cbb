//! Integration tests for program rewriting.

use cutplan_wasm::emit::{append_skeleton, reorder};
use cutplan_wasm::error::CutplanError;
use cutplan_wasm::mpf;
use cutplan_wasm::skeleton::compute_skeleton;

const SINGLE_PART: &str = include_str!("fixtures/single_part.mpf");
const THREE_BLOCKS_CRLF: &str = include_str!("fixtures/three_blocks_crlf.mpf");

fn block_starts(text: &str) -> Vec<String> {
    text.lines()
        .filter(|l| l.contains("HKSTR("))
        .map(str::to_string)
        .collect()
}

/// `[3, 1, 2]` moves block 3 first; text outside the blocks is unchanged.
#[test]
fn reorder_three_blocks() {
    let result = reorder(THREE_BLOCKS_CRLF, &[3, 1, 2]);
    assert!(result.is_ok(), "{:?}", result.as_ref().err());
    let out = result.unwrap_or_default();

    let original = block_starts(THREE_BLOCKS_CRLF);
    assert_eq!(
        block_starts(&out),
        vec![original[2].clone(), original[0].clone(), original[1].clone()]
    );

    let preamble_end = THREE_BLOCKS_CRLF.find("N20 HKSTR").unwrap_or_default();
    assert_eq!(out.get(..preamble_end), THREE_BLOCKS_CRLF.get(..preamble_end));
    assert!(out.ends_with("HKSTO(0,0,0)\r\nN50 HKPED(0,0,0)\r\nM30"));
    assert!(!out.contains("\r\r"));
    assert_eq!(out.matches("\r\n").count(), THREE_BLOCKS_CRLF.matches("\r\n").count());
}

/// Reordered output still parses to the same contours in the new order.
#[test]
fn reordered_program_parses_in_new_order() {
    let out = reorder(THREE_BLOCKS_CRLF, &[2, 3, 1]).unwrap_or_default();
    let before = mpf::parse(THREE_BLOCKS_CRLF);
    let after = mpf::parse(&out);

    let segments = |p: &mpf::Program| -> Vec<Vec<mpf::Segment>> {
        p.contours().map(|c| c.segments.clone()).collect()
    };
    let old = segments(&before);
    let new = segments(&after);
    assert_eq!(new, vec![old[1].clone(), old[2].clone(), old[0].clone()]);
}

/// A short order fails with both counts and no output.
#[test]
fn reorder_length_mismatch() {
    let result = reorder(THREE_BLOCKS_CRLF, &[1, 2]);
    match result {
        Err(CutplanError::OrderLengthMismatch { expected, actual }) => {
            assert_eq!((expected, actual), (3, 2));
        }
        other => panic!("expected length mismatch, got {other:?}"),
    }
}

/// The original tail from the insertion point is reproduced byte-for-byte.
#[test]
fn append_preserves_tail() {
    let model = compute_skeleton(&mpf::parse(SINGLE_PART));
    let out = append_skeleton(SINGLE_PART, &model.skeleton_cuts);

    let insert = SINGLE_PART.find("N50 HKEND").unwrap_or_default();
    assert_eq!(out.get(..insert), SINGLE_PART.get(..insert));
    let tail_at = out.rfind("N50 HKEND").unwrap_or_default();
    assert_eq!(out.get(tail_at..), SINGLE_PART.get(insert..));
}

/// Appended cuts parse back as one extra part with one contour per cut.
#[test]
fn appended_part_parses_back() {
    let model = compute_skeleton(&mpf::parse(SINGLE_PART));
    let out = append_skeleton(SINGLE_PART, &model.skeleton_cuts);
    let reparsed = mpf::parse(&out);

    assert_eq!(reparsed.parts.len(), 2);
    let skeleton_part = reparsed.parts.last();
    assert_eq!(skeleton_part.and_then(|p| p.program_id), Some(990_001));
    assert_eq!(skeleton_part.and_then(|p| p.tech), Some(99));

    let contours = skeleton_part.map(|p| p.contours.as_slice()).unwrap_or_default();
    assert_eq!(contours.len(), model.skeleton_cuts.len());
    for (contour, cut) in contours.iter().zip(&model.skeleton_cuts) {
        let end = contour.segments.last().and_then(mpf::Segment::end);
        assert!(end.is_some_and(|p| p.approx_eq(cut.b, 1e-4)), "cut {}", cut.id);
    }
}
