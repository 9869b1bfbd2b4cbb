//! Arc tessellation for G2/G3 interpolation.
//!
//! Circular moves are sampled into polylines at a fixed angular step so the
//! geometry stage only ever deals with straight edges.

use std::f64::consts::TAU;

use crate::config::ArcSettings;

use super::types::Point;

const POINT_EQUALITY_EPSILON: f64 = 1e-9;

/// Arc sweep direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcDirection {
    /// Clockwise interpolation (G2), angle decreases.
    Clockwise,
    /// Counter-clockwise interpolation (G3), angle increases.
    CounterClockwise,
}

/// Tessellate an arc from `from` to `to` around `from + center_offset`.
///
/// The end angle is wound past the start angle until the sweep runs in the
/// requested direction. An arc whose end coincides with its start sweeps a
/// full turn. The radius is taken from the start point; the returned points
/// run from start to end with `max(min_segments, ceil(sweep / step))` steps.
pub fn tessellate_arc(
    from: Point,
    to: Point,
    center_offset: Point,
    direction: ArcDirection,
    settings: &ArcSettings,
) -> Vec<Point> {
    let center = Point::new(from.x + center_offset.x, from.y + center_offset.y);
    let radius = from.distance(center);

    let start_angle = (from.y - center.y).atan2(from.x - center.x);
    let sweep = if from.approx_eq(to, POINT_EQUALITY_EPSILON) && radius > POINT_EQUALITY_EPSILON
    {
        match direction {
            ArcDirection::Clockwise => -TAU,
            ArcDirection::CounterClockwise => TAU,
        }
    } else {
        let end_angle = (to.y - center.y).atan2(to.x - center.x);
        wind_end_angle(start_angle, end_angle, direction) - start_angle
    };

    let steps = step_count(sweep, settings);
    sample(center, radius, start_angle, sweep, steps)
}

/// Moves `end` by whole turns until it lies on the `direction` side of `start`.
fn wind_end_angle(start: f64, mut end: f64, direction: ArcDirection) -> f64 {
    match direction {
        ArcDirection::Clockwise => {
            while end > start {
                end -= TAU;
            }
        }
        ArcDirection::CounterClockwise => {
            while end < start {
                end += TAU;
            }
        }
    }
    end
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn step_count(sweep: f64, settings: &ArcSettings) -> u32 {
    let step = settings.step_degrees.to_radians();
    let minimum = settings.min_segments.max(1);
    if !step.is_finite() || step <= 0.0 {
        return minimum;
    }

    let raw = (sweep.abs() / step).ceil();
    if !raw.is_finite() || raw <= 0.0 {
        return minimum;
    }

    (raw.min(f64::from(u32::MAX)) as u32).max(minimum)
}

fn sample(center: Point, radius: f64, start_angle: f64, sweep: f64, steps: u32) -> Vec<Point> {
    (0..=steps)
        .map(|step| {
            let t = f64::from(step) / f64::from(steps);
            let angle = sweep.mul_add(t, start_angle);
            Point::new(
                radius.mul_add(angle.cos(), center.x),
                radius.mul_add(angle.sin(), center.y),
            )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    fn angle_about(center: Point, p: Point) -> f64 {
        (p.y - center.y).atan2(p.x - center.x)
    }

    #[test]
    fn clockwise_arc_angles_strictly_decrease() {
        let r = 5.0;
        let points = tessellate_arc(
            Point::new(0.0, 0.0),
            Point::new(-r, 0.0),
            Point::new(0.0, r),
            ArcDirection::Clockwise,
            &ArcSettings::default(),
        );
        assert!(points.len() >= 8, "got {} points", points.len());

        // Unwrap across the -PI/PI seam before comparing.
        let center = Point::new(0.0, r);
        let mut previous = angle_about(center, points[0]);
        for p in &points[1..] {
            let mut angle = angle_about(center, *p);
            while angle > previous {
                angle -= TAU;
            }
            assert!(angle < previous, "angle did not decrease");
            previous = angle;
        }
    }

    #[test]
    fn clockwise_quarter_turn_ends_at_target() {
        let points = tessellate_arc(
            Point::new(0.0, 0.0),
            Point::new(-5.0, 5.0),
            Point::new(0.0, 5.0),
            ArcDirection::Clockwise,
            &ArcSettings::default(),
        );
        // 90 degrees at 6 degrees per step, give or take rounding
        assert!((16..=17).contains(&points.len()), "got {}", points.len());
        let last = points.last().copied().unwrap_or_default();
        assert!(last.approx_eq(Point::new(-5.0, 5.0), 1e-9));
        for p in &points {
            assert!((p.distance(Point::new(0.0, 5.0)) - 5.0).abs() < 1e-9);
            assert!(p.x <= 1e-9, "clockwise path from the bottom goes left");
        }
    }

    #[test]
    fn counter_clockwise_semicircle_stays_in_upper_half() {
        let points = tessellate_arc(
            Point::new(5.0, 0.0),
            Point::new(-5.0, 0.0),
            Point::new(-5.0, 0.0),
            ArcDirection::CounterClockwise,
            &ArcSettings::default(),
        );
        assert!((31..=32).contains(&points.len()), "got {}", points.len());
        assert!(points.iter().all(|p| p.y >= -1e-9));
        assert!(points.iter().any(|p| p.y > 4.99));
    }

    #[test]
    fn small_arc_uses_minimum_steps() {
        let angle = 0.5_f64.to_radians();
        let points = tessellate_arc(
            Point::new(10.0, 0.0),
            Point::new(10.0 * angle.cos(), 10.0 * angle.sin()),
            Point::new(-10.0, 0.0),
            ArcDirection::CounterClockwise,
            &ArcSettings::default(),
        );
        assert_eq!(points.len(), 9);
    }

    #[test]
    fn coincident_endpoints_sweep_full_circle() {
        let points = tessellate_arc(
            Point::new(5.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(-5.0, 0.0),
            ArcDirection::Clockwise,
            &ArcSettings::default(),
        );
        assert!((61..=62).contains(&points.len()), "got {}", points.len());
        let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        assert!(min_y < -4.99 && max_y > 4.99);
        let first = points.first().copied().unwrap_or_default();
        let last = points.last().copied().unwrap_or_default();
        assert!(first.approx_eq(last, 1e-9));
    }

    #[test]
    fn winding_moves_end_angle_by_whole_turns() {
        let cw = wind_end_angle(0.0, PI / 2.0, ArcDirection::Clockwise);
        let ccw = wind_end_angle(0.0, -PI / 2.0, ArcDirection::CounterClockwise);
        assert!((cw - (PI / 2.0 - TAU)).abs() < 1e-12);
        assert!((ccw - (TAU - PI / 2.0)).abs() < 1e-12);
    }
}
