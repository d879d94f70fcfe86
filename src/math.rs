//! Angle and wedge math for radial menus
//!
//! Everything in here is pure: sibling angle assignment (including
//! user-pinned fixed angles), selection wedge computation with an optional
//! gap towards the parent item, and the small 2D vector toolbox used by the
//! input layer. All angles are degrees, 0 degrees is at the top and values
//! increase clockwise.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A 2D position or offset in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length()
    }

    pub fn normalized(self) -> Vec2 {
        let length = self.length();
        Vec2::new(self.x / length, self.y / length)
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, scalar: f64) -> Vec2 {
        Vec2::new(self.x * scalar, self.y * scalar)
    }
}

/// An angular range in degrees. The start is always smaller than the end,
/// so the start may be negative and the end may exceed 360.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wedge {
    pub start: f64,
    pub end: f64,
}

/// Result of [`compute_item_wedges`]: one wedge per item plus the wedge
/// reserved for the back navigation link if a parent angle was given and
/// ended up enclosed by the item wedges.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemWedges {
    pub item_wedges: Vec<Wedge>,
    pub parent_wedge: Option<Wedge>,
}

/// Clamps a value to the given range. Unlike `f64::clamp` this does not
/// panic when min exceeds max (which happens when a monitor is smaller
/// than the menu); the max bound wins in that case.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Returns the angular difference between two angles using the shortest
/// path. The result is between 0 and 180 degrees.
pub fn get_angular_difference(angle1: f64, angle2: f64) -> f64 {
    let diff = ((angle1 % 360.0) - (angle2 % 360.0)).abs();
    diff.min(360.0 - diff)
}

/// Returns the angle equivalent to `angle` (modulo 360) which is closest to
/// the reference. Used to avoid 360-degree flips when an angle is animated
/// or accumulated across frames. The result can be negative.
pub fn get_closest_equivalent_angle(angle: f64, to: Option<f64>) -> f64 {
    match to {
        Some(to) if (to - angle).abs() > 180.0 => {
            let full_turns = ((to - angle) / 360.0).round();
            angle + full_turns * 360.0
        }
        _ => angle,
    }
}

/// Returns the largest angle equivalent to `angle` (modulo 360) which is
/// smaller than or equal to the reference.
pub fn get_equivalent_angle_smaller_than(angle: f64, than: f64) -> f64 {
    let full_turns = ((than - angle) / 360.0).floor();
    angle + full_turns * 360.0
}

/// Returns the smallest angle equivalent to `angle` (modulo 360) which is
/// larger than or equal to the reference.
pub fn get_equivalent_angle_larger_than(angle: f64, than: f64) -> f64 {
    let full_turns = ((than - angle) / 360.0).ceil();
    angle + full_turns * 360.0
}

/// Returns true if the angle lies between start and end. Start should be
/// smaller than end; all three values may be negative or beyond 360, so the
/// test is repeated with the angle shifted by a full turn in each direction.
pub fn is_angle_between(angle: f64, start: f64, end: f64) -> bool {
    (angle > start && angle <= end)
        || (angle - 360.0 > start && angle - 360.0 <= end)
        || (angle + 360.0 > start && angle + 360.0 <= end)
}

/// Shifts three consecutive angles by full turns so that they are
/// increasing. The center angle is wrapped to [0, 360); the start may become
/// negative and the end may exceed 360, but their mutual difference stays
/// below a full turn.
pub fn normalize_consecutive_angles(start: f64, center: f64, end: f64) -> (f64, f64, f64) {
    let center = center % 360.0;
    (
        get_equivalent_angle_smaller_than(start, center),
        center,
        get_equivalent_angle_larger_than(end, center),
    )
}

/// Returns the clockwise angle of the given vector in degrees, 0 at the top.
pub fn get_angle(vec: Vec2) -> f64 {
    let angle = (vec.y.atan2(vec.x).to_degrees() + 90.0) % 360.0;
    if angle < 0.0 {
        360.0 + angle
    } else {
        angle
    }
}

/// Returns the direction vector for the given clockwise angle and length.
pub fn get_direction(angle: f64, length: f64) -> Vec2 {
    let radians = (angle - 90.0).to_radians();
    Vec2::new(radians.cos() * length, radians.sin() * length)
}

/// Normalizes user-pinned fixed angles in place.
///
/// Among siblings, fixed angles must increase monotonically and stay within
/// one turn of the first one. This shifts angles by full turns so the first
/// is in [0, 360) and every later one is at least as large as its
/// predecessor, removes later duplicates of the same angle, and removes
/// angles that ended up a full turn or more past the first.
pub fn fix_fixed_angles(angles: &mut [Option<f64>]) {
    let mut first_angle: Option<f64> = None;
    let mut last_angle: Option<f64> = None;

    for slot in angles.iter_mut() {
        if let Some(angle) = *slot {
            let fixed = match last_angle {
                None => get_equivalent_angle_larger_than(angle, 0.0),
                Some(last) => get_equivalent_angle_larger_than(angle, last),
            };
            *slot = Some(fixed);
            if first_angle.is_none() {
                first_angle = Some(fixed);
            }
            last_angle = Some(fixed);
        }
    }

    let Some(first_angle) = first_angle else {
        return;
    };

    // Adjacent items may now share an angle; the first one wins.
    let mut last_kept: Option<f64> = None;
    for slot in angles.iter_mut() {
        if let Some(angle) = *slot {
            if last_kept == Some(angle) {
                *slot = None;
            } else {
                last_kept = Some(angle);
            }
        }
    }

    let max_angle = first_angle + 360.0;
    for slot in angles.iter_mut() {
        if let Some(angle) = *slot {
            if angle >= max_angle {
                *slot = None;
            }
        }
    }
}

/// Computes an angle for every sibling of a menu level.
///
/// Items with a fixed angle (a `Some` entry) act as anchors; all others are
/// distributed evenly into the gaps between consecutive anchors. If a parent
/// angle is given, one extra gap slot is reserved at that angle for the back
/// navigation link. Fixed angles must increase monotonically; where they do
/// not, the smaller one is ignored.
pub fn compute_item_angles(items: &[Option<f64>], parent_angle: Option<f64>) -> Vec<f64> {
    if items.is_empty() {
        return Vec::new();
    }

    let mut item_angles = vec![0.0; items.len()];

    struct FixedAngle {
        angle: f64,
        index: usize,
    }

    // Only non-negative angles count as fixed.
    let mut fixed_angles: Vec<FixedAngle> = items
        .iter()
        .enumerate()
        .filter_map(|(index, angle)| {
            angle
                .filter(|a| *a >= 0.0)
                .map(|angle| FixedAngle { angle, index })
        })
        .collect();

    // A fixed item must not collide with the parent link; nudge it slightly.
    if let Some(parent_angle) = parent_angle {
        for fixed in fixed_angles.iter_mut() {
            if (fixed.angle - parent_angle).abs() < 0.0001 {
                fixed.angle += 0.1;
            }
        }
    }

    // Fixed angles must increase monotonically. If one is larger than the
    // next, the next one is ignored.
    let mut i = 0;
    while i + 1 < fixed_angles.len() {
        if fixed_angles[i].angle > fixed_angles[i + 1].angle {
            fixed_angles.remove(i + 1);
        } else {
            i += 1;
        }
    }

    // Without any fixed angle, the first item gets one: at the top if there
    // is no parent, else at the first even-distribution slot past the parent
    // angle (the distribution reserves one wedge for the parent link).
    if fixed_angles.is_empty() {
        let first_angle = match parent_angle {
            None => 0.0,
            Some(parent_angle) => {
                let wedge_size = 360.0 / (items.len() as f64 + 1.0);
                let mut min_angle: f64 = 360.0;
                for i in 0..items.len() {
                    min_angle = min_angle.min((parent_angle + (i as f64 + 1.0) * wedge_size) % 360.0);
                }
                min_angle
            }
        };
        item_angles[0] = first_angle;
        fixed_angles.push(FixedAngle {
            angle: first_angle,
            index: 0,
        });
    }

    // The parent angle may need to be lifted by a full turn to land inside
    // the wedge under consideration; that shift carries over to later
    // wedges.
    let mut parent_angle = parent_angle;

    // Walk the wedges between consecutive pairs of fixed angles (wrapping
    // around) and distribute the unassigned items inside each.
    let item_count = items.len();
    for i in 0..fixed_angles.len() {
        let wedge_begin_index = fixed_angles[i].index;
        let wedge_begin_angle = fixed_angles[i].angle;
        let wedge_end_index = fixed_angles[(i + 1) % fixed_angles.len()].index;
        let mut wedge_end_angle = fixed_angles[(i + 1) % fixed_angles.len()].angle;

        item_angles[wedge_begin_index] = wedge_begin_angle;

        if wedge_end_angle <= wedge_begin_angle {
            wedge_end_angle += 360.0;
        }

        let mut wedge_item_count =
            (wedge_end_index + item_count - wedge_begin_index - 1) % item_count;

        // One more slot if the parent link falls inside this wedge.
        let mut parent_in_wedge = false;
        if let Some(angle) = parent_angle.as_mut() {
            if *angle < wedge_begin_angle {
                *angle += 360.0;
            }
            parent_in_wedge = *angle > wedge_begin_angle && *angle < wedge_end_angle;
            if parent_in_wedge {
                wedge_item_count += 1;
            }
        }

        let wedge_item_gap = (wedge_end_angle - wedge_begin_angle) / (wedge_item_count as f64 + 1.0);

        let mut index = (wedge_begin_index + 1) % item_count;
        let mut count = 1.0;
        let mut parent_gap_required = parent_in_wedge;

        while index != wedge_end_index {
            let mut item_angle = wedge_begin_angle + wedge_item_gap * count;

            // Skip one slot where the parent link sits.
            if parent_gap_required {
                if let Some(angle) = parent_angle {
                    if item_angle + wedge_item_gap / 2.0 - angle > 0.0 {
                        count += 1.0;
                        item_angle = wedge_begin_angle + wedge_item_gap * count;
                        parent_gap_required = false;
                    }
                }
            }

            item_angles[index] = item_angle % 360.0;

            index = (index + 1) % item_count;
            count += 1.0;
        }
    }

    item_angles
}

/// Computes the selection wedge of every item.
///
/// Each wedge spans the midpoints towards the angular neighbors, so the
/// wedges tile the full circle without overlap. If a parent angle is given,
/// the wedge containing it is cropped there and the cropped-off range is
/// returned as the parent wedge.
pub fn compute_item_wedges(item_angles: &[f64], parent_angle: Option<f64>) -> ItemWedges {
    if item_angles.is_empty() {
        return ItemWedges {
            item_wedges: Vec::new(),
            parent_wedge: None,
        };
    }

    if item_angles.len() == 1 {
        return match parent_angle {
            // A single child without a parent covers the full circle.
            None => ItemWedges {
                item_wedges: vec![Wedge {
                    start: 0.0,
                    end: 360.0,
                }],
                parent_wedge: None,
            },
            // A single child with a parent splits the circle with it.
            Some(parent_angle) => {
                let (start, center, end) =
                    normalize_consecutive_angles(parent_angle, item_angles[0], parent_angle + 360.0);
                let (start, end) = scale_wedge(start, center, end, 0.5);
                ItemWedges {
                    item_wedges: vec![Wedge { start, end }],
                    parent_wedge: Some(Wedge {
                        start: end,
                        end: start + 360.0,
                    }),
                }
            }
        };
    }

    let count = item_angles.len();
    let mut item_wedges = Vec::with_capacity(count);
    let mut parent_start: Option<f64> = None;
    let mut parent_end: Option<f64> = None;

    for i in 0..count {
        let (mut start, center, mut end) = normalize_consecutive_angles(
            item_angles[(i + count - 1) % count],
            item_angles[i],
            item_angles[(i + 1) % count],
        );

        if let Some(parent_angle) = parent_angle {
            // Remember the bounds of the gap around the parent angle; they
            // become the parent wedge below.
            if is_angle_between(parent_angle, start, center) {
                parent_start = Some(start);
            } else if is_angle_between(parent_angle, center, end) {
                parent_end = Some(end);
            }

            let (cropped_start, cropped_end) = crop_wedge(start, center, end, parent_angle);
            let (s, _, e) = normalize_consecutive_angles(cropped_start, center, cropped_end);
            start = s;
            end = e;
        }

        let (start, end) = scale_wedge(start, center, end, 0.5);
        item_wedges.push(Wedge { start, end });
    }

    if let (Some(parent_angle), Some(start), Some(end)) = (parent_angle, parent_start, parent_end) {
        let (start, center, end) = normalize_consecutive_angles(start, parent_angle, end);
        let (start, end) = scale_wedge(start, center, end, 0.5);
        return ItemWedges {
            item_wedges,
            parent_wedge: Some(Wedge { start, end }),
        };
    }

    ItemWedges {
        item_wedges,
        parent_wedge: None,
    }
}

/// Crops the wedge at the given angle if the angle lies inside it.
fn crop_wedge(start: f64, center: f64, end: f64, crop_angle: f64) -> (f64, f64) {
    let start = if is_angle_between(crop_angle, start, center) {
        crop_angle
    } else {
        start
    };

    let end = if is_angle_between(crop_angle, center, end) {
        crop_angle
    } else {
        end
    };

    (start, end)
}

/// Moves the start and end of a wedge towards its center by the given
/// factor. With 0.5 the wedges of two neighbors meet exactly at the
/// midpoint between their item angles.
fn scale_wedge(start: f64, center: f64, end: f64, scale: f64) -> (f64, f64) {
    (
        center - (center - start) * scale,
        center + (end - center) * scale,
    )
}

/// Clamps a menu center position so that a menu of the given radius stays
/// inside the monitor. The result is floored to whole pixels.
pub fn clamp_to_monitor(position: Vec2, radius: f64, monitor_size: Vec2) -> Vec2 {
    let max_x = monitor_size.x - radius;
    let max_y = monitor_size.y - radius;

    Vec2::new(
        clamp(position.x, radius, max_x).floor(),
        clamp(position.y, radius, max_y).floor(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_angles_eq(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "length mismatch: {actual:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "expected {expected:?}, got {actual:?}");
        }
    }

    #[test]
    fn empty_item_list_yields_no_angles() {
        assert!(compute_item_angles(&[], None).is_empty());
        assert!(compute_item_angles(&[], Some(90.0)).is_empty());
    }

    #[test]
    fn items_are_distributed_evenly() {
        let items = vec![None; 4];
        assert_angles_eq(&compute_item_angles(&items, None), &[0.0, 90.0, 180.0, 270.0]);

        let items = vec![None; 8];
        assert_angles_eq(
            &compute_item_angles(&items, None),
            &[0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0],
        );
    }

    #[test]
    fn space_is_reserved_for_the_parent_link() {
        let items = vec![None; 7];
        assert_angles_eq(
            &compute_item_angles(&items, Some(45.0)),
            &[0.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0],
        );
        assert_angles_eq(
            &compute_item_angles(&items, Some(180.0)),
            &[0.0, 45.0, 90.0, 135.0, 225.0, 270.0, 315.0],
        );
    }

    #[test]
    fn fixed_angles_are_obeyed() {
        let items = [Some(120.0), None, None, None];
        assert_angles_eq(&compute_item_angles(&items, None), &[120.0, 210.0, 300.0, 30.0]);

        let items = [None, None, Some(120.0), None];
        assert_angles_eq(&compute_item_angles(&items, None), &[300.0, 30.0, 120.0, 210.0]);

        let items = [Some(1.0), Some(2.0), Some(120.0), Some(121.0)];
        assert_angles_eq(&compute_item_angles(&items, None), &[1.0, 2.0, 120.0, 121.0]);
    }

    #[test]
    fn non_monotonic_fixed_angles_are_ignored() {
        let items = [Some(120.0), Some(119.0), None, None];
        assert_angles_eq(&compute_item_angles(&items, None), &[120.0, 210.0, 300.0, 30.0]);
    }

    #[test]
    fn fixed_angles_combine_with_a_parent_link() {
        let items = [Some(120.0), None, None, None];
        assert_angles_eq(
            &compute_item_angles(&items, Some(150.0)),
            &[120.0, 264.0, 336.0, 48.0],
        );
    }

    #[test]
    fn single_anchor_places_the_free_item_opposite() {
        let items = [Some(10.0), None];
        assert_angles_eq(&compute_item_angles(&items, None), &[10.0, 190.0]);
    }

    #[test]
    fn angles_increase_monotonically_when_unwrapped() {
        let cases: Vec<(Vec<Option<f64>>, Option<f64>)> = vec![
            (vec![None; 5], None),
            (vec![None; 5], Some(123.0)),
            (vec![Some(90.0), None, None, Some(270.0), None], None),
            (vec![None, Some(200.0), None, None], Some(10.0)),
        ];

        for (items, parent) in cases {
            let angles = compute_item_angles(&items, parent);

            // In item order starting at the first anchor, the angles must
            // wrap around the circle at most once.
            let anchor = items.iter().position(|a| a.is_some()).unwrap_or(0);
            let rotated: Vec<f64> = (0..angles.len())
                .map(|i| angles[(anchor + i) % angles.len()] % 360.0)
                .collect();
            let descents = rotated.windows(2).filter(|w| w[1] < w[0]).count();
            assert!(descents <= 1, "angles not monotonic: {angles:?}");
        }
    }

    #[test]
    fn fixing_fixed_angles_is_idempotent() {
        let mut angles = [Some(-350.0), None, Some(5.0), Some(365.0), Some(700.0)];
        fix_fixed_angles(&mut angles);
        let once = angles;
        fix_fixed_angles(&mut angles);
        assert_eq!(once, angles);
    }

    #[test]
    fn duplicate_fixed_angles_collapse_to_the_first() {
        let mut angles = [Some(90.0), Some(90.0), Some(90.0), None];
        fix_fixed_angles(&mut angles);
        assert_eq!(angles, [Some(90.0), None, None, None]);
    }

    #[test]
    fn fixed_angles_beyond_a_full_turn_are_removed() {
        let mut angles = [Some(300.0), Some(250.0), None];
        fix_fixed_angles(&mut angles);
        // 250 is lifted above 300 to 610, which is less than 300 + 360.
        assert_eq!(angles, [Some(300.0), Some(610.0), None]);

        // 20 has to be lifted above 350, which puts it past 0 + 360.
        let mut angles = [Some(0.0), Some(350.0), Some(20.0)];
        fix_fixed_angles(&mut angles);
        assert_eq!(angles, [Some(0.0), Some(350.0), None]);
    }

    #[test]
    fn wedges_partition_the_circle() {
        for count in [2usize, 3, 5, 8] {
            let items = vec![None; count];
            let angles = compute_item_angles(&items, None);
            let wedges = compute_item_wedges(&angles, None);

            assert_eq!(wedges.item_wedges.len(), count);
            assert!(wedges.parent_wedge.is_none());

            // Probe the circle: every direction must fall into exactly one
            // wedge.
            for step in 0..720 {
                let angle = step as f64 * 0.5 + 0.25;
                let hits = wedges
                    .item_wedges
                    .iter()
                    .filter(|w| is_angle_between(angle, w.start, w.end))
                    .count();
                assert_eq!(hits, 1, "angle {angle} hit {hits} wedges");
            }
        }
    }

    #[test]
    fn wedges_leave_a_gap_towards_the_parent() {
        let items = vec![None; 4];
        let angles = compute_item_angles(&items, Some(180.0));
        let wedges = compute_item_wedges(&angles, Some(180.0));

        let parent = wedges.parent_wedge.expect("parent wedge expected");
        assert!(is_angle_between(180.0, parent.start, parent.end));

        for wedge in &wedges.item_wedges {
            assert!(!is_angle_between(180.0, wedge.start, wedge.end));
        }
    }

    #[test]
    fn single_child_wedges() {
        let wedges = compute_item_wedges(&[42.0], None);
        assert_eq!(wedges.item_wedges, vec![Wedge { start: 0.0, end: 360.0 }]);
        assert!(wedges.parent_wedge.is_none());

        let wedges = compute_item_wedges(&[0.0], Some(180.0));
        let item = wedges.item_wedges[0];
        let parent = wedges.parent_wedge.expect("parent wedge expected");
        assert!(is_angle_between(0.0, item.start, item.end));
        assert!(is_angle_between(180.0, parent.start, parent.end));
    }

    #[test]
    fn empty_wedge_input() {
        let wedges = compute_item_wedges(&[], None);
        assert!(wedges.item_wedges.is_empty());
        assert!(wedges.parent_wedge.is_none());
    }

    #[test]
    fn angle_between_handles_wrap_around() {
        assert!(is_angle_between(350.0, 340.0, 380.0));
        assert!(is_angle_between(10.0, 340.0, 380.0));
        assert!(!is_angle_between(100.0, 340.0, 380.0));
        assert!(is_angle_between(-10.0, 340.0, 380.0));
    }

    #[test]
    fn angular_difference_takes_the_shortest_path() {
        assert!((get_angular_difference(10.0, 350.0) - 20.0).abs() < 1e-9);
        assert!((get_angular_difference(0.0, 180.0) - 180.0).abs() < 1e-9);
        assert!((get_angular_difference(720.0, 0.0)).abs() < 1e-9);
    }

    #[test]
    fn closest_equivalent_angle_avoids_full_turns() {
        assert_eq!(get_closest_equivalent_angle(350.0, Some(10.0)), -10.0);
        assert_eq!(get_closest_equivalent_angle(10.0, Some(350.0)), 370.0);
        assert_eq!(get_closest_equivalent_angle(90.0, Some(100.0)), 90.0);
        assert_eq!(get_closest_equivalent_angle(90.0, None), 90.0);
    }

    #[test]
    fn directions_and_angles_are_inverse() {
        for angle in [0.0, 45.0, 90.0, 180.0, 270.0, 359.0] {
            let dir = get_direction(angle, 100.0);
            assert!((get_angle(dir) - angle).abs() < 1e-9);
            assert!((dir.length() - 100.0).abs() < 1e-9);
        }

        // 0 degrees points up, 90 degrees points right.
        let up = get_direction(0.0, 1.0);
        assert!(up.y < -0.999 && up.x.abs() < 1e-9);
        let right = get_direction(90.0, 1.0);
        assert!(right.x > 0.999 && right.y.abs() < 1e-9);
    }

    #[test]
    fn monitor_clamping() {
        let monitor = Vec2::new(1920.0, 1080.0);
        assert_eq!(
            clamp_to_monitor(Vec2::new(10.0, 10.0), 100.0, monitor),
            Vec2::new(100.0, 100.0)
        );
        assert_eq!(
            clamp_to_monitor(Vec2::new(1900.0, 1070.0), 100.0, monitor),
            Vec2::new(1820.0, 980.0)
        );
        assert_eq!(
            clamp_to_monitor(Vec2::new(500.5, 500.5), 100.0, monitor),
            Vec2::new(500.0, 500.0)
        );
    }
}
