//! Stroke gesture detection
//!
//! Recognizes selections from continuous pointer motion, without a discrete
//! button event. This drives the marking and turbo modes: while an item is
//! dragged, a selection fires when the stroke makes a sharp turn, when the
//! pointer pauses for a moment, or - in fixed-length mode - as soon as the
//! stroke is long enough.
//!
//! The detector is a pure state machine. Time is injected by the caller, so
//! identical motion sequences always produce identical selections.

use std::time::{Duration, Instant};

use crate::math::Vec2;

/// Detects stroke gestures from a stream of motion samples.
///
/// Consider this stroke:
///
/// ```text
///                             M
///                           .
///                         .
///     S ---------------- E
/// ```
///
/// The stroke started at S and was straight until E. When the next motion
/// sample M arrives, the directions of S->E and E->M are compared. If they
/// differ by more than `min_stroke_angle`, this is a corner and a selection
/// fires at E. If E->M roughly continues the stroke, E advances to M. If the
/// pointer then rests for `pause_timeout`, a selection fires at the resting
/// point.
#[derive(Debug)]
pub struct GestureDetector {
    /// Shorter strokes will not lead to selections.
    pub min_stroke_length: f64,

    /// Smaller turns will not lead to selections, in degrees.
    pub min_stroke_angle: f64,

    /// Movements below this length are not considered, in pixels.
    pub jitter_threshold: f64,

    /// If the pointer rests for this long mid-stroke, a selection fires.
    pub pause_timeout: Duration,

    /// Used together with `fixed_stroke_length` for distance-based
    /// selections.
    pub center_dead_zone: f64,

    /// If greater than zero, selections fire as soon as the stroke is longer
    /// than `fixed_stroke_length + center_dead_zone`. Corner and pause
    /// detection are disabled in this mode.
    pub fixed_stroke_length: f64,

    /// Start of the current stroke, set by the first sample after a reset.
    stroke_start: Option<Vec2>,

    /// Tip of the current stroke, advanced with each sample.
    stroke_end: Option<Vec2>,

    /// Pending pause selection: the position it would fire at and the time
    /// at which it fires.
    pause: Option<(Vec2, Instant)>,
}

impl Default for GestureDetector {
    fn default() -> Self {
        Self {
            min_stroke_length: 150.0,
            min_stroke_angle: 20.0,
            jitter_threshold: 10.0,
            pause_timeout: Duration::from_millis(100),
            center_dead_zone: 50.0,
            fixed_stroke_length: 0.0,
            stroke_start: None,
            stroke_end: None,
            pause: None,
        }
    }
}

impl GestureDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one motion sample into the detector. Returns the position of a
    /// selection if this sample completed one.
    pub fn on_motion(&mut self, coords: Vec2, now: Instant) -> Option<Vec2> {
        let (Some(start), Some(end)) = (self.stroke_start, self.stroke_end) else {
            // First sample of this gesture; it anchors the stroke.
            self.stroke_start = Some(coords);
            self.stroke_end = Some(coords);
            return None;
        };

        let stroke_dir = end - start;
        let stroke_length = stroke_dir.length();

        // In fixed-length mode only the stroke length matters.
        if self.fixed_stroke_length > 0.0 {
            let min_length = self.fixed_stroke_length + self.center_dead_zone;
            let mut selection = None;

            if stroke_length > min_length {
                let ideal = start + stroke_dir * (min_length / stroke_length);
                self.reset(Some(ideal));
                selection = Some(ideal);
            }

            self.stroke_end = Some(coords);
            return selection;
        }

        if stroke_length > self.min_stroke_length {
            let tip_dir = coords - end;
            let tip_length = tip_dir.length();

            if tip_length > self.jitter_threshold {
                // The pointer is moving, so it is not pausing.
                self.pause = None;

                let cos = tip_dir.normalized().dot(stroke_dir) / stroke_length;
                let angle = cos.clamp(-1.0, 1.0).acos().to_degrees();

                if angle > self.min_stroke_angle {
                    // A corner. The selection happened back at the tip.
                    self.reset(Some(end));
                    return Some(end);
                }

                // The stroke continues; straighten it out to the new tip.
                self.stroke_end = Some(coords);
            }

            // The stroke is long enough to be a gesture, so a pause would
            // now select. The pending pause keeps the position of the
            // sample which armed it.
            if self.pause.is_none() {
                self.pause = Some((coords, now + self.pause_timeout));
            }
        } else {
            // Not long enough yet; only advance the tip.
            self.stroke_end = Some(coords);
        }

        None
    }

    /// Checks the pause timer. Returns the position of a selection if the
    /// pointer has been resting long enough.
    pub fn poll(&mut self, now: Instant) -> Option<Vec2> {
        match self.pause {
            Some((coords, deadline)) if now >= deadline => {
                self.reset(Some(coords));
                Some(coords)
            }
            _ => None,
        }
    }

    /// Resets the gesture detection, e.g. when the pointer button is
    /// released. If the gesture may continue (after a selection), the last
    /// corner becomes the anchor of the next stroke.
    pub fn reset(&mut self, last_corner: Option<Vec2>) {
        self.pause = None;
        self.stroke_start = last_corner;
        self.stroke_end = last_corner;
    }
}
