//! Pinch-zoom gesture detection over concurrent touch contacts.

use kurbo::Point;

/// A pinch delta derived from two concurrent touches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchUpdate {
    /// Ratio of current to previous finger distance.
    pub scale: f64,
    /// Midpoint of the two touches, in screen coordinates.
    pub anchor: Point,
}

/// Tracks two-finger pinch gestures.
///
/// The stored distance baseline is cleared whenever fewer than two
/// contacts are present, so the next two-finger gesture starts fresh
/// instead of applying a delta extrapolated across the gap.
#[derive(Debug, Clone, Default)]
pub struct GestureDetector {
    last_distance: Option<f64>,
}

impl GestureDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current contact set; returns a pinch update when two
    /// contacts are present and a baseline distance was already
    /// recorded. The first update after (re)acquiring two contacts is
    /// baseline-only.
    pub fn update(&mut self, contacts: &[(u64, Point)]) -> Option<PinchUpdate> {
        if contacts.len() != 2 {
            self.last_distance = None;
            return None;
        }

        let (a, b) = (contacts[0].1, contacts[1].1);
        let distance = a.distance(b);
        let anchor = a.midpoint(b);

        let update = self.last_distance.and_then(|previous| {
            if previous > f64::EPSILON {
                Some(PinchUpdate {
                    scale: distance / previous,
                    anchor,
                })
            } else {
                None
            }
        });

        self.last_distance = Some(distance);
        update
    }

    /// Forget the stored baseline (e.g. on gesture cancel).
    pub fn reset(&mut self) {
        self.last_distance = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contacts(a: (f64, f64), b: (f64, f64)) -> Vec<(u64, Point)> {
        vec![(1, Point::new(a.0, a.1)), (2, Point::new(b.0, b.1))]
    }

    #[test]
    fn test_first_update_is_baseline_only() {
        let mut detector = GestureDetector::new();
        assert_eq!(detector.update(&contacts((0.0, 0.0), (100.0, 0.0))), None);
    }

    #[test]
    fn test_spreading_fingers_zooms_in() {
        let mut detector = GestureDetector::new();
        detector.update(&contacts((0.0, 0.0), (100.0, 0.0)));

        let update = detector
            .update(&contacts((0.0, 0.0), (200.0, 0.0)))
            .unwrap();
        assert!((update.scale - 2.0).abs() < 1e-12);
        assert_eq!(update.anchor, Point::new(100.0, 0.0));
    }

    #[test]
    fn test_closing_fingers_zooms_out() {
        let mut detector = GestureDetector::new();
        detector.update(&contacts((0.0, 0.0), (200.0, 0.0)));

        let update = detector
            .update(&contacts((0.0, 0.0), (100.0, 0.0)))
            .unwrap();
        assert!((update.scale - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_baseline_resets_when_contact_drops() {
        let mut detector = GestureDetector::new();
        detector.update(&contacts((0.0, 0.0), (100.0, 0.0)));
        detector.update(&contacts((0.0, 0.0), (120.0, 0.0)));

        // Down to one finger: baseline cleared.
        assert_eq!(detector.update(&[(1, Point::new(0.0, 0.0))]), None);

        // Back to two fingers at a very different spread: no delta is
        // computed against the pre-drop distance.
        assert_eq!(detector.update(&contacts((0.0, 0.0), (300.0, 0.0))), None);
        let update = detector
            .update(&contacts((0.0, 0.0), (330.0, 0.0)))
            .unwrap();
        assert!((update.scale - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_three_contacts_ignored() {
        let mut detector = GestureDetector::new();
        detector.update(&contacts((0.0, 0.0), (100.0, 0.0)));
        let three = vec![
            (1, Point::new(0.0, 0.0)),
            (2, Point::new(100.0, 0.0)),
            (3, Point::new(50.0, 50.0)),
        ];
        assert_eq!(detector.update(&three), None);
        // Baseline was discarded along the way.
        assert_eq!(detector.update(&contacts((0.0, 0.0), (100.0, 0.0))), None);
    }
}
