//! Input normalization for mouse/touch/pen events.
//!
//! Unifies the three source event families into a single pointer-sample
//! abstraction and tracks concurrent touch contacts so that pinch
//! gestures and single-point drawing stay mutually exclusive.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source device family of a raw pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerDevice {
    Mouse,
    Touch,
    Pen,
}

/// Phase of a pointer contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// Treated identically to `Up` by the stroke builder.
    Cancel,
}

/// A raw platform pointer event, before normalization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawPointerEvent {
    pub phase: PointerPhase,
    pub device: PointerDevice,
    /// Platform pointer/touch identifier.
    pub pointer_id: u64,
    /// Position in screen coordinates.
    pub position: Point,
    /// Device-reported pressure, if any.
    pub pressure: Option<f64>,
    /// Host-supplied event timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl RawPointerEvent {
    pub fn new(phase: PointerPhase, device: PointerDevice, pointer_id: u64, position: Point) -> Self {
        Self {
            phase,
            device,
            pointer_id,
            position,
            pressure: None,
            timestamp_ms: 0,
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }
}

/// A normalized pointer sample in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub position: Point,
    /// Normalized pressure in [0, 1]; 1.0 when the device reports none.
    pub pressure: f64,
    pub device_id: u64,
    pub timestamp_ms: u64,
}

/// Input capabilities of the host platform, resolved once at
/// construction instead of feature-sniffed at runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InputCapabilities {
    /// Whether the platform delivers meaningful pressure values.
    pub reports_pressure: bool,
    /// Whether the platform can report more than one touch contact.
    pub multi_touch: bool,
}

impl Default for InputCapabilities {
    fn default() -> Self {
        Self {
            reports_pressure: true,
            multi_touch: true,
        }
    }
}

/// Result of normalizing one raw event.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedInput {
    /// A single-contact sample; feeds the stroke builder or pan drag.
    Sample {
        phase: PointerPhase,
        sample: PointerSample,
    },
    /// More than one simultaneous contact was involved: drawing is
    /// suppressed for this event and control passes to the gesture
    /// detector with the full contact set (which may have fewer than
    /// two contacts left after a lift, resetting the pinch baseline).
    MultiTouch {
        contacts: Vec<(u64, Point)>,
        timestamp_ms: u64,
    },
    /// Event carried no usable coordinates; state untouched.
    Dropped,
}

/// Normalizes raw platform events into pointer samples.
///
/// Each raw event yields at most one output; there is no buffering or
/// coalescing beyond what the platform already did.
#[derive(Debug, Clone)]
pub struct InputNormalizer {
    capabilities: InputCapabilities,
    /// Active touch contacts, id to last-known screen point.
    contacts: BTreeMap<u64, Point>,
}

impl InputNormalizer {
    pub fn new(capabilities: InputCapabilities) -> Self {
        Self {
            capabilities,
            contacts: BTreeMap::new(),
        }
    }

    pub fn capabilities(&self) -> InputCapabilities {
        self.capabilities
    }

    /// Number of currently tracked touch contacts.
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Normalize one raw event.
    pub fn normalize(&mut self, event: &RawPointerEvent) -> NormalizedInput {
        if !event.position.x.is_finite() || !event.position.y.is_finite() {
            return NormalizedInput::Dropped;
        }

        if event.device == PointerDevice::Touch && self.capabilities.multi_touch {
            return self.normalize_touch(event);
        }

        NormalizedInput::Sample {
            phase: event.phase,
            sample: self.sample_from(event),
        }
    }

    fn normalize_touch(&mut self, event: &RawPointerEvent) -> NormalizedInput {
        let was_multi = self.contacts.len() > 1;

        match event.phase {
            PointerPhase::Down | PointerPhase::Move => {
                self.contacts.insert(event.pointer_id, event.position);
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                self.contacts.remove(&event.pointer_id);
            }
        }

        // Multi-touch suppresses drawing both while it is in progress
        // and on the event that ends it, so a lifted second finger does
        // not turn into a stray stroke sample.
        if self.contacts.len() > 1 || was_multi {
            return NormalizedInput::MultiTouch {
                contacts: self.contacts.iter().map(|(&id, &p)| (id, p)).collect(),
                timestamp_ms: event.timestamp_ms,
            };
        }

        NormalizedInput::Sample {
            phase: event.phase,
            sample: self.sample_from(event),
        }
    }

    fn sample_from(&self, event: &RawPointerEvent) -> PointerSample {
        let pressure = if self.capabilities.reports_pressure {
            event.pressure.map(|p| p.clamp(0.0, 1.0)).unwrap_or(1.0)
        } else {
            1.0
        };

        PointerSample {
            position: event.position,
            pressure,
            device_id: event.pointer_id,
            timestamp_ms: event.timestamp_ms,
        }
    }
}

impl Default for InputNormalizer {
    fn default() -> Self {
        Self::new(InputCapabilities::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(phase: PointerPhase, id: u64, x: f64, y: f64) -> RawPointerEvent {
        RawPointerEvent::new(phase, PointerDevice::Touch, id, Point::new(x, y))
    }

    #[test]
    fn test_mouse_event_yields_sample() {
        let mut normalizer = InputNormalizer::default();
        let event = RawPointerEvent::new(
            PointerPhase::Down,
            PointerDevice::Mouse,
            0,
            Point::new(10.0, 20.0),
        );

        match normalizer.normalize(&event) {
            NormalizedInput::Sample { phase, sample } => {
                assert_eq!(phase, PointerPhase::Down);
                assert_eq!(sample.position, Point::new(10.0, 20.0));
                assert!((sample.pressure - 1.0).abs() < f64::EPSILON);
            }
            other => panic!("expected sample, got {other:?}"),
        }
    }

    #[test]
    fn test_pressure_clamped() {
        let mut normalizer = InputNormalizer::default();
        let event = RawPointerEvent::new(
            PointerPhase::Move,
            PointerDevice::Pen,
            0,
            Point::new(0.0, 0.0),
        )
        .with_pressure(2.5);

        match normalizer.normalize(&event) {
            NormalizedInput::Sample { sample, .. } => {
                assert!((sample.pressure - 1.0).abs() < f64::EPSILON);
            }
            other => panic!("expected sample, got {other:?}"),
        }
    }

    #[test]
    fn test_pressure_capability_disabled() {
        let mut normalizer = InputNormalizer::new(InputCapabilities {
            reports_pressure: false,
            multi_touch: true,
        });
        let event = RawPointerEvent::new(
            PointerPhase::Move,
            PointerDevice::Pen,
            0,
            Point::new(0.0, 0.0),
        )
        .with_pressure(0.3);

        match normalizer.normalize(&event) {
            NormalizedInput::Sample { sample, .. } => {
                assert!((sample.pressure - 1.0).abs() < f64::EPSILON);
            }
            other => panic!("expected sample, got {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_coordinates_dropped() {
        let mut normalizer = InputNormalizer::default();
        let event = RawPointerEvent::new(
            PointerPhase::Down,
            PointerDevice::Touch,
            1,
            Point::new(f64::NAN, 5.0),
        );

        assert_eq!(normalizer.normalize(&event), NormalizedInput::Dropped);
        assert_eq!(normalizer.contact_count(), 0);
    }

    #[test]
    fn test_second_contact_switches_to_multitouch() {
        let mut normalizer = InputNormalizer::default();

        let first = normalizer.normalize(&touch(PointerPhase::Down, 1, 0.0, 0.0));
        assert!(matches!(first, NormalizedInput::Sample { .. }));

        match normalizer.normalize(&touch(PointerPhase::Down, 2, 100.0, 0.0)) {
            NormalizedInput::MultiTouch { contacts, .. } => {
                assert_eq!(contacts.len(), 2);
            }
            other => panic!("expected multitouch, got {other:?}"),
        }
    }

    #[test]
    fn test_lifting_second_finger_stays_suppressed() {
        let mut normalizer = InputNormalizer::default();
        normalizer.normalize(&touch(PointerPhase::Down, 1, 0.0, 0.0));
        normalizer.normalize(&touch(PointerPhase::Down, 2, 100.0, 0.0));

        // The lift event itself must not produce a drawing sample.
        match normalizer.normalize(&touch(PointerPhase::Up, 2, 100.0, 0.0)) {
            NormalizedInput::MultiTouch { contacts, .. } => {
                assert_eq!(contacts.len(), 1);
            }
            other => panic!("expected multitouch, got {other:?}"),
        }

        // Subsequent moves of the remaining finger draw again.
        let next = normalizer.normalize(&touch(PointerPhase::Move, 1, 10.0, 10.0));
        assert!(matches!(next, NormalizedInput::Sample { .. }));
    }

    #[test]
    fn test_multi_touch_capability_disabled() {
        let mut normalizer = InputNormalizer::new(InputCapabilities {
            reports_pressure: true,
            multi_touch: false,
        });
        normalizer.normalize(&touch(PointerPhase::Down, 1, 0.0, 0.0));
        let second = normalizer.normalize(&touch(PointerPhase::Down, 2, 100.0, 0.0));
        assert!(matches!(second, NormalizedInput::Sample { .. }));
    }
}
