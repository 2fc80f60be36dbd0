//! # Registration records.
//!
//! A [`RegistrationRecord`] describes one circular region the caller asked to
//! be notified about. Records are serialized to JSON and stored opaquely by
//! the [`RegistrationStore`](crate::RegistrationStore); the same record is
//! handed to the [`RegionMonitor`](crate::RegionMonitor) on registration and
//! again on reboot replay.
//!
//! ## Example
//! ```rust
//! use fencevisor::{CallbackHandle, Location, RegistrationRecord, Transition, TransitionMask};
//!
//! let rec = RegistrationRecord::new("home", CallbackHandle(7), Location::new(52.37, 4.89), 150.0)
//!     .with_transitions(TransitionMask::from(Transition::Enter) | Transition::Exit)
//!     .with_dwell_delay_ms(30_000);
//!
//! assert!(rec.transitions.contains(Transition::Exit));
//! assert!(!rec.transitions.contains(Transition::Dwell));
//! ```

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use super::handle::CallbackHandle;

/// Kind of region transition.
///
/// The discriminants match the bit values used by [`TransitionMask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    /// The device entered the region.
    Enter = 1,
    /// The device left the region.
    Exit = 2,
    /// The device stayed inside the region for the dwell delay.
    Dwell = 4,
}

impl Transition {
    /// Decodes a raw transition code; returns `None` for unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Transition::Enter),
            2 => Some(Transition::Exit),
            4 => Some(Transition::Dwell),
            _ => None,
        }
    }

    /// Raw code of this transition.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Short stable label (for logs).
    pub fn as_label(self) -> &'static str {
        match self {
            Transition::Enter => "enter",
            Transition::Exit => "exit",
            Transition::Dwell => "dwell",
        }
    }
}

/// Bitset of [`Transition`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionMask(u8);

impl TransitionMask {
    /// Mask with no transitions set.
    pub const NONE: TransitionMask = TransitionMask(0);
    /// Mask with every transition set.
    pub const ALL: TransitionMask = TransitionMask(0b111);

    /// Builds a mask from raw bits, dropping unknown bits.
    pub fn from_bits(bits: u8) -> Self {
        TransitionMask(bits & Self::ALL.0)
    }

    /// Raw bits.
    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if `t` is part of the mask.
    #[inline]
    pub fn contains(self, t: Transition) -> bool {
        self.0 & (t as u8) != 0
    }

    /// Returns true if no transition is set.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every bit of `self` is also set in `other`.
    #[inline]
    pub fn is_subset_of(self, other: TransitionMask) -> bool {
        self.0 & !other.0 == 0
    }
}

impl From<Transition> for TransitionMask {
    fn from(t: Transition) -> Self {
        TransitionMask(t as u8)
    }
}

impl BitOr for TransitionMask {
    type Output = TransitionMask;

    fn bitor(self, rhs: TransitionMask) -> TransitionMask {
        TransitionMask(self.0 | rhs.0)
    }
}

impl BitOr<Transition> for TransitionMask {
    type Output = TransitionMask;

    fn bitor(self, rhs: Transition) -> TransitionMask {
        TransitionMask(self.0 | rhs as u8)
    }
}

/// A point on the globe (WGS84 degrees).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// How long a region stays registered with the monitor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expiration {
    /// The region never expires.
    #[default]
    Never,
    /// The region expires this many milliseconds after registration.
    AfterMillis(u64),
}

/// One monitored circular region.
///
/// ### Field semantics
/// - `id`: caller-supplied, unique across the live set
/// - `radius_meters`: must be `> 0` (see [`RegistrationRecord::is_valid`])
/// - `initial_triggers`: transitions evaluated right after registration
/// - `callback`: routed back with every [`GeofenceEvent`](crate::GeofenceEvent)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub id: String,
    pub callback: CallbackHandle,
    pub center: Location,
    pub radius_meters: f32,
    pub transitions: TransitionMask,
    pub initial_triggers: TransitionMask,
    pub expiration: Expiration,
    pub dwell_delay_ms: u32,
    pub responsiveness_ms: u32,
}

impl RegistrationRecord {
    /// Creates a record that watches enter + exit, triggers on initial enter,
    /// and never expires.
    pub fn new(
        id: impl Into<String>,
        callback: CallbackHandle,
        center: Location,
        radius_meters: f32,
    ) -> Self {
        Self {
            id: id.into(),
            callback,
            center,
            radius_meters,
            transitions: TransitionMask::from(Transition::Enter) | Transition::Exit,
            initial_triggers: TransitionMask::from(Transition::Enter),
            expiration: Expiration::Never,
            dwell_delay_ms: 0,
            responsiveness_ms: 0,
        }
    }

    pub fn with_transitions(mut self, mask: TransitionMask) -> Self {
        self.transitions = mask;
        self
    }

    pub fn with_initial_triggers(mut self, mask: TransitionMask) -> Self {
        self.initial_triggers = mask;
        self
    }

    pub fn with_expiration(mut self, expiration: Expiration) -> Self {
        self.expiration = expiration;
        self
    }

    pub fn with_dwell_delay_ms(mut self, ms: u32) -> Self {
        self.dwell_delay_ms = ms;
        self
    }

    pub fn with_responsiveness_ms(mut self, ms: u32) -> Self {
        self.responsiveness_ms = ms;
        self
    }

    /// Returns true if the record can be handed to a monitor.
    ///
    /// Requires a non-empty id, a finite positive radius and at least one
    /// watched transition.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
            && self.radius_meters.is_finite()
            && self.radius_meters > 0.0
            && !self.transitions.is_empty()
    }

    /// Lightweight view of this record.
    pub fn summary(&self) -> RegionSummary {
        RegionSummary {
            id: self.id.clone(),
            center: self.center,
            radius_meters: self.radius_meters,
        }
    }
}

/// Id, center and radius of a registered region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub id: String,
    pub center: Location,
    pub radius_meters: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_codes_roundtrip_known_values_only() {
        assert_eq!(Transition::from_code(1), Some(Transition::Enter));
        assert_eq!(Transition::from_code(2), Some(Transition::Exit));
        assert_eq!(Transition::from_code(4), Some(Transition::Dwell));
        assert_eq!(Transition::from_code(3), None);
        assert_eq!(Transition::from_code(0), None);
    }

    #[test]
    fn test_mask_drops_unknown_bits() {
        let mask = TransitionMask::from_bits(0xFF);
        assert_eq!(mask, TransitionMask::ALL);
        assert!(mask.contains(Transition::Dwell));
    }

    #[test]
    fn test_initial_triggers_subset() {
        let watched = TransitionMask::from(Transition::Enter) | Transition::Exit;
        assert!(TransitionMask::from(Transition::Enter).is_subset_of(watched));
        assert!(!TransitionMask::from(Transition::Dwell).is_subset_of(watched));
        assert!(TransitionMask::NONE.is_subset_of(watched));
    }

    #[test]
    fn test_record_validity() {
        let ok = RegistrationRecord::new("a", CallbackHandle(1), Location::new(0.0, 0.0), 10.0);
        assert!(ok.is_valid());

        let mut bad = ok.clone();
        bad.radius_meters = 0.0;
        assert!(!bad.is_valid());

        let mut bad = ok.clone();
        bad.radius_meters = f32::NAN;
        assert!(!bad.is_valid());

        let bad = ok.clone().with_transitions(TransitionMask::NONE);
        assert!(!bad.is_valid());

        let mut bad = ok;
        bad.id.clear();
        assert!(!bad.is_valid());
    }

    #[test]
    fn test_record_json_keeps_expiration() {
        let rec = RegistrationRecord::new("a", CallbackHandle(1), Location::new(1.5, -2.5), 10.0)
            .with_expiration(Expiration::AfterMillis(60_000));
        let json = serde_json::to_string(&rec).unwrap();
        let back: RegistrationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.expiration, Expiration::AfterMillis(60_000));
        assert_eq!(back, rec);
    }
}
