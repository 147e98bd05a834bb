//! Drive-cycle segments.
//!
//! The cycle is five contiguous segments:
//!
//! ```text
//!  0      3                     28   31         43   46 s
//!  |Idle1 |        Ramp          |Hold|  Coast   |Idle2|
//! ```
//!
//! Membership is a pure function of the cycle phase.

use dyno_common::consts::{T_COAST, T_HOLD, T_IDLE1, T_IDLE2, T_RAMP};

/// One of the five named phases of the drive cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseSegment {
    /// Constant idle before the sweep.
    Idle1,
    /// Smoothstep sweep from idle to redline.
    Ramp,
    /// Breathing near the limiter.
    Hold,
    /// Smoothstep back down to idle.
    Coast,
    /// Constant idle after the coast.
    Idle2,
}

impl PhaseSegment {
    /// Segments in cycle order.
    pub const ALL: [PhaseSegment; 5] = [
        PhaseSegment::Idle1,
        PhaseSegment::Ramp,
        PhaseSegment::Hold,
        PhaseSegment::Coast,
        PhaseSegment::Idle2,
    ];

    /// Fixed length in seconds.
    pub const fn duration(self) -> f64 {
        match self {
            PhaseSegment::Idle1 => T_IDLE1,
            PhaseSegment::Ramp => T_RAMP,
            PhaseSegment::Hold => T_HOLD,
            PhaseSegment::Coast => T_COAST,
            PhaseSegment::Idle2 => T_IDLE2,
        }
    }

    /// Phase at which this segment begins.
    pub fn start(self) -> f64 {
        Self::ALL
            .iter()
            .take_while(|s| **s != self)
            .map(|s| s.duration())
            .sum()
    }

    /// Segment containing `phase`, with the time already spent in it.
    ///
    /// Phases past the end of the cycle resolve to `Idle2`, negative phases
    /// to `Idle1` at offset 0.
    pub fn locate(phase: f64) -> (PhaseSegment, f64) {
        let mut t = phase.max(0.0);
        for seg in Self::ALL {
            if t < seg.duration() {
                return (seg, t);
            }
            t -= seg.duration();
        }
        (PhaseSegment::Idle2, T_IDLE2)
    }

    /// Segment containing `phase`.
    pub fn at(phase: f64) -> PhaseSegment {
        Self::locate(phase).0
    }
}

impl std::fmt::Display for PhaseSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PhaseSegment::Idle1 => "Idle1",
            PhaseSegment::Ramp => "Ramp",
            PhaseSegment::Hold => "Hold",
            PhaseSegment::Coast => "Coast",
            PhaseSegment::Idle2 => "Idle2",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dyno_common::consts::CYCLE_T;

    #[test]
    fn test_durations_sum_to_cycle() {
        let sum: f64 = PhaseSegment::ALL.iter().map(|s| s.duration()).sum();
        assert_eq!(sum, CYCLE_T);
    }

    #[test]
    fn test_segment_starts() {
        assert_eq!(PhaseSegment::Idle1.start(), 0.0);
        assert_eq!(PhaseSegment::Ramp.start(), 3.0);
        assert_eq!(PhaseSegment::Hold.start(), 28.0);
        assert_eq!(PhaseSegment::Coast.start(), 31.0);
        assert_eq!(PhaseSegment::Idle2.start(), 43.0);
    }

    #[test]
    fn test_boundaries_belong_to_next_segment() {
        assert_eq!(PhaseSegment::at(0.0), PhaseSegment::Idle1);
        assert_eq!(PhaseSegment::at(2.999), PhaseSegment::Idle1);
        assert_eq!(PhaseSegment::at(3.0), PhaseSegment::Ramp);
        assert_eq!(PhaseSegment::at(28.0), PhaseSegment::Hold);
        assert_eq!(PhaseSegment::at(31.0), PhaseSegment::Coast);
        assert_eq!(PhaseSegment::at(43.0), PhaseSegment::Idle2);
        assert_eq!(PhaseSegment::at(45.999), PhaseSegment::Idle2);
    }

    #[test]
    fn test_every_phase_resolves_to_one_segment() {
        let mut phase = 0.0;
        while phase < CYCLE_T {
            let (seg, offset) = PhaseSegment::locate(phase);
            assert!(offset >= 0.0 && offset < seg.duration(), "phase {phase}");
            assert!((seg.start() + offset - phase).abs() < 1e-9);
            phase += 0.005;
        }
    }

    #[test]
    fn test_out_of_range_phase() {
        assert_eq!(PhaseSegment::locate(-1.0), (PhaseSegment::Idle1, 0.0));
        assert_eq!(PhaseSegment::at(CYCLE_T + 1.0), PhaseSegment::Idle2);
    }
}
