//! Tuning for the bolt walk, the buffer fade and the flash overlay.

use crate::error::LightningError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive range a fresh drift segment's length is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRange {
    pub min: u32,
    pub max: u32,
}

impl SegmentRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightningConfig {
    /// Chance per tick of a new root strike while under the cap.
    pub spawn_chance: f64,
    /// Cap on roots and branches combined.
    pub max_active: usize,
    /// Rows each bolt falls per tick.
    pub sub_steps_per_tick: u32,
    pub segment_length: SegmentRange,
    pub kink_chance: f64,
    pub max_kink: u32,
    pub branch_base: f64,
    pub branch_depth_decay: f64,
    pub branch_min_chance: f64,
    /// Buffer persistence per tick.
    pub decay: f32,
    /// Flash opacity set by a strike or a grounding. 0 disables the flash.
    pub flash_strength: f32,
    /// Flash opacity lost per tick.
    pub flash_fade: f32,
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl LightningConfig {
    /// Lone storm over a dark sky: rare, fast, wide-kinked strikes with a flash.
    pub fn classic() -> Self {
        Self {
            spawn_chance: 0.02,
            max_active: 25,
            sub_steps_per_tick: 35,
            segment_length: SegmentRange::new(10, 29),
            kink_chance: 0.1,
            max_kink: 4,
            branch_base: 0.02,
            branch_depth_decay: 2.5,
            branch_min_chance: 0.002,
            decay: 0.82,
            flash_strength: 0.3,
            flash_fade: 0.1,
        }
    }

    /// Busy backdrop: frequent, slower, tighter strikes and no flash.
    pub fn storm() -> Self {
        Self {
            spawn_chance: 0.07,
            sub_steps_per_tick: 25,
            max_kink: 2,
            flash_strength: 0.0,
            ..Self::classic()
        }
    }

    pub fn validate(&self) -> Result<(), LightningError> {
        if self.max_active == 0 {
            return Err(LightningError::invalid("max_active must be at least 1"));
        }
        if self.sub_steps_per_tick == 0 {
            return Err(LightningError::invalid(
                "sub_steps_per_tick must be at least 1",
            ));
        }
        if self.segment_length.min == 0 || self.segment_length.min > self.segment_length.max {
            return Err(LightningError::invalid(format!(
                "segment_length {}..={} must be a non-empty range starting at 1 or more",
                self.segment_length.min, self.segment_length.max
            )));
        }
        if i32::try_from(self.max_kink).is_err() {
            return Err(LightningError::invalid(format!(
                "max_kink must fit in i32, got {}",
                self.max_kink
            )));
        }
        for (name, p) in [
            ("spawn_chance", self.spawn_chance),
            ("kink_chance", self.kink_chance),
            ("branch_base", self.branch_base),
            ("branch_min_chance", self.branch_min_chance),
        ] {
            check_probability(name, p)?;
        }
        if !self.branch_depth_decay.is_finite() || self.branch_depth_decay < 0.0 {
            return Err(LightningError::invalid(format!(
                "branch_depth_decay must be finite and non-negative, got {}",
                self.branch_depth_decay
            )));
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(LightningError::invalid(format!(
                "decay must lie strictly between 0 and 1, got {}",
                self.decay
            )));
        }
        for (name, v) in [
            ("flash_strength", self.flash_strength),
            ("flash_fade", self.flash_fade),
        ] {
            check_probability(name, v as f64)?;
        }
        Ok(())
    }
}

fn check_probability(name: &str, p: f64) -> Result<(), LightningError> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(LightningError::invalid(format!(
            "{name} must lie in [0, 1], got {p}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn presets_validate() {
        assert!(LightningConfig::classic().validate().is_ok());
        assert!(LightningConfig::storm().validate().is_ok());
    }

    #[test]
    fn zero_cap_is_rejected() {
        let cfg = LightningConfig {
            max_active: 0,
            ..LightningConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(LightningError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn probabilities_are_not_clamped() {
        let over = LightningConfig {
            spawn_chance: 1.5,
            ..LightningConfig::default()
        };
        assert!(over.validate().is_err());

        let nan = LightningConfig {
            kink_chance: f64::NAN,
            ..LightningConfig::default()
        };
        assert!(nan.validate().is_err());

        let neg = LightningConfig {
            branch_min_chance: -0.01,
            ..LightningConfig::default()
        };
        assert!(neg.validate().is_err());
    }

    #[test]
    fn empty_segment_range_is_rejected() {
        let cfg = LightningConfig {
            segment_length: SegmentRange::new(12, 4),
            ..LightningConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn oversized_kink_is_rejected() {
        let cfg = LightningConfig {
            max_kink: 3_000_000_000,
            kink_chance: 1.0,
            ..LightningConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(LightningError::InvalidConfiguration(_))
        ));

        let widest = LightningConfig {
            max_kink: i32::MAX as u32,
            ..LightningConfig::default()
        };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn decay_must_fade() {
        for decay in [0.0, 1.0, 1.2] {
            let cfg = LightningConfig {
                decay,
                ..LightningConfig::default()
            };
            assert!(cfg.validate().is_err(), "decay {decay} accepted");
        }
    }

    #[test]
    fn segment_sample_stays_in_range() {
        let range = SegmentRange::new(3, 5);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let v = range.sample(&mut rng);
            assert!((3..=5).contains(&v));
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: LightningConfig =
            serde_json::from_str(r#"{ "spawn_chance": 0.5, "max_active": 3 }"#).unwrap();
        assert_eq!(cfg.spawn_chance, 0.5);
        assert_eq!(cfg.max_active, 3);
        assert_eq!(cfg.sub_steps_per_tick, LightningConfig::classic().sub_steps_per_tick);
        assert!(cfg.validate().is_ok());
    }
}
