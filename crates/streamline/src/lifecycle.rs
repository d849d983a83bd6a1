//! Per-sample life-cycle states and the extinction classifier.
//!
//! The trail redrawn by [`Streamline::tick`](crate::Streamline::tick) never
//! consults any of this. The extinction pass is a separate, explicit call for
//! scenes that want samples to die and respawn.

use curlflow_core::{DVec3, ExtinctionPolicy};

/// Why a sample was retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtinctionReason {
    Age,
    Velocity,
    Distance,
}

/// Life-cycle state of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleState {
    #[default]
    Active,
    Dying(ExtinctionReason),
    /// Freshly respawned; becomes `Active` on the next extinction pass.
    Respawning,
}

impl ParticleState {
    pub fn is_dying(self) -> bool {
        matches!(self, ParticleState::Dying(_))
    }
}

/// Classifies one sample under `policy`.
///
/// `field_speed` is only evaluated for [`ExtinctionPolicy::ByVelocity`], since
/// it costs three noise samples.
pub fn classify(
    policy: &ExtinctionPolicy,
    position: DVec3,
    remaining_life: f64,
    field_speed: impl FnOnce() -> f64,
) -> ParticleState {
    let reason = match *policy {
        ExtinctionPolicy::None => None,
        ExtinctionPolicy::ByAge => (remaining_life <= 0.0).then_some(ExtinctionReason::Age),
        ExtinctionPolicy::ByVelocity { min_speed } => {
            (field_speed() < min_speed).then_some(ExtinctionReason::Velocity)
        }
        ExtinctionPolicy::ByDistance { max_distance } => {
            (position.length() > max_distance).then_some(ExtinctionReason::Distance)
        }
    };
    reason.map_or(ParticleState::Active, ParticleState::Dying)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_speed() -> f64 {
        panic!("field speed evaluated for a policy that does not need it")
    }

    #[test]
    fn none_policy_keeps_everything_active() {
        let s = classify(&ExtinctionPolicy::None, DVec3::splat(1e6), -5.0, unreachable_speed);
        assert_eq!(s, ParticleState::Active);
    }

    #[test]
    fn age_policy_kills_at_zero_life() {
        let p = ExtinctionPolicy::ByAge;
        assert_eq!(
            classify(&p, DVec3::ZERO, 0.0, unreachable_speed),
            ParticleState::Dying(ExtinctionReason::Age)
        );
        assert_eq!(
            classify(&p, DVec3::ZERO, 0.5, unreachable_speed),
            ParticleState::Active
        );
    }

    #[test]
    fn velocity_policy_kills_slow_samples() {
        let p = ExtinctionPolicy::ByVelocity { min_speed: 0.1 };
        assert_eq!(
            classify(&p, DVec3::ZERO, 10.0, || 0.05),
            ParticleState::Dying(ExtinctionReason::Velocity)
        );
        assert_eq!(classify(&p, DVec3::ZERO, 10.0, || 0.2), ParticleState::Active);
    }

    #[test]
    fn distance_policy_kills_far_samples() {
        let p = ExtinctionPolicy::ByDistance { max_distance: 1.0 };
        assert_eq!(
            classify(&p, DVec3::new(2.0, 0.0, 0.0), 10.0, unreachable_speed),
            ParticleState::Dying(ExtinctionReason::Distance)
        );
        assert_eq!(
            classify(&p, DVec3::new(0.5, 0.5, 0.0), 10.0, unreachable_speed),
            ParticleState::Active
        );
    }

    #[test]
    fn is_dying_only_for_dying_states() {
        assert!(ParticleState::Dying(ExtinctionReason::Age).is_dying());
        assert!(!ParticleState::Active.is_dying());
        assert!(!ParticleState::Respawning.is_dying());
    }
}
