use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the annihilation sweep resolves pairs.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnnihilationMode {
    /// In-place scan over slots, mutating charges as pairs are found.
    Sequential,
    /// Parallel read-only candidate search, then an ordered serial commit.
    #[default]
    MarkThenCommit,
}

/// What happens to tombstoned slots during integration.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TombstoneMotion {
    /// Tombstones keep their last velocity and keep drifting under damping.
    #[default]
    Stale,
    /// Tombstones have their velocity zeroed and are never moved.
    Frozen,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Number of vortices placed at start; the first half is positive.
    pub initial_vortices: usize,
    /// Side length `D` of the periodic square domain.
    pub domain_size: f64,
    /// Circulation quantum `κ` used by the induced-velocity law.
    pub kappa: f64,
    /// Opposite-sign pairs closer than this are annihilated.
    pub annihilation_radius: f64,
    /// Charge-signed rotational drag coefficient.
    pub alpha: f64,
    /// Isotropic linear damping coefficient.
    pub alphap: f64,
    /// Fixed integration timestep.
    pub dt: f64,
    /// Dipole pairs added per injection event. Zero disables injection.
    pub inject_pairs: usize,
    /// Simulated time that must elapse between injections.
    pub inject_interval: f64,
    /// Standard deviation of injection jitter, as a fraction of `domain_size`.
    pub injection_jitter: f64,
    /// Pair distances below this are clamped before dividing by `r²`.
    pub min_separation: f64,
    pub seed: u64,
    pub annihilation_mode: AnnihilationMode,
    pub tombstone_motion: TombstoneMotion,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_vortices: 50,
            domain_size: 1e-2,
            kappa: 9.96e-4,
            annihilation_radius: 1e-4,
            alpha: 0.03,
            alphap: 1.76e-2,
            dt: 1e-4,
            inject_pairs: 10,
            inject_interval: 1e-3,
            injection_jitter: 0.01,
            min_separation: 1e-9,
            seed: 42,
            annihilation_mode: AnnihilationMode::default(),
            tombstone_motion: TombstoneMotion::default(),
        }
    }
}

impl SimConfig {
    /// Checks every physical parameter once, before a simulation is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.domain_size.is_finite() && self.domain_size > 0.0) {
            return Err(ConfigError::DomainSize(self.domain_size));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::TimeStep(self.dt));
        }
        if !(self.inject_interval.is_finite() && self.inject_interval > 0.0) {
            return Err(ConfigError::InjectInterval(self.inject_interval));
        }
        if !(self.annihilation_radius.is_finite() && self.annihilation_radius >= 0.0) {
            return Err(ConfigError::AnnihilationRadius(self.annihilation_radius));
        }
        if !self.kappa.is_finite() {
            return Err(ConfigError::Kappa(self.kappa));
        }
        for (name, value) in [
            ("alpha", self.alpha),
            ("alphap", self.alphap),
            ("injection_jitter", self.injection_jitter),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Coefficient { name, value });
            }
        }
        if !(self.min_separation.is_finite()
            && self.min_separation > 0.0
            && self.min_separation < self.domain_size)
        {
            return Err(ConfigError::MinSeparation(self.min_separation));
        }
        Ok(())
    }

    /// Squared floor applied to pair distances in the velocity kernel.
    #[inline]
    pub fn min_separation_sq(&self) -> f64 {
        self.min_separation * self.min_separation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_domain() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = SimConfig {
                domain_size: bad,
                ..SimConfig::default()
            };
            assert!(matches!(cfg.validate(), Err(ConfigError::DomainSize(_))));
        }
    }

    #[test]
    fn rejects_non_positive_dt() {
        let cfg = SimConfig {
            dt: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::TimeStep(0.0)));
    }

    #[test]
    fn zero_annihilation_radius_is_allowed_but_negative_is_not() {
        let ok = SimConfig {
            annihilation_radius: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(ok.validate(), Ok(()));

        let bad = SimConfig {
            annihilation_radius: -1e-4,
            ..SimConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::AnnihilationRadius(-1e-4)));
    }

    #[test]
    fn rejects_negative_drag() {
        let cfg = SimConfig {
            alphap: -0.5,
            ..SimConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Coefficient {
                name: "alphap",
                value: -0.5
            })
        );
    }

    #[test]
    fn min_separation_must_fit_inside_domain() {
        let cfg = SimConfig {
            min_separation: 1.0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::MinSeparation(1.0)));
    }

    #[test]
    fn deserializes_partial_config_with_defaults() {
        let cfg: SimConfig =
            serde_json::from_str(r#"{ "alpha": 0.1, "annihilation_mode": "sequential" }"#)
                .unwrap();
        assert_eq!(cfg.alpha, 0.1);
        assert_eq!(cfg.annihilation_mode, AnnihilationMode::Sequential);
        assert_eq!(cfg.domain_size, SimConfig::default().domain_size);
    }
}
