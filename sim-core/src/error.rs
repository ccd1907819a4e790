use thiserror::Error;

/// Errors raised when a [`crate::config::SimConfig`] is rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("domain_size must be positive and finite, got {0}")]
    DomainSize(f64),
    #[error("dt must be positive and finite, got {0}")]
    TimeStep(f64),
    #[error("inject_interval must be positive and finite, got {0}")]
    InjectInterval(f64),
    #[error("annihilation_radius must be non-negative and finite, got {0}")]
    AnnihilationRadius(f64),
    #[error("kappa must be finite, got {0}")]
    Kappa(f64),
    /// A drag or noise coefficient that must be non-negative.
    #[error("{name} must be non-negative and finite, got {value}")]
    Coefficient { name: &'static str, value: f64 },
    #[error("min_separation must be positive and smaller than domain_size, got {0}")]
    MinSeparation(f64),
}
