use thiserror::Error;

/// Engine-wide result type alias.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Reasons a run can fail. Every variant is raised before the first step executes,
/// except `Aborted`, which reports a caller-requested stop between steps.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A simulation parameter is outside its documented domain.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Particle arrays are misaligned or hold non-finite / non-physical values.
    #[error("invalid particle state: {0}")]
    InvalidParticleState(String),

    /// The caller asked the run to stop; no partial trajectory is returned.
    #[error("simulation aborted after {completed_steps} steps")]
    Aborted { completed_steps: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = EngineError::InvalidConfiguration("elasticity must lie in [0, 1]".to_string());
        let msg = format!("{e}");
        assert!(msg.contains("invalid configuration"));
        assert!(msg.contains("elasticity"));

        let e = EngineError::Aborted { completed_steps: 7 };
        assert_eq!(e.to_string(), "simulation aborted after 7 steps");
    }
}
