use std::time::Duration;

use crate::error::{Result, SynthesisError};

/// Which cost the search must provably minimize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetMetric {
    #[default]
    Gates,
    Depth,
    TwoQubitGates,
}

impl TargetMetric {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "gates" => Ok(TargetMetric::Gates),
            "depth" => Ok(TargetMetric::Depth),
            "two_qubit_gates" => Ok(TargetMetric::TwoQubitGates),
            other => Err(SynthesisError::configuration(format!(
                "unknown target metric {other:?}"
            ))),
        }
    }
}

/// All knobs of one synthesis request. Immutable once built; validation
/// happens here, strictly before any encoding or solver work.
#[derive(Clone, Debug, Default)]
pub struct SynthesisConfig {
    pub target_metric: TargetMetric,
    /// Solve one optimizing instance instead of bound search.
    pub use_maxsat: bool,
    /// After a depth optimum is found, additionally minimize the gate
    /// count at that depth.
    pub minimize_gates_after_depth_optimization: bool,
    /// Widen the timestep limit before two-qubit optimization, since the
    /// two-qubit optimum may need more total gates than the gate optimum.
    pub try_higher_gate_limit_for_two_qubit_gate_optimization: bool,
    /// After a two-qubit optimum is found, hold that count fixed and
    /// minimize the total gate count under it.
    pub minimize_gates_after_two_qubit_gate_optimization: bool,
    /// Undirected coupling edges; `None` means all-to-all.
    pub coupling: Option<Vec<(usize, usize)>>,
    /// Starting timestep limit for the feasibility probes, and a floor
    /// for the limit used during minimization.
    pub initial_timestep_limit: Option<usize>,
    /// Wall-clock budget for the whole request.
    pub time_limit: Option<Duration>,
}

impl SynthesisConfig {
    /// Builds a configuration from string key/value options, mirroring
    /// the keyword-argument surface of the public API. Unknown keys are
    /// rejected eagerly.
    pub fn from_options<'a>(
        options: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self> {
        let mut config = SynthesisConfig::default();
        for (key, value) in options {
            match key {
                "target_metric" => config.target_metric = TargetMetric::parse(value)?,
                "use_maxsat" => config.use_maxsat = parse_bool(key, value)?,
                "minimize_gates_after_depth_optimization" => {
                    config.minimize_gates_after_depth_optimization = parse_bool(key, value)?;
                }
                "try_higher_gate_limit_for_two_qubit_gate_optimization" => {
                    config.try_higher_gate_limit_for_two_qubit_gate_optimization =
                        parse_bool(key, value)?;
                }
                "minimize_gates_after_two_qubit_gate_optimization" => {
                    config.minimize_gates_after_two_qubit_gate_optimization =
                        parse_bool(key, value)?;
                }
                "initial_timestep_limit" => {
                    let limit: usize = value.parse().map_err(|_| {
                        SynthesisError::configuration(format!(
                            "option {key:?} expects a timestep count, got {value:?}"
                        ))
                    })?;
                    config.initial_timestep_limit = Some(limit);
                }
                "time_limit_ms" => {
                    let ms: u64 = value.parse().map_err(|_| {
                        SynthesisError::configuration(format!(
                            "option {key:?} expects milliseconds, got {value:?}"
                        ))
                    })?;
                    config.time_limit = Some(Duration::from_millis(ms));
                }
                unknown => {
                    return Err(SynthesisError::configuration(format!(
                        "unknown option {unknown:?}"
                    )))
                }
            }
        }
        Ok(config)
    }

    /// Fails fast on option combinations that cannot mean anything.
    pub fn validate(&self) -> Result<()> {
        if self.minimize_gates_after_depth_optimization
            && self.target_metric != TargetMetric::Depth
        {
            return Err(SynthesisError::configuration(
                "minimize_gates_after_depth_optimization requires target_metric = depth",
            ));
        }
        let two_qubit_flags = self.try_higher_gate_limit_for_two_qubit_gate_optimization
            || self.minimize_gates_after_two_qubit_gate_optimization;
        if two_qubit_flags && self.target_metric != TargetMetric::TwoQubitGates {
            return Err(SynthesisError::configuration(
                "two-qubit refinement flags require target_metric = two_qubit_gates",
            ));
        }
        if let Some(limit) = self.time_limit {
            if limit.is_zero() {
                return Err(SynthesisError::configuration("time limit must be positive"));
            }
        }
        if self.initial_timestep_limit == Some(0) {
            return Err(SynthesisError::configuration(
                "initial timestep limit must be positive",
            ));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(SynthesisError::configuration(format!(
            "option {key:?} expects a boolean, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_is_rejected() {
        let err = SynthesisConfig::from_options([("invalid_kwarg", "true")]).unwrap_err();
        assert!(matches!(err, SynthesisError::Configuration(_)));
    }

    #[test]
    fn parses_full_option_set() {
        let config = SynthesisConfig::from_options([
            ("target_metric", "two_qubit_gates"),
            ("use_maxsat", "true"),
            ("try_higher_gate_limit_for_two_qubit_gate_optimization", "1"),
            ("minimize_gates_after_two_qubit_gate_optimization", "true"),
            ("initial_timestep_limit", "3"),
            ("time_limit_ms", "5000"),
        ])
        .unwrap();
        assert_eq!(config.target_metric, TargetMetric::TwoQubitGates);
        assert!(config.use_maxsat);
        assert_eq!(config.initial_timestep_limit, Some(3));
        assert_eq!(config.time_limit, Some(Duration::from_millis(5000)));
        config.validate().unwrap();
    }

    #[test]
    fn incoherent_flags_fail_validation() {
        let config = SynthesisConfig {
            minimize_gates_after_depth_optimization: true,
            target_metric: TargetMetric::Gates,
            ..SynthesisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_metric_name() {
        assert!(TargetMetric::parse("fidelity").is_err());
    }
}
