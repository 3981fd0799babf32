//! Decision policy thresholds.

/// Tunable thresholds for the semantic decision policy.
///
/// These are policy knobs, not fixed constants: the defaults come from
/// observed production behavior and are expected to be re-tuned against
/// the `debug` score events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionConfig {
    /// Absolute confidence floor for declaring a turn complete.
    pub sim_threshold: f32,
    /// Required separation of the complete score over the incomplete score.
    pub sim_margin: f32,
    /// Fragments shorter than this many words are inherently ambiguous,
    /// whatever their similarity scores say.
    pub min_words: usize,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            sim_threshold: 0.45,
            sim_margin: 0.05,
            min_words: 5,
        }
    }
}

impl DecisionConfig {
    /// Build from environment variables, falling back to defaults.
    ///
    /// Recognized: `PALAVER_SIM_THRESHOLD`, `PALAVER_SIM_MARGIN`,
    /// `PALAVER_MIN_WORDS`. Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = parse_env::<f32>("PALAVER_SIM_THRESHOLD") {
            config.sim_threshold = v;
        }
        if let Some(v) = parse_env::<f32>("PALAVER_SIM_MARGIN") {
            config.sim_margin = v;
        }
        if let Some(v) = parse_env::<usize>("PALAVER_MIN_WORDS") {
            config.min_words = v;
        }
        config
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecisionConfig::default();
        assert_eq!(config.sim_threshold, 0.45);
        assert_eq!(config.sim_margin, 0.05);
        assert_eq!(config.min_words, 5);
    }

    #[test]
    fn test_from_env_overrides_and_ignores_garbage() {
        std::env::set_var("PALAVER_SIM_THRESHOLD", "0.40");
        std::env::set_var("PALAVER_SIM_MARGIN", "not-a-number");
        std::env::remove_var("PALAVER_MIN_WORDS");

        let config = DecisionConfig::from_env();
        assert_eq!(config.sim_threshold, 0.40);
        assert_eq!(config.sim_margin, DecisionConfig::default().sim_margin);
        assert_eq!(config.min_words, DecisionConfig::default().min_words);

        std::env::remove_var("PALAVER_SIM_THRESHOLD");
        std::env::remove_var("PALAVER_SIM_MARGIN");
    }
}
