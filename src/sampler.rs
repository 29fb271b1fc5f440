//! Feedback-type sampling for synthetic data generation.
//!
//! A [`SamplingConfig`] is validated once, up front, from caller-supplied
//! parameters; a [`FeedbackTypeSampler`] then draws one [`FeedbackType`] per
//! call against it. The random source is injected so callers can seed a
//! deterministic generator.

use rand::Rng;
use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::models::FeedbackType;

/// Default weighted distribution: unsatisfied 20%, neutral 30%, satisfied 50%.
pub const DEFAULT_WEIGHTS: [(FeedbackType, u32); 3] = [
    (FeedbackType::Unsatisfied, 20),
    (FeedbackType::Neutral, 30),
    (FeedbackType::Satisfied, 50),
];

/// Rejected sampling configuration. Raised at construction time only; a
/// successfully built configuration never fails mid-batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("feedback type percentages must sum to 100%, got {total}%")]
    PercentageSum { total: u64 },

    #[error("specific feedback type list must not be empty")]
    EmptyTypeList,

    #[error("weighted configuration has no positive weight")]
    ZeroTotalWeight,
}

/// How each draw selects a feedback type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplingMode {
    /// Uniform draw over an explicit, non-empty list of types.
    SpecificTypes(Vec<FeedbackType>),
    /// Discrete distribution over (type, weight) pairs; every stored weight
    /// is positive, zero-weight types are dropped at construction.
    Weighted(Vec<(FeedbackType, u32)>),
}

/// Immutable, validated sampling configuration for one generation batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingConfig {
    mode: SamplingMode,
    description: String,
}

impl SamplingConfig {
    /// Build a configuration from raw request parameters.
    ///
    /// Precedence: an explicit non-empty type list wins (percentages are
    /// ignored); otherwise any supplied percentage selects weighted mode with
    /// absent values treated as 0 and the sum required to be exactly 100;
    /// otherwise the default weighted distribution applies.
    pub fn from_parameters(
        types: Option<&[FeedbackType]>,
        unsatisfied: Option<u32>,
        neutral: Option<u32>,
        satisfied: Option<u32>,
    ) -> Result<Self, ConfigurationError> {
        if let Some(types) = types {
            if !types.is_empty() {
                return Self::specific_types(types.to_vec());
            }
        }

        if unsatisfied.is_some() || neutral.is_some() || satisfied.is_some() {
            let unsatisfied = unsatisfied.unwrap_or(0);
            let neutral = neutral.unwrap_or(0);
            let satisfied = satisfied.unwrap_or(0);

            let total = u64::from(unsatisfied) + u64::from(neutral) + u64::from(satisfied);
            if total != 100 {
                return Err(ConfigurationError::PercentageSum { total });
            }

            let pairs = [
                (FeedbackType::Unsatisfied, unsatisfied),
                (FeedbackType::Neutral, neutral),
                (FeedbackType::Satisfied, satisfied),
            ];
            let description = format!(
                "percentages - unsatisfied: {unsatisfied}%, neutral: {neutral}%, satisfied: {satisfied}%"
            );
            return Self::validated_weighted(&pairs, description);
        }

        Self::validated_weighted(
            &DEFAULT_WEIGHTS,
            "default configuration - unsatisfied: 20%, neutral: 30%, satisfied: 50%".to_string(),
        )
    }

    /// Uniform sampling over an explicit list of types.
    pub fn specific_types(types: Vec<FeedbackType>) -> Result<Self, ConfigurationError> {
        if types.is_empty() {
            return Err(ConfigurationError::EmptyTypeList);
        }
        let names: Vec<&str> = types.iter().map(FeedbackType::as_str).collect();
        let description = format!("specific types: {}", names.join(", "));
        Ok(Self {
            mode: SamplingMode::SpecificTypes(types),
            description,
        })
    }

    /// Weighted sampling over (type, weight) pairs in the given order.
    pub fn weighted(pairs: Vec<(FeedbackType, u32)>) -> Result<Self, ConfigurationError> {
        let summary: Vec<String> = pairs
            .iter()
            .map(|(ty, weight)| format!("{}: {}", ty.as_str(), weight))
            .collect();
        Self::validated_weighted(&pairs, format!("weighted - {}", summary.join(", ")))
    }

    fn validated_weighted(
        pairs: &[(FeedbackType, u32)],
        description: String,
    ) -> Result<Self, ConfigurationError> {
        let pairs: Vec<(FeedbackType, u32)> = pairs
            .iter()
            .copied()
            .filter(|(_, weight)| *weight > 0)
            .collect();

        if pairs.is_empty() {
            return Err(ConfigurationError::ZeroTotalWeight);
        }

        Ok(Self {
            mode: SamplingMode::Weighted(pairs),
            description,
        })
    }

    pub fn mode(&self) -> &SamplingMode {
        &self.mode
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// JSON summary echoed back in the generation response.
    pub fn summary(&self) -> JsonValue {
        match &self.mode {
            SamplingMode::SpecificTypes(types) => json!({
                "mode": "specific_types",
                "types": types,
                "description": self.description,
            }),
            SamplingMode::Weighted(pairs) => {
                let types: Vec<FeedbackType> = pairs.iter().map(|(ty, _)| *ty).collect();
                let weights: Vec<u32> = pairs.iter().map(|(_, weight)| *weight).collect();
                json!({
                    "mode": "weighted",
                    "types": types,
                    "weights": weights,
                    "description": self.description,
                })
            }
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        // The default weights are non-zero, so validation cannot fail.
        Self::validated_weighted(
            &DEFAULT_WEIGHTS,
            "default configuration - unsatisfied: 20%, neutral: 30%, satisfied: 50%".to_string(),
        )
        .unwrap_or_else(|_| unreachable!("default weights are positive"))
    }
}

/// Draws feedback types against a validated [`SamplingConfig`].
pub struct FeedbackTypeSampler<'a, R: Rng> {
    mode: &'a SamplingMode,
    total_weight: u32,
    rng: R,
}

impl<'a, R: Rng> FeedbackTypeSampler<'a, R> {
    pub fn new(config: &'a SamplingConfig, rng: R) -> Self {
        let total_weight = match config.mode() {
            SamplingMode::SpecificTypes(_) => 0,
            SamplingMode::Weighted(pairs) => pairs.iter().map(|(_, weight)| weight).sum(),
        };
        Self {
            mode: config.mode(),
            total_weight,
            rng,
        }
    }

    /// Draw one feedback type. Uniform in specific-types mode; inverse-CDF
    /// cumulative walk over integer weights in weighted mode, so that
    /// P(type_i) = weight_i / total exactly over a uniform source.
    pub fn next_type(&mut self) -> FeedbackType {
        match self.mode {
            SamplingMode::SpecificTypes(types) => types[self.rng.gen_range(0..types.len())],
            SamplingMode::Weighted(pairs) => {
                let draw = self.rng.gen_range(1..=self.total_weight);
                let mut cumulative = 0u32;
                for (ty, weight) in pairs {
                    cumulative += weight;
                    if draw <= cumulative {
                        return *ty;
                    }
                }
                // The walk ends with cumulative == total_weight >= draw.
                pairs[0].0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn draw_counts(config: &SamplingConfig, n: usize, seed: u64) -> HashMap<FeedbackType, usize> {
        let mut sampler = FeedbackTypeSampler::new(config, StdRng::seed_from_u64(seed));
        let mut counts = HashMap::new();
        for _ in 0..n {
            *counts.entry(sampler.next_type()).or_insert(0) += 1;
        }
        counts
    }

    fn assert_frequency(counts: &HashMap<FeedbackType, usize>, ty: FeedbackType, n: usize, expected: f64) {
        let observed = *counts.get(&ty).unwrap_or(&0) as f64 / n as f64;
        assert!(
            (observed - expected).abs() < 0.02,
            "{ty}: observed {observed:.4}, expected {expected:.4}"
        );
    }

    #[test]
    fn test_weighted_frequencies_match_weights() {
        let config =
            SamplingConfig::from_parameters(None, Some(20), Some(30), Some(50)).unwrap();
        let n = 100_000;
        let counts = draw_counts(&config, n, 7);

        assert_frequency(&counts, FeedbackType::Unsatisfied, n, 0.20);
        assert_frequency(&counts, FeedbackType::Neutral, n, 0.30);
        assert_frequency(&counts, FeedbackType::Satisfied, n, 0.50);
    }

    #[test]
    fn test_specific_types_draw_uniformly() {
        let config = SamplingConfig::from_parameters(
            Some(&[FeedbackType::Unsatisfied, FeedbackType::Satisfied]),
            None,
            None,
            None,
        )
        .unwrap();
        let n = 100_000;
        let counts = draw_counts(&config, n, 11);

        assert_frequency(&counts, FeedbackType::Unsatisfied, n, 0.5);
        assert_frequency(&counts, FeedbackType::Satisfied, n, 0.5);
        assert_eq!(counts.get(&FeedbackType::Neutral), None);
    }

    #[test]
    fn test_zero_weight_type_never_drawn() {
        let config =
            SamplingConfig::from_parameters(None, Some(50), Some(0), Some(50)).unwrap();
        let counts = draw_counts(&config, 10_000, 13);

        assert_eq!(counts.get(&FeedbackType::Neutral), None);
        assert!(counts.contains_key(&FeedbackType::Unsatisfied));
        assert!(counts.contains_key(&FeedbackType::Satisfied));
    }

    #[test]
    fn test_percentage_sum_must_be_exactly_100() {
        let err = SamplingConfig::from_parameters(None, Some(10), Some(10), Some(10))
            .unwrap_err();
        assert_eq!(err, ConfigurationError::PercentageSum { total: 30 });
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_all_zero_percentages_rejected() {
        let err =
            SamplingConfig::from_parameters(None, Some(0), Some(0), Some(0)).unwrap_err();
        assert_eq!(err, ConfigurationError::PercentageSum { total: 0 });
    }

    #[test]
    fn test_single_hundred_percent_type_always_returned() {
        let config =
            SamplingConfig::from_parameters(None, Some(0), Some(0), Some(100)).unwrap();
        let counts = draw_counts(&config, 1_000, 17);

        assert_eq!(counts.get(&FeedbackType::Satisfied), Some(&1_000));
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_partial_percentages_treat_absent_as_zero() {
        // Only one percentage supplied; it must carry the full 100 on its own.
        let config = SamplingConfig::from_parameters(None, None, None, Some(100)).unwrap();
        match config.mode() {
            SamplingMode::Weighted(pairs) => {
                assert_eq!(pairs, &[(FeedbackType::Satisfied, 100)]);
            }
            other => panic!("expected weighted mode, got {other:?}"),
        }

        let err = SamplingConfig::from_parameters(None, None, Some(40), None).unwrap_err();
        assert_eq!(err, ConfigurationError::PercentageSum { total: 40 });
    }

    #[test]
    fn test_identical_parameters_build_equal_configs() {
        let a = SamplingConfig::from_parameters(None, Some(10), Some(25), Some(65)).unwrap();
        let b = SamplingConfig::from_parameters(None, Some(10), Some(25), Some(65)).unwrap();
        assert_eq!(a, b);

        let c = SamplingConfig::from_parameters(Some(&[FeedbackType::Neutral]), None, None, None)
            .unwrap();
        let d = SamplingConfig::from_parameters(Some(&[FeedbackType::Neutral]), None, None, None)
            .unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn test_no_parameters_yield_documented_default() {
        let config = SamplingConfig::from_parameters(None, None, None, None).unwrap();
        match config.mode() {
            SamplingMode::Weighted(pairs) => assert_eq!(pairs, &DEFAULT_WEIGHTS),
            other => panic!("expected weighted mode, got {other:?}"),
        }
        assert_eq!(config, SamplingConfig::default());
    }

    #[test]
    fn test_explicit_type_list_wins_over_percentages() {
        // Percentages would be invalid on their own; the list takes precedence.
        let config = SamplingConfig::from_parameters(
            Some(&[FeedbackType::Neutral]),
            Some(10),
            Some(10),
            Some(10),
        )
        .unwrap();
        assert!(matches!(config.mode(), SamplingMode::SpecificTypes(_)));
    }

    #[test]
    fn test_empty_type_list_falls_through_to_percentages() {
        let err = SamplingConfig::from_parameters(Some(&[]), Some(10), Some(10), Some(10))
            .unwrap_err();
        assert_eq!(err, ConfigurationError::PercentageSum { total: 30 });
    }

    #[test]
    fn test_empty_specific_types_rejected() {
        let err = SamplingConfig::specific_types(Vec::new()).unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyTypeList);
    }

    #[test]
    fn test_weighted_with_no_positive_weight_rejected() {
        let err = SamplingConfig::weighted(vec![
            (FeedbackType::Unsatisfied, 0),
            (FeedbackType::Satisfied, 0),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigurationError::ZeroTotalWeight);

        let err = SamplingConfig::weighted(Vec::new()).unwrap_err();
        assert_eq!(err, ConfigurationError::ZeroTotalWeight);
    }

    #[test]
    fn test_summary_reports_mode_types_and_weights() {
        let config =
            SamplingConfig::from_parameters(None, Some(50), Some(0), Some(50)).unwrap();
        let summary = config.summary();

        assert_eq!(summary["mode"], "weighted");
        assert_eq!(summary["types"], json!(["unsatisfied", "satisfied"]));
        assert_eq!(summary["weights"], json!([50, 50]));
    }
}
