//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs with `deny_unknown_fields`
//! - Schema constraints via `validator`
//! - A semantic pass for cross-field constraints

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::Validate;

use crate::engine::hazard::{HazardModel, DEFAULT_GROWTH_RATE};
use crate::error::{FireError, FireResult};
use crate::strategy::wall::WallWeights;
use crate::strategy::{
    BnbParams, BranchAndBound, IlsParams, IteratedLocalSearch, Strategy, StrategyKind,
    VariableNeighborhoodSearch, VnsParams, WallHeuristic, WallParams,
};

/// Top-level run configuration.
///
/// Loaded from YAML files with full schema validation. Every section is
/// optional; an empty document yields [`FireConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct FireConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Reproducibility settings.
    #[validate(nested)]
    #[serde(default)]
    pub reproducibility: ReproducibilityConfig,

    /// Hazard spread settings.
    #[validate(nested)]
    #[serde(default)]
    pub hazard: HazardConfig,

    /// Run loop settings.
    #[validate(nested)]
    #[serde(default)]
    pub driver: DriverConfig,

    /// Strategy selection and per-strategy parameters.
    #[validate(nested)]
    #[serde(default)]
    pub strategy: StrategyConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            reproducibility: ReproducibilityConfig::default(),
            hazard: HazardConfig::default(),
            driver: DriverConfig::default(),
            strategy: StrategyConfig::default(),
        }
    }
}

impl FireConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> FireResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> FireResult<Self> {
        // An empty document deserializes to unit, not to a mapping.
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };

        config.validate()?;
        config.validate_semantic()?;

        Ok(config)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> FireConfigBuilder {
        FireConfigBuilder::default()
    }

    /// Serialize back to YAML.
    ///
    /// # Errors
    ///
    /// Returns `FireError::YamlParse` if encoding fails.
    pub fn to_yaml(&self) -> FireResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate constraints that span several fields.
    fn validate_semantic(&self) -> FireResult<()> {
        let ils = &self.strategy.iterated_local_search;
        if ils.perturbation_strength > ils.horizon {
            return Err(FireError::config(format!(
                "iterated-local-search perturbation_strength ({}) exceeds horizon ({})",
                ils.perturbation_strength, ils.horizon
            )));
        }

        let vns = &self.strategy.variable_neighborhood_search;
        if vns.k_max > vns.horizon {
            return Err(FireError::config(format!(
                "variable-neighborhood-search k_max ({}) exceeds horizon ({})",
                vns.k_max, vns.horizon
            )));
        }

        Ok(())
    }

    /// The configured hazard model.
    #[must_use]
    pub fn hazard_model(&self) -> HazardModel {
        HazardModel::new(self.hazard.growth_rate)
    }

    /// Construct the configured strategy.
    ///
    /// Stochastic variants are seeded from `reproducibility.seed`.
    #[must_use]
    pub fn build_strategy(&self) -> Strategy {
        let hazard = self.hazard_model();
        let seed = self.reproducibility.seed;
        match self.strategy.kind {
            StrategyKind::WallHeuristic => {
                Strategy::Wall(WallHeuristic::new(self.strategy.wall_heuristic.params()))
            }
            StrategyKind::BranchAndBound => Strategy::BranchAndBound(BranchAndBound::new(
                self.strategy.branch_and_bound.params(),
                hazard,
            )),
            StrategyKind::IteratedLocalSearch => {
                Strategy::IteratedLocalSearch(IteratedLocalSearch::new(
                    self.strategy.iterated_local_search.params(),
                    hazard,
                    seed,
                ))
            }
            StrategyKind::VariableNeighborhoodSearch => {
                Strategy::VariableNeighborhoodSearch(VariableNeighborhoodSearch::new(
                    self.strategy.variable_neighborhood_search.params(),
                    hazard,
                    seed,
                ))
            }
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct FireConfigBuilder {
    seed: Option<u64>,
    strategy: Option<StrategyKind>,
    growth_rate: Option<usize>,
    max_steps: Option<usize>,
    stop_rule: Option<StopRule>,
    check_invariants: Option<bool>,
}

impl FireConfigBuilder {
    /// Set the random seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Select the strategy.
    #[must_use]
    pub const fn strategy(mut self, kind: StrategyKind) -> Self {
        self.strategy = Some(kind);
        self
    }

    /// Set the hazard growth rate.
    #[must_use]
    pub const fn growth_rate(mut self, rate: usize) -> Self {
        self.growth_rate = Some(rate);
        self
    }

    /// Cap the number of ticks per run.
    #[must_use]
    pub const fn max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Choose when a run stops.
    #[must_use]
    pub const fn stop_rule(mut self, rule: StopRule) -> Self {
        self.stop_rule = Some(rule);
        self
    }

    /// Enable or disable the Jidoka guard.
    #[must_use]
    pub const fn check_invariants(mut self, enabled: bool) -> Self {
        self.check_invariants = Some(enabled);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> FireConfig {
        let mut config = FireConfig::default();

        if let Some(seed) = self.seed {
            config.reproducibility.seed = seed;
        }
        if let Some(kind) = self.strategy {
            config.strategy.kind = kind;
        }
        if let Some(rate) = self.growth_rate {
            config.hazard.growth_rate = rate;
        }
        if let Some(steps) = self.max_steps {
            config.driver.max_steps = steps;
        }
        if let Some(rule) = self.stop_rule {
            config.driver.stop_rule = rule;
        }
        if let Some(enabled) = self.check_invariants {
            config.driver.check_invariants = enabled;
        }

        config
    }
}

/// Reproducibility settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ReproducibilityConfig {
    /// Master seed for the stochastic strategies.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

const fn default_seed() -> u64 {
    42
}

impl Default for ReproducibilityConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

/// Hazard spread settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct HazardConfig {
    /// Frontier iterations per tick.
    #[validate(range(min = 1))]
    #[serde(default = "default_growth_rate")]
    pub growth_rate: usize,
}

const fn default_growth_rate() -> usize {
    DEFAULT_GROWTH_RATE
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            growth_rate: default_growth_rate(),
        }
    }
}

/// When a run stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopRule {
    /// Stop once the hazard has no pending ignitions.
    #[default]
    FixedPoint,
    /// Stop as soon as the next barrier would already seal the hazard.
    Stable,
}

/// Run loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Hard cap on ticks per run.
    #[validate(range(min = 1))]
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Stop rule.
    #[serde(default)]
    pub stop_rule: StopRule,
    /// Run the Jidoka guard on every tick.
    #[serde(default = "default_true")]
    pub check_invariants: bool,
}

const fn default_max_steps() -> usize {
    10_000
}

const fn default_true() -> bool {
    true
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            stop_rule: StopRule::default(),
            check_invariants: default_true(),
        }
    }
}

/// Strategy selection plus one parameter block per variant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StrategyConfig {
    /// Which variant drives the agent.
    #[serde(default)]
    pub kind: StrategyKind,
    /// Wall heuristic parameters.
    #[validate(nested)]
    #[serde(default)]
    pub wall_heuristic: WallConfig,
    /// Branch-and-bound parameters.
    #[validate(nested)]
    #[serde(default)]
    pub branch_and_bound: BnbConfig,
    /// Iterated local search parameters.
    #[validate(nested)]
    #[serde(default)]
    pub iterated_local_search: IlsConfig,
    /// Variable neighborhood search parameters.
    #[validate(nested)]
    #[serde(default)]
    pub variable_neighborhood_search: VnsConfig,
}

/// Wall heuristic parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct WallConfig {
    /// Chebyshev distance to the hazard that ends the approach phase.
    #[validate(range(min = 1))]
    #[serde(default = "default_hazard_threshold")]
    pub hazard_threshold: usize,
    /// Weights while approaching the hazard.
    #[serde(default = "WallWeights::approach")]
    pub approach: WallWeights,
    /// Weights while building walls.
    #[serde(default = "WallWeights::walls")]
    pub walls: WallWeights,
}

const fn default_hazard_threshold() -> usize {
    2
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            hazard_threshold: default_hazard_threshold(),
            approach: WallWeights::approach(),
            walls: WallWeights::walls(),
        }
    }
}

impl WallConfig {
    /// Runtime parameters.
    #[must_use]
    pub const fn params(&self) -> WallParams {
        WallParams {
            approach: self.approach,
            walls: self.walls,
            hazard_threshold: self.hazard_threshold,
        }
    }
}

/// Branch-and-bound parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BnbConfig {
    /// Maximum tree depth.
    #[validate(range(min = 1, max = 16))]
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,
    /// Nodes generated per decision.
    #[serde(default = "default_node_limit")]
    pub node_limit: u64,
    /// Wall-clock limit per decision, in milliseconds.
    #[serde(default = "default_bnb_time_ms")]
    pub time_limit_ms: u64,
}

const fn default_lookahead() -> usize {
    5
}

const fn default_node_limit() -> u64 {
    2000
}

const fn default_bnb_time_ms() -> u64 {
    5000
}

impl Default for BnbConfig {
    fn default() -> Self {
        Self {
            lookahead: default_lookahead(),
            node_limit: default_node_limit(),
            time_limit_ms: default_bnb_time_ms(),
        }
    }
}

impl BnbConfig {
    /// Runtime parameters.
    #[must_use]
    pub const fn params(&self) -> BnbParams {
        BnbParams {
            lookahead: self.lookahead,
            node_limit: self.node_limit,
            time_limit: Duration::from_millis(self.time_limit_ms),
        }
    }
}

/// Iterated local search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct IlsConfig {
    /// Plan length.
    #[validate(range(min = 1, max = 32))]
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    /// Plan evaluations per decision.
    #[validate(range(min = 1))]
    #[serde(default = "default_ils_evaluations")]
    pub max_evaluations: u64,
    /// Local-search passes per iteration.
    #[serde(default = "default_ils_local_steps")]
    pub local_search_steps: usize,
    /// Plan positions re-drawn by a perturbation.
    #[validate(range(min = 1))]
    #[serde(default = "default_perturbation")]
    pub perturbation_strength: usize,
    /// Wall-clock limit per decision, in milliseconds.
    #[serde(default = "default_metaheuristic_time_ms")]
    pub time_limit_ms: u64,
    /// Probability of a greedy pick when building or perturbing a plan.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_greedy_bias")]
    pub greedy_bias: f64,
    /// Probability of accepting a non-improving plan.
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_acceptance")]
    pub acceptance_probability: f64,
    /// Weight of the next-tick ignition count in move scoring.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_ils_lookahead_weight")]
    pub lookahead_weight: f64,
}

const fn default_horizon() -> usize {
    6
}

const fn default_ils_evaluations() -> u64 {
    120
}

const fn default_ils_local_steps() -> usize {
    15
}

const fn default_perturbation() -> usize {
    2
}

const fn default_metaheuristic_time_ms() -> u64 {
    1000
}

const fn default_greedy_bias() -> f64 {
    0.45
}

const fn default_acceptance() -> f64 {
    0.10
}

const fn default_ils_lookahead_weight() -> f64 {
    0.30
}

impl Default for IlsConfig {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            max_evaluations: default_ils_evaluations(),
            local_search_steps: default_ils_local_steps(),
            perturbation_strength: default_perturbation(),
            time_limit_ms: default_metaheuristic_time_ms(),
            greedy_bias: default_greedy_bias(),
            acceptance_probability: default_acceptance(),
            lookahead_weight: default_ils_lookahead_weight(),
        }
    }
}

impl IlsConfig {
    /// Runtime parameters.
    #[must_use]
    pub const fn params(&self) -> IlsParams {
        IlsParams {
            horizon: self.horizon,
            max_evaluations: self.max_evaluations,
            local_search_steps: self.local_search_steps,
            perturbation_strength: self.perturbation_strength,
            time_limit: Duration::from_millis(self.time_limit_ms),
            greedy_bias: self.greedy_bias,
            acceptance_probability: self.acceptance_probability,
            lookahead_weight: self.lookahead_weight,
        }
    }
}

/// Variable neighborhood search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct VnsConfig {
    /// Plan length.
    #[validate(range(min = 1, max = 32))]
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    /// Largest neighborhood.
    #[validate(range(min = 1))]
    #[serde(default = "default_k_max")]
    pub k_max: usize,
    /// Shake iterations per decision.
    #[serde(default = "default_vns_iterations")]
    pub max_iterations: u64,
    /// Plan evaluations per decision.
    #[validate(range(min = 1))]
    #[serde(default = "default_vns_evaluations")]
    pub max_evaluations: u64,
    /// Local-search passes per iteration.
    #[serde(default = "default_vns_local_steps")]
    pub local_search_steps: usize,
    /// Wall-clock limit per decision, in milliseconds.
    #[serde(default = "default_metaheuristic_time_ms")]
    pub time_limit_ms: u64,
    /// Size of the restricted candidate list for the initial plan.
    #[validate(range(min = 1))]
    #[serde(default = "default_candidate_list")]
    pub candidate_list: usize,
    /// Weight of the next-tick ignition count in move scoring.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_vns_lookahead_weight")]
    pub lookahead_weight: f64,
}

const fn default_k_max() -> usize {
    3
}

const fn default_vns_iterations() -> u64 {
    60
}

const fn default_vns_evaluations() -> u64 {
    180
}

const fn default_vns_local_steps() -> usize {
    6
}

const fn default_candidate_list() -> usize {
    3
}

const fn default_vns_lookahead_weight() -> f64 {
    0.35
}

impl Default for VnsConfig {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            k_max: default_k_max(),
            max_iterations: default_vns_iterations(),
            max_evaluations: default_vns_evaluations(),
            local_search_steps: default_vns_local_steps(),
            time_limit_ms: default_metaheuristic_time_ms(),
            candidate_list: default_candidate_list(),
            lookahead_weight: default_vns_lookahead_weight(),
        }
    }
}

impl VnsConfig {
    /// Runtime parameters.
    #[must_use]
    pub const fn params(&self) -> VnsParams {
        VnsParams {
            horizon: self.horizon,
            k_max: self.k_max,
            max_iterations: self.max_iterations,
            max_evaluations: self.max_evaluations,
            local_search_steps: self.local_search_steps,
            time_limit: Duration::from_millis(self.time_limit_ms),
            candidate_list: self.candidate_list,
            lookahead_weight: self.lookahead_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = FireConfig::default();
        assert_eq!(config.schema_version, "1.0");
        assert_eq!(config.reproducibility.seed, 42);
        assert_eq!(config.hazard.growth_rate, 1);
        assert_eq!(config.driver.stop_rule, StopRule::FixedPoint);
        assert!(config.driver.check_invariants);
        assert_eq!(config.strategy.kind, StrategyKind::BranchAndBound);
        assert_eq!(config.strategy.branch_and_bound.params(), BnbParams::default());
        assert_eq!(config.strategy.iterated_local_search.params(), IlsParams::default());
        assert_eq!(config.strategy.variable_neighborhood_search.params(), VnsParams::default());
        assert_eq!(config.strategy.wall_heuristic.params(), WallParams::default());
    }

    #[test]
    fn test_config_builder() {
        let config = FireConfig::builder()
            .seed(7)
            .strategy(StrategyKind::IteratedLocalSearch)
            .growth_rate(2)
            .max_steps(50)
            .stop_rule(StopRule::Stable)
            .check_invariants(false)
            .build();
        assert_eq!(config.reproducibility.seed, 7);
        assert_eq!(config.strategy.kind, StrategyKind::IteratedLocalSearch);
        assert_eq!(config.hazard.growth_rate, 2);
        assert_eq!(config.driver.max_steps, 50);
        assert_eq!(config.driver.stop_rule, StopRule::Stable);
        assert!(!config.driver.check_invariants);
    }

    #[test]
    fn test_config_yaml_parse() {
        let yaml = r"
reproducibility:
  seed: 1234
hazard:
  growth_rate: 2
driver:
  stop_rule: stable
strategy:
  kind: variable-neighborhood-search
  variable_neighborhood_search:
    k_max: 2
    time_limit_ms: 250
";
        let config = FireConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.reproducibility.seed, 1234);
        assert_eq!(config.hazard_model().growth_rate(), 2);
        assert_eq!(config.driver.stop_rule, StopRule::Stable);
        let vns = config.strategy.variable_neighborhood_search.params();
        assert_eq!(vns.k_max, 2);
        assert_eq!(vns.time_limit, Duration::from_millis(250));
        assert_eq!(vns.horizon, 6);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(FireConfig::from_yaml("").unwrap(), FireConfig::default());
        assert_eq!(FireConfig::from_yaml("{}").unwrap(), FireConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = FireConfig::from_yaml("colour: red\n").unwrap_err();
        assert!(matches!(err, FireError::YamlParse(_)));
        let err = FireConfig::from_yaml("hazard:\n  speed: 3\n").unwrap_err();
        assert!(matches!(err, FireError::YamlParse(_)));
    }

    #[test]
    fn test_validation_fails_zero_growth_rate() {
        let err = FireConfig::from_yaml("hazard:\n  growth_rate: 0\n").unwrap_err();
        assert!(matches!(err, FireError::Validation(_)));
    }

    #[test]
    fn test_validation_fails_bad_probability() {
        let yaml = "strategy:\n  iterated_local_search:\n    acceptance_probability: 1.5\n";
        let err = FireConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, FireError::Validation(_)));
    }

    #[test]
    fn test_semantic_validation() {
        let yaml = "strategy:\n  variable_neighborhood_search:\n    horizon: 2\n    k_max: 3\n";
        let err = FireConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, FireError::Config { .. }));
        assert!(err.to_string().contains("k_max"));

        let yaml = "strategy:\n  iterated_local_search:\n    horizon: 1\n";
        let err = FireConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("perturbation_strength"));
    }

    #[test]
    fn test_unknown_strategy_kind() {
        let err = FireConfig::from_yaml("strategy:\n  kind: simulated-annealing\n").unwrap_err();
        assert!(matches!(err, FireError::YamlParse(_)));
    }

    #[test]
    fn test_build_strategy_each_kind() {
        for kind in StrategyKind::ALL {
            let strategy = FireConfig::builder().strategy(kind).build().build_strategy();
            assert_eq!(strategy.kind(), kind);
        }
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = FireConfig::builder()
            .seed(99)
            .strategy(StrategyKind::WallHeuristic)
            .build();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(FireConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        std::fs::write(&path, "reproducibility:\n  seed: 5\n").unwrap();
        assert_eq!(FireConfig::load(&path).unwrap().reproducibility.seed, 5);
        assert!(matches!(
            FireConfig::load(dir.path().join("missing.yaml")),
            Err(FireError::Io(_))
        ));
    }
}
