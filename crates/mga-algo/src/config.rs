//! SPORES run configuration.
//!
//! A configuration document is a mapping with the run parameters either at
//! the top level or nested under a `SPORES` key:
//!
//! ```yaml
//! SPORES:
//!   slack: 0.1
//!   spores_number: 10
//!   scoring_method: relative_deployment
//!   tracked_categories: [solar, wind, gas]
//!   solver: clarabel
//! ```
//!
//! Parsing only checks shape and types; [`SporesConfig::validate`] enforces
//! the value ranges, and [`SporesConfig::validate_against`] checks the
//! tracked categories against a concrete network.

use crate::scoring::TrackedComponents;
use mga_core::{MgaError, MgaResult, NetworkAdapter, OptionMap, SolverOptions};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Key under which the run parameters may be nested.
pub const SPORES_SECTION: &str = "SPORES";

/// How weights are derived from the spores found so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    /// Fixed increment whenever a component is used
    #[serde(alias = "integer", alias = "deterministic_weighting")]
    Deterministic,
    /// Cumulative sum of value / capacity limit
    RelativeDeployment,
    /// Relative deployment scaled so the largest weight is 1
    RelativeDeploymentNormalized,
    /// Inverse relative distance to the mean of all deployments so far
    EvolvingAverage,
    /// Inverse relative distance to the median of all deployments so far
    EvolvingMedian,
    /// Fresh uniform draw every iteration
    #[serde(alias = "randomized", alias = "randomized_weighting")]
    Random,
}

impl ScoringMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMethod::Deterministic => "deterministic",
            ScoringMethod::RelativeDeployment => "relative_deployment",
            ScoringMethod::RelativeDeploymentNormalized => "relative_deployment_normalized",
            ScoringMethod::EvolvingAverage => "evolving_average",
            ScoringMethod::EvolvingMedian => "evolving_median",
            ScoringMethod::Random => "random",
        }
    }

    /// Whether weights are drawn independently of the score state.
    pub fn is_randomized(&self) -> bool {
        matches!(self, ScoringMethod::Random)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SporesMode {
    #[default]
    Diversify,
    #[serde(alias = "intensify and diversify")]
    IntensifyAndDiversify,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveSense {
    #[default]
    #[serde(alias = "minimize", alias = "minimise")]
    Min,
    #[serde(alias = "maximize", alias = "maximise")]
    Max,
}

impl ObjectiveSense {
    /// Multiplier applied to every objective coefficient.
    pub fn sign(&self) -> f64 {
        match self {
            ObjectiveSense::Min => 1.0,
            ObjectiveSense::Max => -1.0,
        }
    }
}

/// Numeric knobs of the scoring methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringParams {
    /// A value strictly above this counts as "used"
    #[serde(default)]
    pub use_threshold: f64,
    /// Added to a used component's weight by the deterministic method
    #[serde(default = "default_weight_increment")]
    pub weight_increment: f64,
    /// Random weights are drawn uniformly from `[0, random_upper_bound]`
    #[serde(default = "default_random_upper_bound")]
    pub random_upper_bound: f64,
    /// Lower clip of the relative change in the evolving methods
    #[serde(default = "default_evolving_clip_min")]
    pub evolving_clip_min: f64,
    /// Seed for the random method
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_weight_increment() -> f64 {
    1.0
}

fn default_random_upper_bound() -> f64 {
    1.0
}

fn default_evolving_clip_min() -> f64 {
    1e-3
}

fn default_seed() -> u64 {
    42
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            use_threshold: 0.0,
            weight_increment: default_weight_increment(),
            random_upper_bound: default_random_upper_bound(),
            evolving_clip_min: default_evolving_clip_min(),
            seed: default_seed(),
        }
    }
}

/// Validated-on-demand run parameters of one SPORES chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SporesConfig {
    /// Allowed fractional cost increase over the reference optimum
    #[serde(alias = "spores_slack")]
    pub slack: f64,
    /// Number of alternatives to generate
    #[serde(alias = "num_spores")]
    pub spores_number: usize,
    #[serde(alias = "weighting_method")]
    pub scoring_method: ScoringMethod,
    /// Technology tags whose components are scored
    #[serde(alias = "spore_techs", deserialize_with = "deserialize_categories")]
    pub tracked_categories: BTreeSet<String>,
    #[serde(default)]
    pub spores_mode: SporesMode,
    #[serde(default)]
    pub objective_sense: ObjectiveSense,
    #[serde(default = "default_coefficient")]
    pub diversification_coefficient: f64,
    #[serde(default)]
    pub intensification_coefficient: f64,
    #[serde(default)]
    pub intensifiable_categories: BTreeSet<String>,
    #[serde(default)]
    pub scoring: ScoringParams,
    #[serde(default = "default_solver")]
    pub solver: String,
    #[serde(default)]
    pub solver_options: SolverOptions,
    /// Wall-clock budget for the whole chain
    #[serde(default)]
    pub time_budget_seconds: Option<f64>,
}

/// Tracked categories as a plain list, or grouped by component type and
/// attribute (`{Generator: {p_nom: {solar: 0, wind: 0}}}`), in which case the
/// innermost keys are the categories.
#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryList {
    Flat(BTreeSet<String>),
    Grouped(BTreeMap<String, BTreeMap<String, BTreeMap<String, IgnoredAny>>>),
}

fn deserialize_categories<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match CategoryList::deserialize(deserializer)? {
        CategoryList::Flat(categories) => categories,
        CategoryList::Grouped(groups) => groups
            .into_values()
            .flat_map(BTreeMap::into_values)
            .flat_map(BTreeMap::into_keys)
            .collect(),
    })
}

fn default_coefficient() -> f64 {
    1.0
}

fn default_solver() -> String {
    "clarabel".to_string()
}

impl SporesConfig {
    /// Configuration with every optional key at its default.
    pub fn new(
        slack: f64,
        spores_number: usize,
        scoring_method: ScoringMethod,
        tracked_categories: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            slack,
            spores_number,
            scoring_method,
            tracked_categories: tracked_categories.into_iter().map(Into::into).collect(),
            spores_mode: SporesMode::default(),
            objective_sense: ObjectiveSense::default(),
            diversification_coefficient: default_coefficient(),
            intensification_coefficient: 0.0,
            intensifiable_categories: BTreeSet::new(),
            scoring: ScoringParams::default(),
            solver: default_solver(),
            solver_options: SolverOptions::new(),
            time_budget_seconds: None,
        }
    }

    /// Check value ranges that do not depend on the network.
    pub fn validate(&self) -> MgaResult<()> {
        if !self.slack.is_finite() || self.slack < 0.0 {
            return Err(config_error(format!(
                "slack must be a finite value >= 0, got {}",
                self.slack
            )));
        }
        if self.spores_number < 1 {
            return Err(config_error("spores_number must be at least 1"));
        }
        if self.tracked_categories.is_empty() {
            return Err(config_error("tracked_categories must not be empty"));
        }
        if let Some(blank) = self.tracked_categories.iter().find(|c| c.trim().is_empty()) {
            return Err(config_error(format!("tracked category '{blank}' is blank")));
        }
        require_non_negative("diversification_coefficient", self.diversification_coefficient)?;
        require_non_negative("intensification_coefficient", self.intensification_coefficient)?;
        require_non_negative("scoring.use_threshold", self.scoring.use_threshold)?;
        if !self.scoring.weight_increment.is_finite() || self.scoring.weight_increment <= 0.0 {
            return Err(config_error(format!(
                "scoring.weight_increment must be > 0, got {}",
                self.scoring.weight_increment
            )));
        }
        require_non_negative("scoring.evolving_clip_min", self.scoring.evolving_clip_min)?;
        if !self.scoring.random_upper_bound.is_finite() || self.scoring.random_upper_bound <= 0.0 {
            return Err(config_error(format!(
                "scoring.random_upper_bound must be > 0, got {}",
                self.scoring.random_upper_bound
            )));
        }
        if self.scoring.evolving_clip_min <= 0.0
            && matches!(
                self.scoring_method,
                ScoringMethod::EvolvingAverage | ScoringMethod::EvolvingMedian
            )
        {
            return Err(config_error(
                "scoring.evolving_clip_min must be > 0 for the evolving methods",
            ));
        }
        if let Some(unknown) = self
            .intensifiable_categories
            .difference(&self.tracked_categories)
            .next()
        {
            return Err(config_error(format!(
                "intensifiable category '{unknown}' is not a tracked category"
            )));
        }
        if self.solver.trim().is_empty() {
            return Err(config_error("solver name must not be empty"));
        }
        self.time_budget()?;
        Ok(())
    }

    /// Full validation against the network the chain will run on.
    ///
    /// Returns the components behind the tracked categories.
    pub fn validate_against<N: NetworkAdapter + ?Sized>(
        &self,
        network: &N,
    ) -> MgaResult<TrackedComponents> {
        self.validate()?;
        TrackedComponents::collect(network, &self.tracked_categories)
    }

    /// Wall-clock budget as a `Duration`; values a `Duration` cannot hold
    /// are a configuration error.
    pub fn time_budget(&self) -> MgaResult<Option<Duration>> {
        let Some(seconds) = self.time_budget_seconds else {
            return Ok(None);
        };
        require_non_negative("time_budget_seconds", seconds)?;
        Duration::try_from_secs_f64(seconds).map(Some).map_err(|e| {
            config_error(format!("time_budget_seconds {seconds} is out of range: {e}"))
        })
    }

    /// Options for the selected solver: the configuration's own entry,
    /// overlaid key by key with the caller-supplied options.
    pub fn effective_solver_options(&self, overrides: &SolverOptions) -> OptionMap {
        let mut options = self
            .solver_options
            .get(&self.solver)
            .cloned()
            .unwrap_or_default();
        if let Some(extra) = overrides.get(&self.solver) {
            options.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        options
    }
}

fn config_error(msg: impl Into<String>) -> MgaError {
    MgaError::Configuration(msg.into())
}

fn require_non_negative(name: &str, value: f64) -> MgaResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(config_error(format!(
            "{name} must be a finite value >= 0, got {value}"
        )));
    }
    Ok(())
}

/// Load a configuration document, picking the format from the extension.
///
/// `.yaml`/`.yml`, `.json` and `.toml` are recognised; anything else is
/// tried as YAML, then JSON. The loaded configuration is validated.
pub fn load_config_from_path(path: &Path) -> MgaResult<SporesConfig> {
    let data = fs::read_to_string(path).map_err(|err| {
        MgaError::Io(std::io::Error::new(
            err.kind(),
            format!("reading SPORES config '{}': {err}", path.display()),
        ))
    })?;
    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            config_from_yaml_str(&data)
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => config_from_json_str(&data),
        Some(ext) if ext.eq_ignore_ascii_case("toml") => config_from_toml_str(&data),
        _ => config_from_yaml_str(&data).or_else(|_| config_from_json_str(&data)),
    }
    .map_err(|err| match err {
        MgaError::Configuration(msg) => {
            MgaError::Configuration(format!("{}: {msg}", path.display()))
        }
        MgaError::Parse(msg) => MgaError::Parse(format!("{}: {msg}", path.display())),
        other => other,
    })?;
    config.validate()?;
    Ok(config)
}

/// Parse a YAML document (syntax errors are `Parse`, shape errors `Configuration`).
pub fn config_from_yaml_str(data: &str) -> MgaResult<SporesConfig> {
    let mut doc: serde_yaml::Value =
        serde_yaml::from_str(data).map_err(|e| MgaError::Parse(format!("SPORES yaml: {e}")))?;
    if let Some(section) = doc.get(SPORES_SECTION) {
        doc = section.clone();
    }
    serde_yaml::from_value(doc).map_err(|e| config_error(format!("SPORES config: {e}")))
}

pub fn config_from_json_str(data: &str) -> MgaResult<SporesConfig> {
    let mut doc: serde_json::Value =
        serde_json::from_str(data).map_err(|e| MgaError::Parse(format!("SPORES json: {e}")))?;
    if let Some(section) = doc.get_mut(SPORES_SECTION) {
        doc = section.take();
    }
    serde_json::from_value(doc).map_err(|e| config_error(format!("SPORES config: {e}")))
}

pub fn config_from_toml_str(data: &str) -> MgaResult<SporesConfig> {
    let mut doc: toml::Table =
        toml::from_str(data).map_err(|e| MgaError::Parse(format!("SPORES toml: {e}")))?;
    let value = match doc.remove(SPORES_SECTION) {
        Some(section) => section,
        None => toml::Value::Table(doc),
    };
    value
        .try_into()
        .map_err(|e: toml::de::Error| config_error(format!("SPORES config: {e}")))
}
