use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::InductiveMinerError;

/// Inductive Miner variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InductiveMinerVariant {
    /// Plain Inductive Miner, discovering a process tree
    #[default]
    #[serde(rename = "IM")]
    IM,
    /// Infrequent Inductive Miner (noise filtering on the directly-follows graph)
    #[serde(rename = "IMf")]
    IMf,
    /// POWL discovery with the cuts of the plain Inductive Miner
    #[serde(rename = "POWL_BASIC")]
    POWLBasic,
    /// POWL discovery with the maximal partial order cut
    #[serde(rename = "POWL_MAXIMAL")]
    POWLMaximal,
    /// POWL discovery with the dynamic clustering partial order cut
    #[serde(rename = "POWL_DYNAMIC_CLUSTERING")]
    POWLDynamicClustering,
    /// POWL discovery with the brute-force partial order cut
    #[serde(rename = "POWL_BRUTE_FORCE")]
    POWLBruteForce,
}

impl InductiveMinerVariant {
    /// All variants
    pub const ALL: [InductiveMinerVariant; 6] = [
        InductiveMinerVariant::IM,
        InductiveMinerVariant::IMf,
        InductiveMinerVariant::POWLBasic,
        InductiveMinerVariant::POWLMaximal,
        InductiveMinerVariant::POWLDynamicClustering,
        InductiveMinerVariant::POWLBruteForce,
    ];

    /// `true` if the variant discovers a POWL model (instead of a process tree)
    pub fn is_powl(&self) -> bool {
        !matches!(self, InductiveMinerVariant::IM | InductiveMinerVariant::IMf)
    }

    /// Identifier of the variant (as accepted by [`FromStr`])
    pub fn as_str(&self) -> &'static str {
        match self {
            InductiveMinerVariant::IM => "IM",
            InductiveMinerVariant::IMf => "IMf",
            InductiveMinerVariant::POWLBasic => "POWL_BASIC",
            InductiveMinerVariant::POWLMaximal => "POWL_MAXIMAL",
            InductiveMinerVariant::POWLDynamicClustering => "POWL_DYNAMIC_CLUSTERING",
            InductiveMinerVariant::POWLBruteForce => "POWL_BRUTE_FORCE",
        }
    }
}

impl Display for InductiveMinerVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InductiveMinerVariant {
    type Err = InductiveMinerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| InductiveMinerError::UnsupportedVariant(s.to_string()))
    }
}

/// Fall-through rules that can be switched off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallThroughKind {
    /// Split off empty traces into a choice with a silent step
    EmptyTrace,
    /// Put an activity occurring exactly once per trace in parallel to the rest
    OncePerTrace,
    /// Put an activity in parallel to the rest if that enables a cut
    Concurrent,
    /// Split traces where an end activity is followed by a start activity
    StrictTauLoop,
    /// Split traces at every start activity
    TauLoop,
}

impl FallThroughKind {
    /// All fall-through rules that can be disabled, in the order they are tried
    pub const ALL: [FallThroughKind; 5] = [
        FallThroughKind::EmptyTrace,
        FallThroughKind::OncePerTrace,
        FallThroughKind::Concurrent,
        FallThroughKind::StrictTauLoop,
        FallThroughKind::TauLoop,
    ];

    /// Identifier of the fall-through (as accepted by [`FromStr`])
    pub fn as_str(&self) -> &'static str {
        match self {
            FallThroughKind::EmptyTrace => "empty_trace",
            FallThroughKind::OncePerTrace => "once_per_trace",
            FallThroughKind::Concurrent => "concurrent",
            FallThroughKind::StrictTauLoop => "strict_tau_loop",
            FallThroughKind::TauLoop => "tau_loop",
        }
    }
}

impl Display for FallThroughKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FallThroughKind {
    type Err = InductiveMinerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| InductiveMinerError::InvalidOption {
                name: "disable_fallthroughs".to_string(),
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Algorithm parameters for the Inductive Miner
pub struct InductiveMinerConfig {
    /// Which variant to run
    pub variant: InductiveMinerVariant,
    /// Relative threshold for filtering the directly-follows graph (IMf), in `[0, 1)`
    pub noise_threshold: f64,
    /// Minimal share of eventually-follows observations required to order two blocks
    /// (dynamic clustering), in `(0.5, 1]`
    pub order_frequency_ratio: f64,
    /// Relative threshold for pruning infrequent variants (POWL variants), in `[0, 1)`
    pub filtering_threshold: f64,
    /// Fall-through rules that are skipped
    pub disable_fallthroughs: BTreeSet<FallThroughKind>,
    /// Maximal recursion depth before discovery is aborted
    pub max_recursion_depth: usize,
    /// Simplify the discovered model
    pub simplify: bool,
}

impl Default for InductiveMinerConfig {
    fn default() -> Self {
        Self {
            variant: InductiveMinerVariant::default(),
            noise_threshold: 0.0,
            order_frequency_ratio: 1.0,
            filtering_threshold: 0.0,
            disable_fallthroughs: BTreeSet::new(),
            max_recursion_depth: 512,
            simplify: true,
        }
    }
}

impl InductiveMinerConfig {
    /// Default parameters for the given variant
    pub fn for_variant(variant: InductiveMinerVariant) -> Self {
        Self {
            variant,
            ..Default::default()
        }
    }

    /// Serialize Inductive Miner parameters to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize Inductive Miner parameters from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// `true` if the fall-through is not disabled
    pub fn is_enabled(&self, fall_through: FallThroughKind) -> bool {
        !self.disable_fallthroughs.contains(&fall_through)
    }

    /// Check that every option lies in its domain
    pub fn validate(&self) -> Result<(), InductiveMinerError> {
        let invalid = |name: &str, value: String| {
            Err(InductiveMinerError::InvalidOption {
                name: name.to_string(),
                value,
            })
        };
        if !(0.0..1.0).contains(&self.noise_threshold) {
            return invalid("noise_threshold", self.noise_threshold.to_string());
        }
        if !(self.order_frequency_ratio > 0.5 && self.order_frequency_ratio <= 1.0) {
            return invalid(
                "order_frequency_ratio",
                self.order_frequency_ratio.to_string(),
            );
        }
        if !(0.0..1.0).contains(&self.filtering_threshold) {
            return invalid("filtering_threshold", self.filtering_threshold.to_string());
        }
        if self.max_recursion_depth == 0 {
            return invalid("max_recursion_depth", self.max_recursion_depth.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_from_str() {
        for variant in InductiveMinerVariant::ALL {
            assert_eq!(variant.as_str().parse::<InductiveMinerVariant>().unwrap(), variant);
        }
        assert!(matches!(
            "IMd".parse::<InductiveMinerVariant>(),
            Err(InductiveMinerError::UnsupportedVariant(v)) if v == "IMd"
        ));
        assert!(InductiveMinerVariant::POWLBasic.is_powl());
        assert!(!InductiveMinerVariant::IMf.is_powl());
    }

    #[test]
    fn config_json() {
        let config = InductiveMinerConfig {
            variant: InductiveMinerVariant::POWLDynamicClustering,
            order_frequency_ratio: 0.75,
            disable_fallthroughs: BTreeSet::from([FallThroughKind::TauLoop]),
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("\"POWL_DYNAMIC_CLUSTERING\""));
        assert!(json.contains("\"tau_loop\""));
        assert_eq!(InductiveMinerConfig::from_json(&json).unwrap(), config);

        let partial =
            InductiveMinerConfig::from_json(r#"{"variant": "IMf", "noise_threshold": 0.2}"#)
                .unwrap();
        assert_eq!(partial.variant, InductiveMinerVariant::IMf);
        assert_eq!(partial.max_recursion_depth, 512);
        assert!(partial.simplify);
    }

    #[test]
    fn validation() {
        assert!(InductiveMinerConfig::default().validate().is_ok());
        let config = InductiveMinerConfig {
            noise_threshold: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(InductiveMinerError::InvalidOption { name, .. }) if name == "noise_threshold"
        ));
        let config = InductiveMinerConfig {
            order_frequency_ratio: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = InductiveMinerConfig {
            filtering_threshold: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = InductiveMinerConfig {
            max_recursion_depth: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!("tau_loop".parse::<FallThroughKind>().is_ok());
        assert!("flower".parse::<FallThroughKind>().is_err());
    }
}
