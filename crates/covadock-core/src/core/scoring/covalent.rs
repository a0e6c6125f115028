use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How the distance and affinity terms of a covalent score are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringPolicy {
    /// Stepped distance bands and a linear, clamped affinity term.
    #[default]
    Discrete,
    /// A logistic distance falloff centred at 4 Å and an exponential affinity term.
    Logistic,
}

impl ScoringPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringPolicy::Discrete => "discrete",
            ScoringPolicy::Logistic => "logistic",
        }
    }

    /// Reward for a reactive atom `distance` Å from the nucleophile. Non-increasing in
    /// distance for both policies.
    pub fn distance_factor(self, distance: f64) -> f64 {
        match self {
            ScoringPolicy::Discrete => {
                if distance < 3.5 {
                    1.0
                } else if distance < 5.0 {
                    0.8
                } else if distance < 7.0 {
                    0.4
                } else {
                    0.1
                }
            }
            ScoringPolicy::Logistic => 1.0 / (1.0 + ((distance - 4.0) * 2.0).exp()),
        }
    }

    /// Reward for a binding affinity in kcal/mol (more negative is better).
    pub fn affinity_factor(self, affinity: f64) -> f64 {
        match self {
            ScoringPolicy::Discrete => ((-affinity - 4.0) / 6.0).clamp(0.0, 1.0),
            ScoringPolicy::Logistic => (-affinity / 2.0).exp(),
        }
    }
}

impl fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown scoring policy '{0}' (expected 'discrete' or 'logistic')")]
pub struct ParseScoringPolicyError(pub String);

impl FromStr for ScoringPolicy {
    type Err = ParseScoringPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discrete" => Ok(ScoringPolicy::Discrete),
            "logistic" => Ok(ScoringPolicy::Logistic),
            _ => Err(ParseScoringPolicyError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CovalentScore {
    pub distance: f64,
    pub distance_factor: f64,
    pub affinity_factor: f64,
    /// `affinity_factor * distance_factor * 10`.
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CovalentPrediction {
    Likely,
    Unlikely,
}

impl CovalentPrediction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CovalentPrediction::Likely => "likely",
            CovalentPrediction::Unlikely => "unlikely",
        }
    }
}

impl fmt::Display for CovalentPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceBand {
    /// At most 5 Å.
    Optimal,
    /// Above 5 Å, at most 7 Å.
    Reasonable,
    /// Above 7 Å.
    TooFar,
}

impl DistanceBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceBand::Optimal => "optimal",
            DistanceBand::Reasonable => "reasonable",
            DistanceBand::TooFar => "too-far",
        }
    }
}

/// A categorical judgement of one pose, independent of the numeric score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CovalentAssessment {
    pub is_covalent: bool,
    pub confidence: f64,
    /// `None` when no warhead was found and distance was not considered.
    pub band: Option<DistanceBand>,
    pub rationale: String,
}

pub struct CovalentScorer {
    policy: ScoringPolicy,
}

impl CovalentScorer {
    /// Minimum score for a "likely" prediction.
    pub const LIKELY_THRESHOLD: f64 = 4.0;
    /// Largest reactive-atom distance, in Å, that can still be "likely".
    pub const MAX_REACTIVE_DISTANCE: f64 = 8.0;

    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    pub fn score(&self, affinity: f64, distance: f64) -> CovalentScore {
        let distance_factor = self.policy.distance_factor(distance);
        let affinity_factor = self.policy.affinity_factor(affinity);
        CovalentScore {
            distance,
            distance_factor,
            affinity_factor,
            score: affinity_factor * distance_factor * 10.0,
        }
    }

    pub fn predict(&self, score: &CovalentScore, has_warhead: bool) -> CovalentPrediction {
        if has_warhead
            && score.score >= Self::LIKELY_THRESHOLD
            && score.distance <= Self::MAX_REACTIVE_DISTANCE
        {
            CovalentPrediction::Likely
        } else {
            CovalentPrediction::Unlikely
        }
    }

    /// Categorizes a pose by warhead presence and reactive-atom distance.
    ///
    /// `distance` and `affinity` are ignored when there is no warhead.
    pub fn assess(has_warhead: bool, distance: f64, affinity: f64) -> CovalentAssessment {
        if !has_warhead {
            return CovalentAssessment {
                is_covalent: false,
                confidence: 0.9,
                band: None,
                rationale: "No reactive warhead detected in the ligand".to_string(),
            };
        }

        let strong_binder = affinity < -7.0;
        if distance > 7.0 {
            CovalentAssessment {
                is_covalent: false,
                confidence: 0.8,
                band: Some(DistanceBand::TooFar),
                rationale: format!(
                    "Warhead is {distance:.2} Å from the target nucleophile, too far to react"
                ),
            }
        } else if distance <= 5.0 {
            CovalentAssessment {
                is_covalent: true,
                confidence: if strong_binder { 0.95 } else { 0.9 },
                band: Some(DistanceBand::Optimal),
                rationale: format!(
                    "Warhead is {distance:.2} Å from the target nucleophile, within bonding range"
                ),
            }
        } else {
            CovalentAssessment {
                is_covalent: true,
                confidence: if strong_binder { 0.8 } else { 0.7 },
                band: Some(DistanceBand::Reasonable),
                rationale: format!(
                    "Warhead is {distance:.2} Å from the target nucleophile, reachable after relaxation"
                ),
            }
        }
    }
}

impl Default for CovalentScorer {
    fn default() -> Self {
        Self::new(ScoringPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICIES: [ScoringPolicy; 2] = [ScoringPolicy::Discrete, ScoringPolicy::Logistic];

    #[test]
    fn discrete_policy_matches_reference_pose() {
        let scorer = CovalentScorer::new(ScoringPolicy::Discrete);
        let score = scorer.score(-8.0, 4.0);
        assert_eq!(score.distance_factor, 0.8);
        assert!((score.affinity_factor - 2.0 / 3.0).abs() < 1e-9);
        assert!((score.score - 5.333).abs() < 1e-3);
        assert_eq!(scorer.predict(&score, true), CovalentPrediction::Likely);
    }

    #[test]
    fn distant_warhead_is_unlikely() {
        let scorer = CovalentScorer::new(ScoringPolicy::Discrete);
        let score = scorer.score(-8.0, 9.0);
        assert_eq!(score.distance_factor, 0.1);
        assert_eq!(scorer.predict(&score, true), CovalentPrediction::Unlikely);
    }

    #[test]
    fn no_warhead_is_always_unlikely() {
        for policy in POLICIES {
            let scorer = CovalentScorer::new(policy);
            let score = scorer.score(-15.0, 1.0);
            assert_eq!(scorer.predict(&score, false), CovalentPrediction::Unlikely);
        }
    }

    #[test]
    fn score_is_non_increasing_in_distance() {
        for policy in POLICIES {
            let scorer = CovalentScorer::new(policy);
            for affinity in [-12.0, -8.0, -5.0, -1.0] {
                let mut previous = f64::INFINITY;
                for step in 0..=120 {
                    let distance = step as f64 * 0.1;
                    let score = scorer.score(affinity, distance).score;
                    assert!(score <= previous, "{policy} at {distance} Å");
                    previous = score;
                }
            }
        }
    }

    #[test]
    fn discrete_band_edges() {
        let p = ScoringPolicy::Discrete;
        assert_eq!(p.distance_factor(3.49), 1.0);
        assert_eq!(p.distance_factor(3.5), 0.8);
        assert_eq!(p.distance_factor(5.0), 0.4);
        assert_eq!(p.distance_factor(7.0), 0.1);
        assert_eq!(p.affinity_factor(-2.0), 0.0);
        assert_eq!(p.affinity_factor(-20.0), 1.0);
    }

    #[test]
    fn logistic_policy_is_half_at_four_angstrom() {
        let p = ScoringPolicy::Logistic;
        assert!((p.distance_factor(4.0) - 0.5).abs() < 1e-12);
        assert!((p.affinity_factor(-2.0) - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn assessment_bands_and_confidences() {
        let none = CovalentScorer::assess(false, 1.0, -10.0);
        assert!(!none.is_covalent);
        assert_eq!(none.confidence, 0.9);
        assert_eq!(none.band, None);

        let far = CovalentScorer::assess(true, 7.5, -10.0);
        assert!(!far.is_covalent);
        assert_eq!(far.confidence, 0.8);
        assert_eq!(far.band, Some(DistanceBand::TooFar));

        assert_eq!(CovalentScorer::assess(true, 5.0, -6.0).confidence, 0.9);
        assert_eq!(CovalentScorer::assess(true, 5.0, -7.5).confidence, 0.95);
        let mid = CovalentScorer::assess(true, 7.0, -6.0);
        assert!(mid.is_covalent);
        assert_eq!(mid.confidence, 0.7);
        assert_eq!(mid.band, Some(DistanceBand::Reasonable));
        assert_eq!(CovalentScorer::assess(true, 6.0, -7.1).confidence, 0.8);
    }

    #[test]
    fn policy_names_parse_case_insensitively() {
        assert_eq!("Logistic".parse::<ScoringPolicy>(), Ok(ScoringPolicy::Logistic));
        assert_eq!(" discrete ".parse::<ScoringPolicy>(), Ok(ScoringPolicy::Discrete));
        assert!("linear".parse::<ScoringPolicy>().is_err());
    }
}
