#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Whether a higher or lower numeric score is better for a competition's
/// evaluation metric. Accuracy-style metrics maximize; error metrics such as
/// RMSE minimize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum MetricDirection {
    /// Higher scores are better.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Maximize"))]
    Maximize,
    /// Lower scores are better.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Minimize"))]
    Minimize,
}

impl MetricDirection {
    /// Total order placing better scores first.
    ///
    /// Uses `f64::total_cmp`, so the ordering is deterministic for every pair
    /// of inputs (scores are validated finite before they reach a leaderboard).
    pub fn rank_ordering(&self, a: f64, b: f64) -> Ordering {
        match self {
            Self::Maximize => b.total_cmp(&a),
            Self::Minimize => a.total_cmp(&b),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maximize => "Maximize",
            Self::Minimize => "Minimize",
        }
    }
}

impl fmt::Display for MetricDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for MetricDirection {
    fn default() -> Self {
        Self::Maximize
    }
}

/// Error when parsing an invalid metric direction string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid metric direction '{invalid}'. Valid values: Maximize, Minimize")]
pub struct ParseDirectionError {
    invalid: String,
}

impl FromStr for MetricDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Maximize" => Ok(Self::Maximize),
            "Minimize" => Ok(Self::Minimize),
            _ => Err(ParseDirectionError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// A rejected raw score.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("Score must be a finite number")]
    NotFinite,
    #[error("Score {value} is outside the metric range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },
}

/// Per-competition metric definition: direction plus the inclusive score
/// range a reviewer-entered value must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub direction: MetricDirection,
    pub score_min: f64,
    pub score_max: f64,
}

impl MetricSpec {
    pub fn new(direction: MetricDirection, score_min: f64, score_max: f64) -> Self {
        Self {
            direction,
            score_min,
            score_max,
        }
    }

    /// Validate a raw score against this metric.
    ///
    /// Pure and deterministic: rejects non-finite values and values outside
    /// the inclusive `[score_min, score_max]` range.
    pub fn validate_score(&self, raw: f64) -> Result<f64, ScoreError> {
        if !raw.is_finite() {
            return Err(ScoreError::NotFinite);
        }
        if raw < self.score_min || raw > self.score_max {
            return Err(ScoreError::OutOfRange {
                value: raw,
                min: self.score_min,
                max: self.score_max,
            });
        }
        Ok(raw)
    }
}

impl Default for MetricSpec {
    /// The platform's default convention: scores in [0, 1], higher is better.
    fn default() -> Self {
        Self {
            direction: MetricDirection::Maximize,
            score_min: 0.0,
            score_max: 1.0,
        }
    }
}
