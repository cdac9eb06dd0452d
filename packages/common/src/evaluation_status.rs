#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a submission in the evaluation lifecycle.
///
/// A submission starts `Pending` and moves to exactly one of the terminal
/// states; terminal states never revert and never change into each other.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in
/// SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum EvaluationStatus {
    /// Uploaded, waiting for a reviewer decision.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Pending"))]
    Pending,
    /// Scored by a reviewer. Carries a score and an evaluator.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Evaluated"))]
    Evaluated,
    /// Declined by a reviewer without a score.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Rejected"))]
    Rejected,
}

impl EvaluationStatus {
    /// Returns true once a reviewer decision has been made.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if the submission was scored.
    pub fn is_evaluated(&self) -> bool {
        matches!(self, Self::Evaluated)
    }

    /// All possible status values.
    pub const ALL: &'static [EvaluationStatus] = &[Self::Pending, Self::Evaluated, Self::Rejected];

    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Evaluated => "Evaluated",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for EvaluationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status '{invalid}'. Valid values: Pending, Evaluated, Rejected")]
pub struct ParseStatusError {
    invalid: String,
}

impl FromStr for EvaluationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Evaluated" => Ok(Self::Evaluated),
            "Rejected" => Ok(Self::Rejected),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}
