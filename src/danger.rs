// src/danger.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aggregate::category_totals;
use crate::dataset::Dataset;
use crate::error::Result;

/// Totals at or above this are `High`.
pub const HIGH_FROM: u64 = 500;
/// Totals strictly above this (and not `High`) are `Medium`.
pub const MEDIUM_ABOVE: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DangerTier {
    Low,
    Medium,
    High,
}

/// How a shell should style a tier's message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

impl DangerTier {
    pub fn as_str(&self) -> &str {
        match self {
            DangerTier::Low => "Low",
            DangerTier::Medium => "Medium",
            DangerTier::High => "High",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DangerTier::Low => Severity::Success,
            DangerTier::Medium => Severity::Warning,
            DangerTier::High => Severity::Error,
        }
    }
}

impl fmt::Display for DangerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a total incident count. 500 is `High`, 100 is `Low`.
pub fn classify(total: u64) -> DangerTier {
    if total >= HIGH_FROM {
        DangerTier::High
    } else if total > MEDIUM_ABOVE {
        DangerTier::Medium
    } else {
        DangerTier::Low
    }
}

/// A tier together with the total it was derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DangerAssessment {
    pub tier: DangerTier,
    pub total: u64,
    pub severity: Severity,
}

impl DangerAssessment {
    pub fn from_total(total: u64) -> Self {
        let tier = classify(total);
        Self {
            tier,
            total,
            severity: tier.severity(),
        }
    }

    /// Sum `categories` over all rows of `data`, then classify the sum.
    pub fn assess<S: AsRef<str>>(data: &Dataset, categories: &[S]) -> Result<Self> {
        let totals = category_totals(data, categories)?;
        Ok(Self::from_total(totals.grand_total()))
    }

    pub fn message(&self) -> String {
        format!(
            "Danger Level: {} ({} crimes reported)",
            self.tier, self.total
        )
    }
}
