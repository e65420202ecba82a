//! Subscription tier enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription plan levels, totally ordered from cheapest to richest.
///
/// The declaration order is load-bearing: derived `Ord` is the tier order
/// that entitlement monotonicity is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Free plan.
    Free,
    /// Entry-level paid plan.
    Start,
    /// Mid-level paid plan.
    Plus,
    /// Professional plan.
    Pro,
    /// Top plan.
    Premium,
}

impl PlanTier {
    /// All tiers in ascending order.
    pub const ALL: [PlanTier; 5] = [
        Self::Free,
        Self::Start,
        Self::Plus,
        Self::Pro,
        Self::Premium,
    ];

    /// The lowest tier.
    pub const fn lowest() -> Self {
        Self::Free
    }

    /// The highest tier.
    pub const fn highest() -> Self {
        Self::Premium
    }

    /// Zero-based position in tier order.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Tiers strictly above this one, ascending.
    pub fn above(self) -> impl Iterator<Item = PlanTier> {
        Self::ALL.into_iter().filter(move |t| *t > self)
    }

    /// Return the tier as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Start => "start",
            Self::Plus => "plus",
            Self::Pro => "pro",
            Self::Premium => "premium",
        }
    }

    /// Human-readable plan name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Start => "Start",
            Self::Plus => "Plus",
            Self::Pro => "Pro",
            Self::Premium => "Premium",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = galleryhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "start" => Ok(Self::Start),
            "plus" => Ok(Self::Plus),
            "pro" => Ok(Self::Pro),
            "premium" => Ok(Self::Premium),
            _ => Err(galleryhub_core::AppError::validation(format!(
                "Invalid plan tier: '{s}'. Expected one of: free, start, plus, pro, premium"
            ))),
        }
    }
}
