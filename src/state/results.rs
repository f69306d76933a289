//! Prediction results and their presentation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Likelihood at or above which the high-risk recommendations apply
pub const HIGH_RISK_THRESHOLD: u8 = 70;
/// Likelihood at or above which the confidence bucket is Medium
pub const MEDIUM_RISK_THRESHOLD: u8 = 30;

const HIGH_RISK_RECOMMENDATIONS: &[&str] = &[
    "Isolate immediately and avoid contact with others",
    "Schedule a PCR test for confirmation",
    "Monitor your symptoms and seek medical attention if they worsen",
    "Ensure proper ventilation in your living space",
];

const LOW_RISK_RECOMMENDATIONS: &[&str] = &[
    "Continue monitoring your symptoms",
    "Practice social distancing and wear a mask",
    "Maintain good hygiene practices",
    "Consider getting tested if symptoms worsen",
];

/// Parsed response of a successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Rounded risk percentage, 0..=100
    pub likelihood_percent: u8,
    /// Free-text recommendation supplied by the service
    pub recommendation: String,
    pub received_at: DateTime<Utc>,
}

impl PredictionResult {
    pub fn new(likelihood_percent: u8, recommendation: impl Into<String>) -> Self {
        Self {
            likelihood_percent: likelihood_percent.min(100),
            recommendation: recommendation.into(),
            received_at: Utc::now(),
        }
    }
}

/// Coarse classification of the likelihood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBucket {
    Low,
    Medium,
    High,
}

impl ConfidenceBucket {
    pub const ALL: [ConfidenceBucket; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// What the results view shows for a given likelihood
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub likelihood: u8,
    pub bucket: ConfidenceBucket,
    pub recommendations: &'static [&'static str],
}

/// Derive bucket and recommendation list from a likelihood percentage.
///
/// This is display logic, not a clinical decision.
pub fn present(likelihood: u8) -> Presentation {
    let bucket = if likelihood >= HIGH_RISK_THRESHOLD {
        ConfidenceBucket::High
    } else if likelihood >= MEDIUM_RISK_THRESHOLD {
        ConfidenceBucket::Medium
    } else {
        ConfidenceBucket::Low
    };

    let recommendations = if likelihood >= HIGH_RISK_THRESHOLD {
        HIGH_RISK_RECOMMENDATIONS
    } else {
        LOW_RISK_RECOMMENDATIONS
    };

    Presentation {
        likelihood,
        bucket,
        recommendations,
    }
}
