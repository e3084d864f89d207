//! The person a recommendation is computed for.

use serde::{Deserialize, Serialize};

/// Employment status, as encoded in the model's training data.
///
/// Optional on the wire — predictors that were trained without the
/// employment feature simply ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Employment {
    Unemployed,
    Employed,
    Student,
}

impl Employment {
    /// The ordinal the training pipeline mapped this status to.
    pub fn encoded(self) -> u8 {
        match self {
            Employment::Unemployed => 0,
            Employment::Employed => 1,
            Employment::Student => 2,
        }
    }
}

/// Inputs describing the person: the predictor's feature vector plus the
/// engine's validation gate (`age > 0`, `income > 0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingProfile {
    /// Age in years.
    pub age: f64,

    /// Monthly income, in the model's currency unit.
    pub income: f64,

    /// Employment status, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment: Option<Employment>,
}

impl SpendingProfile {
    pub fn new(age: f64, income: f64) -> Self {
        Self {
            age,
            income,
            employment: None,
        }
    }

    pub fn with_employment(mut self, employment: Employment) -> Self {
        self.employment = Some(employment);
        self
    }
}
