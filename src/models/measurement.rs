// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Body measurement records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One dated set of body measurements. Weight in kg, everything else in cm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeasurementRecord {
    pub id: String,
    pub date: NaiveDate,
    pub weight: f64,
    pub height: Option<f64>,
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hips: Option<f64>,
    pub arms: Option<f64>,
    pub thighs: Option<f64>,
    pub neck: Option<f64>,
    pub shoulders: Option<f64>,
}

impl MeasurementRecord {
    /// Record with only the required fields set.
    pub fn new(date: NaiveDate, weight: f64) -> Self {
        Self {
            id: String::new(),
            date,
            weight,
            height: None,
            chest: None,
            waist: None,
            hips: None,
            arms: None,
            thighs: None,
            neck: None,
            shoulders: None,
        }
    }

    /// Body mass index, when the height is known.
    pub fn bmi(&self) -> Option<f64> {
        let meters = self.height? / 100.0;
        if meters <= 0.0 {
            return None;
        }
        Some(crate::units::round2(self.weight / (meters * meters)))
    }
}
