// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Unit conversion and bounds shared by registration and profile updates.
//!
//! The client works in kilograms and centimeters. The backend stores height
//! in meters, with `NUMERIC(5,2)` for weight and `NUMERIC(3,2)` for height.

use crate::error::AppError;

/// Largest weight (kg) the backend column accepts.
pub const MAX_WEIGHT_KG: f64 = 999.99;

/// Largest height (m) the backend column accepts.
pub const MAX_HEIGHT_M: f64 = 9.99;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Centimeters to meters, rounded to two decimals.
pub fn cm_to_m(cm: f64) -> f64 {
    round2(cm / 100.0)
}

/// Meters to centimeters.
pub fn m_to_cm(m: f64) -> f64 {
    round2(m * 100.0)
}

/// Check a weight in kilograms against the backend bounds.
pub fn validate_weight(weight_kg: f64) -> Result<f64, AppError> {
    if !weight_kg.is_finite() || weight_kg < 0.0 {
        return Err(AppError::Validation(format!(
            "Peso inválido: {}",
            weight_kg
        )));
    }
    if weight_kg > MAX_WEIGHT_KG {
        return Err(AppError::Validation(format!(
            "Peso deve ser no máximo {} kg",
            MAX_WEIGHT_KG
        )));
    }
    Ok(weight_kg)
}

/// Convert a height in centimeters to the wire value in meters, checking
/// the converted value against the backend bounds.
pub fn height_for_wire(height_cm: f64) -> Result<f64, AppError> {
    if !height_cm.is_finite() || height_cm < 0.0 {
        return Err(AppError::Validation(format!(
            "Altura inválida: {}",
            height_cm
        )));
    }
    let meters = cm_to_m(height_cm);
    if meters > MAX_HEIGHT_M {
        return Err(AppError::Validation(format!(
            "Altura deve ser no máximo {} m",
            MAX_HEIGHT_M
        )));
    }
    Ok(meters)
}
