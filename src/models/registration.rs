// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signup and profile-edit input types.

use crate::error::AppError;
use crate::models::user::Role;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Status sent for new accounts when the form does not set one.
pub const DEFAULT_STATUS: &str = "active";

/// First registration step: account fields collected before the account
/// exists. Held in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RegisterData {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub name: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    pub username: Option<String>,
    #[validate(length(min = 6, message = "A senha deve ter pelo menos 6 caracteres"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "As senhas não coincidem"))]
    pub confirm_password: String,
    pub role: Role,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub status: Option<String>,
    pub weight: Option<f64>,
    /// Centimeters
    pub height: Option<f64>,
    pub cref: Option<String>,
}

impl RegisterData {
    /// Minimal first-step data, as the signup form collects it.
    pub fn new(name: &str, email: &str, password: &str, confirm_password: &str, role: Role) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            username: None,
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
            role,
            phone: None,
            date_of_birth: None,
            gender: None,
            status: None,
            weight: None,
            height: None,
            cref: None,
        }
    }

    /// Overlay second-step fields. Fields absent from `additional` keep
    /// their first-step value.
    pub fn merge(mut self, additional: AdditionalUserData) -> Self {
        let AdditionalUserData {
            phone,
            date_of_birth,
            gender,
            weight,
            height,
            cref,
            avatar: _,
            status,
        } = additional;

        self.phone = non_blank(phone).or(self.phone);
        self.date_of_birth = date_of_birth.or(self.date_of_birth);
        self.gender = non_blank(gender).or(self.gender);
        self.status = non_blank(status).or(self.status);
        match self.role {
            Role::Student => {
                self.weight = weight.or(self.weight);
                self.height = height.or(self.height);
            }
            Role::Trainer => {
                self.cref = non_blank(cref).or(self.cref);
            }
        }
        self
    }

    /// Check the fields each role must provide before the account is
    /// submitted: weight and height for students, CREF for trainers.
    pub fn check_role_fields(&self) -> Result<(), AppError> {
        match self.role {
            Role::Student => {
                if self.weight.is_none() {
                    return Err(AppError::Validation("Peso é obrigatório para alunos".into()));
                }
                if self.height.is_none() {
                    return Err(AppError::Validation("Altura é obrigatória para alunos".into()));
                }
            }
            Role::Trainer => {
                if self.cref.as_deref().map_or(true, |c| c.trim().is_empty()) {
                    return Err(AppError::Validation(
                        "CREF é obrigatório para personal trainers".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Second registration step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalUserData {
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    /// Centimeters
    pub height: Option<f64>,
    pub cref: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<String>,
}

/// Partial profile update. Only the fields that are set go on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub weight: Option<f64>,
    /// Centimeters
    pub height: Option<f64>,
    pub cref: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Format a Brazilian phone number as `(DD) DDDDD-DDDD` while it is typed.
/// Non-digits are dropped and at most 11 digits are kept.
pub fn format_phone(input: &str) -> String {
    let digits: String = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(11)
        .collect();

    if digits.is_empty() {
        return digits;
    }

    let mut formatted = format!("({}", &digits[..digits.len().min(2)]);
    if digits.len() > 2 {
        formatted.push_str(&format!(") {}", &digits[2..digits.len().min(7)]));
        if digits.len() > 7 {
            formatted.push_str(&format!("-{}", &digits[7..]));
        }
    }
    formatted
}
