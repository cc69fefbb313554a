// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model shared by the API client, session store and guards.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Account role. Fixed at account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Role {
    Trainer,
    Student,
}

impl Role {
    /// Client-side vocabulary.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Trainer => "trainer",
            Role::Student => "student",
        }
    }

    /// Vocabulary the backend uses for this role.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Role::Trainer => "personal",
            Role::Student => "student",
        }
    }

    /// Parse a backend role name. `trainer` is accepted alongside `personal`.
    pub fn from_backend(name: &str) -> Option<Role> {
        match name.trim().to_ascii_lowercase().as_str() {
            "personal" | "trainer" => Some(Role::Trainer),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Professional fields of a trainer account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TrainerProfile {
    /// CREF registration number
    pub cref: Option<String>,
}

/// Body fields of a student account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StudentProfile {
    pub weight_kg: Option<f64>,
    /// Height in centimeters (client units)
    pub height_cm: Option<f64>,
}

/// Role-specific part of a user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum RoleProfile {
    Trainer(TrainerProfile),
    Student(StudentProfile),
}

impl RoleProfile {
    /// Empty profile for a role.
    pub fn empty(role: Role) -> Self {
        match role {
            Role::Trainer => RoleProfile::Trainer(TrainerProfile::default()),
            Role::Student => RoleProfile::Student(StudentProfile::default()),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Trainer(_) => Role::Trainer,
            RoleProfile::Student(_) => Role::Student,
        }
    }
}

/// Authenticated user, as held in memory and persisted under `fitpulse-user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct User {
    /// Backend id; empty for placeholder users
    pub id: String,
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar: Option<String>,
    pub status: Option<String>,
    /// Bearer token for the backend
    pub token: Option<String>,
    /// Account creation time, when the backend reports it
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub profile: RoleProfile,
}

impl User {
    /// Placeholder for a session whose full profile is not known yet: a bare
    /// token login, or the second registration step.
    pub fn placeholder(name: &str, email: &str, role: Role, token: Option<String>) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            email: email.to_string(),
            username: None,
            phone: None,
            gender: None,
            date_of_birth: None,
            avatar: None,
            status: None,
            token,
            created_at: None,
            profile: RoleProfile::empty(role),
        }
    }

    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_empty()
    }

    pub fn trainer_profile(&self) -> Option<&TrainerProfile> {
        match &self.profile {
            RoleProfile::Trainer(p) => Some(p),
            RoleProfile::Student(_) => None,
        }
    }

    pub fn student_profile(&self) -> Option<&StudentProfile> {
        match &self.profile {
            RoleProfile::Student(p) => Some(p),
            RoleProfile::Trainer(_) => None,
        }
    }
}

/// Local part of an email address, used when the backend gives no name.
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
