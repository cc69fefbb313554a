// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend wire formats and one decoder per endpoint.
//!
//! The backend went through several response shapes over time (token only,
//! `{user, token}`, flat user object). Each decoder lists the shapes it
//! accepts and rejects everything else with `UnexpectedResponse`.

use crate::error::AppError;
use crate::models::registration::{ProfileUpdate, RegisterData, DEFAULT_STATUS};
use crate::models::user::{email_local_part, Role, RoleProfile, StudentProfile, TrainerProfile, User};
use crate::units;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest body excerpt quoted in error messages.
const BODY_EXCERPT_LEN: usize = 200;

/// Backend ids arrive as numbers or strings depending on the endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(i64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

/// User record as the backend sends it (height in meters, backend roles).
#[derive(Debug, Deserialize)]
pub(crate) struct BackendUser {
    id: WireId,
    #[serde(default)]
    name: Option<String>,
    email: String,
    role: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default, alias = "dateOfBirth")]
    date_of_birth: Option<String>,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    cref: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default, alias = "createdAt")]
    created_at: Option<String>,
}

impl BackendUser {
    /// Convert to the client model. `token` wins over a token embedded in
    /// the user object.
    pub(crate) fn into_user(self, token: Option<String>) -> Result<User, AppError> {
        let role = Role::from_backend(&self.role).ok_or_else(|| {
            AppError::UnexpectedResponse(format!("unknown role '{}'", self.role))
        })?;

        let profile = match role {
            Role::Trainer => RoleProfile::Trainer(TrainerProfile { cref: self.cref }),
            Role::Student => RoleProfile::Student(StudentProfile {
                weight_kg: self.weight,
                height_cm: self.height.map(units::m_to_cm),
            }),
        };

        let date_of_birth = self
            .date_of_birth
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(parse_date)
            .transpose()?;

        let created_at = self
            .created_at
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(parse_timestamp)
            .transpose()?;

        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email_local_part(&self.email).to_string());

        Ok(User {
            id: self.id.into_string(),
            name,
            email: self.email,
            username: self.username,
            phone: self.phone,
            gender: self.gender,
            date_of_birth,
            avatar: self.avatar,
            status: self.status,
            token: token.or(self.token),
            created_at,
            profile,
        })
    }
}

/// Dates come as `YYYY-MM-DD` or as a full timestamp.
fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| AppError::UnexpectedResponse(format!("invalid date '{}'", raw)))
}

/// RFC 3339, or a zone-less local timestamp taken as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| AppError::UnexpectedResponse(format!("invalid timestamp '{}'", raw)))
}

/// Accepted answers to `POST /user/login` and `POST /user/create`.
/// Variant order matters: a flat user must win over a bare token field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthPayload {
    Nested {
        user: BackendUser,
        #[serde(default, alias = "login", alias = "access_token")]
        token: Option<String>,
    },
    Flat(BackendUser),
    TokenOnly(TokenAnswer),
    Bare(String),
}

/// `{"login": "<token>"}` and its aliases, with nothing else in the object.
/// A malformed user record next to a token must not pass as a token answer.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenAnswer {
    #[serde(alias = "token", alias = "access_token")]
    login: String,
}

/// Decode a login or registration answer. A bare token yields a placeholder
/// user for `email` with `role`.
pub(crate) fn decode_auth_response(body: &str, email: &str, role: Role) -> Result<User, AppError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(AppError::UnexpectedResponse("empty response body".to_string()));
    }

    let value = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value,
        // Plain-text token
        Err(_) if body.split_whitespace().count() == 1 => {
            return placeholder_for_token(body.to_string(), email, role)
        }
        Err(_) => return Err(unrecognized(body)),
    };

    if value.get("user").is_some() {
        let (user, token) = match serde_json::from_value::<AuthPayload>(value) {
            Ok(AuthPayload::Nested { user, token }) => (user, token),
            Ok(_) => return Err(unrecognized(body)),
            Err(e) => {
                return Err(AppError::UnexpectedResponse(format!(
                    "malformed user record: {}",
                    e
                )))
            }
        };
        return user.into_user(token);
    }

    match serde_json::from_value::<AuthPayload>(value) {
        Ok(AuthPayload::Nested { user, token }) => user.into_user(token),
        Ok(AuthPayload::Flat(user)) => user.into_user(None),
        Ok(AuthPayload::TokenOnly(TokenAnswer { login: token })) | Ok(AuthPayload::Bare(token)) => {
            placeholder_for_token(token, email, role)
        }
        Err(_) => Err(unrecognized(body)),
    }
}

fn placeholder_for_token(token: String, email: &str, role: Role) -> Result<User, AppError> {
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(AppError::UnexpectedResponse("empty token".to_string()));
    }
    Ok(User::placeholder(
        email_local_part(email),
        email,
        role,
        Some(token),
    ))
}

/// Accepted answers to `GET /user/list`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfilePayload {
    Wrapped { user: BackendUser },
    Single(BackendUser),
    List(Vec<BackendUser>),
}

/// Decode the profile of the authenticated user.
pub(crate) fn decode_profile(body: &str) -> Result<BackendUser, AppError> {
    match serde_json::from_str::<ProfilePayload>(body.trim()) {
        Ok(ProfilePayload::Wrapped { user }) | Ok(ProfilePayload::Single(user)) => Ok(user),
        Ok(ProfilePayload::List(users)) => users
            .into_iter()
            .next()
            .ok_or_else(|| AppError::UnexpectedResponse("empty profile list".to_string())),
        Err(_) => Err(unrecognized(body)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AvatarPayload {
    Object {
        #[serde(alias = "avatar", alias = "avatarUrl", alias = "message")]
        url: String,
    },
    Bare(String),
}

/// Decode `PUT /user/upload`: an avatar URL or a confirmation string.
pub(crate) fn decode_avatar_response(body: &str) -> Result<String, AppError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(AppError::UnexpectedResponse("empty response body".to_string()));
    }
    match serde_json::from_str::<AvatarPayload>(body) {
        Ok(AvatarPayload::Object { url }) | Ok(AvatarPayload::Bare(url)) => Ok(url),
        Err(_) if serde_json::from_str::<serde_json::Value>(body).is_err() => Ok(body.to_string()),
        Err(_) => Err(unrecognized(body)),
    }
}

/// Pull a human-readable message out of an error body: JSON `message`,
/// then JSON `error`, then the raw text, then `default`.
pub(crate) fn extract_error_message(body: &str, default: &str) -> String {
    let body = body.trim();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let from_json = match &value {
            serde_json::Value::Object(map) => ["message", "error"]
                .iter()
                .find_map(|k| map.get(*k).and_then(|v| v.as_str()))
                .map(str::to_string),
            serde_json::Value::String(s) => Some(s.clone()),
            _ => None,
        };
        return from_json
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default.to_string());
    }
    if body.is_empty() {
        default.to_string()
    } else {
        body.to_string()
    }
}

fn unrecognized(body: &str) -> AppError {
    let excerpt: String = body.chars().take(BODY_EXCERPT_LEN).collect();
    AppError::UnexpectedResponse(format!("unrecognized payload: {}", excerpt))
}

/// `POST /user/create` body.
#[derive(Debug, Serialize)]
pub(crate) struct CreateUserRequest<'a> {
    name: &'a str,
    email: &'a str,
    username: String,
    password: &'a str,
    confirm_password: &'a str,
    role: &'static str,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
    /// Meters
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cref: Option<&'a str>,
}

impl<'a> CreateUserRequest<'a> {
    /// Build the wire body, checking weight and height bounds first.
    pub(crate) fn from_register_data(data: &'a RegisterData) -> Result<Self, AppError> {
        let weight = data.weight.map(units::validate_weight).transpose()?;
        let height = data.height.map(units::height_for_wire).transpose()?;

        Ok(Self {
            name: &data.name,
            email: &data.email,
            username: data
                .username
                .clone()
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| email_local_part(&data.email).to_string()),
            password: &data.password,
            confirm_password: &data.confirm_password,
            role: data.role.backend_name(),
            status: data.status.as_deref().unwrap_or(DEFAULT_STATUS),
            phone: data.phone.as_deref(),
            date_of_birth: data.date_of_birth,
            gender: data.gender.as_deref(),
            weight,
            height,
            cref: data.cref.as_deref(),
        })
    }
}

/// `PUT /user/update` body. Absent fields are left untouched by the backend.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateUserRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
    /// Meters
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cref: Option<&'a str>,
}

impl<'a> UpdateUserRequest<'a> {
    pub(crate) fn from_update(update: &'a ProfileUpdate) -> Result<Self, AppError> {
        Ok(Self {
            name: update.name.as_deref(),
            phone: update.phone.as_deref(),
            gender: update.gender.as_deref(),
            date_of_birth: update.date_of_birth,
            weight: update.weight.map(units::validate_weight).transpose()?,
            height: update.height.map(units::height_for_wire).transpose()?,
            cref: update.cref.as_deref(),
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateObjectiveRequest<'a> {
    pub nome: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LinkObjectivesRequest<'a> {
    pub objective_ids: &'a [i64],
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateTrainerRequest<'a> {
    pub cref: &'a str,
}
