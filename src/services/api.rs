// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FitPulse backend API client.
//!
//! Handles:
//! - Login and account creation, with response shape normalization
//! - Profile retrieval and partial updates (units and role vocabulary mapped
//!   at this boundary)
//! - Avatar upload (multipart)
//! - Objective listing, creation and linking
//!
//! No caching, retries or timeouts: every call is one request.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Objective, ProfileUpdate, RegisterData, Role, User};
use crate::services::wire::{
    self, CreateObjectiveRequest, CreateTrainerRequest, CreateUserRequest, LinkObjectivesRequest,
    UpdateUserRequest,
};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

/// FitPulse API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the backend named in `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Authenticate with email and password.
    ///
    /// When the backend answers with only a token, the returned user is a
    /// placeholder (see [`User::is_placeholder`]) with the student role.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let request = self.http.post(self.url("/user/login")).json(&body);
        let text = self.send(request, "Falha ao realizar login").await?;

        let user = wire::decode_auth_response(&text, email, Role::Student)?;
        tracing::info!(
            email = %email,
            placeholder = user.is_placeholder(),
            "Login succeeded"
        );
        Ok(user)
    }

    /// Create an account.
    ///
    /// Weight and height are checked against the backend bounds before
    /// anything is sent; height goes over the wire in meters.
    pub async fn register(&self, data: &RegisterData) -> Result<User, AppError> {
        let payload = CreateUserRequest::from_register_data(data)?;

        let request = self.http.post(self.url("/user/create")).json(&payload);
        let text = self.send(request, "Falha ao realizar cadastro").await?;

        let mut user = wire::decode_auth_response(&text, &data.email, data.role)?;
        if user.is_placeholder() {
            user.name = data.name.clone();
        }
        tracing::info!(email = %data.email, role = %data.role, "Account created");
        Ok(user)
    }

    /// Fetch the profile of the user owning `token`.
    pub async fn get_user_profile(&self, token: &str) -> Result<User, AppError> {
        let request = self.http.get(self.url("/user/list")).bearer_auth(token);
        let text = self.send(request, "Falha ao carregar perfil").await?;

        wire::decode_profile(&text)?.into_user(Some(token.to_string()))
    }

    /// Send a partial profile update, then re-fetch the canonical profile.
    /// The update response body is not trusted.
    pub async fn update_user_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<User, AppError> {
        let payload = UpdateUserRequest::from_update(update)?;

        let request = self
            .http
            .put(self.url("/user/update"))
            .bearer_auth(token)
            .json(&payload);
        self.send(request, "Falha ao atualizar perfil").await?;

        tracing::debug!("Profile updated, re-fetching");
        self.get_user_profile(token).await
    }

    /// Upload an avatar image. Returns the avatar URL, or the confirmation
    /// text when the backend does not echo a URL.
    pub async fn upload_avatar(
        &self,
        token: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        if bytes.is_empty() {
            return Err(AppError::Validation("Arquivo de imagem vazio".to_string()));
        }

        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(image_mime(file_name))
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let form = Form::new().part("file", part);

        let request = self
            .http
            .put(self.url("/user/upload"))
            .bearer_auth(token)
            .multipart(form);
        let text = self.send(request, "Falha ao enviar avatar").await?;

        tracing::info!(file = %file_name, size, "Avatar uploaded");
        wire::decode_avatar_response(&text)
    }

    /// Create a named objective. When the backend only confirms, the new
    /// objective is looked up by name.
    pub async fn create_objective(&self, token: &str, name: &str) -> Result<Objective, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Nome do objetivo é obrigatório".to_string(),
            ));
        }

        let request = self
            .http
            .post(self.url("/user/objective/create"))
            .bearer_auth(token)
            .json(&CreateObjectiveRequest { nome: name });
        let text = self.send(request, "Falha ao criar objetivo").await?;

        let objective = match serde_json::from_str::<Objective>(&text) {
            Ok(objective) => objective,
            Err(_) => {
                // Empty body or a confirmation message: the objective exists,
                // find it in the full list.
                tracing::debug!(name = %name, "Create answer has no objective, re-listing");
                self.get_all_objectives(token)
                    .await?
                    .into_iter()
                    .rev()
                    .find(|o| o.name.trim() == name)
                    .ok_or_else(|| {
                        AppError::UnexpectedResponse(format!(
                            "objective '{}' missing after creation",
                            name
                        ))
                    })?
            }
        };
        tracing::info!(id = objective.id, name = %objective.name, "Objective created");
        Ok(objective)
    }

    /// Link existing objectives to the current user.
    pub async fn link_objectives_to_user(
        &self,
        token: &str,
        objective_ids: &[i64],
    ) -> Result<(), AppError> {
        if objective_ids.is_empty() {
            return Err(AppError::Validation(
                "Selecione ao menos um objetivo".to_string(),
            ));
        }

        let request = self
            .http
            .post(self.url("/user/objective/link"))
            .bearer_auth(token)
            .json(&LinkObjectivesRequest { objective_ids });
        self.send(request, "Falha ao vincular objetivos").await?;

        tracing::info!(count = objective_ids.len(), "Objectives linked");
        Ok(())
    }

    /// List every objective known to the backend.
    pub async fn get_all_objectives(&self, token: &str) -> Result<Vec<Objective>, AppError> {
        self.get_json("/user/objective/list/all", token, "Falha ao carregar objetivos")
            .await
    }

    /// List the objectives linked to the current user.
    pub async fn get_user_objectives(&self, token: &str) -> Result<Vec<Objective>, AppError> {
        self.get_json(
            "/user/objective/list/byUser",
            token,
            "Falha ao carregar objetivos do usuário",
        )
        .await
    }

    /// Submit trainer professional fields, for backends that keep them
    /// outside the user record.
    pub async fn create_trainer_profile(&self, token: &str, cref: &str) -> Result<(), AppError> {
        let request = self
            .http
            .post(self.url("/trainer/create"))
            .bearer_auth(token)
            .json(&CreateTrainerRequest { cref });
        self.send(request, "Falha ao cadastrar dados profissionais")
            .await?;

        tracing::info!("Trainer profile created");
        Ok(())
    }

    /// Generic authenticated GET with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        token: &str,
        default_error: &str,
    ) -> Result<T, AppError> {
        let request = self.http.get(self.url(path)).bearer_auth(token);
        let text = self.send(request, default_error).await?;
        decode_json(&text)
    }

    /// Send a request and return the body text of a successful response.
    /// Non-success statuses become `AppError::Http` carrying the server's
    /// message, or `default_error` when there is none.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        default_error: &str,
    ) -> Result<String, AppError> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = wire::extract_error_message(&body, default_error);
            tracing::warn!(status = status.as_u16(), error = %message, "Backend request failed");
            return Err(AppError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

fn decode_json<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T, AppError> {
    serde_json::from_str(text)
        .map_err(|e| AppError::UnexpectedResponse(format!("JSON parse error: {}", e)))
}

/// Content type for an avatar upload, from the file extension.
fn image_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime("me.PNG"), "image/png");
        assert_eq!(image_mime("me.jpeg"), "image/jpeg");
        assert_eq!(image_mime("noext"), "application/octet-stream");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new(&Config::test_default().with_api_base_url("http://x:1/"));
        assert_eq!(client.base_url(), "http://x:1");
        assert_eq!(client.url("/user/login"), "http://x:1/user/login");
    }
}
