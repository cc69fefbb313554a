// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth context: who is logged in, and whether a registration is pending.
//!
//! State is published on a `watch` channel so views can re-render on
//! change. Network-bound operations hold an operation lock for their whole
//! duration; an overlapping call fails with [`AppError::Busy`] instead of
//! racing the first one.
//!
//! Logout does not wait for the lock. It bumps the session generation
//! instead, and an operation that started under an older generation
//! discards its result with [`AppError::SessionEnded`].

use crate::config::Config;
use crate::error::AppError;
use crate::models::{AdditionalUserData, ProfileUpdate, RegisterData, Role, User};
use crate::services::api::ApiClient;
use crate::services::notify::{Notification, Notifier, TracingNotifier};
use crate::services::session::{FileStorage, SessionStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, MutexGuard};
use validator::Validate;

/// Snapshot of the auth state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    /// Current user. During a pending registration this is the placeholder
    /// driving the second step.
    pub user: Option<User>,
    /// True while an auth operation is in flight, and during hydration.
    pub loading: bool,
    /// First-step data of a registration not yet submitted.
    pub registration: Option<RegisterData>,
}

impl AuthState {
    /// The user, unless it is only the placeholder of a pending
    /// registration.
    pub fn authenticated_user(&self) -> Option<&User> {
        match self.registration {
            Some(_) => None,
            None => self.user.as_ref(),
        }
    }

    pub fn is_registration_pending(&self) -> bool {
        self.registration.is_some()
    }
}

/// Process-wide auth context.
pub struct AuthContext {
    api: ApiClient,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
    trainer_endpoint: bool,
    state: watch::Sender<AuthState>,
    op_lock: Mutex<()>,
    /// Bumped whenever the session ends; only changed under the state lock.
    generation: AtomicU64,
}

impl AuthContext {
    /// Create the context and hydrate it from persisted storage.
    pub fn new(api: ApiClient, session: SessionStore, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(AuthState {
            loading: true,
            ..AuthState::default()
        });

        let ctx = Self {
            api,
            session,
            notifier,
            trainer_endpoint: false,
            state,
            op_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        };
        ctx.hydrate();
        ctx
    }

    /// Build a context from configuration: file-backed session, tracing
    /// notifications.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let storage = FileStorage::open(&config.storage_dir)?;
        let ctx = Self::new(
            ApiClient::new(config),
            SessionStore::new(Arc::new(storage)),
            Arc::new(TracingNotifier),
        )
        .with_trainer_endpoint(config.trainer_endpoint);
        Ok(ctx)
    }

    /// Post trainer CREF to `/trainer/create` after account creation.
    pub fn with_trainer_endpoint(mut self, enabled: bool) -> Self {
        self.trainer_endpoint = enabled;
        self
    }

    fn hydrate(&self) {
        let user = self.session.load_user();
        if let Some(user) = &user {
            tracing::debug!(email = %user.email, role = %user.role(), "Restored session");
        }
        self.state.send_modify(|s| {
            s.user = user;
            s.loading = false;
        });
    }

    /// Current state.
    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// The API client, for views that call it directly.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Bearer token of the authenticated user.
    pub fn token(&self) -> Option<String> {
        self.state.borrow().authenticated_user()?.token.clone()
    }

    fn begin(&self) -> Result<MutexGuard<'_, ()>, AppError> {
        self.op_lock.try_lock().map_err(|_| {
            tracing::warn!("Auth operation rejected: another one is in flight");
            AppError::Busy
        })
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn set_loading(&self, loading: bool) {
        self.state.send_modify(|s| s.loading = loading);
    }

    /// Log in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let _guard = self.begin()?;
        let generation = self.generation();
        self.set_loading(true);

        let result = self.login_inner(email, password, generation).await;

        self.set_loading(false);
        match &result {
            Ok(user) => self.notifier.notify(Notification::success(
                "Login realizado com sucesso",
                format!("Bem-vindo(a) de volta, {}!", user.name),
            )),
            Err(AppError::SessionEnded) => {
                tracing::info!(email = %email, "Logged out while logging in, login discarded");
            }
            Err(e) => {
                tracing::error!(email = %email, error = %e, "Login failed");
                self.notifier
                    .notify(Notification::error("Erro ao realizar login", e.to_string()));
            }
        }
        result
    }

    async fn login_inner(
        &self,
        email: &str,
        password: &str,
        generation: u64,
    ) -> Result<User, AppError> {
        let user = self.api.login(email, password).await?;
        let user = self.refine_placeholder(user).await;
        self.establish(user, generation)
    }

    /// Start a registration. Nothing is sent yet: the data is kept until
    /// [`complete_registration`](Self::complete_registration) and a
    /// placeholder user drives the second step.
    pub fn register(&self, data: RegisterData) -> Result<(), AppError> {
        let _guard = self.begin()?;

        if let Err(errors) = data.validate() {
            let err = AppError::from(errors);
            self.notifier
                .notify(Notification::error("Erro ao realizar cadastro", err.to_string()));
            return Err(err);
        }

        let placeholder = User::placeholder(&data.name, &data.email, data.role, None);
        tracing::info!(email = %data.email, role = %data.role, "Registration started");
        self.state.send_modify(|s| {
            s.user = Some(placeholder);
            s.registration = Some(data);
        });
        Ok(())
    }

    /// Drop a pending registration. A submission still in flight will not
    /// establish its account as the session.
    pub fn cancel_registration(&self) {
        self.state.send_modify(|s| {
            if s.registration.take().is_some() {
                self.generation.fetch_add(1, Ordering::SeqCst);
                s.user = None;
            }
        });
    }

    /// Submit the pending registration merged with `additional`.
    ///
    /// Returns `Ok(true)` once the account exists and the session holds the
    /// real user. If the account could not be created the registration stays
    /// pending so the form can be resubmitted. Once it exists the registration
    /// is over: a failed trainer follow-up is only reported.
    pub async fn complete_registration(
        &self,
        additional: AdditionalUserData,
    ) -> Result<bool, AppError> {
        let _guard = self.begin()?;
        let generation = self.generation();
        let pending = self
            .state
            .borrow()
            .registration
            .clone()
            .ok_or(AppError::NoPendingRegistration)?;

        self.set_loading(true);
        let result = self
            .complete_registration_inner(pending.merge(additional), generation)
            .await;
        self.set_loading(false);

        match result {
            Ok(user) => {
                self.notifier.notify(Notification::success(
                    "Cadastro realizado com sucesso",
                    format!("Bem-vindo(a) ao Fit Pulse, {}!", user.name),
                ));
                Ok(true)
            }
            Err(AppError::SessionEnded) => {
                tracing::info!("Registration cancelled while submitting");
                Err(AppError::SessionEnded)
            }
            Err(e) => {
                tracing::error!(error = %e, "Registration failed");
                self.notifier
                    .notify(Notification::error("Erro ao realizar cadastro", e.to_string()));
                Err(e)
            }
        }
    }

    async fn complete_registration_inner(
        &self,
        data: RegisterData,
        generation: u64,
    ) -> Result<User, AppError> {
        data.check_role_fields()?;

        let user = self.api.register(&data).await?;
        let user = self.refine_placeholder(user).await;
        let user = self.establish(user, generation)?;

        if self.trainer_endpoint && data.role == Role::Trainer {
            self.submit_trainer_profile(&user, data.cref.as_deref()).await;
        }
        Ok(user)
    }

    /// Post trainer fields for an account that already exists. Failure is
    /// reported but does not undo the registration.
    async fn submit_trainer_profile(&self, user: &User, cref: Option<&str>) {
        let (Some(token), Some(cref)) = (user.token.as_deref(), cref) else {
            tracing::warn!("No token after account creation, trainer fields not submitted");
            return;
        };

        if let Err(e) = self.api.create_trainer_profile(token, cref).await {
            tracing::warn!(error = %e, "Account created but trainer profile not saved");
            self.notifier.notify(Notification::error(
                "Dados profissionais não salvos",
                format!("Sua conta foi criada, mas o CREF não foi registrado: {}", e),
            ));
        }
    }

    /// Clear the session in memory and in storage. Operations still in
    /// flight will not restore it.
    pub fn logout(&self) -> Result<(), AppError> {
        let mut cleared: Result<(), AppError> = Ok(());
        self.state.send_modify(|s| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            s.user = None;
            s.registration = None;
            cleared = self.session.clear();
        });
        cleared?;

        tracing::info!("Logged out");
        self.notifier
            .notify(Notification::success("Logout realizado", "Até a próxima!"));
        Ok(())
    }

    /// Update profile fields of the authenticated user.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, AppError> {
        let _guard = self.begin()?;
        let generation = self.generation();
        let token = self.token().ok_or(AppError::Unauthenticated)?;

        match self.api.update_user_profile(&token, update).await {
            Ok(user) => {
                let user = self.establish(user, generation)?;
                self.notifier.notify(Notification::success(
                    "Perfil atualizado",
                    "Suas informações foram salvas.",
                ));
                Ok(user)
            }
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Erro ao atualizar perfil", e.to_string()));
                Err(e)
            }
        }
    }

    /// Upload a new avatar for the authenticated user. When the backend
    /// answers with a URL it is stored on the user.
    pub async fn upload_avatar(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, AppError> {
        let _guard = self.begin()?;
        let generation = self.generation();
        let token = self.token().ok_or(AppError::Unauthenticated)?;

        let answer = match self.api.upload_avatar(&token, file_name, bytes).await {
            Ok(answer) => answer,
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Erro ao enviar foto", e.to_string()));
                return Err(e);
            }
        };

        if answer.starts_with("http://") || answer.starts_with("https://") || answer.starts_with('/') {
            let user = self.state.borrow().user.clone();
            if let Some(mut user) = user {
                user.avatar = Some(answer.clone());
                self.establish(user, generation)?;
            }
        }
        self.notifier
            .notify(Notification::success("Foto atualizada", "Sua foto de perfil foi alterada."));
        Ok(answer)
    }

    /// A bare-token login only yields a placeholder. Fetch the real profile;
    /// if that fails keep the placeholder.
    async fn refine_placeholder(&self, user: User) -> User {
        let token = match (&user.token, user.is_placeholder()) {
            (Some(token), true) => token.clone(),
            _ => return user,
        };

        match self.api.get_user_profile(&token).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "Could not fetch profile, keeping placeholder user");
                user
            }
        }
    }

    /// Make `user` the current user: persist it, publish it, and drop any
    /// pending registration. Fails with `SessionEnded` when the session
    /// generation moved past `generation`. A storage failure leaves the
    /// session in memory only.
    fn establish(&self, user: User, generation: u64) -> Result<User, AppError> {
        let mut committed = false;
        self.state.send_if_modified(|s| {
            if self.generation() != generation {
                return false;
            }
            if let Err(e) = self.session.persist(&user) {
                tracing::error!(error = %e, "Failed to persist session, keeping it in memory only");
            }
            s.user = Some(user.clone());
            s.registration = None;
            committed = true;
            true
        });

        if committed {
            Ok(user)
        } else {
            Err(AppError::SessionEnded)
        }
    }
}
