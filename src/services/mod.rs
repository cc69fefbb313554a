// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - API client, session and auth state.

pub mod api;
pub mod auth;
pub mod measurements;
pub mod notify;
pub mod session;
mod wire;

pub use api::ApiClient;
pub use auth::{AuthContext, AuthState};
pub use measurements::MeasurementLog;
pub use notify::{Notification, NotificationKind, Notifier, TracingNotifier};
pub use session::{FileStorage, MemoryStorage, SessionStore, Storage, TOKEN_KEY, USER_KEY};
