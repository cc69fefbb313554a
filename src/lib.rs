// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! FitPulse client core: connects personal trainers and students
//!
//! This crate provides the typed client for the FitPulse backend, the
//! persisted session, the auth context behind login and two-step
//! registration, and the route guards of the web client.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod units;

pub use config::Config;
pub use error::{AppError, Result};
pub use services::{ApiClient, AuthContext, AuthState};
