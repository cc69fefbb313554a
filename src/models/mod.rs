// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the client.

pub mod measurement;
pub mod objective;
pub mod registration;
pub mod user;

pub use measurement::MeasurementRecord;
pub use objective::Objective;
pub use registration::{AdditionalUserData, ProfileUpdate, RegisterData};
pub use user::{Role, RoleProfile, StudentProfile, TrainerProfile, User};
