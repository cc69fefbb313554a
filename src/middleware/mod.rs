// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route guard middleware.

pub mod guard;

pub use guard::{guard_path, require_auth, require_role, GuardDecision};
