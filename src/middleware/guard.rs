// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route guards: decide whether a page may render for the current state.

use crate::models::Role;
use crate::routes::{Access, Route};
use crate::services::auth::AuthState;

/// Outcome of a guard check. A denied guard always redirects, it never
/// renders partial content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth state still hydrating; render a loading indicator.
    Loading,
    Granted,
    Redirect(Route),
}

/// Guard for routes open to any authenticated user.
///
/// The second registration step is reachable with a pending registration
/// even though no user is fully authenticated yet.
pub fn require_auth(state: &AuthState, route: Route) -> GuardDecision {
    if state.loading {
        return GuardDecision::Loading;
    }

    if route == Route::CompleteRegistration && state.is_registration_pending() {
        return GuardDecision::Granted;
    }

    match state.authenticated_user() {
        Some(_) => GuardDecision::Granted,
        None => GuardDecision::Redirect(Route::Login),
    }
}

/// Guard for routes restricted to some roles.
pub fn require_role(state: &AuthState, roles: &[Role]) -> GuardDecision {
    if state.loading {
        return GuardDecision::Loading;
    }

    match state.authenticated_user() {
        None => GuardDecision::Redirect(Route::Login),
        Some(user) if !roles.contains(&user.role()) => {
            tracing::debug!(role = %user.role(), "Role not allowed, redirecting");
            GuardDecision::Redirect(Route::AccessDenied)
        }
        Some(_) => GuardDecision::Granted,
    }
}

/// Apply the policy of the route at `path`.
pub fn guard_path(state: &AuthState, path: &str) -> GuardDecision {
    let route = Route::from_path(path);
    match route.access() {
        Access::Public => GuardDecision::Granted,
        Access::Authenticated => require_auth(state, route),
        Access::Roles(roles) => require_role(state, roles),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RegisterData, User};

    fn logged_in(role: Role) -> AuthState {
        AuthState {
            user: Some(User::placeholder("u", "u@b.com", role, Some("t".into()))),
            ..AuthState::default()
        }
    }

    fn pending_registration() -> AuthState {
        let data = RegisterData::new("Ana", "ana@b.com", "secret1", "secret1", Role::Student);
        AuthState {
            user: Some(User::placeholder(&data.name, &data.email, data.role, None)),
            loading: false,
            registration: Some(data),
        }
    }

    #[test]
    fn test_loading_blocks_rendering() {
        let state = AuthState {
            loading: true,
            ..AuthState::default()
        };
        assert_eq!(guard_path(&state, "/dashboard"), GuardDecision::Loading);
        assert_eq!(guard_path(&state, "/alunos"), GuardDecision::Loading);
    }

    #[test]
    fn test_anonymous_is_redirected_to_login() {
        let state = AuthState::default();
        for path in ["/dashboard", "/agenda", "/perfil", "/treinos", "/alunos", "/progresso", "/completar-cadastro"] {
            assert_eq!(
                guard_path(&state, path),
                GuardDecision::Redirect(Route::Login),
                "{path}"
            );
        }
        assert_eq!(guard_path(&state, "/login"), GuardDecision::Granted);
        assert_eq!(guard_path(&state, "/"), GuardDecision::Granted);
    }

    #[test]
    fn test_pending_registration_only_reaches_second_step() {
        let state = pending_registration();
        assert_eq!(guard_path(&state, "/completar-cadastro"), GuardDecision::Granted);
        assert_eq!(
            guard_path(&state, "/dashboard"),
            GuardDecision::Redirect(Route::Login)
        );
        assert_eq!(
            guard_path(&state, "/progresso"),
            GuardDecision::Redirect(Route::Login)
        );
    }

    #[test]
    fn test_role_routes() {
        let trainer = logged_in(Role::Trainer);
        assert_eq!(guard_path(&trainer, "/alunos"), GuardDecision::Granted);
        assert_eq!(
            guard_path(&trainer, "/progresso"),
            GuardDecision::Redirect(Route::AccessDenied)
        );

        let student = logged_in(Role::Student);
        assert_eq!(guard_path(&student, "/progresso"), GuardDecision::Granted);
        assert_eq!(
            guard_path(&student, "/alunos"),
            GuardDecision::Redirect(Route::AccessDenied)
        );
        assert_eq!(guard_path(&student, "/dashboard"), GuardDecision::Granted);
    }

    #[test]
    fn test_require_role_with_several_roles() {
        let student = logged_in(Role::Student);
        assert_eq!(
            require_role(&student, &[Role::Trainer, Role::Student]),
            GuardDecision::Granted
        );
    }
}
