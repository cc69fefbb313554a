// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side route table and the access policy of each route.

use crate::models::Role;

/// Pages of the FitPulse web client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    CompleteRegistration,
    Dashboard,
    Schedule,
    Profile,
    Students,
    Progress,
    Workouts,
    AccessDenied,
    NotFound,
}

/// Who may render a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Any authenticated user
    Authenticated,
    /// Authenticated users with one of these roles
    Roles(&'static [Role]),
}

const ALL_ROUTES: [Route; 11] = [
    Route::Home,
    Route::Login,
    Route::Register,
    Route::CompleteRegistration,
    Route::Dashboard,
    Route::Schedule,
    Route::Profile,
    Route::Students,
    Route::Progress,
    Route::Workouts,
    Route::AccessDenied,
];

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/cadastro",
            Route::CompleteRegistration => "/completar-cadastro",
            Route::Dashboard => "/dashboard",
            Route::Schedule => "/agenda",
            Route::Profile => "/perfil",
            Route::Students => "/alunos",
            Route::Progress => "/progresso",
            Route::Workouts => "/treinos",
            Route::AccessDenied => "/acesso-negado",
            Route::NotFound => "*",
        }
    }

    /// Look up a path. Query strings, fragments and a trailing slash are
    /// ignored; unknown paths map to `NotFound`.
    pub fn from_path(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        ALL_ROUTES
            .iter()
            .copied()
            .find(|r| r.path() == path)
            .unwrap_or(Route::NotFound)
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Home
            | Route::Login
            | Route::Register
            | Route::AccessDenied
            | Route::NotFound => Access::Public,
            Route::CompleteRegistration
            | Route::Dashboard
            | Route::Schedule
            | Route::Profile
            | Route::Workouts => Access::Authenticated,
            Route::Students => Access::Roles(&[Role::Trainer]),
            Route::Progress => Access::Roles(&[Role::Student]),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
