//! Auth and theme state, constructed once at startup and handed to views.

use crate::route::Route;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// After this long without an auth callback the user is treated as signed out.
pub const AUTH_INITIAL_WAIT: Duration = Duration::from_secs(3);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl UserIdentity {
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Loading,
    SignedIn(UserIdentity),
    SignedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteAccess {
    Pending,
    Allow,
    RedirectToLogin,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthContext {
    state: AuthState,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&UserIdentity> {
        match &self.state {
            AuthState::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == AuthState::Loading
    }

    pub fn on_auth_changed(&mut self, user: Option<UserIdentity>) {
        self.state = match user {
            Some(user) => AuthState::SignedIn(user),
            None => AuthState::SignedOut,
        };
    }

    /// Provider failures never take the app down; the user just stays out.
    pub fn on_auth_error(&mut self, message: &str) {
        tracing::warn!(error = message, "auth provider error");
        if !matches!(self.state, AuthState::SignedIn(_)) {
            self.state = AuthState::SignedOut;
        }
    }

    /// Returns true if the wait expired while still loading.
    pub fn initial_wait_elapsed(&mut self) -> bool {
        if self.is_loading() {
            self.state = AuthState::SignedOut;
            true
        } else {
            false
        }
    }

    pub fn guard(&self, route: &Route) -> RouteAccess {
        if !route.requires_auth() {
            return RouteAccess::Allow;
        }
        match self.state {
            AuthState::Loading => RouteAccess::Pending,
            AuthState::SignedIn(_) => RouteAccess::Allow,
            AuthState::SignedOut => RouteAccess::RedirectToLogin,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// A persisted choice wins; otherwise follow the system preference.
    pub fn resolve(saved: Option<&str>, prefers_light: bool) -> Self {
        match saved {
            Some("light") => Theme::Light,
            Some("dark") => Theme::Dark,
            _ if prefers_light => Theme::Light,
            _ => Theme::Dark,
        }
    }
}
