//! App-wide state, built once in `App` and passed to views as a prop.

use crate::auth::{self, AuthWatch};
use leptos::logging::{error, warn};
use leptos::*;
use relief_core::route::Route;
use relief_core::session::{AuthContext, Theme, AUTH_INITIAL_WAIT};

const THEME_KEY: &str = "theme";

#[derive(Clone, Copy)]
pub struct AppContext {
    pub auth: RwSignal<AuthContext>,
    pub theme: RwSignal<Theme>,
    pub route: RwSignal<Route>,
}

impl AppContext {
    pub fn start() -> Self {
        let ctx = Self {
            auth: create_rw_signal(AuthContext::new()),
            theme: create_rw_signal(load_theme()),
            route: create_rw_signal(Route::parse(&current_hash())),
        };
        ctx.watch_auth();
        ctx.watch_hash();
        ctx.watch_theme();
        ctx
    }

    pub fn navigate(&self, route: Route) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_hash(&route.href()) {
                warn!("failed to update location: {e:?}");
            }
        }
        if self.route.get_untracked() != route {
            self.route.set(route);
        }
    }

    pub fn toggle_theme(&self) {
        self.theme.update(|t| *t = t.toggled());
    }

    pub fn sign_out(&self) {
        let ctx = *self;
        wasm_bindgen_futures::spawn_local(async move {
            match auth::sign_out().await {
                Ok(()) => {
                    ctx.auth.update(|a| a.on_auth_changed(None));
                    ctx.navigate(Route::Login);
                }
                Err(e) => error!("sign out failed: {e}"),
            }
        });
    }

    fn watch_auth(&self) {
        let state = self.auth;
        match AuthWatch::start(
            move |user| state.update(|a| a.on_auth_changed(user)),
            move |e| state.update(|a| a.on_auth_error(&e)),
        ) {
            Ok(watch) => on_cleanup(move || drop(watch)),
            Err(e) => {
                warn!("{e}");
                state.update(|a| a.on_auth_error(&e));
            }
        }
        set_timeout(
            move || {
                let mut expired = false;
                state.update(|a| expired = a.initial_wait_elapsed());
                if expired {
                    warn!("auth provider did not answer in time; continuing signed out");
                }
            },
            AUTH_INITIAL_WAIT,
        );
    }

    fn watch_hash(&self) {
        let route = self.route;
        let handle = window_event_listener(ev::hashchange, move |_| {
            let next = Route::parse(&current_hash());
            if route.get_untracked() != next {
                route.set(next);
            }
        });
        on_cleanup(move || handle.remove());
    }

    fn watch_theme(&self) {
        let theme = self.theme;
        create_effect(move |_| {
            let theme = theme.get();
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(root) = document.document_element() {
                let _ = root.set_attribute("data-theme", theme.as_str());
            }
            if let Some(storage) = local_storage() {
                let _ = storage.set_item(THEME_KEY, theme.as_str());
            }
        });
    }
}

fn current_hash() -> String {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn load_theme() -> Theme {
    let saved = local_storage().and_then(|s| s.get_item(THEME_KEY).ok().flatten());
    let prefers_light = web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: light)").ok().flatten())
        .map(|m| m.matches())
        .unwrap_or(false);
    Theme::resolve(saved.as_deref(), prefers_light)
}
