use crate::auth;
use crate::context::AppContext;
use leptos::logging::error;
use leptos::*;
use relief_core::route::Route;
use wasm_bindgen_futures::spawn_local;

#[component]
pub fn Login(ctx: AppContext) -> impl IntoView {
    let failure = create_rw_signal(None::<String>);
    let busy = create_rw_signal(false);

    // Already signed in: nothing to do here.
    create_effect(move |_| {
        if ctx.auth.with(|a| a.current_user().is_some()) {
            ctx.navigate(Route::Dashboard);
        }
    });

    let sign_in = move |_| {
        busy.set(true);
        failure.set(None);
        spawn_local(async move {
            match auth::sign_in().await {
                Ok(user) => {
                    ctx.auth.update(|a| a.on_auth_changed(Some(user)));
                    ctx.navigate(Route::Dashboard);
                }
                Err(e) => {
                    error!("sign in failed: {e}");
                    failure.set(Some("Sign in failed. Please try again.".into()));
                }
            }
            busy.set(false);
        });
    };

    view! {
        <div class="login-page">
            <div class="login-grid"></div>
            {move || {
                if ctx.auth.with(|a| a.is_loading()) {
                    return view! { <div class="loading"><div class="loading-spinner"></div></div> }
                        .into_view();
                }
                view! {
                    <div class="login-card">
                        <h1 class="login-title">"Disaster Relief Map"</h1>
                        <p class="login-subtitle">
                            "Track, report and coordinate relief efforts in real time"
                        </p>
                        <button class="btn btn-google" disabled=move || busy.get() on:click=sign_in>
                            "Sign in with Google"
                        </button>
                        {move || failure.get().map(|msg| view! { <div class="form-error">{msg}</div> })}
                        <div class="login-divider"><span>"or"</span></div>
                        <button class="btn btn-primary" on:click=move |_| ctx.navigate(Route::Dashboard)>
                            "Continue as guest"
                        </button>
                    </div>
                }
                .into_view()
            }}
        </div>
    }
}
