use crate::context::AppContext;
use crate::views::login::Login;
use crate::views::shell::Shell;
use leptos::*;
use relief_core::route::Route;

#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::start();

    view! {
        {move || match ctx.route.get() {
            Route::Login => view! { <Login ctx=ctx/> }.into_view(),
            route => view! { <Shell ctx=ctx route=route/> }.into_view(),
        }}
    }
}
