use super::admin::AdminPanel;
use super::alerts::Alerts;
use super::dashboard::Dashboard;
use super::link;
use super::map_view::MapView;
use super::report_form::ReportForm;
use crate::context::AppContext;
use leptos::*;
use relief_core::route::Route;
use relief_core::session::Theme;

fn nav_items() -> [Route; 5] {
    [
        Route::Dashboard,
        Route::Map,
        Route::Report {
            lat: None,
            lng: None,
        },
        Route::Alerts,
        Route::Admin,
    ]
}

fn page(ctx: AppContext, route: Route) -> View {
    match route {
        Route::Dashboard => view! { <Dashboard ctx=ctx/> }.into_view(),
        Route::Map => view! { <MapView ctx=ctx/> }.into_view(),
        Route::Report { lat, lng } => view! { <ReportForm lat=lat lng=lng/> }.into_view(),
        Route::Alerts => view! { <Alerts/> }.into_view(),
        Route::Admin => view! { <AdminPanel ctx=ctx/> }.into_view(),
        Route::Login => ().into_view(),
    }
}

/// Sidebar, header and the page for `route`.
#[component]
pub fn Shell(ctx: AppContext, route: Route) -> impl IntoView {
    let title = route.title();
    let current = route.clone();
    let nav = nav_items()
        .into_iter()
        .map(|item| {
            let active = std::mem::discriminant(&item) == std::mem::discriminant(&current);
            view! {
                <a href=link(&item) class="nav-item" class:active=active>
                    {item.title()}
                </a>
            }
        })
        .collect_view();

    let account = move || match ctx.auth.with(|a| a.current_user().cloned()) {
        Some(user) => view! {
            <span class="user-name">{user.label().to_string()}</span>
            <button class="btn btn-secondary" on:click=move |_| ctx.sign_out()>
                "Sign out"
            </button>
        }
        .into_view(),
        None => view! {
            <button class="btn btn-secondary" on:click=move |_| ctx.navigate(Route::Login)>
                "Sign in"
            </button>
        }
        .into_view(),
    };

    view! {
        <div class="app-layout">
            <aside class="sidebar">
                <div class="brand">"Relief Dashboard"</div>
                <nav class="nav">{nav}</nav>
            </aside>
            <main class="main-content">
                <header class="header">
                    <h1 class="header-title">{title}</h1>
                    <div class="header-actions">
                        <button class="theme-toggle" on:click=move |_| ctx.toggle_theme()>
                            {move || match ctx.theme.get() {
                                Theme::Dark => "Light mode",
                                Theme::Light => "Dark mode",
                            }}
                        </button>
                        {account}
                    </div>
                </header>
                <section class="page">{page(ctx, route)}</section>
            </main>
        </div>
    }
}
