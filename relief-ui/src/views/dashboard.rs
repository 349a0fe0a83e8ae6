use super::{link, now, AlertCard};
use crate::context::AppContext;
use crate::live::use_live_reports;
use leptos::*;
use relief_core::route::Route;
use relief_core::stats::{recent, DashboardStats};
use relief_core::Incident;

const RECENT_ALERTS: usize = 3;

#[component]
pub fn Dashboard(ctx: AppContext) -> impl IntoView {
    let live = use_live_reports();
    // A failed feed reads as zero reports here; the map is where demo data shows.
    let incidents = create_memo(move |_| match live.get() {
        Some(Ok(list)) => list,
        _ => Vec::<Incident>::new(),
    });

    let stats = move || {
        let s = DashboardStats::from_incidents(&incidents.get());
        [
            ("Total Reports", s.total, "blue"),
            ("Active Incidents", s.active, "orange"),
            ("Resolved", s.resolved, "green"),
            ("Critical", s.critical, "red"),
        ]
        .into_iter()
        .map(|(label, value, color)| {
            view! {
                <div class="stat-card">
                    <div class=format!("stat-icon {color}")></div>
                    <div class="stat-content">
                        <div class="stat-value">{value}</div>
                        <div class="stat-label">{label}</div>
                    </div>
                </div>
            }
        })
        .collect_view()
    };

    let quick_actions = [
        ("Report Incident", "Submit a new disaster report", Route::Report { lat: None, lng: None }),
        ("Live Map", "View incidents on the map", Route::Map),
        ("Alerts", "Check the latest alerts", Route::Alerts),
        ("Admin Panel", "Manage and verify reports", Route::Admin),
    ]
    .into_iter()
    .map(|(title, desc, route)| {
        view! {
            <button class="card quick-action" on:click=move |_| ctx.navigate(route.clone())>
                <div class="quick-action-title">{title}</div>
                <div class="quick-action-desc">{desc}</div>
            </button>
        }
    })
    .collect_view();

    let recent_alerts = move || {
        if live.with(|d| d.is_none()) {
            return view! { <div class="loading"><div class="loading-spinner"></div></div> }
                .into_view();
        }
        let list = incidents.get();
        if list.is_empty() {
            return view! {
                <div class="empty-state">
                    <div class="empty-state-title">"No alerts yet"</div>
                    <a href=link(&Route::Report { lat: None, lng: None }) class="btn btn-primary">
                        "Report an incident"
                    </a>
                </div>
            }
            .into_view();
        }
        let now = now();
        view! {
            <div class="alerts-list">
                {recent(&list, RECENT_ALERTS)
                    .iter()
                    .cloned()
                    .map(|incident| view! { <AlertCard incident=incident now=now/> })
                    .collect_view()}
            </div>
        }
        .into_view()
    };

    view! {
        <div class="dashboard">
            <div class="page-header">
                <h1 class="page-title">"Command Center"</h1>
                <p class="page-subtitle">
                    "Real-time overview of disaster relief operations across all regions"
                </p>
            </div>
            {move || {
                live.with(|d| matches!(d, Some(Err(_))))
                    .then(|| view! { <div class="feed-notice">"Live reports are unavailable."</div> })
            }}
            <div class="stats-grid">{stats}</div>
            <h2 class="section-title">"Quick Actions"</h2>
            <div class="quick-actions">{quick_actions}</div>
            <div class="card">
                <div class="card-header">
                    <h2 class="card-title"><span class="pulse-dot"></span>"Recent Alerts"</h2>
                    <a href=link(&Route::Alerts) class="btn btn-secondary">"View all"</a>
                </div>
                {recent_alerts}
            </div>
        </div>
    }
}
