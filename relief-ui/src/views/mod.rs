pub mod admin;
pub mod alerts;
pub mod dashboard;
pub mod login;
pub mod map_view;
pub mod report_form;
pub mod shell;

use chrono::{DateTime, Utc};
use leptos::*;
use relief_core::display::{from_epoch_millis, time_ago, truncate};
use relief_core::route::Route;
use relief_core::style::severity_badge;
use relief_core::{FeedState, Incident, Severity};

/// Wall-clock now, read from the browser on every render.
pub fn now() -> DateTime<Utc> {
    from_epoch_millis(js_sys::Date::now()).unwrap_or_else(Utc::now)
}

pub fn link(route: &Route) -> String {
    format!("#{}", route.href())
}

#[component]
pub fn SeverityBadge(severity: Severity) -> impl IntoView {
    let (background, color) = severity_badge(severity);
    view! {
        <span
            class=format!("alert-badge {}", severity.as_str())
            style=format!("background: {background}; color: {color};")
        >
            {severity.label()}
        </span>
    }
}

#[component]
pub fn FeedNotice(state: FeedState) -> impl IntoView {
    state
        .notice()
        .map(|notice| view! { <div class="feed-notice">{notice}</div> })
}

/// One row of an alert list.
#[component]
pub fn AlertCard(incident: Incident, now: DateTime<Utc>) -> impl IntoView {
    let description = if incident.description.is_empty() {
        format!("Reported at {}", incident.location)
    } else {
        truncate(&incident.description, 100)
    };
    view! {
        <div class="alert-card">
            <div class=format!("alert-icon {}", incident.severity.as_str())></div>
            <div class="alert-content">
                <div class="alert-title">{incident.kind.as_str()}</div>
                <div class="alert-description">{description}</div>
                <div class="alert-meta">
                    <span>{incident.location.clone()}</span>
                    <span>{time_ago(incident.timestamp, now)}</span>
                </div>
            </div>
            <SeverityBadge severity=incident.severity/>
        </div>
    }
}
