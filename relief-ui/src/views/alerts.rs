use super::{now, AlertCard};
use crate::bridge;
use leptos::logging::warn;
use leptos::*;
use relief_core::demo::sample_alerts;

const ALERT_LIMIT: usize = 20;

/// Latest reports, read once on mount. Falls back to the built-in samples
/// when the read fails or comes back empty.
#[component]
pub fn Alerts() -> impl IntoView {
    let reports = create_local_resource(|| (), |_| async move { bridge::fetch_reports().await });

    let list = move || {
        let loaded = reports.get()?;
        let mut alerts = match loaded {
            Ok(list) => list,
            Err(e) => {
                warn!("failed to load alerts: {e}");
                Vec::new()
            }
        };
        alerts.truncate(ALERT_LIMIT);
        let now = now();
        if alerts.is_empty() {
            alerts = sample_alerts(now);
        }
        Some(
            alerts
                .into_iter()
                .map(|incident| view! { <AlertCard incident=incident now=now/> })
                .collect_view(),
        )
    };

    view! {
        <div>
            <div class="page-header">
                <h1 class="page-title">"Active Alerts"</h1>
                <p class="page-subtitle">"Real-time disaster alerts and notifications"</p>
            </div>
            {move || match list() {
                Some(cards) => view! { <div class="alerts-list">{cards}</div> }.into_view(),
                None => view! { <div class="loading"><div class="loading-spinner"></div></div> }
                    .into_view(),
            }}
        </div>
    }
}
