use super::SeverityBadge;
use crate::bridge;
use crate::context::AppContext;
use crate::live::use_live_reports;
use leptos::logging::error;
use leptos::*;
use relief_core::route::Route;
use relief_core::session::RouteAccess;
use relief_core::style::status_class;
use relief_core::{Incident, IncidentPatch, IncidentType, Severity, Status};
use wasm_bindgen_futures::spawn_local;

/// Row being edited in place.
#[derive(Clone, Debug, PartialEq)]
struct EditRow {
    id: String,
    kind: IncidentType,
    location: String,
    severity: Severity,
    status: Status,
    description: String,
}

impl EditRow {
    fn from_incident(incident: &Incident) -> Self {
        Self {
            id: incident.id.clone(),
            kind: incident.kind,
            location: incident.location.clone(),
            severity: incident.severity,
            status: incident.status,
            description: incident.description.clone(),
        }
    }

    fn patch(&self) -> IncidentPatch {
        IncidentPatch {
            kind: Some(self.kind),
            location: Some(self.location.clone()),
            severity: Some(self.severity),
            status: Some(self.status),
            description: Some(self.description.clone()),
        }
    }
}

fn format_date(incident: &Incident) -> String {
    incident
        .timestamp
        .map(|ts| ts.format("%d %b %Y, %H:%M").to_string())
        .unwrap_or_else(|| "Unknown".into())
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Only signed-in users get past the gate; others go back to the login page.
#[component]
pub fn AdminPanel(ctx: AppContext) -> impl IntoView {
    let access = create_memo(move |_| ctx.auth.with(|a| a.guard(&Route::Admin)));
    create_effect(move |_| {
        if access.get() == RouteAccess::RedirectToLogin {
            ctx.navigate(Route::Login);
        }
    });

    move || match access.get() {
        RouteAccess::Allow => view! { <ReportTable/> }.into_view(),
        RouteAccess::Pending | RouteAccess::RedirectToLogin => {
            view! { <div class="loading"><div class="loading-spinner"></div></div> }.into_view()
        }
    }
}

#[component]
fn ReportTable() -> impl IntoView {
    let live = use_live_reports();
    let editing = create_rw_signal(None::<EditRow>);
    // Rows re-render when a different row enters edit mode, not on every keystroke.
    let editing_id = create_memo(move |_| editing.with(|e| e.as_ref().map(|r| r.id.clone())));
    let notice = create_rw_signal(None::<String>);

    let reports = create_memo(move |_| match live.get() {
        Some(Ok(list)) => list,
        Some(Err(e)) => {
            error!("error fetching reports: {e}");
            Vec::new()
        }
        None => Vec::new(),
    });

    let fail = move |what: &str, e: String| {
        error!("{what}: {e}");
        notice.set(Some(format!("{what}. {e}")));
    };

    let save = move |_| {
        let Some(row) = editing.get_untracked() else {
            return;
        };
        spawn_local(async move {
            match bridge::update_report(&row.id, &row.patch()).await {
                Ok(()) => editing.set(None),
                Err(e) => fail("Failed to update report", e),
            }
        });
    };

    let change_status = move |id: String, value: String| {
        let Some(status) = Status::from_wire(&value) else {
            return;
        };
        spawn_local(async move {
            if let Err(e) = bridge::set_status(&id, status).await {
                fail("Failed to update status", e);
            }
        });
    };

    let remove = move |id: String| {
        if !confirm("Are you sure you want to delete this report?") {
            return;
        }
        spawn_local(async move {
            if let Err(e) = bridge::delete_report(&id).await {
                fail("Failed to delete report", e);
            }
        });
    };

    let edit_cells = move |row: EditRow| {
        let kinds = IncidentType::ALL
            .into_iter()
            .map(|k| {
                let chosen = k == row.kind;
                view! { <option value=k.as_str() selected=chosen>{k.as_str()}</option> }
            })
            .collect_view();
        let severities = Severity::ALL
            .into_iter()
            .map(|s| {
                let chosen = s == row.severity;
                view! { <option value=s.as_str() selected=chosen>{s.label()}</option> }
            })
            .collect_view();
        let statuses = Status::ALL
            .into_iter()
            .map(|s| {
                let chosen = s == row.status;
                view! { <option value=s.as_str() selected=chosen>{s.label()}</option> }
            })
            .collect_view();
        let update = move |apply: fn(&mut EditRow, String), value: String| {
            editing.update(|e| {
                if let Some(e) = e {
                    apply(e, value)
                }
            });
        };
        view! {
            <td>
                <select class="form-select" on:change=move |ev| {
                    update(|e, v| e.kind = IncidentType::or_default(Some(&v)), event_target_value(&ev))
                }>
                    {kinds}
                </select>
            </td>
            <td>
                <input
                    class="form-input"
                    prop:value=row.location.clone()
                    on:input=move |ev| update(|e, v| e.location = v, event_target_value(&ev))
                />
            </td>
            <td>
                <select class="form-select" on:change=move |ev| {
                    update(|e, v| e.severity = Severity::or_default(Some(&v)), event_target_value(&ev))
                }>
                    {severities}
                </select>
            </td>
            <td>
                <select class="form-select" on:change=move |ev| {
                    update(|e, v| e.status = Status::or_default(Some(&v)), event_target_value(&ev))
                }>
                    {statuses}
                </select>
            </td>
            <td>
                <textarea
                    class="form-textarea"
                    prop:value=row.description.clone()
                    on:input=move |ev| update(|e, v| e.description = v, event_target_value(&ev))
                ></textarea>
            </td>
        }
    };

    let row_view = move |report: Incident| {
        let date = format_date(&report);
        let id = report.id.clone();
        if editing_id.get_untracked().as_deref() == Some(id.as_str()) {
            let row = editing.get_untracked().unwrap_or_else(|| EditRow::from_incident(&report));
            return view! {
                <tr>
                    {edit_cells(row)}
                    <td class="nowrap">{date}</td>
                    <td>
                        <button class="btn btn-primary" on:click=save>"Save"</button>
                        <button class="btn btn-secondary" on:click=move |_| editing.set(None)>"Cancel"</button>
                    </td>
                </tr>
            }
            .into_view();
        }

        let status_id = id.clone();
        let delete_id = id.clone();
        let statuses = Status::ALL
            .into_iter()
            .map(|s| {
                let chosen = s == report.status;
                view! { <option value=s.as_str() selected=chosen>{s.label()}</option> }
            })
            .collect_view();
        let description = report.description.clone();
        let edit_source = report.clone();
        view! {
            <tr>
                <td>{report.kind.as_str()}</td>
                <td>{report.location.clone()}</td>
                <td><SeverityBadge severity=report.severity/></td>
                <td>
                    <select
                        class=format!("form-select {}", status_class(report.status))
                        on:change=move |ev| change_status(status_id.clone(), event_target_value(&ev))
                    >
                        {statuses}
                    </select>
                </td>
                <td class="description-cell">{description}</td>
                <td class="nowrap">{date}</td>
                <td>
                    <button
                        class="btn btn-secondary"
                        on:click=move |_| editing.set(Some(EditRow::from_incident(&edit_source)))
                    >
                        "Edit"
                    </button>
                    <button class="btn btn-danger" on:click=move |_| remove(delete_id.clone())>
                        "Delete"
                    </button>
                </td>
            </tr>
        }
        .into_view()
    };

    let body = move || {
        if live.with(|d| d.is_none()) {
            return view! { <div class="loading"><div class="loading-spinner"></div></div> }
                .into_view();
        }
        let list = reports.get();
        if list.is_empty() {
            return view! {
                <div class="empty-state">
                    <div class="empty-state-title">"No reports yet"</div>
                    <p>"Submitted reports will appear here."</p>
                </div>
            }
            .into_view();
        }
        let _ = editing_id.get();
        view! {
            <div class="table-container">
                <table class="table">
                    <thead>
                        <tr>
                            <th>"Type"</th>
                            <th>"Location"</th>
                            <th>"Severity"</th>
                            <th>"Status"</th>
                            <th>"Description"</th>
                            <th>"Date"</th>
                            <th>"Actions"</th>
                        </tr>
                    </thead>
                    <tbody>{list.into_iter().map(row_view).collect_view()}</tbody>
                </table>
            </div>
        }
        .into_view()
    };

    view! {
        <div>
            <div class="page-header">
                <h1 class="page-title">"Admin Panel"</h1>
                <p class="page-subtitle">"Manage disaster reports and data"</p>
            </div>
            {move || notice.get().map(|msg| view! {
                <div class="form-error dismissible">
                    <span>{msg}</span>
                    <button class="btn-dismiss" on:click=move |_| notice.set(None)>"×"</button>
                </div>
            })}
            <div class="card">
                <div class="card-header">
                    <h2 class="card-title">
                        {move || format!("All Reports ({})", reports.with(Vec::len))}
                    </h2>
                </div>
                {body}
            </div>
        </div>
    }
}
