use crate::{bridge, geo};
use leptos::logging::{error, warn};
use leptos::*;
use relief_core::report::ReportDraft;
use relief_core::{IncidentType, Severity};
use wasm_bindgen_futures::spawn_local;

#[component]
pub fn ReportForm(lat: Option<String>, lng: Option<String>) -> impl IntoView {
    let draft = create_rw_signal(ReportDraft::prefilled(lat.as_deref(), lng.as_deref()));
    let submitting = create_rw_signal(false);
    let locating = create_rw_signal(false);
    let submitted = create_rw_signal(false);
    let failure = create_rw_signal(None::<String>);

    // Any edit clears the previous outcome.
    let edit = move |apply: fn(&mut ReportDraft, String), value: String| {
        draft.update(|d| apply(d, value));
        failure.set(None);
        submitted.set(false);
    };

    let use_my_location = move |_| {
        locating.set(true);
        geo::current_position(move |fix| {
            match fix {
                Ok(at) => draft.update(|d| d.apply_fix(at)),
                Err(e) if e == geo::UNSUPPORTED => failure.set(Some(e)),
                Err(e) => {
                    warn!("geolocation failed: {e}");
                    failure.set(Some(
                        "Failed to get location. Please enter coordinates manually.".into(),
                    ));
                }
            }
            locating.set(false);
        });
    };

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let report = match draft.with_untracked(ReportDraft::validate) {
            Ok(report) => report,
            Err(e) => {
                failure.set(Some(e.to_string()));
                return;
            }
        };
        submitting.set(true);
        failure.set(None);
        spawn_local(async move {
            match bridge::submit_report(&report).await {
                Ok(_) => {
                    submitted.set(true);
                    draft.update(ReportDraft::reset);
                }
                Err(e) => {
                    error!("failed to submit report: {e}");
                    failure.set(Some("Failed to submit report. Please try again.".into()));
                }
            }
            submitting.set(false);
        });
    };

    let type_options = IncidentType::ALL
        .into_iter()
        .map(|kind| view! { <option value=kind.as_str()>{kind.as_str()}</option> })
        .collect_view();
    let severity_options = Severity::ALL
        .into_iter()
        .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
        .collect_view();

    view! {
        <div class="report-page">
            <div class="page-header">
                <h1 class="page-title">"Report a Disaster"</h1>
                <p class="page-subtitle">"Help coordinate relief by reporting what you see"</p>
            </div>
            {move || {
                submitted
                    .get()
                    .then(|| view! { <div class="form-success">"Report submitted successfully!"</div> })
            }}
            {move || failure.get().map(|msg| view! { <div class="form-error">{msg}</div> })}
            <form class="card report-form" on:submit=submit>
                <label class="form-label">"Disaster Type *"</label>
                <select
                    class="form-select"
                    prop:value=move || draft.with(|d| d.kind.clone())
                    on:change=move |ev| edit(|d, v| d.kind = v, event_target_value(&ev))
                >
                    <option value="">"Select type"</option>
                    {type_options}
                </select>

                <label class="form-label">"Location *"</label>
                <input
                    class="form-input"
                    placeholder="City, district or landmark"
                    prop:value=move || draft.with(|d| d.location.clone())
                    on:input=move |ev| edit(|d, v| d.location = v, event_target_value(&ev))
                />

                <label class="form-label">"Severity"</label>
                <select
                    class="form-select"
                    prop:value=move || draft.with(|d| d.severity.as_str())
                    on:change=move |ev| {
                        edit(|d, v| d.severity = Severity::or_default(Some(&v)), event_target_value(&ev))
                    }
                >
                    {severity_options}
                </select>

                <label class="form-label">"Coordinates"</label>
                <div class="form-row">
                    <input
                        class="form-input"
                        placeholder="Latitude"
                        prop:value=move || draft.with(|d| d.lat.clone())
                        on:input=move |ev| edit(|d, v| d.lat = v, event_target_value(&ev))
                    />
                    <input
                        class="form-input"
                        placeholder="Longitude"
                        prop:value=move || draft.with(|d| d.lng.clone())
                        on:input=move |ev| edit(|d, v| d.lng = v, event_target_value(&ev))
                    />
                    <button
                        type="button"
                        class="btn btn-secondary"
                        disabled=move || locating.get()
                        on:click=use_my_location
                    >
                        {move || if locating.get() { "Locating..." } else { "Use my location" }}
                    </button>
                </div>

                <label class="form-label">"Description *"</label>
                <textarea
                    class="form-textarea"
                    rows="4"
                    prop:value=move || draft.with(|d| d.description.clone())
                    on:input=move |ev| edit(|d, v| d.description = v, event_target_value(&ev))
                ></textarea>

                <div class="form-row">
                    <input
                        class="form-input"
                        placeholder="People affected (approx.)"
                        prop:value=move || draft.with(|d| d.affected_people.clone())
                        on:input=move |ev| edit(|d, v| d.affected_people = v, event_target_value(&ev))
                    />
                    <input
                        class="form-input"
                        placeholder="Contact phone"
                        prop:value=move || draft.with(|d| d.contact_phone.clone())
                        on:input=move |ev| edit(|d, v| d.contact_phone = v, event_target_value(&ev))
                    />
                </div>

                <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>
                    {move || if submitting.get() { "Submitting..." } else { "Submit Report" }}
                </button>
            </form>
        </div>
    }
}
