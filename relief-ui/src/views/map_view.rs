use super::{now, FeedNotice, SeverityBadge};
use crate::bridge;
use crate::context::AppContext;
use crate::leaflet::LeafletSurface;
use crate::live::LiveFeed;
use leptos::logging::warn;
use leptos::*;
use relief_core::display::time_ago_short;
use relief_core::reconciler::{MapMount, MarkerReconciler};
use relief_core::stats::SeverityBreakdown;
use relief_core::style::{severity_color, status_class, type_color};
use relief_core::{Coordinates, FeedError, FeedState, Incident, IncidentType, Severity};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Reconciler = MarkerReconciler<LeafletSurface>;
type Mount = MapMount<LeafletSurface, Option<LiveFeed>>;
type MountSlot = RefCell<Option<Mount>>;

/// What the panels around the map render; copied out after every change.
#[derive(Clone, Debug, Default, PartialEq)]
struct MapPanel {
    feed_state: FeedState,
    incidents: Vec<Incident>,
    selected: Option<Incident>,
    pending: Option<Coordinates>,
}

impl MapPanel {
    fn capture(reconciler: &Reconciler) -> Self {
        Self {
            feed_state: reconciler.feed_state(),
            incidents: reconciler.mappable().to_vec(),
            selected: reconciler.selected().cloned(),
            pending: reconciler.pending_click(),
        }
    }
}

/// Runs `f` against the mounted reconciler, then publishes the panel state.
/// Does nothing once the view is gone.
fn drive<R>(
    slot: &Weak<MountSlot>,
    panel: RwSignal<MapPanel>,
    f: impl FnOnce(&mut Reconciler) -> R,
) -> Option<R> {
    let slot = slot.upgrade()?;
    let mut mount = slot.try_borrow_mut().ok()?;
    let reconciler = mount.as_mut()?.reconciler_mut();
    let out = f(reconciler);
    let next = MapPanel::capture(reconciler);
    drop(mount);
    panel.set(next);
    Some(out)
}

#[component]
pub fn MapView(ctx: AppContext) -> impl IntoView {
    let panel = create_rw_signal(MapPanel::default());
    let canvas = create_node_ref::<html::Div>();
    let slot: Rc<MountSlot> = Rc::new(RefCell::new(None));
    let map = store_value(Rc::downgrade(&slot));

    create_effect(move |_| {
        let Some(el) = canvas.get() else {
            return;
        };
        let weak = map.get_value();
        let Some(cell) = weak.upgrade() else {
            return;
        };
        if cell.borrow().is_some() {
            return;
        }

        let events = weak.clone();
        let surface = LeafletSurface::mount(&el, move |event| {
            drive(&events, panel, |r| r.handle(event));
        });
        let deliveries = weak.clone();
        let feed = match LiveFeed::connect(&bridge::live_url(), move |delivery| {
            drive(&deliveries, panel, |r| r.apply(delivery));
        }) {
            Ok(feed) => Some(feed),
            Err(e) => {
                warn!("{e}");
                None
            }
        };

        let mut reconciler = MarkerReconciler::new(surface);
        if feed.is_none() {
            reconciler.apply(Err(FeedError::Unavailable("live feed could not be opened".into())));
        }
        panel.set(MapPanel::capture(&reconciler));
        *cell.borrow_mut() = Some(MapMount::new(reconciler, feed));
    });

    on_cleanup(move || {
        let mount = slot.borrow_mut().take();
        drop(mount);
    });

    let run = move |action: fn(&mut Reconciler)| {
        map.with_value(|w| drive(w, panel, action));
    };
    let select = move |id: String| {
        map.with_value(|w| drive(w, panel, |r| r.select(&id)));
    };
    let report_here = move |_| {
        let route = map
            .with_value(|w| drive(w, panel, |r| r.confirm_pending_click()))
            .flatten();
        if let Some(route) = route {
            ctx.navigate(route);
        }
    };

    let stats = move || {
        let breakdown = panel.with(|p| SeverityBreakdown::from_incidents(&p.incidents));
        let bars = [Severity::Critical, Severity::Warning, Severity::Info]
            .into_iter()
            .map(|severity| {
                view! {
                    <div class="map-stat">
                        <span class="map-stat-value">{breakdown.count(severity)}</span>
                        <span class="map-stat-label">{severity.label()}</span>
                        <div
                            class="map-stat-bar"
                            style=format!(
                                "background: {}; width: {}%;",
                                severity_color(severity),
                                breakdown.share(severity),
                            )
                        ></div>
                    </div>
                }
            })
            .collect_view();
        view! {
            <div class="map-stats">
                <div class="map-stat">
                    <span class="map-stat-value">{breakdown.total}</span>
                    <span class="map-stat-label">"Total"</span>
                </div>
                {bars}
            </div>
        }
    };

    let list = move || {
        let (incidents, selected_id) =
            panel.with(|p| (p.incidents.clone(), p.selected.as_ref().map(|s| s.id.clone())));
        incidents
            .into_iter()
            .map(|incident| {
                let active = selected_id.as_deref() == Some(incident.id.as_str());
                let id = incident.id.clone();
                view! {
                    <div class="map-disaster-item" class:active=active on:click=move |_| select(id.clone())>
                        <div
                            class="map-disaster-indicator"
                            style=format!("background: {};", severity_color(incident.severity))
                        ></div>
                        <div class="map-disaster-info">
                            <div class="map-disaster-type">{incident.kind.as_str()}</div>
                            <div class="map-disaster-location">{incident.location.clone()}</div>
                        </div>
                        <div class=format!("map-disaster-status {}", status_class(incident.status))>
                            {incident.status.label()}
                        </div>
                    </div>
                }
            })
            .collect_view()
    };

    let legend = IncidentType::ALL
        .into_iter()
        .map(|kind| {
            view! {
                <div class="map-legend-item">
                    <span class="map-legend-dot" style=format!("background: {};", type_color(kind))></span>
                    {kind.as_str()}
                </div>
            }
        })
        .collect_view();

    let info_card = move || {
        let incident = panel.with(|p| p.selected.clone())?;
        let reported = incident.timestamp.map(|ts| time_ago_short(Some(ts), now()));
        Some(view! {
            <div class="map-info-card">
                <button class="map-info-close" on:click=move |_| run(Reconciler::clear_selection)>
                    "×"
                </button>
                <div class="map-info-header">
                    <div
                        class="map-info-indicator"
                        style=format!("background: {};", severity_color(incident.severity))
                    ></div>
                    <div>
                        <h3>{incident.kind.as_str()}</h3>
                        <p>{incident.location.clone()}</p>
                    </div>
                </div>
                <div class="map-info-details">
                    <div class="map-info-row">
                        <span>"Severity"</span>
                        <SeverityBadge severity=incident.severity/>
                    </div>
                    {incident.affected_people.clone().map(|n| view! {
                        <div class="map-info-row"><span>"Affected"</span><span>{n}" people"</span></div>
                    })}
                    <div class="map-info-row">
                        <span>"Status"</span>
                        <span>{incident.status.label()}</span>
                    </div>
                    {reported.map(|when| view! {
                        <div class="map-info-row"><span>"Reported"</span><span>{when}</span></div>
                    })}
                    {(!incident.description.is_empty()).then(|| view! {
                        <div class="map-info-description">{incident.description.clone()}</div>
                    })}
                </div>
            </div>
        })
    };

    let click_card = move || {
        let at = panel.with(|p| if p.selected.is_none() { p.pending } else { None })?;
        Some(view! {
            <div class="map-info-card compact">
                <button class="map-info-close" on:click=move |_| run(Reconciler::dismiss_pending_click)>
                    "×"
                </button>
                <div class="map-click-label">"Selected Location"</div>
                <div class="map-click-coords">{format!("{:.6}, {:.6}", at.lat, at.lng)}</div>
                <button class="btn btn-primary" on:click=report_here>"Report Disaster Here"</button>
            </div>
        })
    };

    view! {
        <div class="map-page">
            <div class="map-sidebar">
                {move || view! { <FeedNotice state=panel.with(|p| p.feed_state)/> }}
                {stats}
                <div class="map-disaster-list">{list}</div>
                <div class="map-legend">
                    <div class="map-legend-title">"Disaster Types"</div>
                    <div class="map-legend-items">{legend}</div>
                </div>
            </div>
            <div class="map-main">
                <div node_ref=canvas class="map-canvas"></div>
                <div class="map-controls">
                    <button class="map-control-btn" title="Zoom In" on:click=move |_| run(Reconciler::zoom_in)>
                        "+"
                    </button>
                    <button class="map-control-btn" title="Zoom Out" on:click=move |_| run(Reconciler::zoom_out)>
                        "−"
                    </button>
                    <button class="map-control-btn" title="Reset View" on:click=move |_| run(Reconciler::reset_view)>
                        "⌖"
                    </button>
                </div>
                {info_card}
                {click_card}
            </div>
        </div>
    }
}
