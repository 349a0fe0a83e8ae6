//! Keeps map markers in step with the live report feed.
//!
//! Every delivery is a full replacement: all rendered markers are removed and
//! one marker is created per mappable record. The reconciler also owns the
//! transient interaction state of the map view, namely the selected incident
//! and the pending click-to-report location.

use crate::demo::demo_incidents;
use crate::feed::{Delivery, FeedState};
use crate::incident::{Coordinates, Incident};
use crate::route::Route;
use crate::style::MarkerSpec;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_CENTER: Coordinates = Coordinates::new(20.5937, 78.9629);
pub const DEFAULT_ZOOM: u8 = 5;
pub const FOCUS_ZOOM: u8 = 8;

/// The mapping library as seen by the reconciler.
///
/// Implementations route marker clicks back as [`MapEvent::MarkerClicked`]
/// and clicks on bare canvas as [`MapEvent::CanvasClicked`].
pub trait MapSurface {
    type Marker;

    fn add_marker(&mut self, spec: &MarkerSpec) -> Self::Marker;
    fn remove_marker(&mut self, marker: Self::Marker);
    fn fly_to(&mut self, center: Coordinates, zoom: u8);
    fn zoom_in(&mut self);
    fn zoom_out(&mut self);
    /// Tears down the underlying map instance. Called at most once.
    fn release(&mut self);
}

#[derive(Clone, Debug, PartialEq)]
pub enum MapEvent {
    MarkerClicked(String),
    CanvasClicked(Coordinates),
}

pub struct MarkerReconciler<M: MapSurface> {
    surface: Option<M>,
    rendered: HashMap<String, M::Marker>,
    snapshot: Vec<Incident>,
    mappable: Vec<Incident>,
    selected: Option<Incident>,
    pending_click: Option<Coordinates>,
    feed_state: FeedState,
}

impl<M: MapSurface> MarkerReconciler<M> {
    pub fn new(surface: M) -> Self {
        Self {
            surface: Some(surface),
            rendered: HashMap::new(),
            snapshot: Vec::new(),
            mappable: Vec::new(),
            selected: None,
            pending_click: None,
            feed_state: FeedState::Loading,
        }
    }

    /// Applies one delivery. Runs to completion; the latest delivery wins.
    pub fn apply(&mut self, delivery: Delivery) {
        let (snapshot, feed_error) = match delivery {
            Ok(records) => (records, None),
            Err(err) => (Vec::new(), Some(err)),
        };

        let mut mappable: Vec<Incident> = snapshot
            .iter()
            .filter(|i| i.is_mappable())
            .cloned()
            .collect();

        self.feed_state = match (&feed_error, mappable.is_empty()) {
            (Some(err), _) => {
                tracing::warn!(error = %err, "live feed failed, showing demo incidents");
                FeedState::DemoUnavailable
            }
            (None, true) => FeedState::DemoEmpty,
            (None, false) => FeedState::Live,
        };
        if self.feed_state.is_demo() {
            mappable = demo_incidents();
        }

        // Newest copy of a repeated id wins, on the map and in the list alike.
        let mut seen = HashSet::new();
        mappable.retain(|incident| {
            let fresh = seen.insert(incident.id.clone());
            if !fresh {
                tracing::warn!(id = %incident.id, "duplicate incident id in snapshot");
            }
            fresh
        });

        self.clear_markers();
        if let Some(surface) = self.surface.as_mut() {
            for incident in &mappable {
                let Some(spec) = MarkerSpec::for_incident(incident) else {
                    continue;
                };
                let marker = surface.add_marker(&spec);
                self.rendered.insert(spec.id.clone(), marker);
            }
        }

        self.selected = self
            .selected
            .take()
            .and_then(|sel| find(&mappable, &sel.id).or_else(|| find(&snapshot, &sel.id)));

        tracing::debug!(
            records = snapshot.len(),
            markers = self.rendered.len(),
            state = ?self.feed_state,
            "reconciled markers"
        );

        self.snapshot = snapshot;
        self.mappable = mappable;
    }

    pub fn handle(&mut self, event: MapEvent) {
        match event {
            MapEvent::MarkerClicked(id) => {
                self.select(&id);
            }
            MapEvent::CanvasClicked(at) => self.capture_click(at),
        }
    }

    /// Selects by id, from the marker or from the sidebar list alike.
    pub fn select(&mut self, id: &str) -> bool {
        let Some(incident) = find(&self.mappable, id).or_else(|| find(&self.snapshot, id)) else {
            return false;
        };
        if let (Some(surface), Some(at)) = (self.surface.as_mut(), incident.coordinates) {
            surface.fly_to(at, FOCUS_ZOOM);
        }
        self.pending_click = None;
        self.selected = Some(incident);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn capture_click(&mut self, at: Coordinates) {
        self.pending_click = Some(at.rounded());
    }

    pub fn dismiss_pending_click(&mut self) {
        self.pending_click = None;
    }

    /// Consumes the pending click and returns the pre-filled report route.
    pub fn confirm_pending_click(&mut self) -> Option<Route> {
        self.pending_click.take().map(Route::report_at)
    }

    pub fn zoom_in(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.zoom_out();
        }
    }

    pub fn reset_view(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.fly_to(DEFAULT_CENTER, DEFAULT_ZOOM);
        }
    }

    /// Full last delivery, including records without coordinates.
    pub fn snapshot(&self) -> &[Incident] {
        &self.snapshot
    }

    /// Records currently drawn on the map (live or demo).
    pub fn mappable(&self) -> &[Incident] {
        &self.mappable
    }

    pub fn selected(&self) -> Option<&Incident> {
        self.selected.as_ref()
    }

    pub fn pending_click(&self) -> Option<Coordinates> {
        self.pending_click
    }

    pub fn feed_state(&self) -> FeedState {
        self.feed_state
    }

    pub fn is_rendered(&self, id: &str) -> bool {
        self.rendered.contains_key(id)
    }

    pub fn marker_count(&self) -> usize {
        self.rendered.len()
    }

    pub fn surface(&self) -> Option<&M> {
        self.surface.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.surface.is_none()
    }

    /// Removes every marker and releases the map. Safe to call twice.
    pub fn release(&mut self) {
        self.clear_markers();
        if let Some(mut surface) = self.surface.take() {
            surface.release();
            tracing::debug!("map released");
        }
    }

    fn clear_markers(&mut self) {
        let old: Vec<M::Marker> = self.rendered.drain().map(|(_, m)| m).collect();
        if let Some(surface) = self.surface.as_mut() {
            for marker in old {
                surface.remove_marker(marker);
            }
        }
    }
}

impl<M: MapSurface> Drop for MarkerReconciler<M> {
    fn drop(&mut self) {
        self.release();
    }
}

fn find(incidents: &[Incident], id: &str) -> Option<Incident> {
    incidents.iter().find(|i| i.id == id).cloned()
}

/// A mounted map view: the reconciler plus whatever keeps its feed alive.
///
/// Dropping the mount, for whatever reason, first drops the feed guard
/// (unsubscribing) and then releases the map.
pub struct MapMount<M: MapSurface, G> {
    feed: Option<G>,
    reconciler: MarkerReconciler<M>,
}

impl<M: MapSurface, G> MapMount<M, G> {
    pub fn new(reconciler: MarkerReconciler<M>, feed: G) -> Self {
        Self {
            feed: Some(feed),
            reconciler,
        }
    }

    pub fn reconciler(&self) -> &MarkerReconciler<M> {
        &self.reconciler
    }

    pub fn reconciler_mut(&mut self) -> &mut MarkerReconciler<M> {
        &mut self.reconciler
    }

    pub fn is_subscribed(&self) -> bool {
        self.feed.is_some()
    }
}

impl<M: MapSurface, G> Drop for MapMount<M, G> {
    fn drop(&mut self) {
        drop(self.feed.take());
        self.reconciler.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::incident::{IncidentType, Severity, Status};
    use crate::style::CRITICAL_MARKER_SIZE;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    #[derive(Default)]
    struct MapLog {
        live: HashMap<u32, MarkerSpec>,
        next: u32,
        removed: usize,
        flights: Vec<(Coordinates, u8)>,
        zoom: i32,
        released: usize,
    }

    #[derive(Clone, Default)]
    struct RecordingMap {
        log: Rc<RefCell<MapLog>>,
    }

    impl RecordingMap {
        fn live_ids(&self) -> BTreeSet<String> {
            self.log.borrow().live.values().map(|s| s.id.clone()).collect()
        }

        fn live_specs(&self) -> Vec<MarkerSpec> {
            self.log.borrow().live.values().cloned().collect()
        }
    }

    impl MapSurface for RecordingMap {
        type Marker = u32;

        fn add_marker(&mut self, spec: &MarkerSpec) -> u32 {
            let mut log = self.log.borrow_mut();
            log.next += 1;
            let handle = log.next;
            log.live.insert(handle, spec.clone());
            handle
        }

        fn remove_marker(&mut self, marker: u32) {
            let mut log = self.log.borrow_mut();
            assert!(log.live.remove(&marker).is_some(), "marker removed twice");
            log.removed += 1;
        }

        fn fly_to(&mut self, center: Coordinates, zoom: u8) {
            self.log.borrow_mut().flights.push((center, zoom));
        }

        fn zoom_in(&mut self) {
            self.log.borrow_mut().zoom += 1;
        }

        fn zoom_out(&mut self) {
            self.log.borrow_mut().zoom -= 1;
        }

        fn release(&mut self) {
            self.log.borrow_mut().released += 1;
        }
    }

    fn incident(id: &str, at: Option<(f64, f64)>) -> Incident {
        Incident {
            id: id.into(),
            kind: IncidentType::Fire,
            location: format!("{id} town"),
            coordinates: at.map(|(lat, lng)| Coordinates::new(lat, lng)),
            severity: Severity::Warning,
            status: Status::Pending,
            description: String::new(),
            timestamp: None,
            affected_people: None,
            contact_phone: None,
        }
    }

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn setup() -> (RecordingMap, MarkerReconciler<RecordingMap>) {
        let map = RecordingMap::default();
        let reconciler = MarkerReconciler::new(map.clone());
        (map, reconciler)
    }

    #[test]
    fn one_marker_per_mappable_record() {
        let (map, mut rec) = setup();
        rec.apply(Ok(vec![
            incident("a", Some((1.0, 2.0))),
            incident("b", None),
            incident("c", Some((3.0, 4.0))),
        ]));

        assert_eq!(map.live_ids(), ids(&["a", "c"]));
        assert_eq!(rec.marker_count(), 2);
        assert!(!rec.is_rendered("b"));
        assert_eq!(rec.snapshot().len(), 3);
        assert_eq!(rec.feed_state(), FeedState::Live);
    }

    #[test]
    fn empty_snapshot_falls_back_to_demo_set() {
        let (map, mut rec) = setup();
        rec.apply(Ok(Vec::new()));

        assert_eq!(map.live_ids(), ids(&["s1", "s2", "s3", "s4", "s5", "s6"]));
        assert_eq!(rec.feed_state(), FeedState::DemoEmpty);
        assert!(rec.snapshot().is_empty());
    }

    #[test]
    fn unmappable_only_snapshot_falls_back_but_keeps_source_set() {
        let (map, mut rec) = setup();
        rec.apply(Ok(vec![incident("x", None)]));

        assert_eq!(map.live_ids().len(), 6);
        assert_eq!(rec.snapshot().len(), 1);
        assert_eq!(rec.snapshot()[0].id, "x");
    }

    #[test]
    fn feed_error_shows_demo_set_without_stale_markers() {
        let (map, mut rec) = setup();
        rec.apply(Ok(vec![incident("a", Some((1.0, 2.0)))]));
        rec.apply(Err(FeedError::Unavailable("offline".into())));

        let live = map.live_ids();
        assert!(!live.contains("a"));
        assert_eq!(live.len(), 6);
        assert_eq!(rec.feed_state(), FeedState::DemoUnavailable);
    }

    #[test]
    fn every_delivery_replaces_all_markers() {
        let (map, mut rec) = setup();
        rec.apply(Ok(vec![
            incident("a", Some((1.0, 2.0))),
            incident("b", Some((3.0, 4.0))),
        ]));
        rec.apply(Ok(vec![incident("b", Some((3.0, 4.0)))]));

        assert_eq!(map.live_ids(), ids(&["b"]));
        assert_eq!(map.log.borrow().removed, 2);
    }

    #[test]
    fn same_snapshot_twice_is_idempotent() {
        let (map, mut rec) = setup();
        let snapshot = vec![
            incident("a", Some((1.0, 2.0))),
            incident("b", Some((3.0, 4.0))),
        ];
        rec.apply(Ok(snapshot.clone()));
        let once = map.live_specs().len();
        let once_ids = map.live_ids();
        rec.apply(Ok(snapshot));

        assert_eq!(map.live_specs().len(), once);
        assert_eq!(map.live_ids(), once_ids);
        assert_eq!(rec.marker_count(), 2);
    }

    #[test]
    fn duplicate_ids_do_not_leak_markers() {
        let (map, mut rec) = setup();
        rec.apply(Ok(vec![
            incident("a", Some((1.0, 2.0))),
            incident("a", Some((5.0, 6.0))),
        ]));
        let specs = map.live_specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].position, Coordinates::new(1.0, 2.0));
        assert_eq!(rec.marker_count(), 1);
        assert_eq!(rec.mappable().len(), 1);
        assert_eq!(map.log.borrow().removed, 0);
    }

    #[test]
    fn marker_click_selects_and_flies_to_it() {
        let (map, mut rec) = setup();
        rec.apply(Ok(vec![incident("a", Some((1.0, 2.0)))]));
        rec.capture_click(Coordinates::new(9.0, 9.0));

        rec.handle(MapEvent::MarkerClicked("a".into()));

        assert_eq!(rec.selected().map(|i| i.id.as_str()), Some("a"));
        assert_eq!(rec.pending_click(), None);
        assert_eq!(
            map.log.borrow().flights.last(),
            Some(&(Coordinates::new(1.0, 2.0), FOCUS_ZOOM))
        );
    }

    #[test]
    fn list_selection_matches_marker_selection() {
        let (_map, mut by_marker) = setup();
        let (_map2, mut by_list) = setup();
        let snapshot = vec![incident("a", Some((1.0, 2.0)))];
        by_marker.apply(Ok(snapshot.clone()));
        by_list.apply(Ok(snapshot));

        by_marker.handle(MapEvent::MarkerClicked("a".into()));
        assert!(by_list.select("a"));

        assert_eq!(by_marker.selected(), by_list.selected());
    }

    #[test]
    fn canvas_click_captures_location_and_keeps_selection() {
        let (_map, mut rec) = setup();
        rec.apply(Ok(vec![incident("a", Some((1.0, 2.0)))]));
        rec.select("a");

        rec.handle(MapEvent::CanvasClicked(Coordinates::new(12.345_678_9, 77.1)));

        assert_eq!(rec.pending_click(), Some(Coordinates::new(12.345_679, 77.1)));
        assert_eq!(rec.selected().map(|i| i.id.as_str()), Some("a"));
    }

    #[test]
    fn confirming_click_yields_prefilled_report_route() {
        let (_map, mut rec) = setup();
        rec.capture_click(Coordinates::new(10.0, 20.0));

        let route = rec.confirm_pending_click().expect("route");
        assert_eq!(route.href(), "/report?lat=10.000000&lng=20.000000");
        assert_eq!(rec.pending_click(), None);
        assert_eq!(rec.confirm_pending_click(), None);
    }

    #[test]
    fn dismissing_click_has_no_other_effect() {
        let (map, mut rec) = setup();
        rec.apply(Ok(vec![incident("a", Some((1.0, 2.0)))]));
        rec.capture_click(Coordinates::new(10.0, 20.0));
        rec.dismiss_pending_click();

        assert_eq!(rec.pending_click(), None);
        assert_eq!(rec.selected(), None);
        assert_eq!(map.live_ids(), ids(&["a"]));
    }

    #[test]
    fn selection_follows_updates_and_deletes() {
        let (_map, mut rec) = setup();
        rec.apply(Ok(vec![incident("a", Some((1.0, 2.0)))]));
        rec.select("a");

        let mut updated = incident("a", Some((1.0, 2.0)));
        updated.status = Status::Resolved;
        rec.apply(Ok(vec![updated, incident("b", Some((3.0, 4.0)))]));
        assert_eq!(rec.selected().map(|i| i.status), Some(Status::Resolved));

        rec.apply(Ok(vec![incident("b", Some((3.0, 4.0)))]));
        assert_eq!(rec.selected(), None);
    }

    #[test]
    fn critical_report_renders_as_critical_marker() {
        let (map, mut rec) = setup();
        let mut report = incident("new", Some((10.0, 20.0)));
        report.kind = IncidentType::Flood;
        report.severity = Severity::Critical;
        rec.apply(Ok(vec![report]));

        let specs = map.live_specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].position, Coordinates::new(10.0, 20.0));
        assert_eq!(specs[0].size, CRITICAL_MARKER_SIZE);
    }

    #[test]
    fn map_controls_reach_the_surface() {
        let (map, mut rec) = setup();
        rec.zoom_in();
        rec.zoom_in();
        rec.zoom_out();
        rec.reset_view();

        let log = map.log.borrow();
        assert_eq!(log.zoom, 1);
        assert_eq!(log.flights.last(), Some(&(DEFAULT_CENTER, DEFAULT_ZOOM)));
    }

    #[test]
    fn dropping_the_mount_unsubscribes_and_releases_once() {
        struct FeedGuard(Rc<RefCell<bool>>);
        impl Drop for FeedGuard {
            fn drop(&mut self) {
                *self.0.borrow_mut() = true;
            }
        }

        let (map, mut rec) = setup();
        rec.apply(Ok(vec![incident("a", Some((1.0, 2.0)))]));
        let unsubscribed = Rc::new(RefCell::new(false));
        let mount = MapMount::new(rec, FeedGuard(unsubscribed.clone()));
        assert!(mount.is_subscribed());
        drop(mount);

        assert!(*unsubscribed.borrow());
        let log = map.log.borrow();
        assert_eq!(log.released, 1);
        assert!(log.live.is_empty());
    }

    #[test]
    fn deliveries_after_release_touch_nothing() {
        let (map, mut rec) = setup();
        rec.release();
        rec.apply(Ok(vec![incident("a", Some((1.0, 2.0)))]));

        assert!(rec.is_released());
        assert!(map.live_ids().is_empty());
        assert_eq!(map.log.borrow().released, 1);
    }
}
