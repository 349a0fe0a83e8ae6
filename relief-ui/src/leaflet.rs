//! Leaflet (`window.L`) behind the reconciler's `MapSurface` seam.

use js_sys::{Object, Reflect};
use relief_core::reconciler::{MapEvent, MapSurface, DEFAULT_CENTER, DEFAULT_ZOOM};
use relief_core::style::MarkerSpec;
use relief_core::Coordinates;
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const MAX_ZOOM: u8 = 19;
const FLY_SECONDS: f64 = 1.0;

fn tile_options() -> serde_json::Value {
    serde_json::json!({ "maxZoom": MAX_ZOOM })
}

fn fly_options() -> serde_json::Value {
    serde_json::json!({ "duration": FLY_SECONDS })
}

#[wasm_bindgen]
extern "C" {
    type LeafletMap;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    fn create_map(container: &web_sys::HtmlElement, options: &JsValue) -> LeafletMap;
    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &JsValue, zoom: u8) -> LeafletMap;
    #[wasm_bindgen(method, js_name = flyTo)]
    fn fly_to(this: &LeafletMap, center: &JsValue, zoom: u8, options: &JsValue) -> LeafletMap;
    #[wasm_bindgen(method, js_name = zoomIn)]
    fn zoom_in(this: &LeafletMap) -> LeafletMap;
    #[wasm_bindgen(method, js_name = zoomOut)]
    fn zoom_out(this: &LeafletMap) -> LeafletMap;
    #[wasm_bindgen(method)]
    fn on(this: &LeafletMap, event: &str, handler: &js_sys::Function) -> LeafletMap;
    #[wasm_bindgen(method)]
    fn remove(this: &LeafletMap) -> LeafletMap;

    type TileLayer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn tile_layer(url: &str, options: &JsValue) -> TileLayer;
    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &TileLayer, map: &LeafletMap) -> TileLayer;

    type Marker;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn create_marker(at: &JsValue, options: &JsValue) -> Marker;
    #[wasm_bindgen(js_namespace = L, js_name = divIcon)]
    fn div_icon(options: &JsValue) -> JsValue;
    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &Marker, map: &LeafletMap) -> Marker;
    #[wasm_bindgen(method, js_name = bindPopup)]
    fn bind_popup(this: &Marker, html: &str) -> Marker;
    #[wasm_bindgen(method)]
    fn on(this: &Marker, event: &str, handler: &js_sys::Function) -> Marker;
    #[wasm_bindgen(method)]
    fn remove(this: &Marker) -> Marker;
}

fn js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::UNDEFINED)
}

fn latlng(at: Coordinates) -> JsValue {
    js(&[at.lat, at.lng])
}

fn event_latlng(event: &JsValue) -> Option<Coordinates> {
    let at = Reflect::get(event, &JsValue::from_str("latlng")).ok()?;
    let lat = Reflect::get(&at, &JsValue::from_str("lat")).ok()?.as_f64();
    let lng = Reflect::get(&at, &JsValue::from_str("lng")).ok()?.as_f64();
    Coordinates::from_pair(lat, lng)
}

pub struct LeafletMarker {
    marker: Marker,
    _on_click: Closure<dyn FnMut(JsValue)>,
}

pub struct LeafletSurface {
    map: LeafletMap,
    events: Rc<dyn Fn(MapEvent)>,
    _on_click: Closure<dyn FnMut(JsValue)>,
}

impl LeafletSurface {
    /// Creates the map inside `container`, centred on the default view.
    /// Every marker and canvas click is reported through `events`.
    pub fn mount(container: &web_sys::HtmlElement, events: impl Fn(MapEvent) + 'static) -> Self {
        let map = create_map(
            container,
            &js(&serde_json::json!({ "zoomControl": false, "attributionControl": false })),
        );
        map.set_view(&latlng(DEFAULT_CENTER), DEFAULT_ZOOM);
        tile_layer(TILE_URL, &js(&tile_options())).add_to(&map);

        let events: Rc<dyn Fn(MapEvent)> = Rc::new(events);
        let canvas_events = events.clone();
        let on_click = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            if let Some(at) = event_latlng(&event) {
                canvas_events(MapEvent::CanvasClicked(at));
            }
        });
        map.on("click", on_click.as_ref().unchecked_ref());

        Self {
            map,
            events,
            _on_click: on_click,
        }
    }
}

impl MapSurface for LeafletSurface {
    type Marker = LeafletMarker;

    fn add_marker(&mut self, spec: &MarkerSpec) -> LeafletMarker {
        let half = spec.size / 2;
        let icon = div_icon(&js(&serde_json::json!({
            "className": "custom-marker-container",
            "html": spec.icon_html(),
            "iconSize": [spec.size, spec.size],
            "iconAnchor": [half, half],
        })));
        let options = Object::new();
        let _ = Reflect::set(&options, &JsValue::from_str("icon"), &icon);

        let marker = create_marker(&latlng(spec.position), &options).add_to(&self.map);
        marker.bind_popup(&spec.popup_html);

        let events = self.events.clone();
        let id = spec.id.clone();
        let on_click = Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
            events(MapEvent::MarkerClicked(id.clone()));
        });
        marker.on("click", on_click.as_ref().unchecked_ref());

        LeafletMarker {
            marker,
            _on_click: on_click,
        }
    }

    fn remove_marker(&mut self, marker: LeafletMarker) {
        marker.marker.remove();
    }

    fn fly_to(&mut self, center: Coordinates, zoom: u8) {
        self.map.fly_to(&latlng(center), zoom, &js(&fly_options()));
    }

    fn zoom_in(&mut self) {
        self.map.zoom_in();
    }

    fn zoom_out(&mut self) {
        self.map.zoom_out();
    }

    fn release(&mut self) {
        self.map.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_layer_uses_openstreetmap_tiles() {
        assert_eq!(TILE_URL, "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png");
        assert_eq!(tile_options()["maxZoom"], 19);
    }

    #[test]
    fn fly_to_takes_one_second() {
        assert_eq!(fly_options()["duration"], 1.0);
    }
}
