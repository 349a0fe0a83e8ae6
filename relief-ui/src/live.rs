use crate::bridge;
use leptos::logging::warn;
use leptos::*;
use relief_core::feed::decode_snapshot;
use relief_core::{Delivery, FeedError};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventSource, MessageEvent};

/// An open `EventSource` on the live reports endpoint. Dropping it closes the
/// connection and detaches both listeners.
pub struct LiveFeed {
    source: EventSource,
    on_snapshot: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
}

impl LiveFeed {
    pub fn connect(url: &str, on_delivery: impl Fn(Delivery) + 'static) -> Result<Self, String> {
        let source = EventSource::new(url).map_err(|e| format!("live feed unavailable: {e:?}"))?;
        let deliver: Rc<dyn Fn(Delivery)> = Rc::new(on_delivery);

        let snapshot_deliver = deliver.clone();
        let on_snapshot = Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
            let delivery = match ev.data().as_string() {
                Some(text) => decode_snapshot(&text),
                None => Err(FeedError::Malformed("snapshot event carried no text".into())),
            };
            snapshot_deliver(delivery);
        });
        source
            .add_event_listener_with_callback("snapshot", on_snapshot.as_ref().unchecked_ref())
            .map_err(|e| format!("failed to listen for snapshots: {e:?}"))?;

        // Covers both dropped connections and `error` events sent by the server.
        let on_error = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            deliver(Err(FeedError::Unavailable("live connection lost".into())));
        });
        source.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Ok(Self {
            source,
            on_snapshot,
            _on_error: on_error,
        })
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.source.set_onerror(None);
        let _ = self.source.remove_event_listener_with_callback(
            "snapshot",
            self.on_snapshot.as_ref().unchecked_ref(),
        );
        self.source.close();
    }
}

/// Latest delivery for the current view; `None` until the first one lands.
/// The connection closes when the owning view is cleaned up.
pub fn use_live_reports() -> RwSignal<Option<Delivery>> {
    let latest = create_rw_signal(None::<Delivery>);
    match LiveFeed::connect(&bridge::live_url(), move |delivery| {
        latest.set(Some(delivery))
    }) {
        Ok(feed) => on_cleanup(move || drop(feed)),
        Err(e) => {
            warn!("{e}");
            latest.set(Some(Err(FeedError::Unavailable(e))));
        }
    }
    latest
}
