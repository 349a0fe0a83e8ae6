use crate::AppState;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use relief_core::feed::{Delivery, SnapshotSink};
use relief_core::Incident;
use report_schema::ReportDocument;
use std::convert::Infallible;
use tokio::sync::mpsc;

/// Forwards store deliveries into a per-client channel so writers never wait
/// on a slow SSE connection.
pub struct ChannelSink(pub mpsc::UnboundedSender<Delivery>);

impl SnapshotSink for ChannelSink {
    fn deliver(&self, delivery: Delivery) {
        let _ = self.0.send(delivery);
    }
}

/// `GET /api/reports/live`: one `snapshot` event per change, full set each time.
pub async fn live_reports(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::unbounded_channel();
    let subscription = state.store.subscribe(ChannelSink(tx));
    tracing::info!("live client connected");

    // The subscription rides along in the stream state; when the client goes
    // away the stream is dropped and so is the subscription.
    let events = stream::unfold((rx, subscription), |(mut rx, subscription)| async move {
        let delivery = rx.recv().await?;
        Some((Ok(delivery_event(delivery)), (rx, subscription)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

pub fn delivery_event(delivery: Delivery) -> Event {
    match delivery {
        Ok(incidents) => {
            let docs: Vec<ReportDocument> = incidents.iter().map(Incident::to_document).collect();
            match Event::default().event("snapshot").json_data(&docs) {
                Ok(event) => event,
                Err(err) => {
                    tracing::error!(error = %err, "failed to encode snapshot");
                    Event::default().event("error").data(err.to_string())
                }
            }
        }
        Err(err) => Event::default().event("error").data(err.to_string()),
    }
}
