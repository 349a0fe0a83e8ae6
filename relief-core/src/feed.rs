use crate::error::FeedError;
use crate::incident::{incidents_from_documents, Incident};
use report_schema::ReportDocument;

/// One full-set snapshot, newest first, or the reason there is none.
pub type Delivery = Result<Vec<Incident>, FeedError>;

/// Receiver side of a live subscription.
pub trait SnapshotSink: Send + Sync + 'static {
    fn deliver(&self, delivery: Delivery);
}

impl SnapshotSink for std::sync::mpsc::Sender<Delivery> {
    fn deliver(&self, delivery: Delivery) {
        let _ = self.send(delivery);
    }
}

/// Where the records on screen came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeedState {
    #[default]
    Loading,
    Live,
    /// The feed answered with nothing mappable.
    DemoEmpty,
    /// The feed failed; sample data stands in.
    DemoUnavailable,
}

impl FeedState {
    pub fn is_demo(self) -> bool {
        matches!(self, FeedState::DemoEmpty | FeedState::DemoUnavailable)
    }

    pub fn notice(self) -> Option<&'static str> {
        match self {
            FeedState::DemoEmpty => Some("No mapped reports yet. Showing sample incidents."),
            FeedState::DemoUnavailable => {
                Some("Live reports are unavailable. Showing sample incidents.")
            }
            FeedState::Loading | FeedState::Live => None,
        }
    }
}

/// Decodes a JSON array of report documents as pushed by the live endpoint.
pub fn decode_snapshot(json: &str) -> Delivery {
    serde_json::from_str::<Vec<ReportDocument>>(json)
        .map(incidents_from_documents)
        .map_err(|e| FeedError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::Severity;

    #[test]
    fn decodes_snapshot_with_defaults() {
        let delivery = decode_snapshot(
            r#"[{"id":"a","type":"Flood","lat":1.5,"lng":2.5},{"id":"b","severity":"warning"}]"#,
        );
        let incidents = delivery.expect("decode");
        assert_eq!(incidents.len(), 2);
        assert!(incidents[0].is_mappable());
        assert_eq!(incidents[1].severity, Severity::Warning);
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        assert!(matches!(
            decode_snapshot("{not json"),
            Err(FeedError::Malformed(_))
        ));
    }

    #[test]
    fn channel_sender_is_a_sink() {
        let (tx, rx) = std::sync::mpsc::channel();
        tx.deliver(Ok(Vec::new()));
        assert_eq!(rx.recv().expect("delivery"), Ok(Vec::new()));
    }
}
