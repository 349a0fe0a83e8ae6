use crate::error::{FeedError, ValidationError};
use crate::feed::{Delivery, SnapshotSink};
use crate::incident::{format_timestamp, Incident, IncidentPatch, NewIncident, Status};
use chrono::Utc;
use report_schema::ReportDocument;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("report '{0}' not found")]
    NotFound(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

type Subscribers = Mutex<Vec<(u64, Arc<dyn SnapshotSink>)>>;

/// SQLite-backed report collection with live full-snapshot subscriptions.
#[derive(Clone)]
pub struct ReportStore {
    db_path: Arc<PathBuf>,
    subscribers: Arc<Subscribers>,
    next_subscriber: Arc<AtomicU64>,
}

/// Live interest in the report set. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    subscribers: Weak<Subscribers>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(subscribers) = self.subscribers.upgrade() else {
            return;
        };
        if let Ok(mut guard) = subscribers.lock() {
            guard.retain(|(id, _)| *id != self.id);
        }
        tracing::debug!(subscriber = self.id, "unsubscribed");
    }
}

impl ReportStore {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db_path = PathBuf::from(path);
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            CREATE TABLE IF NOT EXISTS reports (
                id TEXT PRIMARY KEY,
                type TEXT NOT NULL,
                location TEXT NOT NULL,
                lat REAL,
                lng REAL,
                severity TEXT NOT NULL,
                status TEXT NOT NULL,
                description TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                affected_people TEXT,
                contact_phone TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_reports_ts ON reports(timestamp);
            ",
        )?;

        tracing::info!(path = %db_path.display(), "report store opened");
        Ok(Self {
            db_path: Arc::new(db_path),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_subscriber: Arc::new(AtomicU64::new(1)),
        })
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&*self.db_path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Assigns id, server timestamp and `pending` status.
    pub fn create(&self, new: NewIncident) -> Result<Incident, StoreError> {
        let incident = Incident {
            id: uuid::Uuid::new_v4().to_string(),
            kind: new.kind,
            location: new.location,
            coordinates: new.coordinates,
            severity: new.severity,
            status: Status::Pending,
            description: new.description,
            timestamp: Some(Utc::now()),
            affected_people: new.affected_people,
            contact_phone: new.contact_phone,
        };

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO reports
                (id, type, location, lat, lng, severity, status, description, timestamp,
                 affected_people, contact_phone)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                incident.id,
                incident.kind.as_str(),
                incident.location,
                incident.coordinates.map(|c| c.lat),
                incident.coordinates.map(|c| c.lng),
                incident.severity.as_str(),
                incident.status.as_str(),
                incident.description,
                incident.timestamp.map(format_timestamp),
                incident.affected_people,
                incident.contact_phone,
            ],
        )?;

        tracing::info!(id = %incident.id, kind = incident.kind.as_str(), "report created");
        self.publish();
        Ok(incident)
    }

    /// Merges the named fields into an existing report.
    pub fn update(&self, id: &str, patch: IncidentPatch) -> Result<(), StoreError> {
        let mut sets = Vec::new();
        let mut values: Vec<String> = Vec::new();
        if let Some(kind) = patch.kind {
            sets.push("type");
            values.push(kind.as_str().to_string());
        }
        if let Some(location) = patch.location {
            sets.push("location");
            values.push(location);
        }
        if let Some(severity) = patch.severity {
            sets.push("severity");
            values.push(severity.as_str().to_string());
        }
        if let Some(status) = patch.status {
            sets.push("status");
            values.push(status.as_str().to_string());
        }
        if let Some(description) = patch.description {
            sets.push("description");
            values.push(description);
        }
        if sets.is_empty() {
            return Err(ValidationError::Rejected("patch has no fields".into()).into());
        }

        let assignments: Vec<String> = sets
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{col} = ?{}", i + 1))
            .collect();
        let sql = format!(
            "UPDATE reports SET {} WHERE id = ?{}",
            assignments.join(", "),
            sets.len() + 1
        );
        values.push(id.to_string());

        let conn = self.connect()?;
        let changed = conn.execute(&sql, rusqlite::params_from_iter(values.iter()))?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        tracing::info!(id, fields = ?sets, "report updated");
        self.publish();
        Ok(())
    }

    /// Removes a report. Returns whether it existed; a missing id is not an error.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.connect()?;
        let removed = conn.execute("DELETE FROM reports WHERE id = ?1", params![id])? > 0;
        if removed {
            tracing::info!(id, "report deleted");
            self.publish();
        } else {
            tracing::debug!(id, "delete of missing report");
        }
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Result<Option<Incident>, StoreError> {
        let conn = self.connect()?;
        let doc = conn
            .query_row(
                &format!("{SELECT_REPORTS} WHERE id = ?1"),
                params![id],
                map_row,
            )
            .optional()?;
        Ok(doc.map(Incident::from_document))
    }

    /// Full set as stored, newest first.
    pub fn documents(&self) -> Result<Vec<ReportDocument>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_REPORTS} ORDER BY timestamp DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], map_row)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn list(&self) -> Result<Vec<Incident>, StoreError> {
        self.documents()
            .map(|docs| docs.into_iter().map(Incident::from_document).collect())
    }

    /// Delivers the current set right away and again after every write.
    ///
    /// Registration and the first read happen under the subscriber lock that
    /// `publish` takes, so a write landing in between is delivered afterwards.
    pub fn subscribe(&self, sink: impl SnapshotSink) -> Subscription {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let sink: Arc<dyn SnapshotSink> = Arc::new(sink);
        match self.subscribers.lock() {
            Ok(mut guard) => {
                guard.push((id, sink.clone()));
                sink.deliver(self.snapshot());
            }
            Err(_) => sink.deliver(Err(FeedError::Unavailable(
                "subscriber registry poisoned".into(),
            ))),
        }
        tracing::debug!(subscriber = id, "subscribed");
        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|g| g.len()).unwrap_or(0)
    }

    fn snapshot(&self) -> Delivery {
        self.list().map_err(|e| {
            tracing::error!(error = %e, "failed to read snapshot");
            FeedError::Unavailable(e.to_string())
        })
    }

    fn publish(&self) {
        let Ok(guard) = self.subscribers.lock() else {
            return;
        };
        if guard.is_empty() {
            return;
        }
        let delivery = self.snapshot();
        for (_, sink) in guard.iter() {
            sink.deliver(delivery.clone());
        }
    }
}

const SELECT_REPORTS: &str = "SELECT id, type, location, lat, lng, severity, status, description,
        timestamp, affected_people, contact_phone
 FROM reports";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportDocument> {
    Ok(ReportDocument {
        id: row.get(0)?,
        kind: row.get(1)?,
        location: row.get(2)?,
        lat: row.get(3)?,
        lng: row.get(4)?,
        severity: row.get(5)?,
        status: row.get(6)?,
        description: row.get(7)?,
        timestamp: row.get(8)?,
        affected_people: row.get(9)?,
        contact_phone: row.get(10)?,
    })
}
