use crate::error::ValidationError;
use chrono::{DateTime, SecondsFormat, Utc};
use report_schema::{ReportDocument, ReportPatch, SubmitReport};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentType {
    Flood,
    Earthquake,
    Cyclone,
    Fire,
    Landslide,
    Drought,
    Tsunami,
    Other,
}

impl IncidentType {
    pub const ALL: [IncidentType; 8] = [
        IncidentType::Flood,
        IncidentType::Earthquake,
        IncidentType::Cyclone,
        IncidentType::Fire,
        IncidentType::Landslide,
        IncidentType::Drought,
        IncidentType::Tsunami,
        IncidentType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IncidentType::Flood => "Flood",
            IncidentType::Earthquake => "Earthquake",
            IncidentType::Cyclone => "Cyclone",
            IncidentType::Fire => "Fire",
            IncidentType::Landslide => "Landslide",
            IncidentType::Drought => "Drought",
            IncidentType::Tsunami => "Tsunami",
            IncidentType::Other => "Other",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value))
    }

    /// Unknown or missing types are shown as `Other`.
    pub fn or_default(value: Option<&str>) -> Self {
        value.and_then(Self::from_wire).unwrap_or(IncidentType::Other)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Warning, Severity::Critical];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "info" => Some(Severity::Info),
            "warning" => Some(Severity::Warning),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn or_default(value: Option<&str>) -> Self {
        value.and_then(Self::from_wire).unwrap_or_default()
    }

    /// Label used in the admin selectors and map stats.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "Low",
            Severity::Warning => "Medium",
            Severity::Critical => "Critical",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Pending,
    Verified,
    Resolved,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::Verified, Status::Resolved];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Verified => "verified",
            Status::Resolved => "resolved",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Status::Pending),
            "verified" => Some(Status::Verified),
            "resolved" => Some(Status::Resolved),
            _ => None,
        }
    }

    pub fn or_default(value: Option<&str>) -> Self {
        value.and_then(Self::from_wire).unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Verified => "Verified",
            Status::Resolved => "Resolved",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both halves must be present and finite to be mappable.
    pub fn from_pair(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some(Self { lat, lng }),
            _ => None,
        }
    }

    /// Rounds both halves to 6 decimal places (about 11 cm).
    pub fn rounded(self) -> Self {
        let round = |v: f64| (v * 1e6).round() / 1e6;
        Self {
            lat: round(self.lat),
            lng: round(self.lng),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub kind: IncidentType,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub severity: Severity,
    pub status: Status,
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub affected_people: Option<String>,
    pub contact_phone: Option<String>,
}

impl Incident {
    /// The single place where missing or unrecognized wire values get their
    /// defaults. Nothing downstream re-checks them.
    pub fn from_document(doc: ReportDocument) -> Self {
        Self {
            coordinates: Coordinates::from_pair(doc.lat, doc.lng),
            kind: IncidentType::or_default(doc.kind.as_deref()),
            severity: Severity::or_default(doc.severity.as_deref()),
            status: Status::or_default(doc.status.as_deref()),
            timestamp: doc.timestamp.as_deref().and_then(parse_timestamp),
            location: doc.location.unwrap_or_default(),
            description: doc.description.unwrap_or_default(),
            affected_people: doc.affected_people.filter(|v| !v.trim().is_empty()),
            contact_phone: doc.contact_phone.filter(|v| !v.trim().is_empty()),
            id: doc.id,
        }
    }

    pub fn to_document(&self) -> ReportDocument {
        ReportDocument {
            id: self.id.clone(),
            kind: Some(self.kind.as_str().to_string()),
            location: Some(self.location.clone()),
            lat: self.coordinates.map(|c| c.lat),
            lng: self.coordinates.map(|c| c.lng),
            severity: Some(self.severity.as_str().to_string()),
            status: Some(self.status.as_str().to_string()),
            description: Some(self.description.clone()),
            timestamp: self.timestamp.map(format_timestamp),
            affected_people: self.affected_people.clone(),
            contact_phone: self.contact_phone.clone(),
        }
    }

    pub fn is_mappable(&self) -> bool {
        self.coordinates.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.status != Status::Resolved
    }
}

pub fn incidents_from_documents(docs: Vec<ReportDocument>) -> Vec<Incident> {
    docs.into_iter().map(Incident::from_document).collect()
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// A report accepted for creation. The store assigns id, timestamp and the
/// initial `pending` status.
#[derive(Clone, Debug, PartialEq)]
pub struct NewIncident {
    pub kind: IncidentType,
    pub location: String,
    pub description: String,
    pub severity: Severity,
    pub coordinates: Option<Coordinates>,
    pub affected_people: Option<String>,
    pub contact_phone: Option<String>,
}

impl NewIncident {
    pub fn from_submission(report: SubmitReport) -> Result<Self, ValidationError> {
        report_schema::validate_submission(&report).map_err(|e| {
            if report.kind.trim().is_empty()
                || report.location.trim().is_empty()
                || report.description.trim().is_empty()
            {
                ValidationError::MissingRequired
            } else {
                ValidationError::InvalidCoordinates(e)
            }
        })?;

        let kind =
            IncidentType::from_wire(&report.kind).ok_or_else(|| ValidationError::UnknownValue {
                field: "type",
                value: report.kind.clone(),
            })?;
        // An absent or blank severity means info; anything else must be known.
        let severity = match report.severity.as_deref().map(str::trim) {
            None | Some("") => Severity::default(),
            Some(v) => Severity::from_wire(v).ok_or_else(|| ValidationError::UnknownValue {
                field: "severity",
                value: v.to_string(),
            })?,
        };

        Ok(Self {
            kind,
            location: report.location.trim().to_string(),
            description: report.description.trim().to_string(),
            severity,
            coordinates: Coordinates::from_pair(report.lat, report.lng),
            affected_people: non_blank(report.affected_people),
            contact_phone: non_blank(report.contact_phone),
        })
    }

    pub fn to_submission(&self) -> SubmitReport {
        SubmitReport {
            kind: self.kind.as_str().to_string(),
            location: self.location.clone(),
            description: self.description.clone(),
            severity: Some(self.severity.as_str().to_string()),
            lat: self.coordinates.map(|c| c.lat),
            lng: self.coordinates.map(|c| c.lng),
            affected_people: self.affected_people.clone(),
            contact_phone: self.contact_phone.clone(),
        }
    }
}

/// Field-level update used by the edit row and the status selector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IncidentPatch {
    pub kind: Option<IncidentType>,
    pub location: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<Status>,
    pub description: Option<String>,
}

impl IncidentPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Writes are strict: an unknown enum value is an error, not a default.
    pub fn from_wire(patch: ReportPatch) -> Result<Self, ValidationError> {
        report_schema::validate_patch(&patch).map_err(ValidationError::Rejected)?;

        let kind = patch
            .kind
            .as_deref()
            .map(|v| {
                IncidentType::from_wire(v).ok_or_else(|| ValidationError::UnknownValue {
                    field: "type",
                    value: v.to_string(),
                })
            })
            .transpose()?;
        let severity = patch
            .severity
            .as_deref()
            .map(|v| {
                Severity::from_wire(v).ok_or_else(|| ValidationError::UnknownValue {
                    field: "severity",
                    value: v.to_string(),
                })
            })
            .transpose()?;
        let status = patch
            .status
            .as_deref()
            .map(|v| {
                Status::from_wire(v).ok_or_else(|| ValidationError::UnknownValue {
                    field: "status",
                    value: v.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            kind,
            location: patch.location.map(|v| v.trim().to_string()),
            severity,
            status,
            description: patch.description.map(|v| v.trim().to_string()),
        })
    }

    pub fn to_wire(&self) -> ReportPatch {
        ReportPatch {
            kind: self.kind.map(|k| k.as_str().to_string()),
            location: self.location.clone(),
            severity: self.severity.map(|s| s.as_str().to_string()),
            status: self.status.map(|s| s.as_str().to_string()),
            description: self.description.clone(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> ReportDocument {
        ReportDocument {
            id: id.into(),
            ..ReportDocument::default()
        }
    }

    #[test]
    fn missing_fields_take_documented_defaults() {
        let incident = Incident::from_document(doc("r1"));
        assert_eq!(incident.severity, Severity::Info);
        assert_eq!(incident.status, Status::Pending);
        assert_eq!(incident.kind, IncidentType::Other);
        assert_eq!(incident.coordinates, None);
        assert_eq!(incident.timestamp, None);
    }

    #[test]
    fn unrecognized_values_are_defaulted_not_rejected() {
        let incident = Incident::from_document(ReportDocument {
            severity: Some("apocalyptic".into()),
            status: Some("Monitoring".into()),
            kind: Some("volcano".into()),
            ..doc("r2")
        });
        assert_eq!(incident.severity, Severity::Info);
        assert_eq!(incident.status, Status::Pending);
        assert_eq!(incident.kind, IncidentType::Other);
    }

    #[test]
    fn wire_values_are_case_insensitive() {
        let incident = Incident::from_document(ReportDocument {
            severity: Some("CRITICAL".into()),
            status: Some(" Resolved ".into()),
            kind: Some("flood".into()),
            ..doc("r3")
        });
        assert_eq!(incident.severity, Severity::Critical);
        assert_eq!(incident.status, Status::Resolved);
        assert_eq!(incident.kind, IncidentType::Flood);
    }

    #[test]
    fn coordinates_need_both_halves() {
        let only_lat = Incident::from_document(ReportDocument {
            lat: Some(10.0),
            ..doc("a")
        });
        assert!(!only_lat.is_mappable());

        let nan = Incident::from_document(ReportDocument {
            lat: Some(f64::NAN),
            lng: Some(1.0),
            ..doc("b")
        });
        assert!(!nan.is_mappable());

        let both = Incident::from_document(ReportDocument {
            lat: Some(0.0),
            lng: Some(0.0),
            ..doc("c")
        });
        assert_eq!(both.coordinates, Some(Coordinates::new(0.0, 0.0)));
    }

    #[test]
    fn rounding_keeps_six_decimals() {
        let c = Coordinates::new(10.123_456_789, -20.000_000_4).rounded();
        assert_eq!(c, Coordinates::new(10.123_457, -20.0));
    }

    #[test]
    fn document_conversion_preserves_timestamp() {
        let incident = Incident::from_document(ReportDocument {
            timestamp: Some("2024-05-01T10:00:00.000000Z".into()),
            kind: Some("Fire".into()),
            ..doc("r4")
        });
        let back = incident.to_document();
        assert_eq!(back.timestamp.as_deref(), Some("2024-05-01T10:00:00.000000Z"));
        assert_eq!(back.kind.as_deref(), Some("Fire"));
        assert_eq!(back.status.as_deref(), Some("pending"));
    }

    #[test]
    fn blank_required_fields_are_missing_required() {
        let err = NewIncident::from_submission(SubmitReport {
            kind: "Flood".into(),
            location: String::new(),
            description: "water".into(),
            ..SubmitReport::default()
        })
        .expect_err("should fail");
        assert_eq!(err, ValidationError::MissingRequired);
    }

    #[test]
    fn submission_rejects_unknown_type_and_severity() {
        let report = SubmitReport {
            kind: "Volcano".into(),
            location: "Test City".into(),
            description: "ash".into(),
            ..SubmitReport::default()
        };
        let err = NewIncident::from_submission(report.clone()).expect_err("unknown type");
        assert_eq!(
            err,
            ValidationError::UnknownValue { field: "type", value: "Volcano".into() }
        );

        let err = NewIncident::from_submission(SubmitReport {
            kind: "Fire".into(),
            severity: Some("catastrophic".into()),
            ..report.clone()
        })
        .expect_err("unknown severity");
        assert!(matches!(err, ValidationError::UnknownValue { field: "severity", .. }));

        let new = NewIncident::from_submission(SubmitReport {
            kind: "Fire".into(),
            severity: Some(" ".into()),
            ..report
        })
        .expect("blank severity defaults");
        assert_eq!(new.severity, Severity::Info);
    }

    #[test]
    fn submission_trims_and_drops_blank_optionals() {
        let new = NewIncident::from_submission(SubmitReport {
            kind: "Flood".into(),
            location: " Test City ".into(),
            description: "Test".into(),
            severity: Some("critical".into()),
            lat: Some(10.0),
            lng: Some(20.0),
            affected_people: Some("  ".into()),
            contact_phone: Some("555-0100".into()),
        })
        .expect("valid");
        assert_eq!(new.location, "Test City");
        assert_eq!(new.severity, Severity::Critical);
        assert_eq!(new.coordinates, Some(Coordinates::new(10.0, 20.0)));
        assert_eq!(new.affected_people, None);
        assert_eq!(new.contact_phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn patch_rejects_unknown_status() {
        let err = IncidentPatch::from_wire(ReportPatch::status("archived")).expect_err("unknown");
        assert!(matches!(err, ValidationError::UnknownValue { field: "status", .. }));

        let ok = IncidentPatch::from_wire(ReportPatch::status("resolved")).expect("known");
        assert_eq!(ok, IncidentPatch::status(Status::Resolved));
    }
}
