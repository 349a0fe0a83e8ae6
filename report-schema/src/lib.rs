use serde::{Deserialize, Serialize};

/// A report as it is stored and exchanged on the wire.
///
/// Everything except `id` is optional here; defaults are filled in when the
/// document is turned into a domain incident, never on the wire.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// RFC 3339, assigned by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_people: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

/// Body of a new report submission. Status and timestamp are never taken
/// from the client.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReport {
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub affected_people: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

/// Field-level update. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ReportPatch {
    pub fn status(status: &str) -> Self {
        Self {
            status: Some(status.to_string()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.location.is_none()
            && self.severity.is_none()
            && self.status.is_none()
            && self.description.is_none()
    }
}

pub fn validate_submission(report: &SubmitReport) -> Result<(), String> {
    if report.kind.trim().is_empty()
        || report.location.trim().is_empty()
        || report.description.trim().is_empty()
    {
        return Err("Please fill in all required fields.".into());
    }
    match (report.lat, report.lng) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng)) => validate_coordinates(lat, lng),
        _ => Err("latitude and longitude must be given together".into()),
    }
}

pub fn validate_patch(patch: &ReportPatch) -> Result<(), String> {
    if patch.is_empty() {
        return Err("patch has no fields".into());
    }
    for (name, value) in [
        ("type", &patch.kind),
        ("location", &patch.location),
        ("description", &patch.description),
    ] {
        if let Some(v) = value {
            if v.trim().is_empty() {
                return Err(format!("{name} cannot be empty"));
            }
        }
    }
    Ok(())
}

pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), String> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(format!("invalid latitude '{lat}'"));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("invalid longitude '{lng}'"));
    }
    Ok(())
}
