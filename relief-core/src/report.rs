use crate::error::ValidationError;
use crate::incident::{Coordinates, IncidentType, NewIncident, Severity};
use report_schema::SubmitReport;

/// How long a geolocation lookup may take before it fails.
pub const GEOLOCATION_TIMEOUT_MS: u32 = 10_000;

pub fn format_coordinate(value: f64) -> String {
    format!("{value:.6}")
}

/// Raw form state. Everything stays text until submit.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportDraft {
    pub kind: String,
    pub location: String,
    pub description: String,
    pub severity: Severity,
    pub lat: String,
    pub lng: String,
    pub affected_people: String,
    pub contact_phone: String,
}

impl Default for ReportDraft {
    fn default() -> Self {
        Self {
            kind: String::new(),
            location: String::new(),
            description: String::new(),
            severity: Severity::Info,
            lat: String::new(),
            lng: String::new(),
            affected_people: String::new(),
            contact_phone: String::new(),
        }
    }
}

impl ReportDraft {
    /// Starts a draft pre-filled from the report route's query.
    pub fn prefilled(lat: Option<&str>, lng: Option<&str>) -> Self {
        let mut draft = Self::default();
        if let (Some(lat), Some(lng)) = (lat, lng) {
            draft.lat = lat.to_string();
            draft.lng = lng.to_string();
        }
        draft
    }

    pub fn apply_fix(&mut self, fix: Coordinates) {
        self.lat = format_coordinate(fix.lat);
        self.lng = format_coordinate(fix.lng);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn coordinates(&self) -> Result<Option<Coordinates>, ValidationError> {
        let lat = self.lat.trim();
        let lng = self.lng.trim();
        if lat.is_empty() && lng.is_empty() {
            return Ok(None);
        }
        let parse = |v: &str, name: &str| {
            v.parse::<f64>().map_err(|_| {
                ValidationError::InvalidCoordinates(format!("{name} must be a number"))
            })
        };
        let lat = parse(lat, "Latitude")?;
        let lng = parse(lng, "Longitude")?;
        report_schema::validate_coordinates(lat, lng)
            .map_err(ValidationError::InvalidCoordinates)?;
        Ok(Some(Coordinates::new(lat, lng)))
    }

    /// Checks the draft locally; nothing invalid reaches the backend.
    pub fn validate(&self) -> Result<NewIncident, ValidationError> {
        if self.kind.trim().is_empty()
            || self.location.trim().is_empty()
            || self.description.trim().is_empty()
        {
            return Err(ValidationError::MissingRequired);
        }
        let kind = IncidentType::from_wire(&self.kind).ok_or_else(|| {
            ValidationError::UnknownValue {
                field: "type",
                value: self.kind.clone(),
            }
        })?;
        let coordinates = self.coordinates()?;

        NewIncident::from_submission(SubmitReport {
            kind: kind.as_str().to_string(),
            location: self.location.clone(),
            description: self.description.clone(),
            severity: Some(self.severity.as_str().to_string()),
            lat: coordinates.map(|c| c.lat),
            lng: coordinates.map(|c| c.lng),
            affected_people: Some(self.affected_people.clone()),
            contact_phone: Some(self.contact_phone.clone()),
        })
    }
}
