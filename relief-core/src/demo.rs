//! Built-in sample incidents, shown whenever there is nothing live to map.

use crate::incident::{Coordinates, Incident, IncidentType, Severity, Status};
use chrono::{DateTime, Duration, Utc};

struct DemoIncident {
    id: &'static str,
    kind: IncidentType,
    location: &'static str,
    lat: f64,
    lng: f64,
    severity: Severity,
    status: Status,
    affected: &'static str,
}

const DEMO_INCIDENTS: [DemoIncident; 6] = [
    DemoIncident {
        id: "s1",
        kind: IncidentType::Flood,
        location: "Chennai, Tamil Nadu",
        lat: 13.0827,
        lng: 80.2707,
        severity: Severity::Critical,
        status: Status::Pending,
        affected: "15,000+",
    },
    DemoIncident {
        id: "s2",
        kind: IncidentType::Cyclone,
        location: "Mumbai, Maharashtra",
        lat: 19.076,
        lng: 72.8777,
        severity: Severity::Warning,
        status: Status::Verified,
        affected: "8,500+",
    },
    DemoIncident {
        id: "s3",
        kind: IncidentType::Earthquake,
        location: "Delhi NCR",
        lat: 28.6139,
        lng: 77.209,
        severity: Severity::Info,
        status: Status::Resolved,
        affected: "500+",
    },
    DemoIncident {
        id: "s4",
        kind: IncidentType::Fire,
        location: "Bangalore, Karnataka",
        lat: 12.9716,
        lng: 77.5946,
        severity: Severity::Warning,
        status: Status::Pending,
        affected: "1,200+",
    },
    DemoIncident {
        id: "s5",
        kind: IncidentType::Flood,
        location: "Kolkata, West Bengal",
        lat: 22.5726,
        lng: 88.3639,
        severity: Severity::Critical,
        status: Status::Pending,
        affected: "22,000+",
    },
    DemoIncident {
        id: "s6",
        kind: IncidentType::Drought,
        location: "Hyderabad, Telangana",
        lat: 17.385,
        lng: 78.4867,
        severity: Severity::Warning,
        status: Status::Verified,
        affected: "45,000+",
    },
];

pub fn demo_incidents() -> Vec<Incident> {
    DEMO_INCIDENTS
        .iter()
        .map(|d| Incident {
            id: d.id.to_string(),
            kind: d.kind,
            location: d.location.to_string(),
            coordinates: Some(Coordinates::new(d.lat, d.lng)),
            severity: d.severity,
            status: d.status,
            description: String::new(),
            timestamp: None,
            affected_people: Some(d.affected.to_string()),
            contact_phone: None,
        })
        .collect()
}

/// Sample alerts for the alerts feed, timed relative to `now`.
pub fn sample_alerts(now: DateTime<Utc>) -> Vec<Incident> {
    let alert = |id: &str,
                 kind: IncidentType,
                 location: &str,
                 description: &str,
                 severity: Severity,
                 hours_ago: i64| Incident {
        id: id.to_string(),
        kind,
        location: location.to_string(),
        coordinates: None,
        severity,
        status: Status::Pending,
        description: description.to_string(),
        timestamp: Some(now - Duration::hours(hours_ago)),
        affected_people: None,
        contact_phone: None,
    };

    vec![
        alert(
            "1",
            IncidentType::Flood,
            "Chennai, Tamil Nadu",
            "Heavy flooding reported in low-lying areas. Emergency evacuation in progress.",
            Severity::Critical,
            2,
        ),
        alert(
            "2",
            IncidentType::Cyclone,
            "Mumbai, Maharashtra",
            "Cyclone warning issued. Expected landfall in 12 hours.",
            Severity::Warning,
            5,
        ),
        alert(
            "3",
            IncidentType::Earthquake,
            "Delhi NCR",
            "Minor tremors detected. No significant damage reported.",
            Severity::Info,
            24,
        ),
        alert(
            "4",
            IncidentType::Fire,
            "Bangalore, Karnataka",
            "Industrial fire contained. Fire department on scene.",
            Severity::Warning,
            6,
        ),
        alert(
            "5",
            IncidentType::Flood,
            "Kolkata, West Bengal",
            "River levels rising rapidly. Alert for riverside communities.",
            Severity::Critical,
            3,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn demo_set_has_six_distinct_mappable_incidents() {
        let demo = demo_incidents();
        assert_eq!(demo.len(), 6);
        assert!(demo.iter().all(Incident::is_mappable));

        let ids: BTreeSet<_> = demo.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn demo_set_spans_types_and_severities() {
        let demo = demo_incidents();
        let kinds: BTreeSet<_> = demo.iter().map(|i| i.kind.as_str()).collect();
        let severities: BTreeSet<_> = demo.iter().map(|i| i.severity).collect();
        assert!(kinds.len() >= 4);
        assert_eq!(severities.len(), 3);
    }

    #[test]
    fn sample_alerts_are_in_the_past() {
        let now = Utc::now();
        let alerts = sample_alerts(now);
        assert_eq!(alerts.len(), 5);
        assert!(alerts.iter().all(|a| a.timestamp.is_some_and(|t| t < now)));
    }
}
