use crate::incident::{Coordinates, Incident, IncidentType, Severity, Status};

pub const CRITICAL_MARKER_SIZE: u32 = 40;
pub const MARKER_SIZE: u32 = 30;

/// Marker color is stable per incident type.
pub fn type_color(kind: IncidentType) -> &'static str {
    match kind {
        IncidentType::Flood => "#3b82f6",
        IncidentType::Fire => "#ef4444",
        IncidentType::Earthquake => "#8b5cf6",
        IncidentType::Cyclone => "#06b6d4",
        IncidentType::Landslide => "#a16207",
        IncidentType::Drought => "#f59e0b",
        IncidentType::Tsunami => "#0891b2",
        IncidentType::Other => "#6b7280",
    }
}

/// Accent used by list indicators and stat bars.
pub fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "#f43f5e",
        Severity::Warning => "#f59e0b",
        Severity::Info => "#3b82f6",
    }
}

/// (background, foreground) of the severity pill in popups.
pub fn severity_badge(severity: Severity) -> (&'static str, &'static str) {
    match severity {
        Severity::Critical => ("#fee2e2", "#dc2626"),
        Severity::Warning => ("#fef3c7", "#d97706"),
        Severity::Info => ("#dbeafe", "#2563eb"),
    }
}

/// CSS class of the status select in the admin table.
pub fn status_class(status: Status) -> &'static str {
    match status {
        Status::Pending => "status-pending",
        Status::Verified => "status-verified",
        Status::Resolved => "status-resolved",
    }
}

/// Everything a map surface needs to draw one incident.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerSpec {
    pub id: String,
    pub position: Coordinates,
    pub color: &'static str,
    pub size: u32,
    pub pulse_rings: u8,
    pub popup_html: String,
}

impl MarkerSpec {
    pub fn for_incident(incident: &Incident) -> Option<Self> {
        let position = incident.coordinates?;
        let (size, pulse_rings) = match incident.severity {
            Severity::Critical => (CRITICAL_MARKER_SIZE, 2),
            Severity::Warning => (MARKER_SIZE, 1),
            Severity::Info => (MARKER_SIZE, 0),
        };
        Some(Self {
            id: incident.id.clone(),
            position,
            color: type_color(incident.kind),
            size,
            pulse_rings,
            popup_html: popup_html(incident),
        })
    }

    pub fn icon_html(&self) -> String {
        let mut rings = String::new();
        for i in 0..self.pulse_rings {
            let class = if i == 0 { "pulse-ring" } else { "pulse-ring delay" };
            rings.push_str(&format!(r#"<div class="{class}"></div>"#));
        }
        format!(
            r#"<div class="pulse-marker" style="--color: {color}; --size: {size}px;">{rings}<div class="marker-dot" style="background: {color};"></div></div>"#,
            color = self.color,
            size = self.size,
        )
    }
}

pub fn popup_html(incident: &Incident) -> String {
    let color = type_color(incident.kind);
    let (badge_bg, badge_fg) = severity_badge(incident.severity);
    format!(
        concat!(
            r#"<div class="incident-popup">"#,
            r#"<strong style="color: {color};">{kind}</strong>"#,
            r#"<div class="incident-popup-location">{location}</div>"#,
            r#"<div class="incident-popup-tags">"#,
            r#"<span class="incident-popup-severity" style="background: {badge_bg}; color: {badge_fg};">{severity}</span>"#,
            r#"<span class="incident-popup-status">{status}</span>"#,
            r#"</div></div>"#,
        ),
        color = color,
        kind = incident.kind.as_str(),
        location = escape_html(&incident.location),
        badge_bg = badge_bg,
        badge_fg = badge_fg,
        severity = incident.severity.as_str(),
        status = incident.status.as_str(),
    )
}

/// Location text is user supplied and ends up inside Leaflet's innerHTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_incidents;

    fn incident(severity: Severity) -> Incident {
        let mut i = demo_incidents().remove(0);
        i.severity = severity;
        i
    }

    #[test]
    fn color_follows_type_not_severity() {
        let critical = MarkerSpec::for_incident(&incident(Severity::Critical)).expect("mappable");
        let info = MarkerSpec::for_incident(&incident(Severity::Info)).expect("mappable");
        assert_eq!(critical.color, info.color);
        assert_eq!(critical.color, type_color(IncidentType::Flood));
    }

    #[test]
    fn critical_markers_are_larger_and_pulse_more() {
        let critical = MarkerSpec::for_incident(&incident(Severity::Critical)).expect("mappable");
        let warning = MarkerSpec::for_incident(&incident(Severity::Warning)).expect("mappable");
        assert!(critical.size > warning.size);
        assert!(critical.pulse_rings > warning.pulse_rings);
        assert!(critical.icon_html().contains("pulse-ring delay"));
    }

    #[test]
    fn no_marker_without_coordinates() {
        let mut i = incident(Severity::Info);
        i.coordinates = None;
        assert!(MarkerSpec::for_incident(&i).is_none());
    }

    #[test]
    fn popup_summarizes_and_escapes() {
        let mut i = incident(Severity::Warning);
        i.location = "<script>alert(1)</script>".into();
        let html = popup_html(&i);
        assert!(html.contains("Flood"));
        assert!(html.contains("warning"));
        assert!(html.contains("pending"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
