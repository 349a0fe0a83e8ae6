use crate::incident::{Incident, Severity, Status};
use serde::Serialize;

/// Stat cards over the full live set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub active: usize,
    pub resolved: usize,
    pub critical: usize,
}

impl DashboardStats {
    pub fn from_incidents(incidents: &[Incident]) -> Self {
        Self {
            total: incidents.len(),
            active: incidents.iter().filter(|i| i.is_active()).count(),
            resolved: incidents
                .iter()
                .filter(|i| i.status == Status::Resolved)
                .count(),
            critical: incidents
                .iter()
                .filter(|i| i.severity == Severity::Critical)
                .count(),
        }
    }
}

/// Per-severity counts shown in the map sidebar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeverityBreakdown {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl SeverityBreakdown {
    pub fn from_incidents(incidents: &[Incident]) -> Self {
        let count = |s: Severity| incidents.iter().filter(|i| i.severity == s).count();
        Self {
            total: incidents.len(),
            critical: count(Severity::Critical),
            warning: count(Severity::Warning),
            info: count(Severity::Info),
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }

    /// Percentage of the total, with an empty set treated as a total of one.
    pub fn share(&self, severity: Severity) -> f64 {
        self.count(severity) as f64 * 100.0 / self.total.max(1) as f64
    }
}

/// The newest `n` records; the live set is already newest-first.
pub fn recent(incidents: &[Incident], n: usize) -> &[Incident] {
    &incidents[..incidents.len().min(n)]
}
