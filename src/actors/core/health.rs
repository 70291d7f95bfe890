use chrono::{DateTime, Utc};

// ============================================================================
// Component Health
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            HealthStatus::Healthy => None,
            HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason) => Some(reason),
        }
    }
}

/// Last known state of one component, with how long it has been that way
#[derive(Debug, Clone)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub details: Option<String>,
    /// When `status` last changed
    pub since: DateTime<Utc>,
    pub last_check: DateTime<Utc>,
    /// Reports in a row that were not `Healthy`
    pub consecutive_failures: u32,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        let now = Utc::now();
        let consecutive_failures = if status.is_healthy() { 0 } else { 1 };
        Self {
            name: name.into(),
            status,
            details: None,
            since: now,
            last_check: now,
            consecutive_failures,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Fold in a new report. Returns true when the status changed.
    pub fn observe(&mut self, status: HealthStatus, details: Option<String>) -> bool {
        let now = Utc::now();
        self.last_check = now;
        if details.is_some() {
            self.details = details;
        }

        if status.is_healthy() {
            self.consecutive_failures = 0;
        } else {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        }

        if status == self.status {
            return false;
        }
        self.status = status;
        self.since = now;
        true
    }
}
