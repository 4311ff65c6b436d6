/// Result of one unit of work (a source fetch, an article enrichment).
///
/// Units never propagate errors upward. They report how they went and the
/// scout decides what to log and count.
#[derive(Debug)]
pub enum UnitOutcome<T> {
    Success(T),
    /// Usable value built from fallbacks.
    Degraded { value: T, reason: String },
    /// Nothing usable was produced.
    Failed { reason: String },
}

impl<T> UnitOutcome<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        UnitOutcome::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        UnitOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            UnitOutcome::Success(v) | UnitOutcome::Degraded { value: v, .. } => Some(v),
            UnitOutcome::Failed { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            UnitOutcome::Success(_) => None,
            UnitOutcome::Degraded { reason, .. } | UnitOutcome::Failed { reason } => Some(reason),
        }
    }
}
