use serde::{Deserialize, Serialize};

/// Backtest window. The set is closed: the results directory always carries
/// one timeline file per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    LastMonth,
    #[serde(rename = "full_3mo")]
    Full3Mo,
    #[serde(rename = "prior_2mo")]
    Prior2Mo,
}

impl Period {
    /// Display order.
    pub const ALL: [Period; 3] = [Period::LastMonth, Period::Full3Mo, Period::Prior2Mo];

    pub fn id(self) -> &'static str {
        match self {
            Self::LastMonth => "last_month",
            Self::Full3Mo => "full_3mo",
            Self::Prior2Mo => "prior_2mo",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LastMonth => "Last Month",
            Self::Full3Mo => "Full 3 Months",
            Self::Prior2Mo => "Prior 2 Months",
        }
    }

    pub fn timeline_file(self) -> String {
        format!("timeline_{}.csv", self.id())
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        let normalized = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.id() == normalized)
            .ok_or_else(|| format!("unknown period: {value}"))
    }

    pub fn index(self) -> usize {
        match self {
            Self::LastMonth => 0,
            Self::Full3Mo => 1,
            Self::Prior2Mo => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::Period;

    #[test]
    fn parse_accepts_known_ids_and_rejects_others() {
        assert_eq!(Period::parse("last_month").unwrap(), Period::LastMonth);
        assert_eq!(Period::parse(" FULL_3MO ").unwrap(), Period::Full3Mo);
        assert_eq!(Period::parse("prior_2mo").unwrap(), Period::Prior2Mo);
        let err = Period::parse("last_year").expect_err("unknown id");
        assert!(err.contains("last_year"));
    }

    #[test]
    fn next_and_prev_cycle_in_display_order() {
        assert_eq!(Period::LastMonth.next(), Period::Full3Mo);
        assert_eq!(Period::Prior2Mo.next(), Period::LastMonth);
        assert_eq!(Period::LastMonth.prev(), Period::Prior2Mo);
    }

    #[test]
    fn timeline_file_follows_id() {
        assert_eq!(Period::Full3Mo.timeline_file(), "timeline_full_3mo.csv");
    }

    #[test]
    fn serde_uses_ids() {
        let json = serde_json::to_string(&Period::Prior2Mo).unwrap();
        assert_eq!(json, "\"prior_2mo\"");
        let back: Period = serde_json::from_str("\"last_month\"").unwrap();
        assert_eq!(back, Period::LastMonth);
    }
}
