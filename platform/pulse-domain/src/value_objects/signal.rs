use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Long,
    Short,
    Neutral,
}

impl Signal {
    pub fn value(self) -> i8 {
        match self {
            Self::Long => 1,
            Self::Short => -1,
            Self::Neutral => 0,
        }
    }

    /// Accepts `-1`, `0`, `1` and their float spellings (`1.0`).
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| format!("invalid signal: {raw}"))?;
        Self::from_value(value)
    }

    pub fn from_value(value: f64) -> Result<Self, String> {
        if value == 1.0 {
            Ok(Self::Long)
        } else if value == -1.0 {
            Ok(Self::Short)
        } else if value == 0.0 {
            Ok(Self::Neutral)
        } else {
            Err(format!("invalid signal value: {value}"))
        }
    }

    pub fn distribution_label(self) -> &'static str {
        match self {
            Self::Long => "Long Signals",
            Self::Short => "Short Signals",
            Self::Neutral => "Neutral",
        }
    }
}
