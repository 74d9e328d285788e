use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pollution alert level a subscriber opts into.
///
/// Levels are ordered by severity: a subscriber at `Amber` is alerted for
/// amber and red readings but not for green or yellow ones.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    #[default]
    Green,
    Yellow,
    Amber,
    Red,
}

impl AlertLevel {
    pub const ALL: [AlertLevel; 4] = [
        AlertLevel::Green,
        AlertLevel::Yellow,
        AlertLevel::Amber,
        AlertLevel::Red,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Amber => "amber",
            Self::Red => "red",
        }
    }

    /// Whether a subscriber at `self` should hear about a reading at `current`.
    pub fn is_alerted_by(self, current: AlertLevel) -> bool {
        current >= self
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Green => "every alert, including low pollution",
            Self::Yellow => "moderate pollution and above",
            Self::Amber => "high pollution and above",
            Self::Red => "very high pollution only",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown alert level '{0}', expected one of green, yellow, amber, red")]
pub struct UnknownAlertLevel(pub String);

impl FromStr for AlertLevel {
    type Err = UnknownAlertLevel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownAlertLevel(raw.to_string()))
    }
}

/// Marketing-consent flag, rendered the way an HTML checkbox submits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptIn {
    On,
    #[default]
    Off,
}

impl OptIn {
    /// A checkbox field is "on" when present with any value other than an
    /// explicit negative.
    pub fn from_checkbox(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => Self::Off,
            Some(v)
                if v.is_empty()
                    || v.eq_ignore_ascii_case("off")
                    || v.eq_ignore_ascii_case("false")
                    || v.eq_ignore_ascii_case("no")
                    || v == "0" =>
            {
                Self::Off
            }
            Some(_) => Self::On,
        }
    }

    pub fn is_on(self) -> bool {
        self == Self::On
    }

    pub fn is_off(&self) -> bool {
        *self == Self::Off
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for OptIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Masks a phone number for logs, keeping only the last three digits.
pub fn redact_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= 3 {
        return "*".repeat(digits.len());
    }
    let tail: String = digits[digits.len() - 3..].iter().collect();
    format!("{}{tail}", "*".repeat(digits.len() - 3))
}
