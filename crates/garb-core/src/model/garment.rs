use super::id::{GarmentId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Where a garment currently is in its wardrobe lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Laundry,
    Stored,
    Donated,
    Discarded,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Laundry => "laundry",
            Self::Stored => "stored",
            Self::Donated => "donated",
            Self::Discarded => "discarded",
        }
    }

    /// All statuses, in display order.
    pub const ALL: [Self; 5] = [
        Self::Active,
        Self::Laundry,
        Self::Stored,
        Self::Donated,
        Self::Discarded,
    ];
}

impl Default for Status {
    fn default() -> Self {
        Self::Active
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "laundry" => Ok(Self::Laundry),
            "stored" => Ok(Self::Stored),
            "donated" => Ok(Self::Donated),
            "discarded" => Ok(Self::Discarded),
            other => Err(format!(
                "unknown status '{other}': expected one of active, laundry, stored, donated, discarded"
            )),
        }
    }
}

/// A cataloged garment: the scalar attributes rules may query, plus tags
/// (stored in the `garment_tags` edge table and hydrated on read).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Garment {
    pub id: GarmentId,
    pub user_id: UserId,
    pub name: String,
    pub category: String,
    pub material: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub brand: Option<String>,
    /// Purchase date, when known.
    pub purchased: Option<NaiveDate>,
    /// Cost in cents, when known.
    pub cost_cents: Option<i64>,
    pub care: Option<String>,
    pub status: Status,
    pub notes: Option<String>,
    /// Names of the tags attached to this garment.
    pub tags: Vec<String>,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

#[cfg(test)]
mod tests {
    use super::Status;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_strings() {
        for status in Status::ALL {
            assert_eq!(Status::from_str(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn status_parse_is_lenient_about_case() {
        assert_eq!(Status::from_str(" Stored "), Ok(Status::Stored));
        assert!(Status::from_str("wet").is_err());
    }
}
