//! Data models for the passenger analysis.
//!
//! This module contains the passenger record read from the manifest,
//! the features derived from it, and the summary tables produced by
//! the aggregation pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::report::charts::Chart;

/// Columns every manifest must provide.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "PassengerId",
    "Survived",
    "Pclass",
    "Name",
    "Sex",
    "Age",
    "SibSp",
    "Parch",
    "Fare",
];

/// Passenger sex as recorded in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Female => write!(f, "female"),
            Sex::Male => write!(f, "male"),
        }
    }
}

/// Age band derived from a passenger's age.
///
/// Bins are closed on the right: `(0,12]`, `(12,19]`, `(19,59]`, `(59,∞)`.
/// Missing ages, and ages outside every bin, land in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    Child,
    Teenager,
    Adult,
    Senior,
    Unknown,
}

impl AgeGroup {
    /// Classify an optional age into its band.
    pub fn from_age(age: Option<f64>) -> Self {
        match age {
            Some(a) if a > 0.0 && a <= 12.0 => AgeGroup::Child,
            Some(a) if a > 12.0 && a <= 19.0 => AgeGroup::Teenager,
            Some(a) if a > 19.0 && a <= 59.0 => AgeGroup::Adult,
            Some(a) if a > 59.0 && a.is_finite() => AgeGroup::Senior,
            _ => AgeGroup::Unknown,
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeGroup::Child => write!(f, "Child"),
            AgeGroup::Teenager => write!(f, "Teenager"),
            AgeGroup::Adult => write!(f, "Adult"),
            AgeGroup::Senior => write!(f, "Senior"),
            AgeGroup::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One row of the passenger manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PassengerRecord {
    pub passenger_id: u32,
    /// 1 if the passenger survived, 0 otherwise.
    pub survived: u8,
    /// Ticket class, normally 1, 2 or 3.
    pub pclass: u8,
    /// `"<LastName>, <Title> <FirstNames>"`.
    pub name: String,
    pub sex: Sex,
    pub age: Option<f64>,
    /// Siblings and spouses aboard.
    pub sib_sp: u32,
    /// Parents and children aboard.
    pub parch: u32,
    pub fare: f64,
}

impl PassengerRecord {
    pub fn age_group(&self) -> AgeGroup {
        AgeGroup::from_age(self.age)
    }

    /// Relatives aboard plus the passenger.
    pub fn family_size(&self) -> u64 {
        u64::from(self.sib_sp) + u64::from(self.parch) + 1
    }

    /// Text before the first comma of the name, trimmed.
    pub fn last_name(&self) -> &str {
        self.name.split(',').next().unwrap_or_default().trim()
    }

    pub fn has_survived(&self) -> bool {
        self.survived == 1
    }
}

/// Survival counts for one `(Pclass, Sex, AgeGroup)` group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalRow {
    pub pclass: u8,
    pub sex: Sex,
    pub age_group: AgeGroup,
    pub total_passengers: usize,
    pub survivors: usize,
    pub survival_rate: f64,
}

/// Survival counts rolled up by sex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderSurvival {
    pub sex: Sex,
    pub total_passengers: usize,
    pub survivors: usize,
    pub survival_rate: f64,
}

/// Fare statistics for one `(FamilySize, Pclass)` group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareRow {
    pub family_size: u64,
    pub pclass: u8,
    pub avg_fare: f64,
    pub min_fare: f64,
    pub max_fare: f64,
    pub num_passengers: usize,
}

/// Occurrences of a last name in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCount {
    pub last_name: String,
    pub count: usize,
}

/// Average fare paid by a family within one ticket class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyFareRow {
    pub last_name: String,
    pub pclass: u8,
    pub average_fare: f64,
    /// Occurrences of the last name across the whole manifest.
    pub count: usize,
}

/// Metadata about a dashboard run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// URL or path the manifest was loaded from.
    pub source: String,
    pub analysis_date: DateTime<Utc>,
    /// Number of passenger records analyzed.
    pub records: usize,
    pub duration_seconds: f64,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub survival: Vec<SurvivalRow>,
    pub gender: Vec<GenderSurvival>,
    pub family_groups: Vec<FareRow>,
    pub last_names: Vec<NameCount>,
    pub top_families: Vec<FamilyFareRow>,
    pub charts: Vec<Chart>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, sib_sp: u32, parch: u32, age: Option<f64>) -> PassengerRecord {
        PassengerRecord {
            passenger_id: 1,
            survived: 0,
            pclass: 3,
            name: name.to_string(),
            sex: Sex::Male,
            age,
            sib_sp,
            parch,
            fare: 7.25,
        }
    }

    #[test]
    fn test_age_group_bins() {
        assert_eq!(AgeGroup::from_age(Some(0.42)), AgeGroup::Child);
        assert_eq!(AgeGroup::from_age(Some(12.0)), AgeGroup::Child);
        assert_eq!(AgeGroup::from_age(Some(12.5)), AgeGroup::Teenager);
        assert_eq!(AgeGroup::from_age(Some(19.0)), AgeGroup::Teenager);
        assert_eq!(AgeGroup::from_age(Some(19.5)), AgeGroup::Adult);
        assert_eq!(AgeGroup::from_age(Some(59.0)), AgeGroup::Adult);
        assert_eq!(AgeGroup::from_age(Some(80.0)), AgeGroup::Senior);
    }

    #[test]
    fn test_age_group_unknown() {
        assert_eq!(AgeGroup::from_age(None), AgeGroup::Unknown);
        assert_eq!(AgeGroup::from_age(Some(0.0)), AgeGroup::Unknown);
        assert_eq!(AgeGroup::from_age(Some(f64::NAN)), AgeGroup::Unknown);
    }

    #[test]
    fn test_age_group_ordering() {
        assert!(AgeGroup::Child < AgeGroup::Teenager);
        assert!(AgeGroup::Teenager < AgeGroup::Adult);
        assert!(AgeGroup::Adult < AgeGroup::Senior);
        assert!(AgeGroup::Senior < AgeGroup::Unknown);
        assert!(Sex::Female < Sex::Male);
    }

    #[test]
    fn test_derived_features() {
        let r = record("Smith, Mr. John", 1, 2, Some(30.0));
        assert_eq!(r.last_name(), "Smith");
        assert_eq!(r.family_size(), 4);
        assert_eq!(r.age_group(), AgeGroup::Adult);

        let alone = record("  Braund , Mr. Owen Harris", 0, 0, None);
        assert_eq!(alone.last_name(), "Braund");
        assert_eq!(alone.family_size(), 1);

        let no_comma = record(" Cher ", 0, 0, None);
        assert_eq!(no_comma.last_name(), "Cher");
    }
}
