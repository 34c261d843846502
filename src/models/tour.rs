use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// How demanding a tour is on its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Difficult => "Difficult",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Difficult" => Ok(Difficulty::Difficult),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Geographic region a tour operates in. Serialized with its display label
/// ("Central Coast", not "CentralCoast") on the wire and in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    CentralCoast,
    NorthernCalifornia,
    SouthernCalifornia,
    Varies,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::CentralCoast,
        Region::NorthernCalifornia,
        Region::SouthernCalifornia,
        Region::Varies,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Region::CentralCoast => "Central Coast",
            Region::NorthernCalifornia => "Northern California",
            Region::SouthernCalifornia => "Southern California",
            Region::Varies => "Varies",
        }
    }

    pub fn find_by_label(label: &str) -> Option<Region> {
        Region::ALL
            .iter()
            .find(|r| r.label().eq_ignore_ascii_case(label))
            .copied()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Region::find_by_label(&label)
            .ok_or_else(|| de::Error::custom(format!("unknown region: {label}")))
    }
}

/// Classification a tour is sold under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourPackage {
    pub code: String,
    pub name: String,
}

impl TourPackage {
    pub fn new(code: &str, name: &str) -> Self {
        TourPackage {
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

/// A bookable travel package. Two tours compare equal iff every field
/// matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub blurb: String,
    pub price: u32,
    pub duration: String,
    pub bullets: String,
    pub keywords: String,
    pub tour_package: TourPackage,
    pub difficulty: Difficulty,
    pub region: Region,
}
