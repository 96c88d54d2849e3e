//! Gazetteer and free-text location resolution.
//!
//! Location names reach the planner from noisy sources (hand-typed or
//! scraped), so resolution is substring-based rather than exact. A query
//! matches a gazetteer entry when, case-insensitively:
//!
//! 1. the entry's display name contains the query, or
//! 2. the entry's internal key contains the query, or
//! 3. the query contains the entry's display name.
//!
//! The first matching entry in gazetteer order wins. Callers that need a
//! stable answer for ambiguous queries should load a [`Gazetteer::sorted`]
//! copy.
//!
//! ```
//! use haulplan_logic::location::{Gazetteer, GazetteerEntry};
//!
//! let gazetteer = Gazetteer::from_entries(vec![GazetteerEntry {
//!     display_name: "Port Olisar".into(),
//!     internal_key: "stanton_port_olisar".into(),
//!     system: "Stanton".into(),
//!     x: 0.0,
//!     y: 0.0,
//!     z: 0.0,
//! }])
//! .unwrap();
//! assert_eq!(gazetteer.resolve("olisar").unwrap().name, "Port Olisar");
//! assert!(gazetteer.resolve("Lorville").is_none());
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A resolved point in space that contracts can start or end at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Gazetteer internal key.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Star system / region tag.
    pub system: String,
}

impl Location {
    /// Straight-line distance to another location.
    pub fn distance_to(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Grouping key for "same physical stop" checks (lower-cased name).
    pub fn group_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// One gazetteer row as it appears in the bundled JSON data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GazetteerEntry {
    pub display_name: String,
    pub internal_key: String,
    pub system: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GazetteerEntry {
    fn into_location(self) -> Location {
        Location {
            id: self.internal_key,
            name: self.display_name,
            x: self.x,
            y: self.y,
            z: self.z,
            system: self.system,
        }
    }
}

/// Errors raised while loading a gazetteer.
#[derive(Debug)]
pub enum GazetteerError {
    Json(serde_json::Error),
    DuplicateKey(String),
}

impl From<serde_json::Error> for GazetteerError {
    fn from(e: serde_json::Error) -> Self {
        GazetteerError::Json(e)
    }
}

impl std::fmt::Display for GazetteerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GazetteerError::Json(e) => write!(f, "Gazetteer parse error: {}", e),
            GazetteerError::DuplicateKey(key) => {
                write!(f, "Gazetteer key '{}' appears more than once", key)
            }
        }
    }
}

impl std::error::Error for GazetteerError {}

/// Read-only table of known locations with a pre-lowered match index.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    locations: Vec<Location>,
    /// (lower-cased display name, lower-cased internal key), parallel to `locations`.
    index: Vec<(String, String)>,
}

impl Gazetteer {
    /// Build a gazetteer from in-memory entries, keeping their order.
    pub fn from_entries(entries: Vec<GazetteerEntry>) -> Result<Self, GazetteerError> {
        let mut seen = HashSet::new();
        let mut locations = Vec::with_capacity(entries.len());
        for entry in entries {
            if !seen.insert(entry.internal_key.clone()) {
                return Err(GazetteerError::DuplicateKey(entry.internal_key));
            }
            locations.push(entry.into_location());
        }
        Ok(Self::from_locations(locations))
    }

    /// Parse a JSON array of [`GazetteerEntry`] rows.
    pub fn from_json(json: &str) -> Result<Self, GazetteerError> {
        let entries: Vec<GazetteerEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    fn from_locations(locations: Vec<Location>) -> Self {
        let index = locations
            .iter()
            .map(|l| (l.name.to_lowercase(), l.id.to_lowercase()))
            .collect();
        Self { locations, index }
    }

    /// Copy of this gazetteer ordered by internal key.
    pub fn sorted(&self) -> Self {
        let mut locations = self.locations.clone();
        locations.sort_by(|a, b| a.id.cmp(&b.id));
        Self::from_locations(locations)
    }

    /// Resolve a free-text name to the first matching location.
    pub fn resolve(&self, name: &str) -> Option<&Location> {
        let query = name.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.index
            .iter()
            .position(|(display, key)| {
                display.contains(&query)
                    || key.contains(&query)
                    || (!display.is_empty() && query.contains(display.as_str()))
            })
            .map(|i| &self.locations[i])
    }

    /// Exact lookup by internal key.
    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
