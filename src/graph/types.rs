//! Node and edge type definitions.
//!
//! Defines [`NodeType`] (the two node categories), the typed payloads
//! [`PersonData`] and [`EventData`], the [`NodeData`] sum type that a
//! [`Node`] carries, and [`Edge`] (a labeled directed relation).

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Node id reserved for the cared-for person. Always present in a loaded graph.
pub const USER_ID: &str = "user";

/// The two kinds of node in the knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// People the user knows, including the user themself.
    Person,
    /// Things that happened or will happen at a given time and place.
    Event,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Event => "EVENT",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NodeType {
    type Err = Error;

    /// Case-insensitive: `"person"`, `"Person"` and `"PERSON"` all parse.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PERSON" => Ok(Self::Person),
            "EVENT" => Ok(Self::Event),
            _ => Err(Error::UnknownCategory(s.to_string())),
        }
    }
}

/// Attributes of a person node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonData {
    pub name: String,
    pub age: u32,
    /// Free-form extra attributes (e.g. `{"hobby": "gardening"}`).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub misc: Map<String, Value>,
}

impl PersonData {
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            age,
            misc: Map::new(),
        }
    }

    pub fn with_misc(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.misc.insert(key.into(), value.into());
        self
    }
}

/// Attributes of an event node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// 24-hour `HH:MM`.
    pub time: String,
    /// Capitalized weekday name once validated (e.g. `"Saturday"`).
    pub day: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub misc: Map<String, Value>,
}

impl EventData {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        time: impl Into<String>,
        day: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            time: time.into(),
            day: day.into(),
            location: location.into(),
            misc: Map::new(),
        }
    }

    pub fn with_misc(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.misc.insert(key.into(), value.into());
        self
    }
}

/// Typed node payload. The node's [`NodeType`] is derived from the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeData {
    Person(PersonData),
    Event(EventData),
}

impl NodeData {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Person(_) => NodeType::Person,
            Self::Event(_) => NodeType::Event,
        }
    }

    /// Display label: a person's name or an event's title.
    pub fn label(&self) -> &str {
        match self {
            Self::Person(p) => &p.name,
            Self::Event(e) => &e.title,
        }
    }

    /// Check payload invariants and canonicalize the event day.
    pub(crate) fn validated(self, id: &str) -> Result<Self> {
        match self {
            Self::Person(p) => {
                if p.name.trim().is_empty() {
                    return Err(Error::EmptyPersonName(id.to_string()));
                }
                Ok(Self::Person(p))
            }
            Self::Event(mut e) => {
                e.time = canonical_time(&e.time)?;
                e.day = canonical_day(&e.day)?;
                Ok(Self::Event(e))
            }
        }
    }

    /// Render declared fields as `key: value` lines, then flattened `misc` entries.
    ///
    /// The output is the literal embedding input, so field order is fixed and
    /// `misc` keys come out sorted.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();
        let misc = match self {
            Self::Person(p) => {
                lines.push(format!("name: {}", p.name));
                lines.push(format!("age: {}", p.age));
                &p.misc
            }
            Self::Event(e) => {
                lines.push(format!("title: {}", e.title));
                lines.push(format!("description: {}", e.description));
                lines.push(format!("time: {}", e.time));
                lines.push(format!("day: {}", e.day));
                lines.push(format!("location: {}", e.location));
                &e.misc
            }
        };
        flatten_misc("", misc, &mut lines);
        lines.join("\n")
    }
}

fn flatten_misc(prefix: &str, map: &Map<String, Value>, lines: &mut Vec<String>) {
    // Map iteration order depends on serde_json's `preserve_order` feature.
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in entries {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(nested) => flatten_misc(&key, nested, lines),
            Value::String(s) => lines.push(format!("{key}: {s}")),
            other => lines.push(format!("{key}: {other}")),
        }
    }
}

/// A node record. Owned exclusively by the graph.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: String,
    pub data: NodeData,
    /// Bumped whenever the node's rendered text changes.
    #[serde(skip)]
    pub version: u64,
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }
}

/// A directed, labeled relation between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    /// Relationship label (e.g. `"loves"`, `"attended"`, `"hasChild"`).
    pub relation: String,
}

/// Parse a 24-hour `HH:MM` time and return it zero-padded (`"8:05"` becomes `"08:05"`).
pub fn canonical_time(time: &str) -> Result<String> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| Error::InvalidTimeFormat(time.to_string()))
}

/// Parse a full weekday name case-insensitively and return it capitalized.
pub fn canonical_day(day: &str) -> Result<String> {
    let invalid = || Error::InvalidDayFormat(day.to_string());
    let weekday: Weekday = day.trim().parse().map_err(|_| invalid())?;
    let name = match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    };
    // chrono also takes "tue"; only full names are weekday names here.
    if !day.trim().eq_ignore_ascii_case(name) {
        return Err(invalid());
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn parse_fields(text: &str) -> HashMap<&str, &str> {
        text.lines()
            .filter_map(|line| line.split_once(": "))
            .collect()
    }

    #[test]
    fn node_type_parses_case_insensitively() {
        assert_eq!("person".parse::<NodeType>().unwrap(), NodeType::Person);
        assert_eq!("Event".parse::<NodeType>().unwrap(), NodeType::Event);
        assert!(matches!(
            "place".parse::<NodeType>(),
            Err(Error::UnknownCategory(_))
        ));
    }

    #[test]
    fn person_text_round_trips_declared_fields() {
        let data = NodeData::Person(PersonData::new("Margaret", 81).with_misc("hobby", "knitting"));
        let text = data.to_text();
        let fields = parse_fields(&text);
        assert_eq!(fields["name"], "Margaret");
        assert_eq!(fields["age"].parse::<u32>().unwrap(), 81);
        assert_eq!(fields["hobby"], "knitting");
        assert!(!text.contains("PERSON"), "type tag must not be rendered");
    }

    #[test]
    fn event_text_round_trips_declared_fields() {
        let data = NodeData::Event(EventData::new(
            "picnic",
            "Summer picnic",
            "14:00",
            "Saturday",
            "Park",
        ));
        let text = data.to_text();
        let fields = parse_fields(&text);
        assert_eq!(fields["title"], "picnic");
        assert_eq!(fields["description"], "Summer picnic");
        assert_eq!(fields["time"], "14:00");
        assert_eq!(fields["day"], "Saturday");
        assert_eq!(fields["location"], "Park");
    }

    #[test]
    fn misc_is_flattened_after_declared_fields_in_sorted_order() {
        let data = NodeData::Person(
            PersonData::new("Bob", 54)
                .with_misc("zeta", 1)
                .with_misc("address", json!({"city": "Leeds", "street": "Mill Lane"})),
        );
        assert_eq!(
            data.to_text(),
            "name: Bob\nage: 54\naddress.city: Leeds\naddress.street: Mill Lane\nzeta: 1"
        );
    }

    #[test]
    fn time_validation() {
        assert_eq!(canonical_time("08:55").unwrap(), "08:55");
        assert_eq!(canonical_time("23:59").unwrap(), "23:59");
        assert_eq!(canonical_time("8:5").unwrap(), "08:05");
        assert!(matches!(canonical_time("25:61"), Err(Error::InvalidTimeFormat(_))));
        assert!(canonical_time("noon").is_err());
    }

    #[test]
    fn day_is_canonicalized() {
        assert_eq!(canonical_day("saturday").unwrap(), "Saturday");
        assert_eq!(canonical_day("MONDAY").unwrap(), "Monday");
        assert!(matches!(canonical_day("Funday"), Err(Error::InvalidDayFormat(_))));
        assert!(matches!(canonical_day("tue"), Err(Error::InvalidDayFormat(_))));
        assert!(canonical_day("Sat").is_err());
    }

    #[test]
    fn empty_person_name_is_rejected() {
        let result = NodeData::Person(PersonData::new("  ", 40)).validated("ghost");
        assert!(matches!(result, Err(Error::EmptyPersonName(id)) if id == "ghost"));
    }
}
