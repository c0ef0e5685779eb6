//! Filter criteria carried inside a playlist description.
//!
//! A smart playlist's description ends with ` [ST:<token>]`, where the token
//! is base64 of a compact JSON object:
//!
//! ```text
//! {"t":[1,5],"e":[2,4],"m":[1,5],"i":[3],"x":[7]}
//! ```
//!
//! `t`, `e` and `m` are inclusive tempo, energy and mood ranges within 1..=5;
//! `i` lists tag ids a track must all carry and `x` tag ids it must not carry.
//! Older tokens may omit keys, which then mean the full range or no tags.

use std::{collections::BTreeSet, fmt};

use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE},
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const MARKER_OPEN: &str = "[ST:";
pub const MARKER_CLOSE: char = ']';

pub const ATTRIBUTE_MIN: u8 = 1;
pub const ATTRIBUTE_MAX: u8 = 5;

/// Inclusive range of an ordinal attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AttributeRange {
    min: u8,
    max: u8,
}

impl AttributeRange {
    pub const FULL: Self = Self {
        min: ATTRIBUTE_MIN,
        max: ATTRIBUTE_MAX,
    };

    pub fn new(min: u8, max: u8) -> Result<Self> {
        Self::checked(min.into(), max.into()).map_err(AppError::InvalidInput)
    }

    fn checked(min: i64, max: i64) -> std::result::Result<Self, String> {
        let domain = i64::from(ATTRIBUTE_MIN)..=i64::from(ATTRIBUTE_MAX);
        if !domain.contains(&min) || !domain.contains(&max) {
            return Err(format!(
                "range {}-{} is outside {}-{}",
                min, max, ATTRIBUTE_MIN, ATTRIBUTE_MAX
            ));
        }
        if min > max {
            return Err(format!("range {}-{} has min above max", min, max));
        }
        Ok(Self {
            min: min as u8,
            max: max as u8,
        })
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }
}

impl Default for AttributeRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// Validated smart playlist criteria. The default matches every track whose
/// attributes are all set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Criteria {
    pub tempo: AttributeRange,
    pub energy: AttributeRange,
    pub mood: AttributeRange,
    pub include: BTreeSet<i64>,
    pub exclude: BTreeSet<i64>,
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tempo {}-{}, energy {}-{}, mood {}-{}",
            self.tempo.min,
            self.tempo.max,
            self.energy.min,
            self.energy.max,
            self.mood.min,
            self.mood.max
        )?;
        if !self.include.is_empty() {
            write!(f, ", with tags {}", join_ids(&self.include))?;
        }
        if !self.exclude.is_empty() {
            write!(f, ", without tags {}", join_ids(&self.exclude))?;
        }
        Ok(())
    }
}

fn join_ids(ids: &BTreeSet<i64>) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Criteria as submitted by a client, before validation. Missing bounds
/// default to the edge of the domain.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CriteriaParams {
    pub tempo_min: Option<u8>,
    pub tempo_max: Option<u8>,
    pub energy_min: Option<u8>,
    pub energy_max: Option<u8>,
    pub mood_min: Option<u8>,
    pub mood_max: Option<u8>,
    #[serde(default)]
    pub include_tag_ids: Vec<i64>,
    #[serde(default)]
    pub exclude_tag_ids: Vec<i64>,
}

impl CriteriaParams {
    pub fn into_criteria(self) -> Result<Criteria> {
        let range = |min: Option<u8>, max: Option<u8>| {
            AttributeRange::new(
                min.unwrap_or(ATTRIBUTE_MIN),
                max.unwrap_or(ATTRIBUTE_MAX),
            )
        };

        Ok(Criteria {
            tempo: range(self.tempo_min, self.tempo_max)?,
            energy: range(self.energy_min, self.energy_max)?,
            mood: range(self.mood_min, self.mood_max)?,
            include: self.include_tag_ids.into_iter().collect(),
            exclude: self.exclude_tag_ids.into_iter().collect(),
        })
    }
}

#[derive(Serialize, Deserialize)]
struct WireCriteria {
    #[serde(default = "full_bounds")]
    t: [i64; 2],
    #[serde(default = "full_bounds")]
    e: [i64; 2],
    #[serde(default = "full_bounds")]
    m: [i64; 2],
    #[serde(default)]
    i: Vec<i64>,
    #[serde(default)]
    x: Vec<i64>,
}

fn full_bounds() -> [i64; 2] {
    [ATTRIBUTE_MIN.into(), ATTRIBUTE_MAX.into()]
}

impl From<&Criteria> for WireCriteria {
    fn from(criteria: &Criteria) -> Self {
        let bounds = |r: &AttributeRange| [r.min.into(), r.max.into()];
        Self {
            t: bounds(&criteria.tempo),
            e: bounds(&criteria.energy),
            m: bounds(&criteria.mood),
            i: criteria.include.iter().copied().collect(),
            x: criteria.exclude.iter().copied().collect(),
        }
    }
}

impl TryFrom<WireCriteria> for Criteria {
    type Error = String;

    fn try_from(wire: WireCriteria) -> std::result::Result<Self, String> {
        Ok(Criteria {
            tempo: AttributeRange::checked(wire.t[0], wire.t[1])?,
            energy: AttributeRange::checked(wire.e[0], wire.e[1])?,
            mood: AttributeRange::checked(wire.m[0], wire.m[1])?,
            include: wire.i.into_iter().collect(),
            exclude: wire.x.into_iter().collect(),
        })
    }
}

/// Encodes criteria as a padded standard base64 token.
pub fn encode(criteria: &Criteria) -> Result<String> {
    let json = serde_json::to_string(&WireCriteria::from(criteria))
        .map_err(|e| AppError::CriteriaCorrupt(e.to_string()))?;
    Ok(STANDARD.encode(json))
}

/// The full marker, leading space included, as appended to a description.
pub fn marker(criteria: &Criteria) -> Result<String> {
    Ok(format!(" {}{}{}", MARKER_OPEN, encode(criteria)?, MARKER_CLOSE))
}

/// Appends the criteria marker to a human-readable description.
pub fn embed(human: &str, criteria: &Criteria) -> Result<String> {
    Ok(format!("{}{}", human, marker(criteria)?))
}

pub fn has_marker(description: &str) -> bool {
    description.contains(MARKER_OPEN)
}

/// Extracts criteria from a playlist description.
///
/// Fails with [`AppError::NotSmart`] when there is no marker and with
/// [`AppError::CriteriaCorrupt`] when the marker is present but its token
/// can't be turned into valid criteria.
pub fn decode(description: &str) -> Result<Criteria> {
    let Some(start) = description.find(MARKER_OPEN) else {
        return Err(AppError::NotSmart);
    };
    let rest = &description[start + MARKER_OPEN.len()..];
    let Some(end) = rest.find(MARKER_CLOSE) else {
        return Err(corrupt("missing closing bracket"));
    };
    let token = rest[..end].trim();

    let bytes = STANDARD
        .decode(token)
        .or_else(|_| URL_SAFE.decode(token))
        .map_err(|e| corrupt(format!("invalid base64: {}", e)))?;
    let json = String::from_utf8(bytes).map_err(|_| corrupt("token is not UTF-8"))?;
    let wire: WireCriteria =
        serde_json::from_str(&json).map_err(|e| corrupt(format!("invalid JSON: {}", e)))?;

    Criteria::try_from(wire).map_err(corrupt)
}

fn corrupt(reason: impl Into<String>) -> AppError {
    AppError::CriteriaCorrupt(reason.into())
}

/// The description text before the marker, trimmed. Descriptions without a
/// marker are returned trimmed as a whole.
pub fn human_text(description: &str) -> &str {
    match description.find(MARKER_OPEN) {
        Some(start) => description[..start].trim(),
        None => description.trim(),
    }
}
