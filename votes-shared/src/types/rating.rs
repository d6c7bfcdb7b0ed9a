use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

use crate::types::TargetKind;

const NO_INFO: &str = "no_info";

/// The numeric domain ratings are validated against.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RatingScale {
    /// Discrete negative / neutral / positive votes.
    #[default]
    TriState,
    /// Reputation-style ratings from -1 up to 10.
    ///
    /// Zero is still refused for kinds without a neutral counter (users and
    /// articles), so their partitioned counters keep summing to `nBeenVoted`.
    Continuous,
}

impl RatingScale {
    pub fn range(self) -> RangeInclusive<i16> {
        match self {
            RatingScale::TriState => -1..=1,
            RatingScale::Continuous => -1..=10,
        }
    }
}

/// A rating scale name that could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown rating scale: {0}")]
pub struct UnknownRatingScale(pub String);

impl FromStr for RatingScale {
    type Err = UnknownRatingScale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tri-state" | "tristate" | "tri_state" => Ok(RatingScale::TriState),
            "continuous" | "legacy" => Ok(RatingScale::Continuous),
            _ => Err(UnknownRatingScale(s.to_string())),
        }
    }
}

/// Which aggregate counter a rating contributes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoteSign {
    Negative,
    Neutral,
    Positive,
}

/// The value carried by a vote.
///
/// On the wire a rating is either a JSON integer or the string `"no_info"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rating {
    Value(i16),
    /// Recorded in the ledger only; never touches the target counters.
    NoInfo,
}

impl Rating {
    pub const NEGATIVE: Rating = Rating::Value(-1);
    pub const NEUTRAL: Rating = Rating::Value(0);
    pub const POSITIVE: Rating = Rating::Value(1);

    pub fn sign(self) -> Option<VoteSign> {
        match self {
            Rating::Value(v) if v < 0 => Some(VoteSign::Negative),
            Rating::Value(0) => Some(VoteSign::Neutral),
            Rating::Value(_) => Some(VoteSign::Positive),
            Rating::NoInfo => None,
        }
    }

    /// Checks the rating against the scale and the counters the target kind carries.
    ///
    /// A neutral rating is refused for kinds without a neutral counter, otherwise
    /// `nBeenVoted` would drift away from the sum of the partitioned counters.
    pub fn is_valid_for(self, kind: TargetKind, scale: RatingScale) -> bool {
        match self {
            Rating::NoInfo => kind.accepts_no_info(),
            Rating::Value(0) => kind.has_neutral_counter(),
            Rating::Value(v) => scale.range().contains(&v),
        }
    }

    pub fn as_value(self) -> Option<i16> {
        match self {
            Rating::Value(v) => Some(v),
            Rating::NoInfo => None,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Value(v) => write!(f, "{v}"),
            Rating::NoInfo => f.write_str(NO_INFO),
        }
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rating::Value(v) => serializer.serialize_i16(*v),
            Rating::NoInfo => serializer.serialize_str(NO_INFO),
        }
    }
}

struct RatingVisitor;

impl<'de> Visitor<'de> for RatingVisitor {
    type Value = Rating;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer rating or \"no_info\"")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Rating, E> {
        i16::try_from(v)
            .map(Rating::Value)
            .map_err(|_| E::custom(format!("rating {v} is out of range")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Rating, E> {
        i16::try_from(v)
            .map(Rating::Value)
            .map_err(|_| E::custom(format!("rating {v} is out of range")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Rating, E> {
        if v.fract() == 0.0 && v >= f64::from(i16::MIN) && v <= f64::from(i16::MAX) {
            Ok(Rating::Value(v as i16))
        } else {
            Err(E::custom(format!("rating {v} is not a whole number")))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Rating, E> {
        if v == NO_INFO {
            Ok(Rating::NoInfo)
        } else {
            Err(E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RatingVisitor)
    }
}
