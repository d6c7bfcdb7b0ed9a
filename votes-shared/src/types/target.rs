use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// The kind of entity a vote can be cast on.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    User,
    Article,
    Claim,
    Review,
}

impl TargetKind {
    pub const ALL: [TargetKind; 4] = [
        TargetKind::User,
        TargetKind::Article,
        TargetKind::Claim,
        TargetKind::Review,
    ];

    /// Whether targets of this kind carry an `nNeutralVotes` counter.
    pub fn has_neutral_counter(self) -> bool {
        matches!(self, TargetKind::Claim | TargetKind::Review)
    }

    /// Whether a `no_info` vote may be recorded against this kind.
    pub fn accepts_no_info(self) -> bool {
        matches!(self, TargetKind::Review)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::User => "user",
            TargetKind::Article => "article",
            TargetKind::Claim => "claim",
            TargetKind::Review => "review",
        }
    }

    /// Name of the query parameter that selects a target of this kind.
    pub fn query_param(self) -> &'static str {
        match self {
            TargetKind::User => "userId",
            TargetKind::Article => "articleId",
            TargetKind::Claim => "claimId",
            TargetKind::Review => "reviewId",
        }
    }

    /// Stable small integer used as the storage discriminant.
    pub fn code(self) -> i16 {
        match self {
            TargetKind::User => 0,
            TargetKind::Article => 1,
            TargetKind::Claim => 2,
            TargetKind::Review => 3,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(TargetKind::User),
            1 => Some(TargetKind::Article),
            2 => Some(TargetKind::Claim),
            3 => Some(TargetKind::Review),
            _ => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = TargetSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(TargetKind::User),
            "article" => Ok(TargetKind::Article),
            "claim" => Ok(TargetKind::Claim),
            "review" => Ok(TargetKind::Review),
            _ => Err(TargetSelectorError::UnknownKind(s.to_string())),
        }
    }
}

/// A reference to exactly one votable entity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TargetRef {
    pub kind: TargetKind,
    pub id: Uuid,
}

impl TargetRef {
    pub fn new(kind: TargetKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    pub fn user(id: Uuid) -> Self {
        Self::new(TargetKind::User, id)
    }

    pub fn article(id: Uuid) -> Self {
        Self::new(TargetKind::Article, id)
    }

    pub fn claim(id: Uuid) -> Self {
        Self::new(TargetKind::Claim, id)
    }

    pub fn review(id: Uuid) -> Self {
        Self::new(TargetKind::Review, id)
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Parses the `kind:id` form produced by `Display`.
impl FromStr for TargetRef {
    type Err = TargetSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| TargetSelectorError::UnknownKind(s.to_string()))?;
        let kind: TargetKind = kind.parse()?;
        let id = Uuid::parse_str(id)
            .map_err(|_| TargetSelectorError::MalformedId(kind, id.to_string()))?;
        Ok(TargetRef::new(kind, id))
    }
}

/// Errors produced while resolving a [`TargetSelector`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TargetSelectorError {
    #[error("articleId, claimId, reviewId or userId must be specified")]
    Missing,

    #[error("only one of articleId, claimId, reviewId or userId may be specified, got: {params}", params = .0.iter().map(|k| k.query_param()).collect::<Vec<_>>().join(", "))]
    Ambiguous(Vec<TargetKind>),

    #[error("{param} is not a valid id: {raw}", param = .0.query_param(), raw = .1)]
    MalformedId(TargetKind, String),

    #[error("unknown target kind: {0}")]
    UnknownKind(String),
}

/// The "one of four optional ids" reference as supplied by a caller.
///
/// Resolving it into a [`TargetRef`] enforces that exactly one id is present.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TargetSelector {
    pub article_id: Option<String>,
    pub claim_id: Option<String>,
    pub review_id: Option<String>,
    pub user_id: Option<String>,
}

impl TargetSelector {
    pub fn from_ref(target: TargetRef) -> Self {
        let id = Some(target.id.to_string());
        let mut selector = Self::default();
        match target.kind {
            TargetKind::Article => selector.article_id = id,
            TargetKind::Claim => selector.claim_id = id,
            TargetKind::Review => selector.review_id = id,
            TargetKind::User => selector.user_id = id,
        }
        selector
    }

    fn entries(&self) -> [(TargetKind, Option<&str>); 4] {
        [
            (TargetKind::Article, self.article_id.as_deref()),
            (TargetKind::Claim, self.claim_id.as_deref()),
            (TargetKind::Review, self.review_id.as_deref()),
            (TargetKind::User, self.user_id.as_deref()),
        ]
    }

    /// Resolves the selector into a single [`TargetRef`].
    ///
    /// Empty strings count as absent, matching how query strings such as
    /// `?claimId=` are usually meant.
    pub fn resolve(&self) -> Result<TargetRef, TargetSelectorError> {
        let present: Vec<(TargetKind, &str)> = self
            .entries()
            .into_iter()
            .filter_map(|(kind, raw)| raw.map(str::trim).filter(|r| !r.is_empty()).map(|r| (kind, r)))
            .collect();

        match present.as_slice() {
            [] => Err(TargetSelectorError::Missing),
            [(kind, raw)] => Uuid::parse_str(raw)
                .map(|id| TargetRef::new(*kind, id))
                .map_err(|_| TargetSelectorError::MalformedId(*kind, raw.to_string())),
            many => Err(TargetSelectorError::Ambiguous(
                many.iter().map(|(kind, _)| *kind).collect(),
            )),
        }
    }
}

impl From<TargetRef> for TargetSelector {
    fn from(target: TargetRef) -> Self {
        Self::from_ref(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "a7ef0016-a2f4-44fb-82ca-a4f5c61d2cf5";

    #[test]
    fn test_resolve_single_claim() {
        let selector = TargetSelector {
            claim_id: Some(ID.to_string()),
            ..Default::default()
        };
        let target = selector.resolve().unwrap();
        assert_eq!(target, TargetRef::claim(Uuid::parse_str(ID).unwrap()));
    }

    #[test]
    fn test_resolve_missing() {
        assert_eq!(
            TargetSelector::default().resolve(),
            Err(TargetSelectorError::Missing)
        );
    }

    #[test]
    fn test_resolve_blank_counts_as_missing() {
        let selector = TargetSelector {
            user_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(selector.resolve(), Err(TargetSelectorError::Missing));
    }

    #[test]
    fn test_resolve_ambiguous() {
        let selector = TargetSelector {
            article_id: Some(ID.to_string()),
            claim_id: Some(ID.to_string()),
            ..Default::default()
        };
        assert_eq!(
            selector.resolve(),
            Err(TargetSelectorError::Ambiguous(vec![
                TargetKind::Article,
                TargetKind::Claim
            ]))
        );
    }

    #[test]
    fn test_resolve_malformed_id() {
        let selector = TargetSelector {
            review_id: Some("41224d776a326fb40f000008".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            selector.resolve(),
            Err(TargetSelectorError::MalformedId(TargetKind::Review, _))
        ));
    }

    #[test]
    fn test_from_ref_round_trips_through_resolve() {
        for kind in TargetKind::ALL {
            let target = TargetRef::new(kind, Uuid::new_v4());
            assert_eq!(TargetSelector::from(target).resolve().unwrap(), target);
        }
    }

    #[test]
    fn test_target_ref_parses_display_form() {
        let target = TargetRef::review(Uuid::parse_str(ID).unwrap());
        assert_eq!(target.to_string().parse::<TargetRef>(), Ok(target));
        assert!(matches!(
            "claim:nope".parse::<TargetRef>(),
            Err(TargetSelectorError::MalformedId(TargetKind::Claim, _))
        ));
        assert!(matches!(
            "comment:".parse::<TargetRef>(),
            Err(TargetSelectorError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_kind_codes_are_stable() {
        for kind in TargetKind::ALL {
            assert_eq!(TargetKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(TargetKind::from_code(9), None);
    }

    #[test]
    fn test_neutral_counter_kinds() {
        assert!(TargetKind::Claim.has_neutral_counter());
        assert!(TargetKind::Review.has_neutral_counter());
        assert!(!TargetKind::Article.has_neutral_counter());
        assert!(!TargetKind::User.has_neutral_counter());
    }
}
