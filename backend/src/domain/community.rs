//! Community model.
//!
//! A community document carries its free-text attributes, the creator uid that
//! holds delete authority, and a creation-time membership seed. After creation
//! the attributes are immutable and the seed is never rewritten; live rosters
//! are derived from user membership sets.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::user::UserId;

/// Maximum accepted length for a community id token.
pub const COMMUNITY_ID_MAX: usize = 128;
/// Maximum accepted length for a community name.
pub const COMMUNITY_NAME_MAX: usize = 120;

/// Validation errors raised when building a [`CommunityDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommunityValidationError {
    /// The id token was empty, over-long, or contained whitespace.
    InvalidId,
    /// The name was blank once trimmed.
    EmptyName,
    /// The name exceeded [`COMMUNITY_NAME_MAX`] characters.
    NameTooLong {
        /// Permitted maximum.
        max: usize,
    },
    /// The description was blank once trimmed.
    EmptyDescription,
    /// The category was blank once trimmed.
    EmptyCategory,
    /// The joining questions were blank once trimmed.
    EmptyQuestions,
}

impl fmt::Display for CommunityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "community id must be a single printable token"),
            Self::EmptyName => write!(f, "community name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "community name must be at most {max} characters")
            }
            Self::EmptyDescription => write!(f, "community description must not be empty"),
            Self::EmptyCategory => write!(f, "community category must not be empty"),
            Self::EmptyQuestions => write!(f, "community questions must not be empty"),
        }
    }
}

impl std::error::Error for CommunityValidationError {}

/// Opaque community identifier minted at the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommunityId(String);

impl CommunityId {
    /// Validate and construct a [`CommunityId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, CommunityValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, CommunityValidationError> {
        if id.is_empty()
            || id.chars().count() > COMMUNITY_ID_MAX
            || id.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(CommunityValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for CommunityId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CommunityId> for String {
    fn from(value: CommunityId) -> Self {
        value.0
    }
}

impl TryFrom<String> for CommunityId {
    type Error = CommunityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Validated creation payload for a community.
///
/// ## Invariants
/// - Every text field is non-empty once trimmed; the name also honours
///   [`COMMUNITY_NAME_MAX`].
///
/// # Examples
/// ```
/// use backend::domain::CommunityDraft;
///
/// let draft =
///     CommunityDraft::try_from_parts("Readers", "Book club", "Education", "None").unwrap();
/// assert_eq!(draft.name(), "Readers");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityDraft {
    name: String,
    description: String,
    category: String,
    questions: String,
}

impl CommunityDraft {
    /// Construct a draft from raw form inputs.
    pub fn try_from_parts(
        name: &str,
        description: &str,
        category: &str,
        questions: &str,
    ) -> Result<Self, CommunityValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CommunityValidationError::EmptyName);
        }
        if name.chars().count() > COMMUNITY_NAME_MAX {
            return Err(CommunityValidationError::NameTooLong {
                max: COMMUNITY_NAME_MAX,
            });
        }
        if description.trim().is_empty() {
            return Err(CommunityValidationError::EmptyDescription);
        }
        if category.trim().is_empty() {
            return Err(CommunityValidationError::EmptyCategory);
        }
        if questions.trim().is_empty() {
            return Err(CommunityValidationError::EmptyQuestions);
        }
        Ok(Self {
            name: name.to_owned(),
            description: description.trim().to_owned(),
            category: category.trim().to_owned(),
            questions: questions.trim().to_owned(),
        })
    }

    /// Community name shown in listings.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Long-form description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Free-text category label.
    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    /// Questions shown to prospective joiners.
    pub fn questions(&self) -> &str {
        self.questions.as_str()
    }
}

/// Stored community document.
///
/// ## Invariants
/// - `creator` is immutable and holds sole delete authority.
/// - `members` is the creation-time attribution seed, not a live roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    /// Identifier minted at the store boundary.
    #[schema(value_type = String, example = "0d4cfe0e-8a2f-4c5d-9d4e-b7a1c43d6f20")]
    id: CommunityId,
    /// Name shown in listings.
    name: String,
    /// Long-form description.
    description: String,
    /// Free-text category label.
    category: String,
    /// Questions shown to prospective joiners.
    questions: String,
    /// Uid of the creating user.
    #[schema(value_type = String, example = "u-5f3a9c")]
    creator: UserId,
    /// Creation-time membership seed, conventionally `{creator}`.
    #[schema(value_type = Vec<String>)]
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    members: BTreeSet<UserId>,
    /// Creation timestamp (UTC).
    #[schema(value_type = String, format = DateTime)]
    created_at: DateTime<Utc>,
}

impl Community {
    /// Assemble a community from a validated draft.
    ///
    /// The membership seed starts as `{creator}` for attribution display.
    pub fn from_draft(
        id: CommunityId,
        draft: CommunityDraft,
        creator: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        let CommunityDraft {
            name,
            description,
            category,
            questions,
        } = draft;
        let members = BTreeSet::from([creator.clone()]);
        Self {
            id,
            name,
            description,
            category,
            questions,
            creator,
            members,
            created_at,
        }
    }

    /// Identifier minted at the store boundary.
    pub fn id(&self) -> &CommunityId {
        &self.id
    }

    /// Name shown in listings.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Long-form description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Free-text category label.
    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    /// Questions shown to prospective joiners.
    pub fn questions(&self) -> &str {
        self.questions.as_str()
    }

    /// Uid of the creating user.
    pub fn creator(&self) -> &UserId {
        &self.creator
    }

    /// Creation-time membership seed.
    pub fn members(&self) -> &BTreeSet<UserId> {
        &self.members
    }

    /// Creation timestamp (UTC).
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether `user` holds delete authority over this community.
    pub fn is_creator(&self, user: &UserId) -> bool {
        &self.creator == user
    }
}
