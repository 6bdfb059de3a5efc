//! User profile model.
//!
//! Profiles are denormalised copies of the identity provider's attributes plus
//! the user-owned membership set. The membership set is the canonical side of
//! the user/community relation; community rosters are derived from it.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use crate::domain::community::CommunityId;

/// Maximum accepted length for an identity token.
pub const USER_ID_MAX: usize = 128;
/// Maximum accepted length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Validation errors returned by the profile value-object constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The identity token was empty.
    EmptyId,
    /// The identity token exceeded [`USER_ID_MAX`] characters.
    IdTooLong {
        /// Permitted maximum.
        max: usize,
    },
    /// The identity token contained whitespace or control characters.
    IdInvalidCharacters,
    /// The display name was blank once trimmed.
    EmptyDisplayName,
    /// The display name exceeded [`DISPLAY_NAME_MAX`] characters.
    DisplayNameTooLong {
        /// Permitted maximum.
        max: usize,
    },
    /// The email address was not of the shape `local@domain`.
    InvalidEmail,
    /// The photo URL did not parse as an http(s) URL.
    InvalidPhotoUrl,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::IdTooLong { max } => {
                write!(f, "user id must be at most {max} characters")
            }
            Self::IdInvalidCharacters => {
                write!(f, "user id must not contain whitespace or control characters")
            }
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::InvalidEmail => write!(f, "email address must look like local@domain"),
            Self::InvalidPhotoUrl => write!(f, "photo URL must be a valid http(s) URL"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable opaque identity token issued by the session provider.
///
/// Unlike database-generated keys this is whatever the identity provider
/// mints, so the only shape enforced is "one printable token".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.chars().count() > USER_ID_MAX {
            return Err(UserValidationError::IdTooLong { max: USER_ID_MAX });
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(UserValidationError::IdInvalidCharacters);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Human readable display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`] from owned input.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(display_name.into())
    }

    fn from_owned(display_name: String) -> Result<Self, UserValidationError> {
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if display_name.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Email address copied from the identity provider.
///
/// Full RFC validation is the provider's job; this only rejects values that
/// cannot possibly be addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`] from owned input.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(email.into())
    }

    fn from_owned(email: String) -> Result<Self, UserValidationError> {
        let Some((local, domain)) = email.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Profile photo location, restricted to http(s) URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhotoUrl(String);

impl PhotoUrl {
    /// Validate and construct a [`PhotoUrl`] from owned input.
    pub fn new(url: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(url.into())
    }

    fn from_owned(url: String) -> Result<Self, UserValidationError> {
        let parsed = Url::parse(&url).map_err(|_| UserValidationError::InvalidPhotoUrl)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(UserValidationError::InvalidPhotoUrl);
        }
        Ok(Self(url))
    }
}

impl AsRef<str> for PhotoUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PhotoUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PhotoUrl> for String {
    fn from(value: PhotoUrl) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhotoUrl {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Denormalised attributes mirrored from the identity provider.
///
/// All fields are optional because the provider may withhold any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAttributes {
    /// Name shown to other users.
    #[schema(value_type = Option<String>, example = "Ada Lovelace")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<DisplayName>,
    /// Contact address.
    #[schema(value_type = Option<String>, example = "ada@example.com")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailAddress>,
    /// Avatar location.
    #[schema(value_type = Option<String>, example = "https://example.com/ada.png")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<PhotoUrl>,
}

impl ProfileAttributes {
    /// Overlay `incoming` onto `self`: present values refresh, absent values
    /// leave the stored ones untouched.
    pub fn merge(&mut self, incoming: &Self) {
        if let Some(display_name) = &incoming.display_name {
            self.display_name = Some(display_name.clone());
        }
        if let Some(email) = &incoming.email {
            self.email = Some(email.clone());
        }
        if let Some(photo_url) = &incoming.photo_url {
            self.photo_url = Some(photo_url.clone());
        }
    }
}

/// Stored user profile document.
///
/// ## Invariants
/// - `communities` has set semantics; every id in it is expected to reference
///   a community that still exists (eventually, not instantaneously).
///
/// Deserialisation tolerates unknown fields so that store documents written by
/// newer revisions survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Stable identity token.
    #[schema(value_type = String, example = "u-5f3a9c")]
    id: UserId,
    /// Provider-mirrored attributes.
    #[serde(flatten)]
    attributes: ProfileAttributes,
    /// Ids of the communities this user has joined.
    #[schema(value_type = Vec<String>)]
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    communities: BTreeSet<CommunityId>,
}

impl UserProfile {
    /// Build a fresh profile with an empty membership set.
    pub fn new(id: UserId, attributes: ProfileAttributes) -> Self {
        Self {
            id,
            attributes,
            communities: BTreeSet::new(),
        }
    }

    /// Stable identity token.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Provider-mirrored attributes.
    pub fn attributes(&self) -> &ProfileAttributes {
        &self.attributes
    }

    /// Ids of the communities this user has joined.
    pub fn communities(&self) -> &BTreeSet<CommunityId> {
        &self.communities
    }

    /// Whether the user has joined the given community.
    pub fn has_joined(&self, community: &CommunityId) -> bool {
        self.communities.contains(community)
    }

    /// Non-destructive attribute refresh performed on every sign-in.
    ///
    /// The membership set is never touched here.
    pub fn merge_attributes(&mut self, incoming: &ProfileAttributes) {
        self.attributes.merge(incoming);
    }

    /// Replace the membership set wholesale (used by adapters when re-reading
    /// the stored document).
    pub fn with_communities(mut self, communities: BTreeSet<CommunityId>) -> Self {
        self.communities = communities;
        self
    }
}
