//! Domain primitives, aggregates, ports, and services.
//!
//! Purpose: define strongly typed entities for the community platform and the
//! use-case services that keep user membership sets and community records
//! consistent. Types are immutable where possible and document their
//! invariants and serde contracts in each type's Rustdoc.

pub mod accounts;
pub mod auth;
pub mod communities;
pub mod community;
pub mod error;
pub mod membership;
pub mod ports;
pub mod user;

pub use self::accounts::AccountService;
pub use self::auth::{AuthValidationError, Identity, IdentityAssertion};
pub use self::communities::CommunityService;
pub use self::community::{
    Community, CommunityDraft, CommunityId, CommunityValidationError,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::membership::{CascadeFailure, CascadeReport, MembershipSynchronizer};
pub use self::user::{
    DisplayName, EmailAddress, PhotoUrl, ProfileAttributes, UserId, UserProfile,
    UserValidationError,
};

/// Convenient domain result alias.
pub type ApiResult<T> = Result<T, Error>;
