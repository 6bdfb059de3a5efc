//! Domain ports and supporting types for the hexagonal boundary.

mod account_command;
mod community_command;
mod community_query;
mod community_repository;
mod document_store;
mod membership_command;
mod profile_query;
mod session_provider;
mod user_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, FIXTURE_UID, FixtureAccountCommand};
#[cfg(test)]
pub use community_command::MockCommunityCommand;
pub use community_command::{CommunityCommand, FixtureCommunityCommand};
#[cfg(test)]
pub use community_query::MockCommunityQuery;
pub use community_query::{CommunityOverview, CommunityQuery, FixtureCommunityQuery};
#[cfg(test)]
pub use community_repository::MockCommunityRepository;
pub use community_repository::{
    CommunityRepository, CommunityRepositoryError, FixtureCommunityRepository,
};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    Document, DocumentFields, DocumentStore, DocumentStoreError, MergePolicy, SetOp,
};
#[cfg(test)]
pub use membership_command::MockMembershipCommand;
pub use membership_command::{FixtureMembershipCommand, MembershipCommand};
#[cfg(test)]
pub use profile_query::MockProfileQuery;
pub use profile_query::{FixtureProfileQuery, ProfileQuery};
#[cfg(test)]
pub use session_provider::MockSessionProvider;
pub use session_provider::{
    AuthListener, AuthSubscription, FixtureSessionProvider, ListenerRegistry, SessionProvider,
    SessionProviderError,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserRepository, UserRepositoryError};
