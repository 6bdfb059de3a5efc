//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, CommunityCommand, CommunityQuery, FixtureAccountCommand,
    FixtureCommunityCommand, FixtureCommunityQuery, FixtureMembershipCommand, FixtureProfileQuery,
    MembershipCommand, ProfileQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Sign-in/sign-out use-cases.
    pub accounts: Arc<dyn AccountCommand>,
    /// Profile view.
    pub profiles: Arc<dyn ProfileQuery>,
    /// Community create/delete.
    pub communities: Arc<dyn CommunityCommand>,
    /// Community listings and rosters.
    pub community_directory: Arc<dyn CommunityQuery>,
    /// Join/leave.
    pub memberships: Arc<dyn MembershipCommand>,
}

impl Default for HttpState {
    /// Fixture-backed state for tests and early wiring.
    fn default() -> Self {
        Self {
            accounts: Arc::new(FixtureAccountCommand),
            profiles: Arc::new(FixtureProfileQuery),
            communities: Arc::new(FixtureCommunityCommand),
            community_directory: Arc::new(FixtureCommunityQuery),
            memberships: Arc::new(FixtureMembershipCommand),
        }
    }
}
