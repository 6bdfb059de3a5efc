//! Persistence adapters over the document store contract.

mod document_community_repository;
mod document_user_repository;
mod memory_document_store;

pub use document_community_repository::DocumentCommunityRepository;
pub use document_user_repository::DocumentUserRepository;
pub use memory_document_store::InMemoryDocumentStore;
