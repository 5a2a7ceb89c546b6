pub mod database;
pub mod memory;

use ring::constant_time::verify_slices_are_equal;
use shared::{Poll, StoreError, Vote};

pub use database::DatabaseStore;
pub use memory::MemoryStore;

pub const VOTE_RECORDED: &str = "**Voice recorded!**";

pub fn closed_message(poll_id: &str) -> String {
    format!("*Poll*: `{}` **has been successfully closed!**", poll_id)
}

pub fn deleted_message(poll_id: &str) -> String {
    format!("*Poll*: `{}` **has been successfully deleted!**", poll_id)
}

pub(crate) fn tokens_match(stored: &str, presented: &str) -> bool {
    verify_slices_are_equal(stored.as_bytes(), presented.as_bytes()).is_ok()
}

/// The poll storage contract, picked once at startup from `MODE`.
#[derive(Debug)]
pub enum PollStore {
    Memory(MemoryStore),
    Database(DatabaseStore),
}

impl PollStore {
    pub async fn create_poll(&self, poll: Poll) -> Result<(), StoreError> {
        match self {
            PollStore::Memory(store) => store.create_poll(poll),
            PollStore::Database(store) => store.create_poll(&poll).await,
        }
    }

    pub async fn vote(&self, vote: &Vote) -> Result<String, StoreError> {
        match self {
            PollStore::Memory(store) => store.vote(vote),
            PollStore::Database(store) => store.vote(vote).await,
        }
    }

    pub async fn get_poll_result(&self, poll_id: &str) -> Result<String, StoreError> {
        match self {
            PollStore::Memory(store) => store.get_poll_result(poll_id),
            PollStore::Database(store) => store.get_poll_result(poll_id).await,
        }
    }

    pub async fn close_poll(&self, poll_id: &str, user_id: &str) -> Result<String, StoreError> {
        match self {
            PollStore::Memory(store) => store.close_poll(poll_id, user_id),
            PollStore::Database(store) => store.close_poll(poll_id, user_id).await,
        }
    }

    pub async fn delete_poll(&self, poll_id: &str, user_id: &str) -> Result<String, StoreError> {
        match self {
            PollStore::Memory(store) => store.delete_poll(poll_id, user_id),
            PollStore::Database(store) => store.delete_poll(poll_id, user_id).await,
        }
    }

    pub async fn add_cmd_token(&self, cmd_path: &str, token: &str) -> Result<(), StoreError> {
        match self {
            PollStore::Memory(store) => store.add_cmd_token(cmd_path, token),
            PollStore::Database(store) => store.add_cmd_token(cmd_path, token).await,
        }
    }

    pub async fn validate_cmd_token(&self, cmd_path: &str, token: &str) -> bool {
        match self {
            PollStore::Memory(store) => store.validate_cmd_token(cmd_path, token),
            PollStore::Database(store) => store.validate_cmd_token(cmd_path, token).await,
        }
    }

    /// Inbound command tokens are only checked against the persistent store;
    /// an in-memory store never sees tokens of commands registered by an
    /// earlier process.
    pub fn enforces_tokens(&self) -> bool {
        matches!(self, PollStore::Database(_))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            PollStore::Memory(_) => "memory",
            PollStore::Database(_) => "database",
        }
    }
}
