use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};
use shared::{render_results, validate_vote, Poll, PollAction, StoreError, Vote};
use super::{closed_message, deleted_message, tokens_match, VOTE_RECORDED};

/// Process-lifetime poll storage.
///
/// Every mutation holds the write lock for its whole read-modify-write, so two
/// votes on one poll can never interleave. Result lookups share the read lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    polls: RwLock<HashMap<String, Poll>>,
    cmd_tokens: RwLock<HashMap<String, String>>,
}

fn recover<G>(poisoned: PoisonError<G>) -> G {
    // mutations only happen after validation, so the map is never half-written
    warn!("Poll store lock was poisoned, recovering");
    poisoned.into_inner()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_polls(&self) -> RwLockReadGuard<'_, HashMap<String, Poll>> {
        self.polls.read().unwrap_or_else(recover)
    }

    fn write_polls(&self) -> RwLockWriteGuard<'_, HashMap<String, Poll>> {
        self.polls.write().unwrap_or_else(recover)
    }

    pub fn create_poll(&self, poll: Poll) -> Result<(), StoreError> {
        let mut polls = self.write_polls();
        if polls.contains_key(&poll.poll_id) {
            return Err(StoreError::Conflict(poll.poll_id));
        }
        debug!(poll_id = %poll.poll_id, options = poll.options.len(), "Poll stored");
        polls.insert(poll.poll_id.clone(), poll);
        Ok(())
    }

    pub fn vote(&self, vote: &Vote) -> Result<String, StoreError> {
        let mut polls = self.write_polls();
        let poll = polls.get_mut(&vote.poll_id).ok_or(StoreError::NotFound)?;

        validate_vote(poll, vote)?;
        poll.record_vote(vote)?;

        Ok(VOTE_RECORDED.to_string())
    }

    pub fn get_poll_result(&self, poll_id: &str) -> Result<String, StoreError> {
        let polls = self.read_polls();
        let poll = polls.get(poll_id).ok_or(StoreError::NotFound)?;
        Ok(render_results(poll))
    }

    pub fn close_poll(&self, poll_id: &str, user_id: &str) -> Result<String, StoreError> {
        let mut polls = self.write_polls();
        let poll = polls.get_mut(poll_id).ok_or(StoreError::NotFound)?;

        if poll.closed {
            return Err(StoreError::AlreadyClosed(poll_id.to_string()));
        }
        if poll.creator != user_id {
            return Err(StoreError::Permission(PollAction::Close));
        }
        poll.closed = true;

        Ok(closed_message(poll_id))
    }

    pub fn delete_poll(&self, poll_id: &str, user_id: &str) -> Result<String, StoreError> {
        let mut polls = self.write_polls();
        let poll = polls.get(poll_id).ok_or(StoreError::NotFound)?;

        if poll.creator != user_id {
            return Err(StoreError::Permission(PollAction::Delete));
        }
        polls.remove(poll_id);

        Ok(deleted_message(poll_id))
    }

    pub fn add_cmd_token(&self, cmd_path: &str, token: &str) -> Result<(), StoreError> {
        let mut tokens = self.cmd_tokens.write().unwrap_or_else(recover);
        if tokens.contains_key(cmd_path) {
            return Err(StoreError::Conflict(cmd_path.to_string()));
        }
        tokens.insert(cmd_path.to_string(), token.to_string());
        Ok(())
    }

    pub fn validate_cmd_token(&self, cmd_path: &str, token: &str) -> bool {
        let tokens = self.cmd_tokens.read().unwrap_or_else(recover);
        match tokens.get(cmd_path) {
            Some(stored) => tokens_match(stored, token),
            None => {
                debug!(cmd_path, "No token registered for command");
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.read_polls().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of a stored poll.
    pub fn get(&self, poll_id: &str) -> Option<Poll> {
        self.read_polls().get(poll_id).cloned()
    }
}
