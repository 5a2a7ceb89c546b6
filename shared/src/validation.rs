use crate::error::StoreError;
use crate::models::{Poll, Vote};

/// Checks a vote against the current poll state.
///
/// The order is fixed: option validity, then duplicate voter, then closed
/// state. A returning voter naming a bogus option is told the option is
/// invalid.
pub fn validate_vote(poll: &Poll, vote: &Vote) -> Result<(), StoreError> {
    if !poll.options.contains_key(&vote.option) { return Err(StoreError::InvalidOption); }
    if poll.voters.contains(&vote.user_id) { return Err(StoreError::DuplicateVote); }
    if poll.closed { return Err(StoreError::PollClosed(vote.poll_id.clone())); }

    Ok(())
}
