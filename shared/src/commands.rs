use std::collections::HashSet;
use thiserror::Error;
use crate::models::Vote;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("**Invalid format!** *Example*: `/poll-create \"Question\" \"Option1\" \"Option2\" ... \"OptionN\"`")]
    Create,
    #[error("**Invalid format!** *Example*: `/poll-vote \"Poll_ID\" \"Option\"`")]
    Vote,
    #[error("**Invalid format!** *Example*: `/{0} \"Poll_ID\"`")]
    PollId(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateArgs {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteArgs {
    pub poll_id: String,
    pub option: String,
}

/// Splits `"a" "b" "c"` into its quoted arguments.
pub fn split_args(text: &str) -> Vec<String> {
    text.trim()
        .split("\" \"")
        .map(|arg| arg.trim_matches('"').to_string())
        .collect()
}

pub fn parse_create(text: &str) -> Result<CreateArgs, ParseError> {
    let mut args = split_args(text);
    if args.len() < 2 || args.iter().any(|arg| arg.trim().is_empty()) {
        return Err(ParseError::Create);
    }
    let question = args.remove(0);
    let mut seen = HashSet::new();
    args.retain(|option| seen.insert(option.clone()));
    Ok(CreateArgs { question, options: args })
}

pub fn parse_vote(text: &str) -> Result<VoteArgs, ParseError> {
    let args = split_args(text);
    match <[String; 2]>::try_from(args) {
        Ok([poll_id, option]) => Ok(VoteArgs { poll_id, option }),
        Err(_) => Err(ParseError::Vote),
    }
}

/// Parses the single poll id taken by `/poll-results`, `/poll-close` and
/// `/poll-delete`. `trigger` only feeds the usage message.
pub fn parse_poll_id(text: &str, trigger: &'static str) -> Result<String, ParseError> {
    let args = split_args(text);
    match <[String; 1]>::try_from(args) {
        Ok([poll_id]) => Ok(poll_id),
        Err(_) => Err(ParseError::PollId(trigger)),
    }
}

impl VoteArgs {
    pub fn into_vote(self, user_id: impl Into<String>) -> Vote {
        Vote { poll_id: self.poll_id, user_id: user_id.into(), option: self.option }
    }
}
