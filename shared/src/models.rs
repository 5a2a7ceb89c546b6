use serde::{Serialize, Deserialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub poll_id: String,
    pub question: String,
    pub options: HashMap<String, u32>,
    pub voters: HashSet<String>,
    pub creator: String,
    pub closed: bool,
}

/// A single vote request. Never stored on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub poll_id: String,
    pub user_id: String,
    pub option: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub trigger: &'static str,
    pub url_path: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub hint: &'static str,
}

pub const COMMAND_LIST: [CommandInfo; 5] = [
    CommandInfo {
        trigger: "poll-create",
        url_path: "/poll-create",
        display_name: "Create poll",
        description: "Create a new poll",
        hint: "[\"question\"] [\"option1\"] [\"option2\"] ...",
    },
    CommandInfo {
        trigger: "poll-vote",
        url_path: "/poll-vote",
        display_name: "Vote",
        description: "Cast a vote",
        hint: "[\"poll_id\"] [\"option\"]",
    },
    CommandInfo {
        trigger: "poll-results",
        url_path: "/poll-results",
        display_name: "Results",
        description: "Get poll results",
        hint: "[\"poll_id\"]",
    },
    CommandInfo {
        trigger: "poll-close",
        url_path: "/poll-close",
        display_name: "Close poll",
        description: "Close an active poll",
        hint: "[\"poll_id\"]",
    },
    CommandInfo {
        trigger: "poll-delete",
        url_path: "/poll-delete",
        display_name: "Delete poll",
        description: "Delete an existing poll",
        hint: "[\"poll_id\"]",
    },
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Ephemeral,
    InChannel,
}

/// Body returned to the chat platform for a slash command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandResponse {
    pub response_type: ResponseType,
    pub text: String,
}

impl CommandResponse {
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { response_type: ResponseType::Ephemeral, text: text.into() }
    }

    pub fn in_channel(text: impl Into<String>) -> Self {
        Self { response_type: ResponseType::InChannel, text: text.into() }
    }
}

impl Poll {
    /// Fresh open poll with every option at zero. Repeated labels collapse
    /// into one option.
    pub fn new<I, S>(poll_id: impl Into<String>, question: impl Into<String>, options: I, creator: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            poll_id: poll_id.into(),
            question: question.into(),
            options: options.into_iter().map(|opt| (opt.into(), 0)).collect(),
            voters: HashSet::new(),
            creator: creator.into(),
            closed: false,
        }
    }

    pub fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub fn total_voters(&self) -> usize {
        self.voters.len()
    }

    pub fn total_votes(&self) -> u64 {
        self.options.values().map(|&count| u64::from(count)).sum()
    }

    /// Applies an already validated vote. The poll is left untouched when
    /// the option is unknown or its count is saturated.
    pub fn record_vote(&mut self, vote: &Vote) -> Result<(), StoreError> {
        let count = self.options.get_mut(&vote.option).ok_or(StoreError::InvalidOption)?;
        *count = count
            .checked_add(1)
            .ok_or_else(|| StoreError::decode(format!("vote count of option `{}` overflows", vote.option)))?;
        self.voters.insert(vote.user_id.clone());
        Ok(())
    }
}
