use std::time::Duration;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status code {0}")]
    Status(u16),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteCommand {
    pub trigger: String,
    #[serde(default)]
    pub token: String,
}

/// Slash command definition sent to the chat platform.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewCommand {
    pub team_id: String,
    pub trigger: String,
    pub method: String,
    pub url: String,
    pub display_name: String,
    pub description: String,
    pub auto_complete: bool,
    pub auto_complete_desc: String,
    pub auto_complete_hint: String,
}

#[derive(Debug, Deserialize)]
struct Team {
    id: String,
}

#[derive(Debug, Serialize)]
struct NewPost<'a> {
    channel_id: &'a str,
    message: &'a str,
}

/// The parts of the chat platform API the bot talks to.
#[rocket::async_trait]
pub trait ChatClient: Send + Sync {
    async fn team_id_by_name(&self, team_name: &str) -> Result<String, ChatError>;
    async fn list_commands(&self, team_id: &str) -> Result<Vec<RemoteCommand>, ChatError>;
    async fn create_command(&self, command: &NewCommand) -> Result<RemoteCommand, ChatError>;
    async fn create_post(&self, channel_id: &str, message: &str) -> Result<(), ChatError>;
}

/// Mattermost REST v4 client authenticated with the bot token.
#[derive(Debug, Clone)]
pub struct MattermostClient {
    http: Client,
    base_url: String,
    token: String,
}

fn expect_status(response: Response, expected: StatusCode) -> Result<Response, ChatError> {
    if response.status() == expected {
        Ok(response)
    } else {
        Err(ChatError::Status(response.status().as_u16()))
    }
}

impl MattermostClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ChatError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v4{}", self.base_url, path)
    }
}

#[rocket::async_trait]
impl ChatClient for MattermostClient {
    async fn team_id_by_name(&self, team_name: &str) -> Result<String, ChatError> {
        let response = self
            .http
            .get(self.url(&format!("/teams/name/{}", team_name)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let team: Team = expect_status(response, StatusCode::OK)?.json().await?;
        Ok(team.id)
    }

    async fn list_commands(&self, team_id: &str) -> Result<Vec<RemoteCommand>, ChatError> {
        let response = self
            .http
            .get(self.url("/commands"))
            .query(&[("team_id", team_id), ("custom_only", "false")])
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(expect_status(response, StatusCode::OK)?.json().await?)
    }

    async fn create_command(&self, command: &NewCommand) -> Result<RemoteCommand, ChatError> {
        let response = self
            .http
            .post(self.url("/commands"))
            .bearer_auth(&self.token)
            .json(command)
            .send()
            .await?;
        Ok(expect_status(response, StatusCode::CREATED)?.json().await?)
    }

    async fn create_post(&self, channel_id: &str, message: &str) -> Result<(), ChatError> {
        let response = self
            .http
            .post(self.url("/posts"))
            .bearer_auth(&self.token)
            .json(&NewPost { channel_id, message })
            .send()
            .await?;
        expect_status(response, StatusCode::CREATED)?;
        debug!(channel_id, "Post created");
        Ok(())
    }
}
