use std::collections::HashSet;
use thiserror::Error;
use tracing::{info, instrument};
use shared::{CommandInfo, StoreError, COMMAND_LIST};
use crate::chat::{ChatClient, ChatError, NewCommand};
use crate::config::Config;
use crate::store::PollStore;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("failed to get team: {0}")]
    Team(ChatError),
    #[error("failed to get commands list: {0}")]
    ListCommands(ChatError),
    #[error("failed to create command '{path}': {source}")]
    CreateCommand { path: &'static str, source: ChatError },
    #[error("failed to add cmd token : {0}")]
    AddToken(StoreError),
}

pub fn new_command(team_id: &str, info: &CommandInfo, url: String) -> NewCommand {
    NewCommand {
        team_id: team_id.to_string(),
        trigger: info.trigger.to_string(),
        method: "P".to_string(),
        url,
        display_name: info.display_name.to_string(),
        description: info.description.to_string(),
        auto_complete: true,
        auto_complete_desc: info.description.to_string(),
        auto_complete_hint: info.hint.to_string(),
    }
}

/// Creates every slash command the team does not have yet and stores the
/// token the platform issues for it. Commands already present are left as
/// they are. Returns the paths that were registered.
#[instrument(skip_all, fields(team = %config.team_name))]
pub async fn register_commands(
    chat: &dyn ChatClient,
    store: &PollStore,
    config: &Config,
) -> Result<Vec<&'static str>, RegistrationError> {
    let team_id = chat
        .team_id_by_name(&config.team_name)
        .await
        .map_err(RegistrationError::Team)?;

    let existing: HashSet<String> = chat
        .list_commands(&team_id)
        .await
        .map_err(RegistrationError::ListCommands)?
        .into_iter()
        .map(|cmd| cmd.trigger)
        .collect();

    let mut registered = Vec::new();
    for info in COMMAND_LIST.iter().filter(|info| !existing.contains(info.trigger)) {
        let command = new_command(&team_id, info, config.command_url(info.url_path));
        let created = chat
            .create_command(&command)
            .await
            .map_err(|source| RegistrationError::CreateCommand { path: info.url_path, source })?;

        store
            .add_cmd_token(info.url_path, &created.token)
            .await
            .map_err(RegistrationError::AddToken)?;

        info!("✓ Created command '{}'", info.url_path);
        registered.push(info.url_path);
    }

    Ok(registered)
}
