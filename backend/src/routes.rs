use std::sync::Arc;
use rocket::{FromForm, State, post, form::Form, serde::json::Json};
use tracing::{debug, error, info, instrument, warn};
use shared::commands::{parse_create, parse_poll_id, parse_vote};
use shared::{CommandResponse, Poll, StoreError};
use crate::{chat::ChatClient, error::ApiError, store::PollStore};

/// Fields of the slash command webhook the bot reads. Everything else the
/// platform sends is ignored.
#[derive(Debug, Default, FromForm)]
pub struct CommandForm {
    pub text: Option<String>,
    pub user_id: Option<String>,
    pub channel_id: Option<String>,
    pub command: Option<String>,
    pub token: Option<String>,
}

impl CommandForm {
    fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    fn user_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or_default()
    }
}

pub struct AppState {
    pub store: PollStore,
    pub chat: Arc<dyn ChatClient>,
}

impl AppState {
    pub fn new(store: PollStore, chat: Arc<dyn ChatClient>) -> Self {
        Self { store, chat }
    }

    /// Every request must name its command and carry a token. The token is
    /// checked against the stored one when the store persists tokens.
    pub async fn authorize(&self, form: &CommandForm) -> Result<(), ApiError> {
        let present = |field: &Option<String>| field.as_deref().filter(|v| !v.is_empty()).map(str::to_owned);
        let (Some(command), Some(token)) = (present(&form.command), present(&form.token)) else {
            return Err(ApiError::MissingCredentials);
        };

        if self.store.enforces_tokens() && !self.store.validate_cmd_token(&command, &token).await {
            warn!(command = %command, "Rejected request with invalid token");
            return Err(ApiError::InvalidToken);
        }
        Ok(())
    }
}

/// User-facing store errors are answered like a success; the rest end the
/// request with `failure` as the only text the caller sees.
pub(crate) fn reply(result: Result<String, StoreError>, failure: &str) -> Result<Json<CommandResponse>, ApiError> {
    match result {
        Ok(text) => Ok(Json(CommandResponse::ephemeral(text))),
        Err(e) if e.is_user_facing() => {
            debug!(code = ?e.code(), "Command refused: {}", e);
            Ok(Json(CommandResponse::ephemeral(e.to_string())))
        }
        Err(e) => {
            error!("{}: {}", failure, e);
            Err(ApiError::Internal(e.user_message(failure)))
        }
    }
}

fn usage(message: impl ToString) -> Result<Json<CommandResponse>, ApiError> {
    Ok(Json(CommandResponse::ephemeral(message.to_string())))
}

#[instrument(skip(state, form), fields(poll_id))]
#[post("/poll-create", data = "<form>")]
pub async fn create_poll(state: &State<AppState>, form: Form<CommandForm>) -> Result<Json<CommandResponse>, ApiError> {
    let form = form.into_inner();
    state.authorize(&form).await?;

    let args = match parse_create(form.text()) {
        Ok(args) => args,
        Err(e) => return usage(e),
    };

    let poll = Poll::new(Poll::generate_id(), args.question.clone(), args.options.iter().cloned(), form.user_id());
    let poll_id = poll.poll_id.clone();
    tracing::Span::current().record("poll_id", poll_id.as_str());

    if let Err(e) = state.store.create_poll(poll).await {
        return reply(Err(e), "Failed to create poll");
    }
    info!(options = args.options.len(), "Poll created");

    let announcement = format!(
        "**Poll created!** *Poll_ID*: `{}` *Question*: `{}` *Options*: `{}`",
        poll_id,
        args.question,
        args.options.join("` `")
    );

    match form.channel_id.as_deref() {
        Some(channel_id) if !channel_id.is_empty() => match state.chat.create_post(channel_id, &announcement).await {
            Ok(()) => Ok(Json(CommandResponse::ephemeral(format!("*Poll_ID*: `{}`", poll_id)))),
            Err(e) => {
                warn!("Failed to post poll announcement, replying in channel: {}", e);
                Ok(Json(CommandResponse::in_channel(announcement)))
            }
        },
        _ => Ok(Json(CommandResponse::in_channel(announcement))),
    }
}

#[instrument(skip(state, form))]
#[post("/poll-vote", data = "<form>")]
pub async fn vote(state: &State<AppState>, form: Form<CommandForm>) -> Result<Json<CommandResponse>, ApiError> {
    let form = form.into_inner();
    state.authorize(&form).await?;

    let ballot = match parse_vote(form.text()) {
        Ok(args) => args.into_vote(form.user_id()),
        Err(e) => return usage(e),
    };

    reply(state.store.vote(&ballot).await, "Failed to vote")
}

#[instrument(skip(state, form))]
#[post("/poll-results", data = "<form>")]
pub async fn poll_results(state: &State<AppState>, form: Form<CommandForm>) -> Result<Json<CommandResponse>, ApiError> {
    let form = form.into_inner();
    state.authorize(&form).await?;

    let poll_id = match parse_poll_id(form.text(), "poll-results") {
        Ok(id) => id,
        Err(e) => return usage(e),
    };

    reply(state.store.get_poll_result(&poll_id).await, "Failed to get poll results")
}

#[instrument(skip(state, form))]
#[post("/poll-close", data = "<form>")]
pub async fn close_poll(state: &State<AppState>, form: Form<CommandForm>) -> Result<Json<CommandResponse>, ApiError> {
    let form = form.into_inner();
    state.authorize(&form).await?;

    let poll_id = match parse_poll_id(form.text(), "poll-close") {
        Ok(id) => id,
        Err(e) => return usage(e),
    };

    reply(state.store.close_poll(&poll_id, form.user_id()).await, "Failed to close poll")
}

#[instrument(skip(state, form))]
#[post("/poll-delete", data = "<form>")]
pub async fn delete_poll(state: &State<AppState>, form: Form<CommandForm>) -> Result<Json<CommandResponse>, ApiError> {
    let form = form.into_inner();
    state.authorize(&form).await?;

    let poll_id = match parse_poll_id(form.text(), "poll-delete") {
        Ok(id) => id,
        Err(e) => return usage(e),
    };

    reply(state.store.delete_poll(&poll_id, form.user_id()).await, "Failed to delete poll")
}
