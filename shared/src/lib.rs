pub mod error;
pub mod models;
pub mod validation;
pub mod results;
pub mod commands;

pub use error::{ErrorCode, PollAction, Result, StoreError, GENERIC_FAILURE};
pub use models::*;
pub use validation::*;
pub use results::render_results;
pub use commands::{CreateArgs, ParseError, VoteArgs};
