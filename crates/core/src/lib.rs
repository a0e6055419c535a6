//! Core logic of the relay: conversation history, web search formatting,
//! prompt assembly, model calls and the command controller.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod access;
mod command;
mod error;
mod event;
pub mod history;
mod model_client;
pub mod prompt;
mod relay;
mod retry;
pub mod search;
mod settings;
pub mod texts;

pub use access::Allowlist;
pub use command::Command;
pub use error::{CompletionError, SearchError};
pub use event::{ConversationId, EventKind, InboundEvent, ParseMode, PlaceholderId, Reply, Signal};
pub use history::{HistoryStore, SearchSlot};
pub use model_client::{ModelClient, ModelOptions, completion_budget};
pub use relay::{Relay, RelayBuilder};
pub use retry::RetryPolicy;
pub use search::{FormattedResults, SearchClient, SearchOptions};
pub use settings::*;
