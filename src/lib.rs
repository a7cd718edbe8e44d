pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;
pub use config::ClientConfig;

pub use adapters::{LocalStorage, PromptConfirmer};
pub use app::AllotmentWorkflow;
pub use crate::core::{
    api::HttpBackend, dispatcher::MutationDispatcher, listing::Listing,
    selection::SelectionStore,
};
pub use utils::error::{ClientError, Result};
