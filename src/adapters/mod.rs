// Adapters layer: concrete implementations of the domain ports for a terminal session.

pub mod prompt;
pub mod storage;

pub use prompt::PromptConfirmer;
pub use storage::LocalStorage;
