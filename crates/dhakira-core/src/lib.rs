//! dhakira-core: model, rules, and session state for the dhakira client.
//!
//! Everything the client decides on its own lives here: which quiz levels
//! are open, which stage follows the current one, how a quiz attempt moves
//! from question to summary, how a chat transcript grows, and when the
//! session list needs re-rendering. Talking to the backend is abstracted
//! behind [`backend::Backend`].

pub mod backend;
pub mod chat;
pub mod context;
pub mod error;
pub mod lessons;
pub mod model;
pub mod notice;
pub mod progress;
pub mod quiz;
pub mod reveal;
pub mod router;
pub mod sessions;
pub mod stages;
pub mod store;

pub use context::{Action, AppContext};
pub use error::ClientError;
pub use model::{SessionNonce, StageCode, UserProfile};
