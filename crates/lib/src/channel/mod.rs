//! Outbound side of the channel: connector client and token acquisition.
//!
//! The [`ConversationApi`] trait is the seam between the dispatcher and the
//! Bot Framework connector, so tests can record outbound activities without a
//! network.

mod auth;
mod connector;

pub use auth::{AuthError, TokenProvider};
pub use connector::{ConnectorClient, ConversationApi};
