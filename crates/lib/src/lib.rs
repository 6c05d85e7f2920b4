//! Teams LLM bot core library — activity types, backend clients, dispatcher,
//! connector, and HTTP server used by the CLI binary.

pub mod activity;
pub mod backend;
pub mod bot;
pub mod channel;
pub mod config;
pub mod server;
