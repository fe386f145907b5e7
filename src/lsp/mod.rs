//! LSP server for keyword help in simulator decks.
//!
//! Provides hover with keyword synopses and commands to open the manual page,
//! toggle the feature and reload the dictionary.

mod hover;
mod server;

pub use server::{
    serve_stdio, CMD_DISABLE, CMD_ENABLE, CMD_OPEN_DOCUMENTATION, CMD_RELOAD,
};
