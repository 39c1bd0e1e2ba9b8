//! # client
//!
//! Native client for the `/ws/chat` assistant backend.
//!
//! This crate contains the websocket session, the balance HTTP client,
//! client-side state (transcript, panels, attachment drafts, history pagers,
//! notifications), theme persistence, and [`app::ChatApp`], the single
//! session object that owns all of that state. Front ends drive `ChatApp`
//! and forward whatever it produces to a [`net::Transport`].

pub mod app;
pub mod config;
pub mod error;
pub mod net;
pub mod state;
pub mod util;

pub use app::{AppEffect, ChatApp};
pub use config::ClientConfig;
pub use error::ClientError;
