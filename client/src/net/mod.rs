//! Networking modules for the websocket chat channel and HTTP balance calls.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` owns the websocket lifecycle, `balance` handles the REST calls,
//! and [`Transport`] is the seam [`crate::app::ChatApp`] sends through.

pub mod balance;
pub mod session;

use frames::OutboundFrame;

use crate::error::ClientError;

pub use balance::BalanceClient;
pub use session::{ChatSession, SessionEvent};

/// Outbound side of a chat connection.
pub trait Transport {
    /// Whether the connection is currently open.
    fn is_open(&self) -> bool;

    /// Hand a frame to the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] if the connection is closed.
    fn send(&self, frame: OutboundFrame) -> Result<(), ClientError>;
}
