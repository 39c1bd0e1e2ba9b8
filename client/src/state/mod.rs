//! Client-side state owned by [`crate::app::ChatApp`].
//!
//! SYSTEM CONTEXT
//! ==============
//! Each module is a plain data model with no I/O. Inbound events mutate it
//! through `ChatApp::handle`, and front ends read it to render.

pub mod attachments;
pub mod chat;
pub mod compose;
pub mod notifications;
pub mod pager;
pub mod panels;
