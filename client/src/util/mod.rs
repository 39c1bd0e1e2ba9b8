//! Preference persistence and theme selection.
//!
//! SYSTEM CONTEXT
//! ==============
//! `preferences` is the key/value store front ends persist settings in;
//! `theme` is its only consumer today.

pub mod preferences;
pub mod theme;
