//! Conversational help-desk agent.
//!
//! Answers from a small embedded knowledge blurb or researches the official
//! documentation through a tool-calling loop, and replies in the user's
//! language.

pub mod commands;
pub mod config;
pub mod desk;
pub mod logging;
pub mod rchain;
