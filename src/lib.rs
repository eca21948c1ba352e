//! Lingon - Swedish language learning MCP server backed by Notion
//!
//! Exposes two Notion databases (vocabulary and grammar) as MCP tools
//! for a conversational assistant. The interesting parts are pure:
//! the spaced-repetition scheduler ([`review`]), the study-set composer
//! ([`review::compose`]), and the property-schema mapper ([`schema`]).
//! The [`notion`] gateway owns all network I/O and the [`server`] module
//! speaks the protocol over stdio.

pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod notion;
pub mod review;
pub mod schema;
pub mod server;
pub mod tools;
