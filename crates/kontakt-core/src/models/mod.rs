//! Data models: contacts, messages, configuration and embedded resources.

pub mod config;
pub mod contact;
pub mod embedded;
pub mod message;
