//! Chat transport module.

mod chat;

pub use chat::*;
