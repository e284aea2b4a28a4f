// src/core/mod.rs

//! The central module containing the core logic and data structures of Trunkline.

pub mod errors;
pub mod events;
pub mod protocol;

pub use errors::AmiError;
pub use protocol::{ActionRequest, Message, MessageKind};
