// src/core/protocol/mod.rs

pub mod action;
pub mod codec;
pub mod message;

pub use action::{ActionIdGenerator, ActionRequest, ActionValue};
pub use codec::AmiCodec;
pub use message::{Message, MessageKind};
