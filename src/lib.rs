// src/lib.rs

pub mod config;
pub mod core;
pub mod manager;

// Re-export
pub use crate::config::Config;
pub use crate::core::AmiError;
pub use crate::core::events::{EventHandler, EventRegistry, PeerInfo};
pub use crate::core::protocol::{ActionRequest, AmiCodec, Message, MessageKind};
pub use crate::manager::Manager;
