// src/core/errors.rs

//! Defines the primary error type for the entire crate.

use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing all possible failures within the client.
/// Using `thiserror` allows for clean error definitions and automatic `From` trait implementations.
#[derive(Error, Debug)]
pub enum AmiError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Not connected to a manager peer")]
    NotConnected,

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Event handler for '{0}' is already registered")]
    HandlerAlreadyRegistered(String),

    #[error("Event handler for '{0}' is not registered")]
    HandlerNotRegistered(String),
}

// Manual implementation of Clone because `std::io::Error` is not cloneable.
// We wrap it in an Arc to allow for cheap, shared cloning.
impl Clone for AmiError {
    fn clone(&self) -> Self {
        match self {
            AmiError::Io(e) => AmiError::Io(Arc::clone(e)),
            AmiError::ConnectionClosed => AmiError::ConnectionClosed,
            AmiError::NotConnected => AmiError::NotConnected,
            AmiError::Authentication(s) => AmiError::Authentication(s.clone()),
            AmiError::Protocol(s) => AmiError::Protocol(s.clone()),
            AmiError::HandlerAlreadyRegistered(s) => AmiError::HandlerAlreadyRegistered(s.clone()),
            AmiError::HandlerNotRegistered(s) => AmiError::HandlerNotRegistered(s.clone()),
        }
    }
}

impl PartialEq for AmiError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AmiError::Io(e1), AmiError::Io(e2)) => e1.to_string() == e2.to_string(),
            (AmiError::ConnectionClosed, AmiError::ConnectionClosed) => true,
            (AmiError::NotConnected, AmiError::NotConnected) => true,
            (AmiError::Authentication(s1), AmiError::Authentication(s2)) => s1 == s2,
            (AmiError::Protocol(s1), AmiError::Protocol(s2)) => s1 == s2,
            (AmiError::HandlerAlreadyRegistered(s1), AmiError::HandlerAlreadyRegistered(s2)) => {
                s1 == s2
            }
            (AmiError::HandlerNotRegistered(s1), AmiError::HandlerNotRegistered(s2)) => s1 == s2,
            _ => false,
        }
    }
}

impl From<std::io::Error> for AmiError {
    fn from(e: std::io::Error) -> Self {
        AmiError::Io(Arc::new(e))
    }
}
