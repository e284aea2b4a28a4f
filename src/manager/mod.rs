// src/manager/mod.rs

//! Manages the lifecycle of the manager session: connection ownership,
//! login/logoff, action correlation, and event dispatch.

// Declare the private sub-modules of the `manager` module.
mod actions;
mod connection;
mod session;

// Publicly re-export the primary type from the sub-modules.
// This creates a clean public API for the `manager` module, hiding the
// internal file structure from the rest of the crate.
pub use actions::OriginateParams;
pub use session::Manager;
