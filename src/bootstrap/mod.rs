//! Initialization routines for the relayer.
//!
//! Opens the credential store and builds the clients and submission pipeline
//! that make up the shared application state.
mod initialize_app_state;
pub use initialize_app_state::*;
