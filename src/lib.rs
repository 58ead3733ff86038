//! Modal Relayer
//!
//! Signs and submits contract calls on behalf of onboarded users. A request
//! names an organization; the relayer loads that organization's delegated API
//! key, has the custodial signer produce the owner signature through the
//! signer relay, and submits a sponsored user operation from the owner's
//! smart account.
//!
//! # Modules
//!
//! * `api` - HTTP routes, controllers and middleware
//! * `bootstrap` - application state construction
//! * `config` - environment configuration
//! * `domain` - contract calls and the submission pipeline
//! * `repositories` - credential store access
//! * `services` - signer, smart account and bundler clients
pub mod api;
pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod domain;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
