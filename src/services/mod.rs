//! # Services Module
//!
//! Clients for the external systems the relayer depends on and the signing
//! and submission services built on top of them.

pub mod bundler;
pub mod provider;
pub mod signer;
pub mod signing_relay;
pub mod smart_account;
pub mod turnkey;
