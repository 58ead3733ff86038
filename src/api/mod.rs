//! # API Module
//!
//! HTTP surface of the relayer.
//!
//! ## Structure
//!
//! * `controllers` - request handling
//! * `routes` - endpoint definitions
//! * `middleware` - request timeout

pub mod controllers;

pub mod middleware;

pub mod routes;
