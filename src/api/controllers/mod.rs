//! # API Controllers Module
//!
//! ## Controllers
//!
//! * `submission` - `register-peer` and `submit-winner`

pub mod submission;
