//! # Domain Module
//!
//! * [`contract`]: call encoding for the coordinator contract
//! * [`pipeline`]: the delegated signing and submission pipeline shared by all endpoints

pub mod contract;

mod pipeline;
pub use pipeline::*;
