//! # API Routes Module
//!
//! Configures HTTP routes for the relayer API, mounted under `/api`.
//!
//! ## Routes
//!
//! * `/register-peer`, `/submit-winner` - contract call submission
//! * `/v1/health` - health check

pub mod health;
pub mod submission;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(submission::init)
        .service(web::scope("/v1").configure(health::init));
}
