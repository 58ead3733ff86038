//! HTTP routes for the two contract operations.
//!
//! Bodies are taken as raw bytes so the controller decides how malformed JSON
//! is reported.
use crate::{api::controllers::submission, models::DefaultAppState};
use actix_web::{post, web, Responder};

/// Registers a peer id on behalf of an onboarded user.
#[post("/register-peer")]
async fn register_peer(body: web::Bytes, data: web::ThinData<DefaultAppState>) -> impl Responder {
    submission::register_peer(body, data).await
}

/// Submits the winners of a round on behalf of an onboarded user.
#[post("/submit-winner")]
async fn submit_winner(body: web::Bytes, data: web::ThinData<DefaultAppState>) -> impl Responder {
    submission::submit_winner(body, data).await
}

/// Configures the submission routes.
pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.service(register_peer).service(submit_winner);
}
