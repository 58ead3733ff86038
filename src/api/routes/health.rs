//! Liveness endpoint. Answers without touching the credential store or the relays.
use actix_web::{get, web, HttpResponse, Responder};

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}
