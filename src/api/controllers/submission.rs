//! # Submission Controller
//!
//! Handles `register-peer` and `submit-winner`. Both parse the raw body
//! themselves so a malformed payload maps to the same `400` as a missing
//! `orgId`, then hand the request to the shared pipeline.
use actix_web::{web, HttpResponse};
use log::warn;
use serde::de::DeserializeOwned;

use crate::{
    domain::ContractCall,
    models::{
        ApiError, RegisterPeerRequest, SubmissionResponse, SubmitWinnerRequest, ThinDataAppState,
    },
    repositories::CredentialStore,
    services::{
        bundler::OperationSubmitter, signing_relay::SigningTransport,
        smart_account::SmartAccountFactory,
    },
};

fn parse_request<C: DeserializeOwned>(body: &[u8]) -> Result<C, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("Rejecting unparseable request body: {}", e);
        ApiError::BadRequest("bad request".to_string())
    })
}

async fn submit<C, CS, T, F, O>(
    body: web::Bytes,
    state: ThinDataAppState<CS, T, F, O>,
) -> Result<HttpResponse, ApiError>
where
    C: ContractCall + DeserializeOwned,
    CS: CredentialStore,
    T: SigningTransport + 'static,
    F: SmartAccountFactory,
    O: OperationSubmitter,
{
    let request: C = parse_request(&body)?;
    let hash = state.pipeline.run(request).await?;

    Ok(HttpResponse::Ok().json(SubmissionResponse { hash }))
}

/// Registers a peer id for the caller's smart account.
pub async fn register_peer<CS, T, F, O>(
    body: web::Bytes,
    state: ThinDataAppState<CS, T, F, O>,
) -> Result<HttpResponse, ApiError>
where
    CS: CredentialStore,
    T: SigningTransport + 'static,
    F: SmartAccountFactory,
    O: OperationSubmitter,
{
    submit::<RegisterPeerRequest, _, _, _, _>(body, state).await
}

/// Submits the winners of a round.
pub async fn submit_winner<CS, T, F, O>(
    body: web::Bytes,
    state: ThinDataAppState<CS, T, F, O>,
) -> Result<HttpResponse, ApiError>
where
    CS: CredentialStore,
    T: SigningTransport + 'static,
    F: SmartAccountFactory,
    O: OperationSubmitter,
{
    submit::<SubmitWinnerRequest, _, _, _, _>(body, state).await
}
