//! Application state shared by all request handlers.
use std::sync::Arc;

use actix_web::web::ThinData;

use crate::domain::SubmissionPipeline;
use crate::repositories::{CredentialStore, CredentialStoreStorage};
use crate::services::{
    bundler::{OperationSubmitter, UserOperationSubmitter},
    provider::JsonRpcProvider,
    signing_relay::{AlchemySigningRelay, SigningTransport},
    smart_account::{ModularAccountV2Factory, SmartAccountFactory},
};

pub struct AppState<CS, T, F, O>
where
    CS: CredentialStore,
    T: SigningTransport + 'static,
    F: SmartAccountFactory,
    O: OperationSubmitter,
{
    pub pipeline: Arc<SubmissionPipeline<CS, T, F, O>>,
}

impl<CS, T, F, O> Clone for AppState<CS, T, F, O>
where
    CS: CredentialStore,
    T: SigningTransport + 'static,
    F: SmartAccountFactory,
    O: OperationSubmitter,
{
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

pub type DefaultAppState = AppState<
    CredentialStoreStorage,
    AlchemySigningRelay,
    ModularAccountV2Factory<JsonRpcProvider>,
    UserOperationSubmitter<JsonRpcProvider>,
>;

pub type ThinDataAppState<CS, T, F, O> = ThinData<AppState<CS, T, F, O>>;
