//! Per-request deadline.
//!
//! Handlers that outlive the configured budget are dropped, which cancels any
//! in-flight relay call, and the caller receives `504 {"error":"request timeout"}`.
use std::{
    rc::Rc,
    task::{Context, Poll},
    time::Duration,
};

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::error;

use crate::models::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct TimeoutMiddleware {
    budget: Duration,
}

impl TimeoutMiddleware {
    pub fn new(seconds: u64) -> Self {
        Self::from(Duration::from_secs(seconds))
    }
}

impl From<Duration> for TimeoutMiddleware {
    fn from(budget: Duration) -> Self {
        Self { budget }
    }
}

impl<S, B> Transform<S, ServiceRequest> for TimeoutMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = DeadlineService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(DeadlineService {
            inner: Rc::new(service),
            budget: self.budget,
        }))
    }
}

// The handler may already have handed the operation to the bundler.
fn deadline_exceeded_message(route: &str, budget: Duration) -> String {
    format!(
        "{} did not finish within {}s; operation may have been submitted",
        route,
        budget.as_secs()
    )
}

pub struct DeadlineService<S> {
    inner: Rc<S>,
    budget: Duration,
}

impl<S, B> Service<ServiceRequest> for DeadlineService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let inner = Rc::clone(&self.inner);
        let budget = self.budget;
        let route = format!("{} {}", req.method(), req.path());

        Box::pin(async move {
            tokio::time::timeout(budget, inner.call(req))
                .await
                .unwrap_or_else(|_| {
                    error!("{}", deadline_exceeded_message(&route, budget));
                    Err(ApiError::Timeout.into())
                })
        })
    }
}
