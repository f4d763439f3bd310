//! Typed adapters between raw HTTP requests and handler functions.
//!
//! A JSON route is registered with a plain async function
//! `(RequestContext, Args) -> ServiceResult<Resp>`. [`TypedJsonEndpoint`]
//! remembers `Args` and `Resp` so the dispatcher can decode the request into
//! the right type and encode the result back, while the registry only ever
//! sees the type-erased [`JsonEndpoint`] trait object.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::Query;
use axum::http::{HeaderMap, Method, Uri, request::Parts};
use axum::response::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use remi_core::{ServiceError, ServiceResult};

use crate::context::RequestContext;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Everything the dispatcher knows about an inbound request once the body
/// has been read.
#[derive(Debug, Clone)]
pub struct RawRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl RawRequest {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    /// Buffer the body, refusing anything over `limit` bytes.
    pub async fn read(parts: Parts, body: Body, limit: usize) -> Result<Self, DecodeError> {
        let body = axum::body::to_bytes(body, limit)
            .await
            .map_err(|e| DecodeError::Body(format!("can't read request body: {e}")))?;

        Ok(Self::new(parts.method, parts.uri, parts.headers, body))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decode the query string into `T`.
    pub fn query<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        Query::<T>::try_from_uri(&self.uri)
            .map(|Query(value)| value)
            .map_err(|e| DecodeError::Query(e.body_text()))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid request body: {0}")]
    Body(String),

    #[error("invalid query parameters: {0}")]
    Query(String),
}

impl From<DecodeError> for ServiceError {
    fn from(err: DecodeError) -> Self {
        ServiceError::invalid_argument(err.to_string())
    }
}

/// Bind handler arguments from the request.
///
/// Bodies of POST/PUT/PATCH are JSON; GET reads the query string. Any other
/// method carries no input, so `T` is built from an empty query.
pub fn decode_args<T: DeserializeOwned>(raw: &RawRequest) -> Result<T, DecodeError> {
    match *raw.method() {
        Method::POST | Method::PUT | Method::PATCH => {
            serde_json::from_slice(raw.body()).map_err(|e| DecodeError::Body(e.to_string()))
        }
        Method::GET => raw.query(),
        _ => Query::<T>::try_from_uri(&Uri::from_static("/"))
            .map(|Query(value)| value)
            .map_err(|e| DecodeError::Query(e.body_text())),
    }
}

/// A JSON route with its argument and response types erased.
pub trait JsonEndpoint: Send + Sync {
    /// Decode the arguments and return the pending invocation.
    ///
    /// A decode failure is returned before the handler is ever called.
    fn bind(
        &self,
        ctx: RequestContext,
        raw: &RawRequest,
    ) -> Result<BoxFuture<'static, ServiceResult<serde_json::Value>>, DecodeError>;
}

type Invoke<A, R> =
    Box<dyn Fn(RequestContext, A) -> BoxFuture<'static, ServiceResult<R>> + Send + Sync>;

pub struct TypedJsonEndpoint<A, R> {
    invoke: Invoke<A, R>,
    _types: PhantomData<fn(A) -> R>,
}

impl<A, R> TypedJsonEndpoint<A, R>
where
    A: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
{
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(RequestContext, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ServiceResult<R>> + Send + 'static,
    {
        Self {
            invoke: Box::new(move |ctx, args| Box::pin(handler(ctx, args))),
            _types: PhantomData,
        }
    }
}

impl<A, R> JsonEndpoint for TypedJsonEndpoint<A, R>
where
    A: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
{
    fn bind(
        &self,
        ctx: RequestContext,
        raw: &RawRequest,
    ) -> Result<BoxFuture<'static, ServiceResult<serde_json::Value>>, DecodeError> {
        let args: A = decode_args(raw)?;
        let pending = (self.invoke)(ctx, args);

        Ok(Box::pin(async move {
            let response = pending.await?;
            serde_json::to_value(response)
                .map_err(|e| ServiceError::internal(format!("can't encode response: {e}")))
        }))
    }
}

/// A route that renders its own response (HTML pages, static files).
pub trait PageEndpoint: Send + Sync {
    fn call(&self, raw: RawRequest) -> BoxFuture<'static, Response>;
}

impl<F> PageEndpoint for F
where
    F: Fn(RawRequest) -> BoxFuture<'static, Response> + Send + Sync,
{
    fn call(&self, raw: RawRequest) -> BoxFuture<'static, Response> {
        self(raw)
    }
}

#[derive(Clone)]
pub enum HandlerTarget {
    Json(Arc<dyn JsonEndpoint>),
    Page(Arc<dyn PageEndpoint>),
}

impl core::fmt::Debug for HandlerTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HandlerTarget::Json(_) => f.write_str("HandlerTarget::Json"),
            HandlerTarget::Page(_) => f.write_str("HandlerTarget::Page"),
        }
    }
}
