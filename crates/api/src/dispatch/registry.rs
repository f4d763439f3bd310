//! Declarative routing table: `(path, method) -> HandlerDescriptor`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::http::Method;
use axum::response::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use remi_core::ServiceResult;

use super::endpoint::{HandlerTarget, RawRequest, TypedJsonEndpoint};
use crate::context::RequestContext;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub path: String,
    pub method: Method,
}

impl RouteKey {
    pub fn new(path: impl Into<String>, method: Method) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }
}

impl core::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    None,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Json,
    Html,
    File,
}

#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    pub target: HandlerTarget,
    pub auth: AuthRequirement,
    pub response: ResponseKind,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route for path")]
    NotFound,

    #[error("method not allowed for path")]
    MethodNotAllowed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("route registered twice: {0}")]
    Duplicate(RouteKey),
}

/// Immutable after [`RegistryBuilder::build`].
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    routes: HashMap<String, HashMap<Method, HandlerDescriptor>>,
}

impl HandlerRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn resolve(&self, path: &str, method: &Method) -> Result<&HandlerDescriptor, RouteError> {
        let by_method = self.routes.get(path).ok_or(RouteError::NotFound)?;
        by_method.get(method).ok_or(RouteError::MethodNotAllowed)
    }

    /// Every registered key, sorted by path then method.
    pub fn routes(&self) -> Vec<RouteKey> {
        let mut keys: Vec<RouteKey> = self
            .routes
            .iter()
            .flat_map(|(path, by_method)| {
                by_method
                    .keys()
                    .map(move |method| RouteKey::new(path.clone(), method.clone()))
            })
            .collect();
        keys.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.method.as_str().cmp(b.method.as_str()))
        });
        keys
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    routes: HashMap<String, HashMap<Method, HandlerDescriptor>>,
    duplicate: Option<RouteKey>,
}

impl RegistryBuilder {
    pub fn route(mut self, key: RouteKey, descriptor: HandlerDescriptor) -> Self {
        let by_method = self.routes.entry(key.path.clone()).or_default();
        if by_method.contains_key(&key.method) {
            self.duplicate.get_or_insert(key);
        } else {
            by_method.insert(key.method, descriptor);
        }
        self
    }

    pub fn json<A, R, F, Fut>(
        self,
        method: Method,
        path: &str,
        auth: AuthRequirement,
        handler: F,
    ) -> Self
    where
        A: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(RequestContext, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ServiceResult<R>> + Send + 'static,
    {
        let descriptor = HandlerDescriptor {
            target: HandlerTarget::Json(Arc::new(TypedJsonEndpoint::new(handler))),
            auth,
            response: ResponseKind::Json,
        };
        self.route(RouteKey::new(path, method), descriptor)
    }

    /// A public GET page.
    pub fn html<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(RawRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.page(path, ResponseKind::Html, handler)
    }

    pub fn file<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(RawRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.page(path, ResponseKind::File, handler)
    }

    fn page<F, Fut>(self, path: &str, response: ResponseKind, handler: F) -> Self
    where
        F: Fn(RawRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let boxed = move |raw: RawRequest| -> super::endpoint::BoxFuture<'static, Response> {
            Box::pin(handler(raw))
        };
        let descriptor = HandlerDescriptor {
            target: HandlerTarget::Page(Arc::new(boxed)),
            auth: AuthRequirement::None,
            response,
        };
        self.route(RouteKey::new(path, Method::GET), descriptor)
    }

    pub fn build(self) -> Result<HandlerRegistry, RegistryError> {
        match self.duplicate {
            Some(key) => Err(RegistryError::Duplicate(key)),
            None => Ok(HandlerRegistry {
                routes: self.routes,
            }),
        }
    }
}
