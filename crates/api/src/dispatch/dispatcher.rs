use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error, info, warn};

use remi_core::ErrorKind;

use super::endpoint::{HandlerTarget, RawRequest};
use super::registry::{AuthRequirement, HandlerRegistry};
use crate::app::errors::{json_error, service_error_to_response};
use crate::context::RequestContext;
use crate::middleware::{AuthVerifier, apply_cors_headers};

/// Routes every inbound request through resolve, auth, bind, invoke, encode.
pub struct RequestDispatcher {
    registry: Arc<HandlerRegistry>,
    verifier: AuthVerifier,
    max_body_bytes: usize,
}

impl RequestDispatcher {
    pub fn new(registry: HandlerRegistry, verifier: AuthVerifier, max_body_bytes: usize) -> Self {
        Self {
            registry: Arc::new(registry),
            verifier,
            max_body_bytes,
        }
    }

    pub async fn dispatch(&self, req: Request<Body>) -> Response {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        info!(%method, %path, "request");

        let mut response = self.route(req).await;
        apply_cors_headers(response.headers_mut());

        debug!(%method, %path, status = response.status().as_u16(), "response");
        response
    }

    async fn route(&self, req: Request<Body>) -> Response {
        if req.method() == Method::OPTIONS {
            return StatusCode::OK.into_response();
        }

        let descriptor = match self.registry.resolve(req.uri().path(), req.method()) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                debug!(error = %e, "unresolved route");
                return json_error(StatusCode::NOT_FOUND, "not found");
            }
        };

        let (parts, body) = req.into_parts();

        let ctx = match descriptor.auth {
            AuthRequirement::None => RequestContext::anonymous(),
            AuthRequirement::User => match self.verifier.authenticate(&parts.headers) {
                Ok(identity) => RequestContext::authenticated(identity),
                Err(e) => {
                    warn!(error = %e, "authentication failed");
                    return json_error(StatusCode::UNAUTHORIZED, "unauthorized");
                }
            },
        };

        let raw = match RawRequest::read(parts, body, self.max_body_bytes).await {
            Ok(raw) => raw,
            Err(e) => return service_error_to_response(&e.into()),
        };

        match &descriptor.target {
            HandlerTarget::Json(endpoint) => {
                let pending = match endpoint.bind(ctx, &raw) {
                    Ok(pending) => pending,
                    Err(e) => {
                        debug!(error = %e, "argument decoding failed");
                        return service_error_to_response(&e.into());
                    }
                };

                match pending.await {
                    Ok(value) => (StatusCode::OK, Json(value)).into_response(),
                    Err(err) => {
                        if err.kind() == ErrorKind::Internal {
                            error!(error = %err, "handler failed");
                        }
                        service_error_to_response(&err)
                    }
                }
            }
            HandlerTarget::Page(page) => page.call(raw).await,
        }
    }
}

/// Fallback handler feeding every request to the dispatcher.
pub async fn dispatch_handler(
    State(dispatcher): State<Arc<RequestDispatcher>>,
    req: Request<Body>,
) -> Response {
    dispatcher.dispatch(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::http::header;
    use chrono::{Duration, Utc};
    use remi_auth::{AuthenticatedIdentity, Hs256TokenSigner, TokenSigner};
    use remi_core::{ServiceError, ServiceResult, UserId};
    use serde::{Deserialize, Serialize};

    use crate::dispatch::registry::HandlerRegistry;

    const SECRET: &str = "dispatcher-test";

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Echo {
        text: String,
        count: u32,
    }

    struct Harness {
        dispatcher: RequestDispatcher,
        calls: Arc<AtomicUsize>,
        signer: Arc<Hs256TokenSigner>,
    }

    fn harness() -> Harness {
        let calls = Arc::new(AtomicUsize::new(0));
        let signer = Arc::new(Hs256TokenSigner::new(SECRET));

        let counted = {
            let calls = calls.clone();
            move |ctx: RequestContext, _args: serde_json::Value| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    let identity = ctx.require_identity()?;
                    ServiceResult::Ok(serde_json::json!({
                        "id": identity.user_id(),
                        "username": identity.username(),
                    }))
                }
            }
        };

        let echo = {
            let calls = calls.clone();
            move |_ctx: RequestContext, args: Echo| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { ServiceResult::Ok(args) }
            }
        };

        let registry = HandlerRegistry::builder()
            .json(Method::POST, "/whoami", AuthRequirement::User, counted)
            .json(Method::POST, "/echo", AuthRequirement::None, echo.clone())
            .json(Method::GET, "/echo", AuthRequirement::None, echo)
            .json(Method::POST, "/boom", AuthRequirement::None, |_ctx, _: serde_json::Value| async {
                ServiceResult::<()>::Err(ServiceError::internal("database is down"))
            })
            .build()
            .unwrap();

        Harness {
            dispatcher: RequestDispatcher::new(registry, AuthVerifier::new(signer.clone()), 1024),
            calls,
            signer,
        }
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn options_short_circuits_without_invocation() {
        let h = harness();
        let response = h
            .dispatcher
            .dispatch(request(Method::OPTIONS, "/whoami", None, ""))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn protected_route_rejects_bad_credentials_before_invocation() {
        let h = harness();
        let identity = AuthenticatedIdentity::new(UserId::new(), "alice");
        let expired = h
            .signer
            .sign(&identity, Utc::now() - Duration::hours(3))
            .unwrap();
        let foreign = Hs256TokenSigner::new("other-secret")
            .sign(&identity, Utc::now())
            .unwrap();

        for token in [None, Some("garbage"), Some(expired.as_str()), Some(foreign.as_str())] {
            let response = h
                .dispatcher
                .dispatch(request(Method::POST, "/whoami", token, "{}"))
                .await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
            assert_eq!(body_json(response).await, serde_json::json!({ "error": "unauthorized" }));
        }
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_credential_reaches_handler_with_same_identity() {
        let h = harness();
        let identity = AuthenticatedIdentity::new(UserId::new(), "alice");
        let token = h.signer.sign(&identity, Utc::now()).unwrap();

        let response = h
            .dispatcher
            .dispatch(request(Method::POST, "/whoami", Some(&token), "{}"))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "id": identity.user_id(), "username": "alice" })
        );
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn success_payload_round_trips() {
        let h = harness();
        let sent = Echo { text: "hello".into(), count: 3 };
        let response = h
            .dispatcher
            .dispatch(request(
                Method::POST,
                "/echo",
                None,
                &serde_json::to_string(&sent).unwrap(),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let got: Echo = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(got, sent);
    }

    #[tokio::test]
    async fn get_binds_query_parameters() {
        let h = harness();
        let response = h
            .dispatcher
            .dispatch(request(Method::GET, "/echo?text=hi&count=2", None, ""))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({ "text": "hi", "count": 2 }));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request_and_not_invoked() {
        let h = harness();
        for body in ["", "{\"text\":", "[1,2]"] {
            let response = h
                .dispatcher
                .dispatch(request(Method::POST, "/echo", None, body))
                .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert!(body_json(response).await["error"].is_string());
        }
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oversized_body_is_bad_request() {
        let h = harness();
        let huge = format!("{{\"text\":\"{}\",\"count\":1}}", "x".repeat(4096));
        let response = h
            .dispatcher
            .dispatch(request(Method::POST, "/echo", None, &huge))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_path_or_method_is_not_found() {
        let h = harness();
        for (method, uri) in [(Method::POST, "/missing"), (Method::DELETE, "/echo")] {
            let response = h.dispatcher.dispatch(request(method, uri, None, "")).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
            assert_eq!(body_json(response).await, serde_json::json!({ "error": "not found" }));
        }
    }

    #[tokio::test]
    async fn handler_errors_map_to_their_status() {
        let h = harness();
        let response = h
            .dispatcher
            .dispatch(request(Method::POST, "/boom", None, "{}"))
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "database is down" })
        );
    }
}
