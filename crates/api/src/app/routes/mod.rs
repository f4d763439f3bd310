//! The routing table. Every route the service answers is declared here.

use std::future::Future;
use std::sync::Arc;

use axum::http::Method;

use crate::app::pages::{self, StaticPages};
use crate::app::services::{AppServices, MovieService, UserService};
use crate::config::AppConfig;
use crate::context::RequestContext;
use crate::dispatch::{AuthRequirement, HandlerRegistry, RawRequest, RegistryError};

pub mod system;

const API: &str = "/api/v1";

/// Bind a service method `(Arc<S>, ctx, args)` into a route handler `(ctx, args)`.
fn bound<S, A, F, Fut>(service: &Arc<S>, method: F) -> impl Fn(RequestContext, A) -> Fut + Send + Sync + 'static
where
    S: Send + Sync + 'static,
    F: Fn(Arc<S>, RequestContext, A) -> Fut + Send + Sync + 'static,
    Fut: Future,
{
    let service = service.clone();
    move |ctx, args| method(service.clone(), ctx, args)
}

pub fn registry(services: &AppServices, config: &AppConfig) -> Result<HandlerRegistry, RegistryError> {
    let users = services.user_service();
    let movies = services.movie_service();
    let static_pages = StaticPages::new(&config.public_url);

    let route = |name: &str| format!("{API}/{name}");

    let builder = HandlerRegistry::builder()
        .json(
            Method::POST,
            &route("register"),
            AuthRequirement::None,
            bound(&users, UserService::register),
        )
        .json(
            Method::POST,
            &route("login"),
            AuthRequirement::None,
            bound(&users, UserService::login),
        )
        .json(
            Method::POST,
            &route("createMovie"),
            AuthRequirement::User,
            bound(&movies, MovieService::create),
        )
        .json(
            Method::POST,
            &route("getMovieByUser"),
            AuthRequirement::User,
            bound(&movies, MovieService::get_by_user),
        );

    // Listings answer both a JSON body and a query string.
    let builder = [Method::POST, Method::GET]
        .into_iter()
        .fold(builder, |builder, method| {
            builder
                .json(
                    method.clone(),
                    &route("listMoviesByUser"),
                    AuthRequirement::User,
                    bound(&movies, MovieService::list_by_user),
                )
                .json(
                    method,
                    &route("listMovies"),
                    AuthRequirement::None,
                    bound(&movies, MovieService::list),
                )
        });

    let page = |render: fn(&StaticPages) -> axum::response::Response| {
        let static_pages = static_pages.clone();
        move |_raw: RawRequest| {
            let response = render(&static_pages);
            async move { response }
        }
    };

    let movie_page = {
        let movies = movies.clone();
        move |raw: RawRequest| pages::movie_view(movies.clone(), raw)
    };

    builder
        .json(Method::GET, "/health", AuthRequirement::None, system::health)
        .html("/", page(StaticPages::home))
        .html("/login", page(StaticPages::login))
        .html("/register", page(StaticPages::register))
        .html("/movies", page(StaticPages::movie_create))
        .html("/movie", movie_page)
        .file("/assets/remi.css", |_raw: RawRequest| async { pages::stylesheet() })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{ResponseKind, RouteKey};

    #[test]
    fn declares_every_route_once() {
        let registry = registry(&AppServices::in_memory("k"), &AppConfig::default()).unwrap();

        let expected = [
            (Method::POST, "/api/v1/register", AuthRequirement::None, ResponseKind::Json),
            (Method::POST, "/api/v1/login", AuthRequirement::None, ResponseKind::Json),
            (Method::POST, "/api/v1/createMovie", AuthRequirement::User, ResponseKind::Json),
            (Method::POST, "/api/v1/getMovieByUser", AuthRequirement::User, ResponseKind::Json),
            (Method::POST, "/api/v1/listMoviesByUser", AuthRequirement::User, ResponseKind::Json),
            (Method::GET, "/api/v1/listMoviesByUser", AuthRequirement::User, ResponseKind::Json),
            (Method::POST, "/api/v1/listMovies", AuthRequirement::None, ResponseKind::Json),
            (Method::GET, "/api/v1/listMovies", AuthRequirement::None, ResponseKind::Json),
            (Method::GET, "/health", AuthRequirement::None, ResponseKind::Json),
            (Method::GET, "/", AuthRequirement::None, ResponseKind::Html),
            (Method::GET, "/login", AuthRequirement::None, ResponseKind::Html),
            (Method::GET, "/register", AuthRequirement::None, ResponseKind::Html),
            (Method::GET, "/movies", AuthRequirement::None, ResponseKind::Html),
            (Method::GET, "/movie", AuthRequirement::None, ResponseKind::Html),
            (Method::GET, "/assets/remi.css", AuthRequirement::None, ResponseKind::File),
        ];

        for (method, path, auth, response) in &expected {
            let descriptor = registry
                .resolve(path, method)
                .unwrap_or_else(|e| panic!("{}: {e}", RouteKey::new(*path, method.clone())));
            assert_eq!(descriptor.auth, *auth, "{method} {path}");
            assert_eq!(descriptor.response, *response, "{method} {path}");
        }
        assert_eq!(registry.len(), expected.len());
    }
}
