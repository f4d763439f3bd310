//! HTTP API: configuration, request dispatch, and the movie-sharing handlers.

pub mod app;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod middleware;
