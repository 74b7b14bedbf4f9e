//! HTTP service for the marketplace admin backend: settings, content
//! versions, media library and configuration cache administration.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod jobs;
pub mod middleware;
pub mod routes;
