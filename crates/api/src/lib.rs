pub mod config;
pub mod error;
pub mod handlers;
pub mod multipart;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod service;
pub mod state;
