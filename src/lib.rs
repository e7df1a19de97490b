// ITS image transform library
//
// Request flow: router -> query -> loader -> pipeline (color, transform,
// optimizer) -> service response.

pub mod auth;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod loader;
pub mod logging;
pub mod optimizer;
pub mod pipeline;
pub mod query;
pub mod router;
pub mod security;
pub mod service;
pub mod source;
pub mod transform;
