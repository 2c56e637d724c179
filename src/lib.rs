//! Edge request gate for a localized web front-end.
//!
//! Every request is classified, locale-negotiated and (for protected
//! routes) verified against a remote identity service before it is proxied
//! to the front-end origin.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod services;
pub mod state;
