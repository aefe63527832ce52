pub mod api_client;
pub mod authentication;
pub mod cleanup;
pub mod configuration;
pub mod context;
pub mod domain;
pub mod fixtures;
pub mod session_user;
pub mod telemetry;
pub mod ui;
