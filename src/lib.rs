pub mod app;
pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod modules;
pub mod notifications;
pub mod scheduling;
pub mod telemetry;
pub mod websocket;
