pub mod api;
pub mod config;
pub mod forms;
pub mod http_client;
pub mod model;
pub mod provider;
pub mod state;
pub mod store;
pub mod views;
