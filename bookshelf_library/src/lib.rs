pub mod api;
pub mod telemetry;

#[cfg(any(feature = "client", test))]
pub mod client;

#[cfg(any(feature = "server", test))]
pub mod app_config;
#[cfg(any(feature = "server", test))]
mod handlers;
#[cfg(any(feature = "server", test))]
pub mod library_store;
#[cfg(any(feature = "server", test))]
pub mod settings;
