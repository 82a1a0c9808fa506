pub mod api;
pub mod library_source;
pub mod recommendations;
pub mod recommendations_service;
pub mod stopwords;
pub mod text_similarity;
pub mod tfidf;

#[cfg(any(feature = "client", test))]
pub mod client;

#[cfg(any(feature = "server", test))]
pub mod app_config;
#[cfg(any(feature = "server", test))]
mod handlers;
#[cfg(any(feature = "server", test))]
pub mod settings;
