//! End to end tests against running services, enabled with `system_tests` feature.
//! Expects bookshelf_library at http://127.0.0.1:8080 and bookshelf_recommendations at http://127.0.0.1:8081

#[cfg(all(test, feature = "system_tests"))]
mod system_tests;
