//! # tienda_core
//!
//! Core domain logic for the Tienda storefront backend: credential
//! storage, password hashing, and session-token issuance.

pub mod auth;
pub mod db;
pub mod migrate;
pub mod models;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
