//! Authentication building blocks for the identity service
//!
//! Provides the pieces the HTTP service composes per request:
//! - Password hashing and verification (Argon2id)
//! - Signed access/refresh token issuance and verification (HS256)
//!
//! Access and refresh tokens are signed with distinct secrets so a leaked
//! access secret cannot be used to mint refresh tokens.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Token Issuance and Verification
//! ```
//! use chrono::Duration;
//! use auth::TokenAuthority;
//!
//! let authority = TokenAuthority::new(
//!     b"access_secret_at_least_32_bytes!!",
//!     b"refresh_secret_at_least_32_bytes!",
//!     Duration::minutes(30),
//!     Duration::days(7),
//! );
//!
//! let token = authority.issue_access("a@b.com", Some("standard")).unwrap();
//! let claims = authority.verify_access(&token).unwrap();
//! assert_eq!(claims.sub, "a@b.com");
//! ```

pub mod claims;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use claims::Claims;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::TokenAuthority;
pub use token::TokenError;
pub use token::TokenRejected;
pub use token::TokenSigner;
pub use token::TokenVerifier;
