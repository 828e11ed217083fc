// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless JWT authentication for the Bank Cards API.
//!
//! ## Auth Flow
//!
//! 1. Client logs in via `POST /api/auth/login` and receives an HS256 token
//! 2. Client sends `Authorization: Bearer <token>`
//! 3. Server, per request:
//!    - Skips allow-listed paths entirely (login, registration, docs)
//!    - Validates signature and `iat <= now < exp`
//!    - Looks the subject up in the credential store
//!    - Attaches an [`AuthenticatedUser`] with `ROLE_*` authorities
//! 4. Handler extractors ([`Auth`], [`UserOnly`], [`AdminOnly`]) decide access
//!
//! ## Security
//!
//! - A bad or missing credential never fails the request in the middleware;
//!   the extractor answers 401/403
//! - No clock skew tolerance
//! - Roles have no hierarchy

pub mod accounts;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod token;

pub use accounts::{AccountError, AccountService};
pub use claims::{AuthenticatedUser, TokenClaims};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, UserOnly};
pub use middleware::{authenticate, RequestAuthenticator};
pub use password::{Argon2Verifier, PasswordError, PasswordVerifier};
pub use roles::Role;
pub use token::{TokenService, TokenVerifier};
