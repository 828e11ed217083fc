// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Service
//!
//! Issues and validates HS256-signed JWTs asserting a username and role set.
//!
//! A token is valid at instant `now` when its signature verifies under the
//! configured secret and `iat <= now < exp`. There is no clock skew leeway.
//! Time checks are done here against an explicit `now` and not inside
//! `jsonwebtoken`, so tests can pin the clock.
//!
//! `iat` and `exp` are whole Unix seconds, so lifetimes are applied at
//! second granularity.
//!
//! Tokens are stateless: there is no revocation list and no refresh.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::claims::TokenClaims;
use super::roles::{join_role_claim, Role};
use super::AuthError;

/// Token checks used by the request authenticator.
///
/// `claims` decodes and checks a token once against a single clock reading.
/// The authenticator takes subject and roles from that one result.
/// `subject` and `roles` decode again on each call; on an invalid token they
/// return `None` and the empty set.
pub trait TokenVerifier: Send + Sync {
    /// Claims of a currently valid token, or `None`.
    fn claims(&self, token: &str) -> Option<TokenClaims>;

    fn validate(&self, token: &str) -> bool {
        self.claims(token).is_some()
    }

    fn subject(&self, token: &str) -> Option<String> {
        self.claims(token).map(|claims| claims.sub)
    }

    fn roles(&self, token: &str) -> BTreeSet<Role> {
        self.claims(token)
            .map(|claims| claims.role_set())
            .unwrap_or_default()
    }
}

/// HS256 token issuer and validator.
///
/// Built once from configuration; the keys are read-only afterwards.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `username` valid from now for the configured lifetime.
    pub fn issue(&self, username: &str, roles: &BTreeSet<Role>) -> Result<String, AuthError> {
        self.issue_at(username, roles, Utc::now())
    }

    pub fn issue_at(
        &self,
        username: &str,
        roles: &BTreeSet<Role>,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub: username.to_string(),
            roles: join_role_claim(roles),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("token encoding failed: {e}")))
    }

    /// Verify a token and return its claims, or the reason it is invalid.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            },
        )?;

        let claims = data.claims;
        let now = now.timestamp();
        if now < claims.iat {
            return Err(AuthError::TokenNotYetValid);
        }
        if now >= claims.exp {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.claims_at(token, now).is_some()
    }

    /// Claims of a token valid at `now`; the rejection reason is logged.
    pub fn claims_at(&self, token: &str, now: DateTime<Utc>) -> Option<TokenClaims> {
        match self.verify_at(token, now) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(reason = e.error_code(), "Token rejected");
                None
            }
        }
    }
}

impl TokenVerifier for TokenService {
    fn claims(&self, token: &str) -> Option<TokenClaims> {
        self.claims_at(token, Utc::now())
    }
}
