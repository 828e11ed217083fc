// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::{AccountError, AuthError};
use crate::ledger::LedgerError;

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    /// Stable machine-readable kind, e.g. `insufficient_funds`
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn forbidden(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, code, message)
    }

    /// Log `detail` and answer with a generic 500.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            INTERNAL_MESSAGE,
        )
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::CardNotFound(_) => Self::not_found("card_not_found", message),
            LedgerError::UserNotFound(_) => Self::not_found("user_not_found", message),
            LedgerError::OwnershipViolation => Self::forbidden("card_ownership", message),
            LedgerError::InsufficientFunds => Self::bad_request("insufficient_funds", message),
            LedgerError::SameCardTransfer => Self::bad_request("same_card_transfer", message),
            LedgerError::InvalidAmount => Self::bad_request("invalid_amount", message),
            LedgerError::BalanceOverflow => Self::bad_request("balance_overflow", message),
            LedgerError::Validation(_) => Self::bad_request("validation_error", message),
            LedgerError::Codec(e) => Self::internal(e),
            LedgerError::Storage(e) => Self::internal(e),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err {
            AccountError::Validation(_) => Self::bad_request("validation_error", message),
            AccountError::UserAlreadyExists(_) => {
                Self::new(StatusCode::CONFLICT, "user_already_exists", message)
            }
            AccountError::UserNotFound => Self::not_found("user_not_found", message),
            AccountError::InvalidPassword => Self::bad_request("invalid_password", message),
            AccountError::UserHasCards { .. } => {
                Self::new(StatusCode::CONFLICT, "user_has_cards", message)
            }
            AccountError::Token(e) => Self::from(e),
            AccountError::Password(e) => Self::internal(e),
            AccountError::Storage(e) => Self::internal(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InternalError(detail) => Self::internal(detail),
            other => Self::new(other.status_code(), other.error_code(), other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code,
        });
        (self.status, body).into_response()
    }
}
