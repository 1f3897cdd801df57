use log::error;
use rocket::{
    http::Status,
    request::Request,
    response::{
        self,
        status::Custom,
        Responder,
    },
    serde::json::Json,
};
use thiserror::Error;

use crate::reqres::ErrorResponse;

/// Use for mapping errors in functions that can throw multiple errors.
#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("Database unavailable")]
    DatabaseUnavailable,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid email or password")]
    Credentials,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("Order cannot move from {from} to {to}")]
    Transition { from: String, to: String },
    #[error("token error: {0}")]
    Token(#[from] jwt::Error),
    #[error("signing key error")]
    SigningKey,
    #[error("token lifetime out of range")]
    TokenLifetime,
}

impl StorefrontError {
    pub fn status(&self) -> Status {
        match self {
            StorefrontError::Database(_)
            | StorefrontError::Token(_)
            | StorefrontError::SigningKey
            | StorefrontError::TokenLifetime => Status::InternalServerError,
            StorefrontError::DatabaseUnavailable => Status::ServiceUnavailable,
            StorefrontError::NotFound(_) => Status::NotFound,
            StorefrontError::Validation(_) => Status::BadRequest,
            StorefrontError::Conflict(_) | StorefrontError::Transition { .. } => Status::Conflict,
            StorefrontError::Credentials => Status::Unauthorized,
            StorefrontError::Forbidden(_) => Status::Forbidden,
        }
    }
}

impl<'r> Responder<'r, 'static> for StorefrontError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let message = if status == Status::InternalServerError {
            error!("{} {}: {}", req.method(), req.uri(), self);
            String::from("Internal server error")
        } else {
            self.to_string()
        };
        Custom(status, Json(ErrorResponse { message })).respond_to(req)
    }
}
