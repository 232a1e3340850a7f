//! Billing error types

use thiserror::Error;

/// Billing-specific errors
///
/// Remote-call failures carry an explicit kind so each caller decides
/// whether to surface or suppress the failure.
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Stripe request failed: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Webhook signature verification failed")]
    WebhookSignatureInvalid,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<stripe::StripeError> for BillingError {
    fn from(err: stripe::StripeError) -> Self {
        match &err {
            stripe::StripeError::Stripe(request_err) => match request_err.http_status {
                404 => BillingError::NotFound(err.to_string()),
                400..=499 => BillingError::InvalidArgument(err.to_string()),
                _ => BillingError::Network(err.to_string()),
            },
            _ => BillingError::Network(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for BillingError {
    fn from(err: sqlx::Error) -> Self {
        BillingError::Database(err.to_string())
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
