use shared::{
    domain::ProductId,
    error::{ApiError, ErrorCode},
};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("product {0} is not in the catalog")]
    UnknownProduct(ProductId),
    #[error("cart entry {0} no longer resolves to a catalog product")]
    UnresolvedEntry(ProductId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("invalid login form: {}", summarize(.0))]
    Validation(Vec<FieldViolation>),
    #[error("wrong username or password")]
    InvalidCredentials,
    #[error("session store failure: {0}")]
    Store(#[from] anyhow::Error),
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("not signed in")]
    NotAuthenticated,
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error("session store failure: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<&CartError> for ApiError {
    fn from(value: &CartError) -> Self {
        match value {
            CartError::UnknownProduct(_) => ApiError::new(ErrorCode::NotFound, value.to_string()),
            CartError::UnresolvedEntry(_) => ApiError::new(ErrorCode::Internal, value.to_string()),
        }
    }
}

impl From<&LoginError> for ApiError {
    fn from(value: &LoginError) -> Self {
        let code = match value {
            LoginError::Validation(_) => ErrorCode::Validation,
            LoginError::InvalidCredentials => ErrorCode::InvalidCredentials,
            LoginError::Store(_) => ErrorCode::Internal,
        };
        ApiError::new(code, value.to_string())
    }
}

impl From<&StorefrontError> for ApiError {
    fn from(value: &StorefrontError) -> Self {
        match value {
            StorefrontError::NotAuthenticated => {
                ApiError::new(ErrorCode::Unauthorized, value.to_string())
            }
            StorefrontError::Cart(err) => err.into(),
            StorefrontError::Login(err) => err.into(),
            StorefrontError::Store(_) => ApiError::new(ErrorCode::Internal, value.to_string()),
        }
    }
}
