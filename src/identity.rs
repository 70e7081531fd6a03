use axum::{extract::FromRequestParts, http::HeaderMap, http::request::Parts};

use crate::db::Actor;
use crate::error::AppError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Caller identity as asserted by the upstream identity provider. The values
/// are trusted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Actor,
}

impl Identity {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let user_id = headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Authentication(format!("missing {} header", USER_ID_HEADER)))?;

        let role = match headers
            .get(USER_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_lowercase())
            .as_deref()
        {
            Some("client") => Actor::Client,
            Some("consultant") => Actor::Consultant,
            Some(other) => {
                return Err(AppError::Authentication(format!("unknown role '{}'", other)));
            }
            None => {
                return Err(AppError::Authentication(format!(
                    "missing {} header",
                    USER_ROLE_HEADER
                )));
            }
        };

        Ok(Identity {
            user_id: user_id.to_string(),
            role,
        })
    }

    pub fn require_role(&self, role: Actor) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Authorization(format!("only a {} can do this", role)))
        }
    }

    /// The caller must be this consultant.
    pub fn require_consultant(&self, consultant_id: &str) -> Result<(), AppError> {
        self.require_role(Actor::Consultant)?;
        if self.user_id != consultant_id {
            return Err(AppError::Authorization(
                "consultants can only manage their own schedule".to_string(),
            ));
        }
        Ok(())
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Identity::from_headers(&parts.headers)
    }
}
