//! Identity Classifier — maps verified token claims to a [`UserContext`].
//!
//! Exactly one user type is assigned per request. Claims that do not
//! form a coherent identity for their declared type fail classification;
//! there is no fallback to a default type.

use uuid::Uuid;
use vendora_core::error::VendoraResult;
use vendora_core::identity::{UserContext, UserType};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token::{AccessTokenClaims, decode_access_token};

/// Classify already-verified claims into a `UserContext`.
///
/// Pure mapping — no I/O, no re-verification.
pub fn classify(claims: &AccessTokenClaims) -> Result<UserContext, AuthError> {
    match claims.user_type {
        UserType::Customer => {
            let (tenant_id, tenant_slug) = tenant_binding(claims)?;
            Ok(UserContext::Customer {
                uid: claims.sub.clone(),
                email: claims.email.clone(),
                tenant_id,
                tenant_slug,
            })
        }
        UserType::MerchantAdmin => {
            let (tenant_id, tenant_slug) = tenant_binding(claims)?;
            let role = claims.role.ok_or_else(|| {
                AuthError::MalformedClaims("merchant_admin token without role".into())
            })?;
            Ok(UserContext::MerchantAdmin {
                uid: claims.sub.clone(),
                email: claims.email.clone(),
                tenant_id,
                tenant_slug,
                role,
            })
        }
        UserType::PlatformAdmin => Ok(UserContext::PlatformAdmin {
            uid: claims.sub.clone(),
            email: claims.email.clone(),
            permissions: claims.permissions.clone().unwrap_or_default(),
        }),
    }
}

fn tenant_binding(claims: &AccessTokenClaims) -> Result<(Uuid, String), AuthError> {
    let raw_id = claims.tenant_id.as_deref().ok_or_else(|| {
        AuthError::MalformedClaims(format!(
            "{} token without tenant_id",
            claims.user_type.as_str()
        ))
    })?;
    let tenant_id = Uuid::parse_str(raw_id)
        .map_err(|e| AuthError::MalformedClaims(format!("invalid tenant_id: {e}")))?;
    let tenant_slug = claims
        .tenant_slug
        .as_deref()
        .ok_or_else(|| {
            AuthError::MalformedClaims(format!(
                "{} token without tenant_slug",
                claims.user_type.as_str()
            ))
        })?
        .to_ascii_lowercase();
    Ok((tenant_id, tenant_slug))
}

/// Verify a bearer token and classify it in one step.
///
/// This is the entry point the request layer calls; failures surface
/// as `Unauthenticated`.
pub fn classify_token(token: &str, config: &AuthConfig) -> VendoraResult<UserContext> {
    let claims = decode_access_token(token, config)?;
    Ok(classify(&claims)?)
}
