//! Cookie-held cart persistence.
//!
//! The cart travels in a single cookie: base64url-encoded JSON plus a
//! keyed SHA-256 digest. The codec rejects tampered or undecodable
//! payloads by handing back an empty cart — carts are not
//! commerce-critical state, so a lost cart is acceptable and a forged
//! one is not.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use tracing::debug;
use vendora_core::error::{VendoraError, VendoraResult};
use vendora_core::models::cart::Cart;

use crate::tenant::normalize_slug;

/// Encodes carts to and from their signed cookie representation.
#[derive(Clone)]
pub struct CartCodec {
    secret: Vec<u8>,
}

impl CartCodec {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Keyed digest over the encoded payload, hex-encoded.
    fn sign(&self, payload: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(payload.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Encode a cart to its cookie value: `<payload>.<signature>`.
    pub fn encode(&self, cart: &Cart) -> VendoraResult<String> {
        let json = serde_json::to_vec(cart)
            .map_err(|e| VendoraError::Internal(format!("cart encode: {e}")))?;
        let payload = URL_SAFE_NO_PAD.encode(&json);
        let signature = self.sign(&payload);
        Ok(format!("{payload}.{signature}"))
    }

    /// Decode a cookie value. Returns `None` for anything that is not
    /// a validly signed cart.
    pub fn decode(&self, raw: &str) -> Option<Cart> {
        let (payload, signature) = raw.split_once('.')?;
        if self.sign(payload) != signature {
            debug!("cart cookie signature mismatch, discarding");
            return None;
        }
        let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Load the cart for a request against a specific tenant.
    ///
    /// A stored cart whose tenant does not match is discarded and
    /// replaced with an empty cart — cross-tenant leakage is not an
    /// option, and neither is erroring on stale cookies.
    pub fn load_for_tenant(&self, raw: Option<&str>, tenant_slug: &str, currency: &str) -> Cart {
        let slug = normalize_slug(tenant_slug);
        match raw.and_then(|r| self.decode(r)) {
            Some(cart) if normalize_slug(&cart.tenant_slug) == slug => cart,
            Some(cart) => {
                debug!(
                    stored = %cart.tenant_slug,
                    current = %slug,
                    "cart belongs to another tenant, replacing with empty cart"
                );
                Cart::new(slug, currency)
            }
            None => Cart::new(slug, currency),
        }
    }
}
