//! Vendora Engine — the request-scoped commerce services.
//!
//! This crate provides:
//! - Tenant resolution with bounded retry ([`TenantResolver`])
//! - The cookie cart store ([`CartCodec`])
//! - The checkout/order engine ([`CheckoutService`])
//! - The payment adapter boundary ([`PaymentProvider`],
//!   [`PaymentService`])
//! - Gated administration: orders ([`OrderService`]), catalog
//!   ([`CatalogService`]), staff ([`StaffService`])
//! - The read-through cache collaborator ([`ReadCache`])

pub mod cache;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod payment;
pub mod staff;
pub mod tenant;

pub use cache::{MemoryCache, ReadCache};
pub use cart::CartCodec;
pub use catalog::CatalogService;
pub use checkout::{CheckoutOutcome, CheckoutService, CustomerInfo};
pub use orders::OrderService;
pub use payment::{MockProvider, PaymentIntent, PaymentProvider, PaymentService};
pub use staff::StaffService;
pub use tenant::TenantResolver;
