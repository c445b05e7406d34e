//! SurrealDB repository implementations.

mod checkout;
mod customer;
mod membership;
mod order;
mod payment;
mod product;
mod tenant;

pub use checkout::SurrealCheckoutStore;
pub use customer::SurrealCustomerRepository;
pub use membership::SurrealMembershipRepository;
pub use order::SurrealOrderRepository;
pub use payment::SurrealPaymentRepository;
pub use product::SurrealProductRepository;
pub use tenant::SurrealTenantRepository;
