//! Service layer providing the business rules of the finance API on top of models.
//! - `pricing` and `forecast` are pure calculations without I/O.
//! - The `*_service` modules wrap entity access, scoped to one company.
//! - `auth` follows a domain / repository / service split.

pub mod errors;
pub mod pricing;
pub mod forecast;
pub mod auth;
pub mod company_service;
pub mod category_service;
pub mod product_service;
pub mod finance_service;
pub mod revenue_service;
pub mod sales_service;
#[cfg(test)]
pub mod test_support;
