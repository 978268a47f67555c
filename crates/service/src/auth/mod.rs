//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Sign-up creates the whole tenant (company, owner user, credentials and a
//! default category) in one transaction; sign-in issues an HS256 JWT that
//! carries the user and company ids.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod token;
pub mod repo;

pub use service::AuthService;
