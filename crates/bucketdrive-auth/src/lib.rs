//! # bucketdrive-auth
//!
//! Authentication and authorization for BucketDrive's shared links.
//!
//! ## Modules
//!
//! - `jwt`: bearer token creation and validation
//! - `authenticator`: resolves a bearer token to an active directory user
//! - `gate`: pure permission predicates for creating and revoking links

pub mod authenticator;
pub mod gate;
pub mod jwt;

pub use authenticator::{AuthenticatedUser, Authenticator};
pub use gate::AuthorizationGate;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
