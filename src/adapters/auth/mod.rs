//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` and `SessionIssuer` ports:
//!
//! - `jwt` - HS256 signed session tokens
//! - `mock` - Test implementation that doesn't sign anything

mod jwt;
mod mock;

pub use jwt::{JwtConfig, JwtSessionService};
pub use mock::MockSessionValidator;
