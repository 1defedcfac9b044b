//! Authentication module
//!
//! Marketo uses the OAuth2 client-credentials grant. The `Authenticator`
//! performs the exchange once per extraction run; tokens are never cached
//! across runs.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{Credential, Token};
