//! Identity-provider session exchange for the storefront.
//! Keep the public surface thin and split implementation across sub-modules.

mod token;
mod minter;
mod provider;
mod session;

pub use token::{IdToken, SessionArtifact};
pub use minter::{MintError, TokenMinter};
pub use provider::{HttpTokenMinter, ProviderCredentials, DEFAULT_IDP_BASE_URL};
pub use session::{CookiePolicy, SessionCookie, SessionIssuer, SESSION_COOKIE, SESSION_TTL};
