//! Account identity and credential domain types.

mod id;
mod record;
mod secret;

pub use id::{AccountId, IdentifierError};
pub use record::{AccountStatus, CredentialRecord, TokenGrant};
pub use secret::TokenSecret;
