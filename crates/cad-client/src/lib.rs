//! Client for the Intuit Customer Account Data API.
//!
//! Authentication uses a signed SAML 2.0 bearer assertion that is exchanged
//! for an OAuth 1.0a token. API calls are then signed with that token.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`saml`] for building and signing assertions and running the token exchange
//! - [`AggregationClient`] for institution, login, account, and transaction calls
//! - [`ChallengeSession`] for multi-factor authentication rounds during login
//! - [`Transport`] trait for HTTP, with [`UreqTransport`] as the real backend
//!   and [`MockTransport`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use cad_client::{AggregationClient, LoginOutcome, username_password};
//! use cad_config::Config;
//!
//! let config = Config::load(None, None)?;
//! let client = AggregationClient::with_ureq(config.require_intuit()?, Box::new(signer));
//!
//! let credentials = username_password("Banking Userid", "user", "Banking Password", "secret");
//! match client.discover_and_add_accounts("100000", &credentials)? {
//!     LoginOutcome::Accounts(accounts) => println!("{} accounts", accounts.len()),
//!     LoginOutcome::Challenged(mut session) => {
//!         session.answer(["blue"]);
//!         client.respond_to_challenge(&session)?;
//!     }
//! }
//! ```

mod challenge;
mod client;
mod error;
mod payload;
pub mod saml;
mod transport;

pub use challenge::{Challenge, ChallengeSession, Choice, ContextType, LoginTarget, is_challenge};
pub use client::{AggregationClient, LoginOutcome, RequestSigner};
pub use error::{ClientError, KeyFormatError, SamlError, TransportError};
pub use payload::{
    CHALLENGE_XMLNS, Credential, INSTITUTION_LOGIN_XMLNS, challenge_responses_xml,
    credentials_xml, username_password,
};
pub use saml::OAuthToken;
#[cfg(any(test, feature = "mock"))]
pub use transport::MockTransport;
pub use transport::{HttpRequest, HttpResponse, Transport, UreqTransport};
