pub mod factory;
pub mod http;
pub mod verifier;

pub use factory::build_auth_verifier;
pub use http::HttpAuthVerifier;
pub use verifier::{AuthVerifier, Verification, VerifyError};
