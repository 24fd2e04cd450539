//! Request gate: which requests need a credential, checking the credential,
//! and the role check for admin-only operations.

pub mod exemption;
pub mod gate;
pub mod policy;
pub mod verifier;

pub use exemption::{ExemptionError, ExemptionTable};
pub use gate::{AccessGate, GateOutcome, normalize_path};
pub use policy::{Authorization, authorize_admin};
pub use verifier::{AuthError, CredentialVerifier, Subject, unix_now};
