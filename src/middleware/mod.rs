pub mod auth;
pub mod portal_session;

pub use auth::DentistAuth;
pub use portal_session::{PortalPatient, PORTAL_SESSION_HEADER};
