//! Student portal adapter
//!
//! The scrape pipeline is split by stage: [`session`] issues a fresh cookie
//! jar, [`auth`] submits the login form, [`grades_page`] downloads the grades
//! page and hands it to [`parser`]. [`PortalClient`] chains them behind the
//! [`GradesSource`](crate::domain::GradesSource) trait.

pub mod auth;
mod client;
pub mod endpoints;
pub mod grades_page;
mod markers;
pub mod parser;
pub mod session;

pub use auth::{classify_login, LoginOutcome};
pub use client::PortalClient;
pub use endpoints::{PortalEndpoints, DEFAULT_PORTAL_BASE_URL};
pub use parser::parse_grades;
pub use session::{AuthenticatedSession, PortalHttpSettings, PortalSession, SessionProvider};
