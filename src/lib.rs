//! # dpdp-consent
//!
//! Notice-and-consent engine for the Digital Personal Data Protection Act 2023.
//!
//! A data principal is shown a persona-tailored notice (optionally translated
//! into a scheduled language), grants or withholds consent per declared
//! processing purpose, receives an immutable receipt, and may later revoke
//! optional consents. Every consent-relevant event lands in an append-only
//! audit log.
//!
//! - [`catalog`]: static purpose, persona and language catalogs
//! - [`compliance`]: consent state, audit log, receipts, checklist
//! - [`workflow`]: wizard steps, notice requests, the per-session facade
//! - [`session`]: isolated sessions for multi-session deployments
//! - [`llm`]: the text-generation collaborator (OpenAI-compatible)

pub mod catalog;
pub mod compliance;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod session;
pub mod workflow;

pub use catalog::Catalog;
pub use config::AppConfig;
pub use error::{Error, ErrorClass, Result};
pub use session::{SessionId, SessionManager};
pub use workflow::{ConsentSession, Step};
