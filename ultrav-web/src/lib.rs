//! HTTP front end
//!
//! Serves the landing page that hosts the viewer canvas and a contact form
//! localized in English and Italian.

pub mod contact;
pub mod error;
pub mod i18n;
pub mod pages;
pub mod server;
pub mod validation;

pub use error::{Result, WebError};
pub use i18n::{ErrorKey, Language, Translation, Translations};
pub use server::{create_router, run_server, AppState, ServerConfig};
pub use validation::{validate, ContactSubmission, Field, FieldErrors, ValidationError};
