//! Analysis plugin framework.
//!
//! Each statistical procedure is one static [`descriptor::AnalysisDescriptor`]:
//! an input schema, a parameter schema, a pure numeric kernel, a locale
//! bundle, and an output layout. The [`harness`] drives every
//! invocation through the same path — validate, prompt if needed, run
//! the kernel, build the localized result document, assemble the
//! report — so procedures never touch I/O or locale state themselves.

pub mod descriptor;
pub mod descriptors;
pub mod error;
pub mod frame;
pub mod harness;
pub mod kernel;
pub mod locale;
pub mod plot;
pub mod registry;
pub mod report;
pub mod result;
pub mod schema;

pub use descriptor::{AnalysisDescriptor, SectionTemplate};
pub use error::{Fault, Result};
pub use frame::{load_frame, Column, Frame};
pub use harness::{execute, run_analysis, Invocation, NoPrompt, PromptChannel, RunReport, RunStatus};
pub use locale::{LocaleBundle, Localizer, FALLBACK_LOCALE, SUPPORTED_LOCALES};
pub use result::ResultDocument;
