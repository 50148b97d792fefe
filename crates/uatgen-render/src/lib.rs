//! # uatgen render
//!
//! Turns [`ModuleSuite`](uatgen_core::ModuleSuite)s into documents. A run
//! writes, into one dated directory:
//!
//! ```text
//! 01-project-info.<ext>
//! 02-users.<ext>
//! 03-available-modules.<ext>
//! 05-module-<first>.<ext>
//! 06-module-<second>.<ext>
//! ...
//! ```

pub mod error;
pub mod json;
pub mod markdown;
pub mod presentation;
pub mod project;
pub mod writer;

pub use error::RenderError;
pub use json::JsonPresentation;
pub use markdown::MarkdownPresentation;
pub use presentation::{OutputFormat, Presentation, module_file_name};
pub use project::{ProjectInfo, UserRecord, load_users};
pub use writer::{DocumentWriter, GeneratedDocs, dated_directory};
