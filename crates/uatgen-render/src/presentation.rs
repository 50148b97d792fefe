//! The renderer contract and format selection.

use crate::error::RenderError;
use crate::json::JsonPresentation;
use crate::markdown::MarkdownPresentation;
use crate::project::{ProjectInfo, UserRecord};
use std::fmt;
use std::str::FromStr;
use uatgen_core::ModuleSuite;

/// Turns suite data into document text.
///
/// Every method receives the run's `generated_at` stamp (directly or via
/// [`ProjectInfo`]) so all documents of one run agree on it.
pub trait Presentation {
    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    fn project_info(&self, info: &ProjectInfo) -> Result<String, RenderError>;

    fn users(&self, users: &[UserRecord], generated_at: &str) -> Result<String, RenderError>;

    fn available_modules(
        &self,
        suites: &[ModuleSuite],
        generated_at: &str,
    ) -> Result<String, RenderError>;

    fn module_test_suite(
        &self,
        suite: &ModuleSuite,
        generated_at: &str,
    ) -> Result<String, RenderError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn presentation(self) -> Box<dyn Presentation> {
        match self {
            OutputFormat::Markdown => Box::new(MarkdownPresentation),
            OutputFormat::Json => Box::new(JsonPresentation),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(RenderError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of the first module document; `04` stays unused.
pub const FIRST_MODULE_NUMBER: usize = 5;

/// `NN-module-<slug>.<ext>`, numbered from [`FIRST_MODULE_NUMBER`].
pub fn module_file_name(suite: &ModuleSuite, extension: &str) -> String {
    let slug = suite.name.to_lowercase().replace(' ', "-");
    format!(
        "{:02}-module-{slug}.{extension}",
        suite.index + FIRST_MODULE_NUMBER
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_accepts_aliases() {
        assert_eq!("markdown".parse::<OutputFormat>().ok(), Some(OutputFormat::Markdown));
        assert_eq!("MD".parse::<OutputFormat>().ok(), Some(OutputFormat::Markdown));
        assert_eq!("json".parse::<OutputFormat>().ok(), Some(OutputFormat::Json));
        assert!(matches!(
            "yaml".parse::<OutputFormat>(),
            Err(RenderError::UnknownFormat(name)) if name == "yaml"
        ));
        assert_eq!(OutputFormat::Json.presentation().extension(), "json");
    }

    #[test]
    fn module_files_start_at_five_and_slug_spaces() {
        let suite = |index: usize, name: &str| ModuleSuite {
            index,
            name: name.to_string(),
            routes: Vec::new(),
            blocks: Vec::new(),
            summary: Default::default(),
        };
        assert_eq!(
            module_file_name(&suite(0, "User Management"), "md"),
            "05-module-user-management.md"
        );
        assert_eq!(module_file_name(&suite(6, "Reports"), "json"), "11-module-reports.json");
    }
}
