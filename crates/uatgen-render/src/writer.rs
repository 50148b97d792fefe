//! Writing one run's documents into a directory.

use crate::error::RenderError;
use crate::presentation::{Presentation, module_file_name};
use crate::project::{DATE_FORMAT, ProjectInfo, UserRecord};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uatgen_core::ModuleSuite;

/// Result of a write: where the files went and in what order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDocs {
    pub directory: PathBuf,
    pub generated_files: Vec<PathBuf>,
    pub date: String,
}

/// `<base>/<YYYY-MM-DD>`.
pub fn dated_directory(base: impl AsRef<Path>, date: NaiveDate) -> PathBuf {
    base.as_ref().join(date.format(DATE_FORMAT).to_string())
}

pub struct DocumentWriter<'a> {
    presentation: &'a dyn Presentation,
    directory: PathBuf,
}

impl<'a> DocumentWriter<'a> {
    pub fn new(presentation: &'a dyn Presentation, directory: impl Into<PathBuf>) -> Self {
        Self {
            presentation,
            directory: directory.into(),
        }
    }

    /// Write project info, users, module overview, then one file per module.
    ///
    /// Files already in the directory are removed first; subdirectories are
    /// left alone.
    pub fn write(
        &self,
        project: &ProjectInfo,
        users: &[UserRecord],
        suites: &[ModuleSuite],
    ) -> Result<GeneratedDocs, RenderError> {
        self.prepare_directory()?;

        let ext = self.presentation.extension();
        let generated_at = project.generated_at.as_str();
        let mut generated_files = Vec::with_capacity(suites.len() + 3);

        generated_files.push(self.put(
            &format!("01-project-info.{ext}"),
            &self.presentation.project_info(project)?,
        )?);
        generated_files.push(self.put(
            &format!("02-users.{ext}"),
            &self.presentation.users(users, generated_at)?,
        )?);
        generated_files.push(self.put(
            &format!("03-available-modules.{ext}"),
            &self.presentation.available_modules(suites, generated_at)?,
        )?);
        for suite in suites {
            let content = self.presentation.module_test_suite(suite, generated_at)?;
            generated_files.push(self.put(&module_file_name(suite, ext), &content)?);
        }

        tracing::info!(
            directory = %self.directory.display(),
            files = generated_files.len(),
            "wrote UAT documents"
        );

        Ok(GeneratedDocs {
            directory: self.directory.clone(),
            generated_files,
            date: project.date.clone(),
        })
    }

    fn prepare_directory(&self) -> Result<(), RenderError> {
        let io_err = |source| RenderError::Io {
            path: self.directory.display().to_string(),
            source,
        };
        if !self.directory.exists() {
            return fs::create_dir_all(&self.directory).map_err(io_err);
        }

        let mut removed = 0usize;
        for entry in fs::read_dir(&self.directory).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(|source| RenderError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(
                directory = %self.directory.display(),
                removed,
                "cleared previous documents"
            );
        }
        Ok(())
    }

    fn put(&self, file_name: &str, content: &str) -> Result<PathBuf, RenderError> {
        let path = self.directory.join(file_name);
        fs::write(&path, content).map_err(|source| RenderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dated_directory_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).expect("valid date");
        assert_eq!(
            dated_directory("uat", date),
            PathBuf::from("uat").join("2026-03-07")
        );
    }
}
