//! Project and user data for the leading documents.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use uatgen_core::{ProjectConfig, SnapshotError};

/// Timestamp format used in every "Generated on" line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Users listed per role in the recommended test-user matrix.
pub const USERS_PER_ROLE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    pub name: String,
    pub description: String,
    pub version: String,
    pub environment: String,
    pub stack: BTreeMap<String, String>,
    pub generated_at: String,
    /// Calendar date of `generated_at`, `YYYY-MM-DD`.
    pub date: String,
}

impl ProjectInfo {
    pub fn new(project: &ProjectConfig, generated_at: DateTime<Local>) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
            version: project.version.clone(),
            environment: project.environment.clone(),
            stack: project.stack.clone(),
            generated_at: generated_at.format(TIMESTAMP_FORMAT).to_string(),
            date: generated_at.format(DATE_FORMAT).to_string(),
        }
    }
}

/// One row of the users snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: serde_json::Value,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub created_at: String,
}

pub fn load_users(path: impl AsRef<Path>) -> Result<Vec<UserRecord>, SnapshotError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SnapshotError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SnapshotError::ParseJson {
        path: path.display().to_string(),
        source,
    })
}

/// Role name and number of users holding it, in first-seen order.
pub fn role_distribution(users: &[UserRecord]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for role in users.iter().flat_map(|user| &user.roles) {
        match counts.iter_mut().find(|(name, _)| name == role) {
            Some((_, count)) => *count += 1,
            None => counts.push((role.clone(), 1)),
        }
    }
    counts
}

/// Up to [`USERS_PER_ROLE`] users for each role, in first-seen role order.
pub fn test_user_matrix(users: &[UserRecord]) -> Vec<(String, Vec<&UserRecord>)> {
    role_distribution(users)
        .into_iter()
        .map(|(role, _)| {
            let holders = users
                .iter()
                .filter(|user| user.roles.contains(&role))
                .take(USERS_PER_ROLE)
                .collect();
            (role, holders)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, name: &str, roles: &[&str]) -> UserRecord {
        UserRecord {
            id: serde_json::json!(id),
            name: name.to_string(),
            email: format!("{}@example.test", name.to_lowercase()),
            email_verified: true,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            created_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn distribution_and_matrix_keep_first_seen_role_order() {
        let users = vec![
            user(1, "Ana", &["editor"]),
            user(2, "Ben", &["admin", "editor"]),
            user(3, "Cy", &["editor"]),
        ];

        assert_eq!(
            role_distribution(&users),
            vec![("editor".to_string(), 3), ("admin".to_string(), 1)]
        );

        let matrix = test_user_matrix(&users);
        let editors: Vec<&str> = matrix[0].1.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(editors, vec!["Ana", "Ben"]);
        assert_eq!(matrix[1].1.len(), 1);
    }

    #[test]
    fn user_snapshot_fields_default() {
        let users: Vec<UserRecord> =
            serde_json::from_str(r#"[{"id": 7, "name": "Dee", "email": "dee@example.test"}]"#)
                .expect("parse users");
        assert!(!users[0].email_verified);
        assert!(users[0].roles.is_empty());
    }
}
