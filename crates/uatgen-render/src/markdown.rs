//! Markdown documents meant to be printed or filled in by hand.

use crate::error::RenderError;
use crate::presentation::{Presentation, module_file_name};
use crate::project::{ProjectInfo, UserRecord, role_distribution, test_user_matrix};
use uatgen_core::{ModuleSuite, TestCase, TestStatus};

const NOTES_LINE: &str = "________________________________";
const LONG_LINE: &str = "_________________________________________________";

const UAT_NOTES: &[&str] = &[
    "This document serves as the foundation for User Acceptance Testing (UAT)",
    "All testing should be performed in a controlled environment",
    "Verify all components are properly configured before testing",
    "Report any discrepancies between expected and actual behavior",
];

const USER_CHECKLIST: &[&str] = &[
    "All test users have verified email addresses",
    "Each role has at least one test user assigned",
    "Test user passwords are documented and accessible to UAT team",
    "Multi-factor authentication is configured for admin users (if enabled)",
    "User permissions are properly assigned and tested",
];

const PRE_TESTING_CHECKLIST: &[&str] = &[
    "All modules are deployed and accessible",
    "Database is properly seeded with test data",
    "All external dependencies are available",
    "Test users are created for each role",
    "Browser compatibility testing setup is ready",
];

const METHODOLOGY: &[(&str, &str)] = &[
    ("Smoke Testing", "Verify all routes are accessible"),
    ("Functional Testing", "Test core business logic for each module"),
    ("Authorization Testing", "Verify role-based access controls"),
    ("Policy Testing", "Verify policy-based authorization rules"),
    ("Integration Testing", "Test module interactions"),
    ("Security Testing", "Test for common vulnerabilities"),
];

const BUG_REPORT_FIELDS: &[(&str, &str)] = &[
    ("Test Case ID", "[TC-XXX-XX-XXX]"),
    ("Module", "[Module Name]"),
    ("Route", "[Route URI]"),
    ("User Role", "[Role being tested]"),
    ("Expected Behavior", "[What should happen]"),
    ("Actual Behavior", "[What actually happened]"),
    ("Steps to Reproduce", "[Detailed steps]"),
    ("Browser/Environment", "[Testing environment details]"),
    ("Severity", "[Critical/High/Medium/Low]"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownPresentation;

impl Presentation for MarkdownPresentation {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn project_info(&self, info: &ProjectInfo) -> Result<String, RenderError> {
        let mut md = String::from("# Project Information\n\n");
        md.push_str(&format!("> Generated on: {}\n\n", info.generated_at));

        md.push_str("## Basic Information\n\n");
        md.push_str("| Field | Value |\n|-------|-------|\n");
        md.push_str(&format!("| **Project Name** | {} |\n", cell(&info.name)));
        md.push_str(&format!("| **Description** | {} |\n", cell(&info.description)));
        md.push_str(&format!("| **Version** | {} |\n", cell(&info.version)));
        md.push_str(&format!("| **Environment** | {} |\n\n", cell(&info.environment)));

        if !info.stack.is_empty() {
            md.push_str("## Technical Stack\n\n");
            md.push_str("| Component | Version/Configuration |\n");
            md.push_str("|-----------|----------------------|\n");
            for (component, value) in &info.stack {
                md.push_str(&format!("| **{}** | {} |\n", cell(component), cell(value)));
            }
            md.push('\n');
        }

        md.push_str("## UAT Testing Notes\n\n");
        push_bullets(&mut md, UAT_NOTES);
        Ok(md)
    }

    fn users(&self, users: &[UserRecord], generated_at: &str) -> Result<String, RenderError> {
        let mut md = String::from("# Users\n\n");
        md.push_str(&format!("> Generated on: {generated_at}\n"));
        md.push_str(&format!("> Total Users: {}\n\n", users.len()));

        md.push_str("## Users Overview\n\n");
        md.push_str("| User ID | Name | Email | Email Verified | Roles | Created At |\n");
        md.push_str("|---------|------|-------|----------------|-------|------------|\n");
        for user in users {
            md.push_str(&format!(
                "| {} | **{}** | {} | {} | {} | {} |\n",
                display_id(&user.id),
                cell(&user.name),
                cell(&user.email),
                if user.email_verified { "✅" } else { "❌" },
                cell(&user.roles.join(", ")),
                cell(&user.created_at),
            ));
        }

        md.push_str("\n## User Roles Distribution\n\n");
        for (role, count) in role_distribution(users) {
            md.push_str(&format!("- **{role}**: {count} users\n"));
        }

        md.push_str("\n## UAT Test Users\n\n");
        md.push_str("### Recommended Test User Matrix\n\n");
        md.push_str("For comprehensive UAT testing, ensure you have test users for each role:\n\n");
        for (role, holders) in test_user_matrix(users) {
            md.push_str(&format!("#### {role} Role\n\n"));
            md.push_str("**Available Test Users:**\n");
            for user in holders {
                md.push_str(&format!("- {} ({})\n", user.name, user.email));
            }
            md.push('\n');
        }

        md.push_str("## Pre-UAT User Checklist\n\n");
        push_checklist(&mut md, USER_CHECKLIST);
        Ok(md)
    }

    fn available_modules(
        &self,
        suites: &[ModuleSuite],
        generated_at: &str,
    ) -> Result<String, RenderError> {
        let mut md = String::from("# Available Modules Overview\n\n");
        md.push_str(&format!("> Generated on: {generated_at}\n"));
        md.push_str(&format!("> Total Modules: {}\n\n", suites.len()));

        md.push_str("## Modules Summary\n\n");
        md.push_str("| Module | Routes | Test Cases | File |\n");
        md.push_str("|--------|--------|------------|------|\n");
        for suite in suites {
            md.push_str(&format!(
                "| **{}** | {} | {} | `{}` |\n",
                cell(&suite.name),
                suite.route_count(),
                suite.summary.total,
                module_file_name(suite, self.extension()),
            ));
        }

        md.push_str("\n## General UAT Testing Guidelines\n\n");
        md.push_str("### Pre-Testing Checklist\n\n");
        push_checklist(&mut md, PRE_TESTING_CHECKLIST);

        md.push_str("### Testing Methodology\n\n");
        for (n, (label, text)) in METHODOLOGY.iter().enumerate() {
            md.push_str(&format!("{}. **{label}**: {text}\n", n + 1));
        }
        md.push('\n');

        md.push_str("### Bug Reporting Template\n\n");
        md.push_str("When reporting issues found during UAT:\n\n");
        md.push_str("**Bug Report Template:**\n");
        for (field, placeholder) in BUG_REPORT_FIELDS {
            md.push_str(&format!("- **{field}**: {placeholder}\n"));
        }
        md.push('\n');
        Ok(md)
    }

    fn module_test_suite(
        &self,
        suite: &ModuleSuite,
        generated_at: &str,
    ) -> Result<String, RenderError> {
        let mut md = format!("# {} Module - UAT Test Suite\n\n", suite.name);
        md.push_str(&format!("> Generated on: {generated_at}\n"));
        md.push_str(&format!("> Module: {}\n", suite.name));
        md.push_str(&format!("> Routes: {}\n\n", suite.route_count()));

        md.push_str("## Module Overview\n\n");
        md.push_str("| Route URI | Route Name | Action | Middleware | Prerequisites |\n");
        md.push_str("|-----------|------------|--------|------------|---------------|\n");
        for route in &suite.routes {
            let prerequisites = match route.prerequisites.len() {
                0 => "None".to_string(),
                n => format!("{n} item(s)"),
            };
            md.push_str(&format!(
                "| `{}` | {} | {} | {} | {} |\n",
                route.path,
                cell(&route.name),
                cell(&route.action),
                cell(&route.middleware.join(", ")),
                prerequisites,
            ));
        }

        md.push_str("\n## Test Cases\n\n");
        for block in &suite.blocks {
            md.push_str(&format!("### Route: `{}`\n\n", block.path));

            if !block.prerequisites.is_empty() {
                md.push_str("#### Prerequisites\n\n");
                for prerequisite in &block.prerequisites {
                    md.push_str(&format!("**{}:**\n", prerequisite.rule_type()));
                    md.push_str(&format!("- **Description**: {}\n", prerequisite.rule.description));
                    md.push_str(&format!("- **Setup Action**: {}\n", prerequisite.rule.action));
                    md.push_str(&format!("- **Validation**: {}\n\n", prerequisite.rule.validation));
                }
            }

            for case in &block.tests {
                push_test_case(&mut md, case);
            }
            md.push_str("---\n\n");
        }

        md.push_str("## Test Summary\n\n");
        md.push_str("| Status | Count |\n|-----------|-------|\n");
        md.push_str(&format!("| **Total Test Cases** | {} |\n", suite.summary.total));
        md.push_str("| **Passed** | _____ |\n");
        md.push_str("| **Failed** | _____ |\n");
        md.push_str("| **Not Tested** | _____ |\n\n");
        md.push_str("**Test Completion**: _____%\n\n");
        md.push_str("**Tester Name**: ___________________________\n\n");
        md.push_str("**Test Date**: _____________________________\n\n");
        md.push_str("**Notes**: \n");
        md.push_str(&format!("{LONG_LINE}\n\n{LONG_LINE}\n\n"));
        Ok(md)
    }
}

fn push_test_case(md: &mut String, case: &TestCase) {
    md.push_str(&format!("#### {}: {}\n\n", case.id, case.name));
    md.push_str(&format!("**Test Objective**: {}\n\n", case.objective));

    md.push_str("**Prerequisites**:\n");
    for line in &case.prerequisites {
        md.push_str(&format!("- {line}\n"));
    }

    md.push_str("\n**Test Steps**:\n");
    for (n, step) in case.steps.iter().enumerate() {
        md.push_str(&format!("{}. {step}\n", n + 1));
    }

    md.push_str(&format!("\n**Expected Result**: {}\n\n", case.expected_result));

    if let Some(check) = &case.policy_check {
        md.push_str(&format!("**Policy**: {}\n", check.policy));
        md.push_str(&format!("**Method**: {}\n", check.method));
        if !check.required_permissions.is_empty() {
            md.push_str(&format!(
                "**Required Permissions**: {}\n",
                check.required_permissions.join(", ")
            ));
        }
        md.push('\n');
    }

    md.push_str(&format!("**Status**: {}\n\n", status_boxes(case.status)));
    let notes = if case.notes.is_empty() {
        NOTES_LINE
    } else {
        case.notes.as_str()
    };
    md.push_str(&format!("**Notes**: {notes}\n\n"));
}

fn status_boxes(status: TestStatus) -> String {
    let (pass, fail) = match status {
        TestStatus::Pass => ("[x]", "[ ]"),
        TestStatus::Fail => ("[ ]", "[x]"),
        TestStatus::NotTested => ("[ ]", "[ ]"),
    };
    format!("{pass} Pass {fail} Fail [ ] Not Tested")
}

fn push_bullets(md: &mut String, items: &[&str]) {
    for item in items {
        md.push_str(&format!("- {item}\n"));
    }
    md.push('\n');
}

fn push_checklist(md: &mut String, items: &[&str]) {
    for item in items {
        md.push_str(&format!("- [ ] {item}\n"));
    }
    md.push('\n');
}

/// Escape pipes so a value cannot break a table row.
fn cell(value: &str) -> String {
    value.replace('|', "\\|")
}

fn display_id(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use uatgen_core::{Generator, Route, UatConfig};

    fn users_suite() -> ModuleSuite {
        let config = UatConfig::default();
        let generator = Generator::new(&config, None);
        let routes = vec![
            Route::new("users", &["GET"])
                .with_name("users.index")
                .with_action("App\\Http\\Controllers\\UserController@index")
                .with_middleware(["web", "auth", "role:admin"]),
        ];
        generator.suites(&routes).remove(0)
    }

    #[test]
    fn module_suite_lists_every_case_with_policy_details() {
        let md = MarkdownPresentation
            .module_test_suite(&users_suite(), "2026-10-19 09:00:00")
            .expect("render");

        assert!(md.starts_with("# Users Module - UAT Test Suite\n\n> Generated on: 2026-10-19 09:00:00\n"));
        assert!(md.contains(
            "| `/users` | users.index | UserController@index | web, auth, role:admin | 3 item(s) |"
        ));
        assert!(md.contains("#### TC-USE-01-001: Basic Access Test"));
        assert!(md.contains("#### TC-USE-01-002: Authentication Required Test"));
        assert!(md.contains("#### TC-USE-01-003: Role Authorization Test - admin"));
        assert!(md.contains("#### TC-USE-01-004: Policy Authorization Test - UserPolicy::viewAny"));
        assert!(md.contains("**Required Permissions**: view-user-security"));
        assert!(md.contains("| **Total Test Cases** | 4 |"));
        assert_eq!(md.matches("**Status**: [ ] Pass [ ] Fail [ ] Not Tested").count(), 4);
    }

    #[test]
    fn available_modules_links_module_files() {
        let md = MarkdownPresentation
            .available_modules(&[users_suite()], "2026-10-19 09:00:00")
            .expect("render");
        assert!(md.contains("> Total Modules: 1"));
        assert!(md.contains("| **Users** | 1 | 4 | `05-module-users.md` |"));
    }

    #[test]
    fn project_info_skips_empty_stack() {
        let mut info = ProjectInfo {
            name: "Shop".to_string(),
            description: "Storefront".to_string(),
            version: "2.1.0".to_string(),
            environment: "staging".to_string(),
            stack: BTreeMap::new(),
            generated_at: "2026-10-19 09:00:00".to_string(),
            date: "2026-10-19".to_string(),
        };
        let md = MarkdownPresentation.project_info(&info).expect("render");
        assert!(md.contains("| **Project Name** | Shop |"));
        assert!(!md.contains("## Technical Stack"));

        info.stack.insert("Database".to_string(), "pgsql".to_string());
        let md = MarkdownPresentation.project_info(&info).expect("render");
        assert!(md.contains("| **Database** | pgsql |"));
    }

    #[test]
    fn users_document_counts_roles() {
        let users = vec![UserRecord {
            id: serde_json::json!(1),
            name: "Ana".to_string(),
            email: "ana@example.test".to_string(),
            email_verified: false,
            roles: vec!["admin".to_string()],
            created_at: "2026-01-01".to_string(),
        }];
        let md = MarkdownPresentation.users(&users, "now").expect("render");
        assert!(md.contains("| 1 | **Ana** | ana@example.test | ❌ | admin | 2026-01-01 |"));
        assert!(md.contains("- **admin**: 1 users"));
        assert!(md.contains("#### admin Role\n\n**Available Test Users:**\n- Ana (ana@example.test)"));
    }
}
