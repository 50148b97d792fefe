//! JSON documents for tooling that tracks UAT progress.
//!
//! Test case `status` is the tri-state object `{pass, fail, not_tested}` so a
//! tracker can flip one flag without knowing the enum spelling.

use crate::error::RenderError;
use crate::presentation::{Presentation, module_file_name};
use crate::project::{ProjectInfo, UserRecord, role_distribution, test_user_matrix};
use serde::Serialize;
use serde_json::{Map, Value, json};
use uatgen_core::{ModuleSuite, TestCase, TestStatus};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPresentation;

impl Presentation for JsonPresentation {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn project_info(&self, info: &ProjectInfo) -> Result<String, RenderError> {
        let document = json!({
            "title": "Project Information",
            "generated_at": info.generated_at,
            "basic_information": {
                "project_name": info.name,
                "description": info.description,
                "version": info.version,
                "environment": info.environment,
            },
            "technical_stack": info.stack,
            "uat_testing_notes": {
                "foundation": "This document serves as the foundation for User Acceptance Testing (UAT)",
                "environment": "All testing should be performed in a controlled environment",
                "configuration": "Verify all components are properly configured before testing",
                "reporting": "Report any discrepancies between expected and actual behavior",
            },
        });
        to_pretty("project information", &document)
    }

    fn users(&self, users: &[UserRecord], generated_at: &str) -> Result<String, RenderError> {
        let distribution: Map<String, Value> = role_distribution(users)
            .into_iter()
            .map(|(role, count)| (role, json!(count)))
            .collect();
        let matrix: Map<String, Value> = test_user_matrix(users)
            .into_iter()
            .map(|(role, holders)| {
                (
                    role,
                    json!({ "available_users": holders, "has_users": !holders.is_empty() }),
                )
            })
            .collect();

        let document = json!({
            "title": "Users",
            "generated_at": generated_at,
            "total_users": users.len(),
            "users_overview": users,
            "user_roles_distribution": distribution,
            "uat_test_users": {
                "description": "For comprehensive UAT testing, ensure you have test users for each role",
                "recommended_test_user_matrix": matrix,
            },
            "pre_uat_user_checklist": {
                "verified_emails": "All test users have verified email addresses",
                "role_coverage": "Each role has at least one test user assigned",
                "password_documentation": "Test user passwords are documented and accessible to UAT team",
                "mfa_configuration": "Multi-factor authentication is configured for admin users (if enabled)",
                "permission_testing": "User permissions are properly assigned and tested",
            },
        });
        to_pretty("users", &document)
    }

    fn available_modules(
        &self,
        suites: &[ModuleSuite],
        generated_at: &str,
    ) -> Result<String, RenderError> {
        let summary: Vec<Value> = suites
            .iter()
            .map(|suite| {
                json!({
                    "module": suite.name,
                    "routes_count": suite.route_count(),
                    "test_cases_count": suite.summary.total,
                    "file": module_file_name(suite, self.extension()),
                })
            })
            .collect();

        let document = json!({
            "title": "Available Modules Overview",
            "generated_at": generated_at,
            "total_modules": suites.len(),
            "modules_summary": summary,
            "general_uat_testing_guidelines": {
                "pre_testing_checklist": {
                    "modules_deployed": "All modules are deployed and accessible",
                    "database_seeded": "Database is properly seeded with test data",
                    "external_dependencies": "All external dependencies are available",
                    "test_users_created": "Test users are created for each role",
                    "browser_compatibility": "Browser compatibility testing setup is ready",
                },
                "testing_methodology": {
                    "smoke_testing": "Verify all routes are accessible",
                    "functional_testing": "Test core business logic for each module",
                    "authorization_testing": "Verify role-based access controls",
                    "policy_testing": "Verify policy-based authorization rules",
                    "integration_testing": "Test module interactions",
                    "security_testing": "Test for common vulnerabilities",
                },
                "bug_reporting_template": {
                    "description": "When reporting issues found during UAT",
                    "fields": {
                        "test_case_id": "[TC-XXX-XX-XXX]",
                        "module": "[Module Name]",
                        "route": "[Route URI]",
                        "user_role": "[Role being tested]",
                        "expected_behavior": "[What should happen]",
                        "actual_behavior": "[What actually happened]",
                        "steps_to_reproduce": "[Detailed steps]",
                        "browser_environment": "[Testing environment details]",
                        "severity": "[Critical/High/Medium/Low]",
                    },
                },
            },
        });
        to_pretty("available modules", &document)
    }

    fn module_test_suite(
        &self,
        suite: &ModuleSuite,
        generated_at: &str,
    ) -> Result<String, RenderError> {
        let overview: Vec<Value> = suite
            .routes
            .iter()
            .map(|route| {
                let prerequisites = match route.prerequisites.len() {
                    0 => "None".to_string(),
                    n => format!("{n} item(s)"),
                };
                json!({
                    "uri": route.path,
                    "name": route.name,
                    "action": route.action,
                    "middleware": route.middleware.join(", "),
                    "prerequisites": prerequisites,
                })
            })
            .collect();

        let test_cases: Vec<Value> = suite
            .blocks
            .iter()
            .map(|block| {
                json!({
                    "route_uri": block.path,
                    "prerequisites": block.prerequisites,
                    "tests": block.tests.iter().map(test_case_value).collect::<Vec<_>>(),
                })
            })
            .collect();

        let summary = &suite.summary;
        let document = json!({
            "title": format!("{} Module - UAT Test Suite", suite.name),
            "generated_at": generated_at,
            "module": suite.name,
            "routes_count": suite.route_count(),
            "module_overview": overview,
            "test_cases": test_cases,
            "test_summary": {
                "total_test_cases": summary.total,
                "passed": summary.passed,
                "failed": summary.failed,
                "not_tested": summary.not_tested,
                "completion_percentage": summary.completion_percentage,
                "tester_name": "",
                "test_date": "",
                "notes": "",
            },
        });
        to_pretty("module test suite", &document)
    }
}

fn test_case_value(case: &TestCase) -> Value {
    let mut fields = Map::new();
    fields.insert("test_id".to_string(), json!(case.id));
    fields.insert("test_name".to_string(), json!(case.name));
    fields.insert("test_objective".to_string(), json!(case.objective));
    fields.insert("prerequisites".to_string(), json!(case.prerequisites));
    fields.insert("test_steps".to_string(), json!(case.steps));
    fields.insert("expected_result".to_string(), json!(case.expected_result));
    if let Some(check) = &case.policy_check {
        fields.insert("policy".to_string(), json!(check.policy));
        fields.insert("method".to_string(), json!(check.method));
        fields.insert(
            "required_permissions".to_string(),
            json!(check.required_permissions),
        );
    }
    fields.insert("status".to_string(), status_flags(case.status));
    fields.insert("notes".to_string(), json!(case.notes));
    Value::Object(fields)
}

fn status_flags(status: TestStatus) -> Value {
    json!({
        "pass": status == TestStatus::Pass,
        "fail": status == TestStatus::Fail,
        "not_tested": status == TestStatus::NotTested,
    })
}

fn to_pretty<T: Serialize>(document: &'static str, value: &T) -> Result<String, RenderError> {
    serde_json::to_string_pretty(value)
        .map_err(|source| RenderError::Serialize { document, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uatgen_core::{Generator, Route, UatConfig};

    fn suite() -> ModuleSuite {
        let config = UatConfig::default();
        let generator = Generator::new(&config, None);
        let routes = vec![
            Route::new("users", &["GET"])
                .with_name("users.index")
                .with_action("App\\Http\\Controllers\\UserController@index")
                .with_middleware(["web", "auth"]),
            Route::new("users/create", &["GET"]).with_name("users.create"),
        ];
        generator.suites(&routes).remove(0)
    }

    #[test]
    fn module_suite_document_shape() {
        let text = JsonPresentation
            .module_test_suite(&suite(), "2026-10-19 09:00:00")
            .expect("render");
        let doc: Value = serde_json::from_str(&text).expect("valid json");

        assert_eq!(doc["title"], "Users Module - UAT Test Suite");
        assert_eq!(doc["routes_count"], 2);
        assert_eq!(doc["module_overview"][0]["uri"], "/users");
        assert_eq!(doc["module_overview"][0]["prerequisites"], "2 item(s)");
        assert_eq!(doc["module_overview"][1]["prerequisites"], "None");

        let first_route = &doc["test_cases"][0];
        assert_eq!(first_route["route_uri"], "/users");
        assert_eq!(first_route["prerequisites"][1]["type"], "policy_authorization");
        assert_eq!(first_route["tests"][0]["test_id"], "TC-USE-01-001");
        assert_eq!(
            first_route["tests"][0]["status"],
            json!({"pass": false, "fail": false, "not_tested": true})
        );
        let policy = &first_route["tests"][2];
        assert_eq!(policy["policy"], "UserPolicy");
        assert_eq!(
            policy["required_permissions"],
            json!(["view-user-security", "role:superadmin", "role:administrator"])
        );
        assert!(first_route["tests"][0].get("policy").is_none());

        assert_eq!(doc["test_cases"][1]["tests"][0]["test_id"], "TC-USE-02-001");
        assert_eq!(doc["test_summary"]["total_test_cases"], 4);
        assert_eq!(doc["test_summary"]["not_tested"], 4);
        assert_eq!(doc["test_summary"]["completion_percentage"], 0);
    }

    #[test]
    fn available_modules_uses_json_file_names() {
        let text = JsonPresentation
            .available_modules(&[suite()], "2026-10-19 09:00:00")
            .expect("render");
        let doc: Value = serde_json::from_str(&text).expect("valid json");
        insta::assert_snapshot!(
            doc["modules_summary"][0]["file"].as_str().unwrap_or_default(),
            @"05-module-users.json"
        );
    }
}
