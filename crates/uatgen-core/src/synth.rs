//! Test-case synthesis.
//!
//! Per route, in order, a shared sequence counter numbers:
//! 1. the basic access test (always),
//! 2. the authentication test (literal `auth` middleware),
//! 3. one role test per `role:<name>` entry,
//! 4. one policy test per `policy_authorization` prerequisite.
//!
//! IDs are `TC-<PREFIX>-<ROUTE>-<SEQ>` with a 2-digit 1-based route index
//! and a 3-digit sequence that restarts for every route.

use crate::module::{Module, ModuleRoute};
use crate::rule::{PolicyRequirement, Prerequisite};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Pass,
    Fail,
    #[default]
    NotTested,
}

/// Policy details carried by policy authorization test cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCheck {
    pub policy: String,
    pub method: String,
    pub required_permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub name: String,
    pub objective: String,
    pub prerequisites: Vec<String>,
    pub steps: Vec<String>,
    pub expected_result: String,
    #[serde(default)]
    pub status: TestStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_check: Option<PolicyCheck>,
}

/// Test cases for one route, with the route's prerequisites alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTestBlock {
    pub path: String,
    pub prerequisites: Vec<Prerequisite>,
    pub tests: Vec<TestCase>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub not_tested: usize,
    pub completion_percentage: u32,
}

impl TestSummary {
    pub fn of<'a>(cases: impl IntoIterator<Item = &'a TestCase>) -> Self {
        let mut summary = Self::default();
        for case in cases {
            summary.total += 1;
            match case.status {
                TestStatus::Pass => summary.passed += 1,
                TestStatus::Fail => summary.failed += 1,
                TestStatus::NotTested => summary.not_tested += 1,
            }
        }
        if summary.total > 0 {
            let done = (summary.passed + summary.failed) * 100 / summary.total;
            summary.completion_percentage = done as u32;
        }
        summary
    }
}

impl TestCase {
    fn new(
        id: String,
        name: impl Into<String>,
        objective: impl Into<String>,
        prerequisites: Vec<String>,
        steps: Vec<String>,
        expected_result: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            objective: objective.into(),
            prerequisites,
            steps,
            expected_result: expected_result.into(),
            status: TestStatus::NotTested,
            notes: String::new(),
            policy_check: None,
        }
    }
}

/// Flat list of a module's test cases, in generation order.
pub fn build_test_cases(module: &Module) -> Vec<TestCase> {
    build_route_blocks(module)
        .into_iter()
        .flat_map(|block| block.tests)
        .collect()
}

pub fn build_route_blocks(module: &Module) -> Vec<RouteTestBlock> {
    let prefix = module.prefix();
    module
        .routes
        .iter()
        .enumerate()
        .map(|(index, entry)| route_block(&prefix, index + 1, entry))
        .collect()
}

struct IdSequence<'a> {
    prefix: &'a str,
    route: usize,
    next: usize,
}

impl IdSequence<'_> {
    fn next_id(&mut self) -> String {
        let id = format!("TC-{}-{:02}-{:03}", self.prefix, self.route, self.next);
        self.next += 1;
        id
    }
}

fn route_block(prefix: &str, route_index: usize, entry: &ModuleRoute) -> RouteTestBlock {
    let route = &entry.route;
    let path = route.path();
    let mut ids = IdSequence {
        prefix,
        route: route_index,
        next: 1,
    };
    let mut tests = Vec::new();

    let prerequisite_lines = if entry.prerequisites.is_empty() {
        vec!["None".to_string()]
    } else {
        entry
            .prerequisites
            .iter()
            .map(|p| p.description().to_string())
            .collect()
    };
    tests.push(TestCase::new(
        ids.next_id(),
        "Basic Access Test",
        "Verify route is accessible and loads without errors",
        prerequisite_lines,
        vec![
            format!("Navigate to {path}"),
            "Wait for page to load completely".to_string(),
            "Verify page content is displayed".to_string(),
        ],
        "Page loads successfully without errors",
    ));

    if route.has_middleware("auth") {
        tests.push(TestCase::new(
            ids.next_id(),
            "Authentication Required Test",
            "Verify unauthenticated users are redirected to login",
            vec![
                "User must be logged out".to_string(),
                "Clear all browser sessions".to_string(),
            ],
            vec![
                "Ensure user is not logged in".to_string(),
                format!("Navigate directly to {path}"),
                "Observe browser behavior".to_string(),
            ],
            "User is redirected to login page",
        ));
    }

    for role in route
        .named_middleware()
        .filter_map(|name| name.strip_prefix("role:"))
    {
        tests.push(role_test(ids.next_id(), role, &path));
    }

    for prerequisite in &entry.prerequisites {
        if prerequisite.is_policy()
            && let Some(requirement) = &prerequisite.policy
        {
            tests.push(policy_test(ids.next_id(), prerequisite, requirement, &path));
        }
    }

    RouteTestBlock {
        path,
        prerequisites: entry.prerequisites.clone(),
        tests,
    }
}

fn role_test(id: String, role: &str, path: &str) -> TestCase {
    TestCase::new(
        id,
        format!("Role Authorization Test - {role}"),
        format!("Verify only users with '{role}' role can access route"),
        vec![
            format!("Test user without '{role}' role"),
            format!("Test user with '{role}' role"),
        ],
        vec![
            format!("Login with user WITHOUT '{role}' role"),
            format!("Navigate to {path}"),
            "Verify access is denied (403 or redirect)".to_string(),
            format!("Logout and login with user WITH '{role}' role"),
            format!("Navigate to {path}"),
            "Verify access is granted".to_string(),
        ],
        "Access denied for unauthorized user, granted for authorized user",
    )
}

fn policy_test(
    id: String,
    prerequisite: &Prerequisite,
    requirement: &PolicyRequirement,
    path: &str,
) -> TestCase {
    let rule = &prerequisite.rule;
    let (prerequisites, steps, expected) = if requirement.permissions_required.is_empty() {
        (
            vec![
                "Test user with appropriate authorization".to_string(),
                "Test user without authorization".to_string(),
            ],
            vec![
                rule.action.clone(),
                format!("Navigate to {path}"),
                rule.validation.clone(),
            ],
            "Access granted for authorized user",
        )
    } else {
        let mut users: Vec<String> = requirement
            .permissions_required
            .iter()
            .map(|permission| format!("Test user with '{permission}' permission"))
            .collect();
        users.push("Test user without required permissions".to_string());
        (
            users,
            vec![
                rule.action.clone(),
                format!("Navigate to {path}"),
                rule.validation.clone(),
                "Logout and login with user WITHOUT required permissions".to_string(),
                format!("Navigate to {path}"),
                "Verify access is denied (403, 404, or redirect)".to_string(),
            ],
            "Access granted for authorized user, denied for unauthorized user",
        )
    };

    let mut case = TestCase::new(
        id,
        format!(
            "Policy Authorization Test - {}::{}",
            requirement.policy, requirement.method
        ),
        rule.description.clone(),
        prerequisites,
        steps,
        expected,
    );
    case.policy_check = Some(PolicyCheck {
        policy: requirement.policy.clone(),
        method: requirement.method.clone(),
        required_permissions: requirement.permissions_required.clone(),
    });
    case
}
