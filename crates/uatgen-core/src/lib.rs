//! # uatgen core
//!
//! Derives manual User-Acceptance-Test scenarios from a web application's
//! route table. Middleware names and controller/policy pairs become
//! human-readable authorization prerequisites; each selected route becomes a
//! numbered set of test cases.
//!
//! The live application is never queried. Its router state arrives as a
//! route-table snapshot, and its middleware and policy sources (optionally)
//! through an [`Introspector`].
//!
//! ## Architecture
//!
//! ```text
//! Route table snapshot
//!     │
//! select_routes         ← GET, not excluded, no parameters, web only
//!     │
//! group_by_module       ← dotted name / first segment / Dashboard
//!     │
//! PrerequisiteResolver  ← RuleDiscovery first, static rule tables as fallback
//!     │
//! build_test_cases      ← TC-<MOD>-<RR>-<SSS> per route
//!     │
//! ModuleSuite           ← handed to a renderer
//! ```

pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
pub mod module;
pub mod naming;
pub mod pattern;
pub mod resolve;
pub mod route;
pub mod rule;
pub mod suite;
pub mod synth;

pub use classify::{ROOT_MODULE, group_by_module, module_for_route, select_routes};
pub use config::{PatternRule, PolicyMapping, PolicyMethodInfo, ProjectConfig, RuleTables, UatConfig};
pub use discovery::{
    Introspector, ReflectiveDiscovery, RegistryIntrospector, RuleDiscovery, SourceTreeIntrospector,
};
pub use error::{ConfigError, DiscoveryError, SnapshotError};
pub use module::{Module, ModuleRoute, build_modules, module_prefix};
pub use resolve::{PrerequisiteResolver, PrerequisiteSource, Resolution};
pub use route::{MiddlewareRef, OpaqueHandler, Route, load_route_table, parse_route_table};
pub use rule::{PolicyRequirement, Prerequisite, Rule};
pub use suite::{Generator, ModuleSuite, RouteOverview};
pub use synth::{PolicyCheck, RouteTestBlock, TestCase, TestStatus, TestSummary, build_test_cases};
