//! One generation run: route table in, per-module suites out.

use crate::classify::select_routes;
use crate::config::UatConfig;
use crate::discovery::RuleDiscovery;
use crate::module::{Module, build_modules};
use crate::resolve::{PrerequisiteResolver, PrerequisiteSource};
use crate::route::Route;
use crate::rule::Prerequisite;
use crate::synth::{RouteTestBlock, TestSummary, build_route_blocks};
use serde::Serialize;

/// Route row of a module overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteOverview {
    pub uri: String,
    pub path: String,
    pub name: String,
    pub action: String,
    pub middleware: Vec<String>,
    pub prerequisites: Vec<Prerequisite>,
}

/// Everything a renderer needs for one module document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSuite {
    /// 0-based position in first-seen module order.
    pub index: usize,
    pub name: String,
    pub routes: Vec<RouteOverview>,
    pub blocks: Vec<RouteTestBlock>,
    pub summary: TestSummary,
}

impl ModuleSuite {
    pub fn from_module(index: usize, module: &Module) -> Self {
        let blocks = build_route_blocks(module);
        let summary = TestSummary::of(blocks.iter().flat_map(|block| &block.tests));
        let routes = module
            .routes
            .iter()
            .map(|entry| RouteOverview {
                uri: entry.route.uri.clone(),
                path: entry.route.path(),
                name: entry.route.display_name().to_string(),
                action: entry.route.action_label().to_string(),
                middleware: entry.route.middleware_display(),
                prerequisites: entry.prerequisites.clone(),
            })
            .collect();
        Self {
            index,
            name: module.name.clone(),
            routes,
            blocks,
            summary,
        }
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

pub struct Generator<'a> {
    config: &'a UatConfig,
    resolver: PrerequisiteResolver<'a>,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a UatConfig, discovery: Option<Box<dyn RuleDiscovery + 'a>>) -> Self {
        Self {
            config,
            resolver: PrerequisiteResolver::new(config, discovery),
        }
    }

    pub fn config(&self) -> &UatConfig {
        self.config
    }

    pub fn select<'r>(&self, routes: &'r [Route]) -> Vec<&'r Route> {
        select_routes(routes, &self.config.excluded_prefixes)
    }

    pub fn modules(&self, routes: &[Route]) -> Vec<Module> {
        let selected = self.select(routes);
        let modules = build_modules(&selected, &self.resolver);

        let discovered = modules
            .iter()
            .flat_map(|m| &m.routes)
            .filter(|r| r.source == PrerequisiteSource::Discovery)
            .count();
        tracing::info!(
            routes = routes.len(),
            selected = selected.len(),
            modules = modules.len(),
            discovered,
            discovery = self.resolver.has_discovery(),
            "classified route table"
        );
        modules
    }

    pub fn suites(&self, routes: &[Route]) -> Vec<ModuleSuite> {
        self.modules(routes)
            .iter()
            .enumerate()
            .map(|(index, module)| ModuleSuite::from_module(index, module))
            .collect()
    }
}
