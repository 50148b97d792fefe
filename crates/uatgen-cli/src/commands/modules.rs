use crate::cli::DiscoveryArgs;
use crate::support::{
    discovery_or_exit, load_config_or_exit, load_routes_or_exit, plural, print_json_or_exit,
};
use serde_json::{Value, json};
use uatgen_core::{Generator, module_prefix};
use uatgen_render::module_file_name;

pub fn run(routes: String, config: Option<String>, discovery: DiscoveryArgs, json: bool) {
    let config = load_config_or_exit(config.as_deref());
    let routes = load_routes_or_exit(&routes);
    let discovery = discovery_or_exit(&discovery, &config);

    let generator = Generator::new(&config, discovery);
    let suites = generator.suites(&routes);

    if json {
        let modules: Vec<Value> = suites
            .iter()
            .map(|suite| {
                json!({
                    "index": suite.index,
                    "name": suite.name,
                    "prefix": module_prefix(&suite.name),
                    "document": module_file_name(suite, "md"),
                    "routes": suite.routes.iter().map(|r| r.path.as_str()).collect::<Vec<_>>(),
                    "test_cases": suite.summary.total,
                })
            })
            .collect();
        print_json_or_exit(&json!({
            "total_routes": routes.len(),
            "selected_routes": suites.iter().map(|s| s.route_count()).sum::<usize>(),
            "modules": modules,
        }));
        return;
    }

    println!("uatgen modules");
    println!();
    if suites.is_empty() {
        println!("  (no routes selected)");
        return;
    }
    for suite in &suites {
        println!(
            "  {} [{}] {}, {}",
            suite.name,
            module_prefix(&suite.name),
            plural(suite.route_count(), "route"),
            plural(suite.summary.total, "test case"),
        );
        for route in &suite.routes {
            println!("    - {} ({})", route.path, route.name);
        }
    }
}
