use crate::cli::DiscoveryArgs;
use crate::support::{
    discovery_or_exit, load_config_or_exit, load_routes_or_exit, print_json_or_exit,
};
use serde_json::{Value, json};
use uatgen_core::{Generator, PrerequisiteSource};

pub fn run(routes: String, config: Option<String>, discovery: DiscoveryArgs, json: bool) {
    let config = load_config_or_exit(config.as_deref());
    let routes = load_routes_or_exit(&routes);
    let discovery = discovery_or_exit(&discovery, &config);

    let generator = Generator::new(&config, discovery);
    let modules = generator.modules(&routes);

    if json {
        let rows: Vec<Value> = modules
            .iter()
            .flat_map(|module| {
                module.routes.iter().map(|entry| {
                    json!({
                        "module": module.name,
                        "uri": entry.route.path(),
                        "name": entry.route.name,
                        "action": entry.route.action,
                        "source": entry.source,
                        "prerequisites": entry.prerequisites,
                    })
                })
            })
            .collect();
        print_json_or_exit(&rows);
        return;
    }

    println!("uatgen prerequisites");
    for module in &modules {
        println!();
        println!("  {}", module.name);
        for entry in &module.routes {
            let source = match entry.source {
                PrerequisiteSource::Discovery => "discovery",
                PrerequisiteSource::Fallback => "static rules",
            };
            println!("    {} [{source}]", entry.route.path());
            if entry.prerequisites.is_empty() {
                println!("      - none");
            }
            for prerequisite in &entry.prerequisites {
                println!(
                    "      - {}: {}",
                    prerequisite.rule_type(),
                    prerequisite.description()
                );
            }
        }
    }
}
