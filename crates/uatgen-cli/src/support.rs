use crate::cli::DiscoveryArgs;
use serde::Serialize;
use std::path::Path;
use uatgen_core::{
    ReflectiveDiscovery, RegistryIntrospector, Route, RuleDiscovery, SourceTreeIntrospector,
    UatConfig, load_route_table,
};
use uatgen_render::{OutputFormat, UserRecord, load_users};

/// Marker directory that makes the working directory count as a source root.
const IMPLICIT_SOURCE_MARKER: &str = "app/Http";

pub fn load_routes_or_exit(path: &str) -> Vec<Route> {
    load_route_table(path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(2);
    })
}

pub fn load_config_or_exit(path: Option<&str>) -> UatConfig {
    UatConfig::load_or_default(path.map(Path::new)).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(2);
    })
}

pub fn load_users_or_exit(path: Option<&str>) -> Vec<UserRecord> {
    let Some(path) = path else {
        return Vec::new();
    };
    load_users(path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(2);
    })
}

pub fn parse_format_or_exit(format: &str) -> OutputFormat {
    format.parse().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(2);
    })
}

/// Discovery strategy selected by the flags.
///
/// Without flags, the working directory is scanned when it looks like an
/// application root; otherwise only the static tables are used.
pub fn discovery_or_exit(
    args: &DiscoveryArgs,
    config: &UatConfig,
) -> Option<Box<dyn RuleDiscovery>> {
    if args.no_discovery {
        return None;
    }

    if let Some(registry) = &args.registry {
        let introspector = RegistryIntrospector::load(registry).unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(2);
        });
        return Some(Box::new(ReflectiveDiscovery::new(introspector, config)));
    }

    let root = match &args.source_root {
        Some(root) => root.as_str(),
        None if Path::new(IMPLICIT_SOURCE_MARKER).is_dir() => ".",
        None => {
            tracing::debug!("no discovery source; using static rule tables");
            return None;
        }
    };
    let introspector = SourceTreeIntrospector::open(root).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(2);
    });
    tracing::info!(root, "scanning application sources for rules");
    Some(Box::new(ReflectiveDiscovery::new(introspector, config)))
}

pub fn print_json_or_exit<T: Serialize>(value: &T) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("error: failed to render json: {e}");
        std::process::exit(1);
    });
    println!("{rendered}");
}

pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
