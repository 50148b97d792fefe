use crate::cli::DiscoveryArgs;
use crate::support::{
    discovery_or_exit, load_config_or_exit, load_routes_or_exit, load_users_or_exit,
    parse_format_or_exit, plural, print_json_or_exit,
};
use chrono::Local;
use serde_json::json;
use std::path::PathBuf;
use uatgen_core::Generator;
use uatgen_render::{DocumentWriter, ProjectInfo, dated_directory};

#[derive(Debug, Clone)]
pub struct Args {
    pub routes: String,
    pub config: Option<String>,
    pub format: String,
    pub output_dir: Option<String>,
    pub users: Option<String>,
    pub discovery: DiscoveryArgs,
    pub json: bool,
}

pub fn run(args: Args) {
    let format = parse_format_or_exit(&args.format);
    let config = load_config_or_exit(args.config.as_deref());
    let routes = load_routes_or_exit(&args.routes);
    let users = load_users_or_exit(args.users.as_deref());
    let discovery = discovery_or_exit(&args.discovery, &config);

    let now = Local::now();
    let generator = Generator::new(&config, discovery);
    let suites = generator.suites(&routes);
    let project = ProjectInfo::new(&config.project, now);

    let directory = args
        .output_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| dated_directory(&config.directory, now.date_naive()));

    let presentation = format.presentation();
    let docs = DocumentWriter::new(presentation.as_ref(), &directory)
        .write(&project, &users, &suites)
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(1);
        });

    let test_cases: usize = suites.iter().map(|s| s.summary.total).sum();
    if args.json {
        print_json_or_exit(&json!({
            "directory": docs.directory,
            "generated_files": docs.generated_files,
            "date": docs.date,
            "format": format.as_str(),
            "modules": suites.len(),
            "test_cases": test_cases,
        }));
        return;
    }

    println!("uatgen generate");
    println!();
    println!("  directory: {}", docs.directory.display());
    println!("  format: {format}");
    println!(
        "  modules: {} ({})",
        suites.len(),
        plural(test_cases, "test case")
    );
    println!("  files:");
    for file in &docs.generated_files {
        println!("    - {}", file.display());
    }
}
