use chrono::{Local, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use uatgen_core::{Generator, Route, UatConfig};
use uatgen_render::{DocumentWriter, OutputFormat, ProjectInfo, UserRecord};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "uatgen-render-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn project_info() -> ProjectInfo {
    let at = Local
        .with_ymd_and_hms(2026, 10, 19, 9, 30, 0)
        .single()
        .expect("unambiguous local time");
    ProjectInfo::new(&UatConfig::default().project, at)
}

fn routes() -> Vec<Route> {
    vec![
        Route::new("/", &["GET", "HEAD"]).with_middleware(["web"]),
        Route::new("users", &["GET", "HEAD"])
            .with_name("users.index")
            .with_middleware(["web", "auth"]),
        Route::new("Audit Log", &["GET"]).with_middleware(["web"]),
    ]
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .expect("utf-8 file name")
                .to_string()
        })
        .collect()
}

#[test]
fn markdown_run_writes_numbered_files_and_clears_stale_ones() {
    let tmp = TempDirGuard::new("markdown");
    let out = tmp.path().join("2026-10-19");
    fs::create_dir_all(out.join("keep")).expect("create nested dir");
    fs::write(out.join("99-stale.md"), "old").expect("write stale file");

    let config = UatConfig::default();
    let suites = Generator::new(&config, None).suites(&routes());
    let presentation = OutputFormat::Markdown.presentation();
    let docs = DocumentWriter::new(presentation.as_ref(), &out)
        .write(&project_info(), &[], &suites)
        .expect("write documents");

    assert_eq!(docs.directory, out);
    assert_eq!(docs.date, "2026-10-19");
    assert_eq!(
        file_names(&docs.generated_files),
        vec![
            "01-project-info.md",
            "02-users.md",
            "03-available-modules.md",
            "05-module-dashboard.md",
            "06-module-users.md",
            "07-module-audit-log.md",
        ]
    );
    assert!(!out.join("99-stale.md").exists());
    assert!(out.join("keep").is_dir());

    let users_doc = fs::read_to_string(out.join("06-module-users.md")).expect("read module doc");
    assert!(users_doc.contains("> Generated on: 2026-10-19 09:30:00"));
    assert!(users_doc.contains("#### TC-USE-01-002: Authentication Required Test"));
}

#[test]
fn json_run_emits_parseable_documents() {
    let tmp = TempDirGuard::new("json");
    let out = tmp.path().join("docs");

    let users = vec![UserRecord {
        id: serde_json::json!(1),
        name: "Ana".to_string(),
        email: "ana@example.test".to_string(),
        email_verified: true,
        roles: vec!["admin".to_string()],
        created_at: "2026-01-01 00:00:00".to_string(),
    }];
    let config = UatConfig::default();
    let suites = Generator::new(&config, None).suites(&routes());
    let presentation = OutputFormat::Json.presentation();
    let docs = DocumentWriter::new(presentation.as_ref(), &out)
        .write(&project_info(), &users, &suites)
        .expect("write documents");

    assert_eq!(docs.generated_files.len(), 6);
    for path in &docs.generated_files {
        let text = fs::read_to_string(path).expect("read document");
        let _: serde_json::Value = serde_json::from_str(&text)
            .unwrap_or_else(|e| panic!("{} is not json: {e}", path.display()));
    }

    let users_doc: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.join("02-users.json")).expect("read users"),
    )
    .expect("users json");
    assert_eq!(users_doc["total_users"], 1);
    assert_eq!(users_doc["user_roles_distribution"]["admin"], 1);
    assert_eq!(
        users_doc["uat_test_users"]["recommended_test_user_matrix"]["admin"]["has_users"],
        true
    );
}
