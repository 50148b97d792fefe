//! Heuristic introspection over an application source tree.
//!
//! Reads PHP sources under a project root:
//! - `app/Http/Middleware/*.php` for middleware handlers and their doc blocks
//! - `app/Policies/*.php` for policy classes and method bodies
//! - `app/Http/Kernel.php` and `bootstrap/app.php` for `'alias' => Handler::class`
//! - `app/Providers/AuthServiceProvider.php` for `Model::class => Policy::class`
//!
//! Everything here is regex scanning of text. It recognises conventional
//! layouts and misses anything clever.

use super::introspect::{
    Introspector, PolicyAssociation, PolicyMethodArtifact, doc_summary, scan_permission_checks,
};
use crate::error::DiscoveryError;
use crate::route::class_basename;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const MIDDLEWARE_DIR: &str = "app/Http/Middleware";
const POLICIES_DIR: &str = "app/Policies";
const MIDDLEWARE_NAMESPACE: &str = "App\\Http\\Middleware";
const ALIAS_SOURCES: &[&str] = &["app/Http/Kernel.php", "bootstrap/app.php"];
const POLICY_REGISTRY_SOURCE: &str = "app/Providers/AuthServiceProvider.php";

#[derive(Debug, Clone)]
pub struct SourceTreeIntrospector {
    root: PathBuf,
    aliases: BTreeMap<String, String>,
    associations: Vec<PolicyAssociation>,
}

fn alias_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"['"]([\w.\-]+)['"]\s*=>\s*\\?([\w\\]+)::class"#)
            .expect("middleware alias regex must compile")
    })
}

fn policy_registration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\\?([\w\\]+)::class\s*=>\s*\\?([\w\\]+)::class")
            .expect("policy registration regex must compile")
    })
}

impl SourceTreeIntrospector {
    /// Open a project root, reading alias and policy registrations eagerly.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DiscoveryError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DiscoveryError::Unavailable(format!(
                "source root is not a directory: {}",
                root.display()
            )));
        }

        let mut aliases = BTreeMap::new();
        for relative in ALIAS_SOURCES {
            if let Some(text) = read_optional(&root.join(relative))? {
                for caps in alias_re().captures_iter(&text) {
                    aliases
                        .entry(caps[1].to_string())
                        .or_insert_with(|| caps[2].to_string());
                }
            }
        }

        let mut associations = Vec::new();
        if let Some(text) = read_optional(&root.join(POLICY_REGISTRY_SOURCE))? {
            for caps in policy_registration_re().captures_iter(&text) {
                associations.push(PolicyAssociation {
                    subject: caps[1].to_string(),
                    policy: caps[2].to_string(),
                });
            }
        }

        Ok(Self {
            root,
            aliases,
            associations,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn policy_path(&self, policy: &str) -> PathBuf {
        self.root
            .join(POLICIES_DIR)
            .join(format!("{}.php", class_basename(policy)))
    }

    fn handler_path(&self, handler: &str) -> PathBuf {
        self.root
            .join(MIDDLEWARE_DIR)
            .join(format!("{}.php", class_basename(handler)))
    }
}

impl Introspector for SourceTreeIntrospector {
    fn middleware_alias(&self, alias: &str) -> Result<Option<String>, DiscoveryError> {
        Ok(self.aliases.get(alias).cloned())
    }

    fn middleware_handlers(&self) -> Result<Vec<String>, DiscoveryError> {
        Ok(php_class_names(&self.root.join(MIDDLEWARE_DIR))?
            .into_iter()
            .map(|name| format!("{MIDDLEWARE_NAMESPACE}\\{name}"))
            .collect())
    }

    fn handler_description(&self, handler: &str) -> Result<Option<String>, DiscoveryError> {
        let Some(text) = read_optional(&self.handler_path(handler))? else {
            return Ok(None);
        };
        Ok(class_doc_block(&text, class_basename(handler)).and_then(|doc| doc_summary(&doc)))
    }

    fn has_policy(&self, policy: &str) -> Result<bool, DiscoveryError> {
        Ok(self.policy_path(policy).is_file())
    }

    fn policy_associations(&self) -> Result<Vec<PolicyAssociation>, DiscoveryError> {
        Ok(self.associations.clone())
    }

    fn policy_method(
        &self,
        policy: &str,
        method: &str,
    ) -> Result<Option<PolicyMethodArtifact>, DiscoveryError> {
        let Some(text) = read_optional(&self.policy_path(policy))? else {
            return Ok(None);
        };
        Ok(method_source(&text, method).map(|(doc, body)| PolicyMethodArtifact {
            description: doc.and_then(|d| doc_summary(&d)),
            permissions: scan_permission_checks(&body),
        }))
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, DiscoveryError> {
    if !path.is_file() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|source| DiscoveryError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// File stems of `*.php` files directly under `dir`, sorted.
fn php_class_names(dir: &Path) -> Result<Vec<String>, DiscoveryError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let io_err = |source| DiscoveryError::Io {
        path: dir.display().to_string(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().is_some_and(|ext| ext == "php")
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
        {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// The doc block immediately preceding `class <name>`.
fn class_doc_block(text: &str, class: &str) -> Option<String> {
    let pattern = format!(
        r"(?s)(/\*\*(?:[^*]|\*[^/])*\*/)\s*(?:#\[[^\]]*\]\s*)*(?:final\s+|abstract\s+|readonly\s+)*class\s+{}\b",
        regex::escape(class)
    );
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Doc block (if any) and full text of `function <method>(...) { ... }`.
fn method_source(text: &str, method: &str) -> Option<(Option<String>, String)> {
    let pattern = format!(
        r"(?s)(/\*\*(?:[^*]|\*[^/])*\*/\s*)?(?:public\s+)?(?:static\s+)?function\s+{}\s*\(",
        regex::escape(method)
    );
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(text)?;
    let whole = caps.get(0)?;
    let doc_match = caps.get(1);
    let doc = doc_match.map(|m| m.as_str().trim().to_string());

    let signature_start = doc_match.map_or(whole.start(), |m| m.end());
    let tail = &text[signature_start..];
    let body = match block_end(tail) {
        Some(end) => tail[..end].to_string(),
        None => {
            tracing::debug!(method, "no balanced body for policy method; permissions not scanned");
            String::new()
        }
    };
    Some((doc, body))
}

/// Byte offset just past the first `{ ... }` block of `src`.
///
/// Braces inside quoted strings and `//`, `#`, `/* */` comments are ignored.
/// A `;` before the block opens (an abstract or interface method) yields `None`.
fn block_end(src: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => i = line_end(bytes, i),
            b'#' if bytes.get(i + 1) != Some(&b'[') => i = line_end(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let close = src[i + 2..].find("*/")?;
                i += 2 + close + 1;
            }
            b';' if depth == 0 => return None,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = r#"<?php

namespace App\Policies;

class PostPolicy
{
    /**
     * Determine whether the user can list posts.
     */
    public function viewAny(User $user): bool
    {
        if ($user->hasRole('editor')) {
            return true;
        }
        return $user->hasPermissionTo('view-posts');
    }

    public function delete(User $user, Post $post): bool
    {
        return $user->can('delete-posts');
    }
}
"#;

    #[test]
    fn method_source_captures_doc_and_balanced_body() {
        let (doc, body) = method_source(POLICY, "viewAny").expect("method found");
        assert_eq!(
            doc.as_deref().and_then(doc_summary).as_deref(),
            Some("Determine whether the user can list posts.")
        );
        assert!(body.contains("view-posts"));
        assert!(!body.contains("delete-posts"));
        assert_eq!(
            scan_permission_checks(&body),
            vec!["view-posts", "role:editor"]
        );
    }

    #[test]
    fn method_without_doc_block_still_found() {
        let (doc, body) = method_source(POLICY, "delete").expect("method found");
        assert!(doc.is_none());
        assert_eq!(scan_permission_checks(&body), vec!["delete-posts"]);
        assert!(method_source(POLICY, "restore").is_none());
    }

    const POLICY_WITH_LITERALS: &str = r#"<?php

class PostPolicy
{
    /**
     * Only editors may list posts.
     */
    public function viewAny(User $user): bool
    {
        $open = "{";
        $label = 'it\'s {';
        // a stray { in a comment
        # another {
        /* and { in a block comment */
        return $user->can('list-posts') || $user->hasRole('editor');
    }

    public function view(User $user, Post $post): bool
    {
        return $user->hasPermissionTo('secret');
    }
}
"#;

    #[test]
    fn braces_in_literals_and_comments_do_not_leak_into_sibling_methods() {
        let (_, body) = method_source(POLICY_WITH_LITERALS, "viewAny").expect("method found");
        assert!(body.trim_end().ends_with('}'));
        assert!(!body.contains("secret"));
        assert_eq!(
            scan_permission_checks(&body),
            vec!["list-posts", "role:editor"]
        );

        let (_, view) = method_source(POLICY_WITH_LITERALS, "view").expect("method found");
        assert_eq!(scan_permission_checks(&view), vec!["secret"]);
    }

    #[test]
    fn bodiless_method_yields_empty_body() {
        let text = "<?php
interface Gate
{
    public function view(User $user);
    public function update(User $user) { return $user->can('edit'); }
}
";
        let (_, body) = method_source(text, "view").expect("signature found");
        assert!(body.is_empty());
        assert_eq!(block_end("f() { if (x) { y(); } } z() {}"), Some(23));
        assert_eq!(block_end("f() { \"unterminated"), None);
    }

    #[test]
    fn class_doc_block_skips_unrelated_blocks() {
        let text = "<?php\n/**\n * File header.\n */\nnamespace App;\n\n/**\n * Require an active subscription.\n */\nfinal class EnsureSubscribed {}";
        let doc = class_doc_block(text, "EnsureSubscribed").expect("class doc");
        assert_eq!(
            doc_summary(&doc).as_deref(),
            Some("Require an active subscription.")
        );
    }

    #[test]
    fn alias_and_policy_registration_patterns() {
        let kernel = r#"protected $middlewareAliases = [
            'auth' => \App\Http\Middleware\Authenticate::class,
            'team.member' => \App\Http\Middleware\EnsureTeamMember::class,
        ];"#;
        let aliases: Vec<(String, String)> = alias_re()
            .captures_iter(kernel)
            .map(|c| (c[1].to_string(), c[2].to_string()))
            .collect();
        assert_eq!(aliases[1].0, "team.member");
        assert_eq!(aliases[1].1, "App\\Http\\Middleware\\EnsureTeamMember");

        let provider = r#"protected $policies = [ Invoice::class => InvoicePolicy::class ];"#;
        let caps = policy_registration_re()
            .captures(provider)
            .expect("registration found");
        assert_eq!(&caps[1], "Invoice");
        assert_eq!(&caps[2], "InvoicePolicy");
    }
}
