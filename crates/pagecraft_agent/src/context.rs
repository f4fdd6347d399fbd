//! Project context snapshot.
//!
//! A small, bounded description of the project sent to the planner so its
//! plan matches what is on disk. Built fresh for every request and never
//! persisted.

use std::collections::BTreeMap;
use std::fs;

use pagecraft_plan::HOME_PAGE_FILES;
use pagecraft_sandbox::SandboxRoot;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Well-known files whose contents are included when present.
pub const SNAPSHOT_FILES: &[&str] = &[
    "package.json",
    "next.config.js",
    "next.config.mjs",
    "next.config.ts",
    "tsconfig.json",
    "tailwind.config.js",
    "tailwind.config.ts",
    "app/layout.tsx",
    "app/page.tsx",
    "app/globals.css",
    "pages/index.tsx",
    "pages/_app.tsx",
];

/// Directories never listed in the file tree.
pub const SKIPPED_DIRS: &[&str] = &["node_modules", ".next", ".git", ".pagecraft", "dist", "out"];

const TAILWIND_CONFIGS: &[&str] = &[
    "tailwind.config.js",
    "tailwind.config.ts",
    "tailwind.config.cjs",
    "tailwind.config.mjs",
];

/// Routing style of the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterStyle {
    App,
    Pages,
}

/// Framework flags derived from the files on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub framework: String,
    pub router: RouterStyle,
    pub typescript: bool,
    pub tailwind: bool,
    /// Whether a home page exists yet
    pub initialized: bool,
}

/// Context payload sent alongside the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    pub manifest: ProjectManifest,
    /// Sorted, truncated list of project-relative files
    pub tree: Vec<String>,
    /// Contents of the well-known files that exist
    pub snippets: BTreeMap<String, String>,
}

/// Builds [`ProjectContext`] values for a sandbox.
pub struct ContextSnapshotter<'a> {
    root: &'a SandboxRoot,
    max_tree_entries: usize,
    max_snippet_bytes: usize,
}

impl<'a> ContextSnapshotter<'a> {
    pub fn new(root: &'a SandboxRoot) -> Self {
        Self {
            root,
            max_tree_entries: 200,
            max_snippet_bytes: 8 * 1024,
        }
    }

    pub fn max_tree_entries(mut self, entries: usize) -> Self {
        self.max_tree_entries = entries;
        self
    }

    pub fn max_snippet_bytes(mut self, bytes: usize) -> Self {
        self.max_snippet_bytes = bytes;
        self
    }

    /// Take a snapshot. Unreadable files are skipped, never fatal.
    pub fn snapshot(&self) -> ProjectContext {
        let snippets = self.read_snippets();
        let manifest = self.detect_manifest(&snippets);
        let tree = self.list_tree();

        debug!(
            "Context snapshot: {} file(s) listed, {} snippet(s)",
            tree.len(),
            snippets.len()
        );

        ProjectContext {
            manifest,
            tree,
            snippets,
        }
    }

    fn exists(&self, relative: &str) -> bool {
        self.root
            .resolve(relative)
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    fn read_snippets(&self) -> BTreeMap<String, String> {
        let mut snippets = BTreeMap::new();

        for relative in SNAPSHOT_FILES {
            let Ok(path) = self.root.resolve(relative) else {
                continue;
            };
            if !path.is_file() {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(contents) => {
                    let clipped = truncate_on_char_boundary(&contents, self.max_snippet_bytes);
                    snippets.insert(relative.to_string(), clipped.to_string());
                }
                Err(e) => warn!("Skipping unreadable context file {}: {}", relative, e),
            }
        }

        snippets
    }

    fn detect_manifest(&self, snippets: &BTreeMap<String, String>) -> ProjectManifest {
        let has_app = self.exists("app") || self.exists("src/app");
        let has_pages = self.exists("pages") || self.exists("src/pages");
        let router = if !has_app && has_pages {
            RouterStyle::Pages
        } else {
            RouterStyle::App
        };

        let tailwind = TAILWIND_CONFIGS.iter().any(|f| self.exists(f))
            || snippets
                .get("package.json")
                .map(|manifest| declares_dependency(manifest, "tailwindcss"))
                .unwrap_or(false);

        ProjectManifest {
            framework: "next".to_string(),
            router,
            typescript: self.exists("tsconfig.json"),
            tailwind,
            initialized: HOME_PAGE_FILES.iter().any(|f| self.exists(f)),
        }
    }

    fn list_tree(&self) -> Vec<String> {
        let walker = WalkDir::new(self.root.path())
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                !(entry.file_type().is_dir() && SKIPPED_DIRS.iter().any(|skipped| name == *skipped))
            });

        walker
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable tree entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| self.root.relative(entry.path()))
            .take(self.max_tree_entries)
            .collect()
    }
}

/// Whether a `package.json` lists a package in its dependency tables.
fn declares_dependency(package_json: &str, name: &str) -> bool {
    let Ok(manifest) = serde_json::from_str::<serde_json::Value>(package_json) else {
        return false;
    };
    ["dependencies", "devDependencies"]
        .iter()
        .any(|table| manifest.get(*table).and_then(|deps| deps.get(name)).is_some())
}

fn truncate_on_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_empty_project() {
        let dir = TempDir::new().unwrap();
        let root = SandboxRoot::new(dir.path()).unwrap();

        let context = ContextSnapshotter::new(&root).snapshot();

        assert!(context.tree.is_empty());
        assert!(context.snippets.is_empty());
        assert_eq!(context.manifest.router, RouterStyle::App);
        assert!(!context.manifest.initialized);
        assert!(!context.manifest.typescript);
    }

    #[test]
    fn test_app_router_project() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", r#"{"devDependencies":{"tailwindcss":"^3.4.0"}}"#);
        write(dir.path(), "tsconfig.json", "{}");
        write(dir.path(), "app/page.tsx", "export default function Home() {}");
        write(dir.path(), "app/layout.tsx", "export default function Layout() {}");
        write(dir.path(), "components/Hero.tsx", "export function Hero() {}");
        let root = SandboxRoot::new(dir.path()).unwrap();

        let context = ContextSnapshotter::new(&root).snapshot();

        assert_eq!(context.manifest.router, RouterStyle::App);
        assert!(context.manifest.typescript);
        assert!(context.manifest.tailwind);
        assert!(context.manifest.initialized);
        assert!(context.snippets.contains_key("app/page.tsx"));
        assert!(!context.snippets.contains_key("components/Hero.tsx"));
        assert_eq!(
            context.tree,
            vec![
                "app/layout.tsx",
                "app/page.tsx",
                "components/Hero.tsx",
                "package.json",
                "tsconfig.json"
            ]
        );
    }

    #[test]
    fn test_pages_router_project() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pages/index.tsx", "export default function Home() {}");
        let root = SandboxRoot::new(dir.path()).unwrap();

        let context = ContextSnapshotter::new(&root).snapshot();

        assert_eq!(context.manifest.router, RouterStyle::Pages);
        assert!(context.manifest.initialized);
        assert!(!context.manifest.tailwind);
    }

    #[test]
    fn test_tree_skips_build_directories_and_truncates() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "node_modules/react/index.js", "x");
        write(dir.path(), ".next/cache/a", "x");
        for i in 0..5 {
            write(dir.path(), &format!("public/img{}.png", i), "x");
        }
        let root = SandboxRoot::new(dir.path()).unwrap();

        let context = ContextSnapshotter::new(&root).max_tree_entries(3).snapshot();

        assert_eq!(context.tree.len(), 3);
        assert!(context.tree.iter().all(|p| p.starts_with("public/")));
    }

    #[test]
    fn test_snippets_are_capped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app/globals.css", &"é".repeat(100));
        let root = SandboxRoot::new(dir.path()).unwrap();

        let context = ContextSnapshotter::new(&root).max_snippet_bytes(51).snapshot();

        // 51 bytes falls inside a two-byte character.
        assert_eq!(context.snippets["app/globals.css"].len(), 50);
    }

    #[test]
    fn test_context_wire_shape() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app/page.tsx", "home");
        let root = SandboxRoot::new(dir.path()).unwrap();

        let value = serde_json::to_value(ContextSnapshotter::new(&root).snapshot()).unwrap();

        assert_eq!(value["manifest"]["framework"], "next");
        assert_eq!(value["manifest"]["router"], "app");
        assert_eq!(value["tree"][0], "app/page.tsx");
        assert_eq!(value["snippets"]["app/page.tsx"], "home");
    }
}
