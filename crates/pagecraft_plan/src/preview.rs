//! Preview route inference.
//!
//! Maps the net effect of an executed plan to the URL most likely to show it.
//! Actions are scanned newest first and the first path matching a routing
//! convention decides the route.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::error;

use crate::action::Action;

/// Route used when nothing in the plan points at a page.
pub const PREVIEW_FALLBACK: &str = "/";

/// Home page files that imply `/` even when no rule matched.
pub const HOME_PAGE_FILES: [&str; 4] = [
    "app/page.tsx",
    "pages/index.tsx",
    "src/app/page.tsx",
    "src/pages/index.tsx",
];

/// Turns the captures of a matching path into a route.
pub type RouteExtractor = fn(&Captures<'_>) -> Option<String>;

/// A routing convention: a path matcher plus a route extractor.
pub struct RouteRule {
    pub name: &'static str,
    matcher: Regex,
    extract: RouteExtractor,
}

impl RouteRule {
    pub fn new(
        name: &'static str,
        pattern: &str,
        extract: RouteExtractor,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            matcher: Regex::new(pattern)?,
            extract,
        })
    }

    /// Route for a project-relative path, if this convention applies to it.
    pub fn route_for(&self, path: &str) -> Option<String> {
        let captures = self.matcher.captures(path)?;
        (self.extract)(&captures)
    }
}

impl std::fmt::Debug for RouteRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRule")
            .field("name", &self.name)
            .field("matcher", &self.matcher.as_str())
            .finish()
    }
}

const APP_ROUTER_PATTERN: &str =
    r"^(?:src/)?app/(?:(?P<segments>.+)/)?page\.(?:tsx|ts|jsx|js|mdx|md)$";
const PAGES_ROUTER_PATTERN: &str = r"^(?:src/)?pages/(?P<route>.+)\.(?:tsx|ts|jsx|js|mdx|md)$";

/// Built-in conventions, in priority order: app router, then pages router.
pub fn default_rules() -> &'static [RouteRule] {
    static RULES: OnceLock<Vec<RouteRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        compile_rules(&[
            ("app-router", APP_ROUTER_PATTERN, app_router_route),
            ("pages-router", PAGES_ROUTER_PATTERN, pages_router_route),
        ])
    })
}

/// Compile rule definitions in order. A pattern that fails to compile is
/// reported and left out; the remaining rules keep their order.
fn compile_rules(definitions: &[(&'static str, &str, RouteExtractor)]) -> Vec<RouteRule> {
    definitions
        .iter()
        .filter_map(|(name, pattern, extract)| match RouteRule::new(*name, pattern, *extract) {
            Ok(rule) => Some(rule),
            Err(e) => {
                error!("Route rule `{}` does not compile and is disabled: {}", name, e);
                None
            }
        })
        .collect()
}

fn app_router_route(captures: &Captures<'_>) -> Option<String> {
    let segments = captures
        .name("segments")
        .map(|m| m.as_str())
        .unwrap_or_default();

    let visible: Vec<&str> = segments
        .split('/')
        .filter(|segment| !segment.is_empty() && !is_hidden_segment(segment))
        .collect();

    Some(format!("/{}", visible.join("/")))
}

fn pages_router_route(captures: &Captures<'_>) -> Option<String> {
    let route = captures.name("route")?.as_str();
    let mut segments: Vec<&str> = route.split('/').filter(|s| !s.is_empty()).collect();

    // API handlers and framework files (_app, _document) are not pages.
    if segments.first() == Some(&"api") || segments.iter().any(|s| s.starts_with('_')) {
        return None;
    }

    if segments.last() == Some(&"index") {
        segments.pop();
    }

    Some(format!("/{}", segments.join("/")))
}

/// Route groups `(name)` and parallel-route slots `@name` never reach the URL.
fn is_hidden_segment(segment: &str) -> bool {
    (segment.starts_with('(') && segment.ends_with(')')) || segment.starts_with('@')
}

fn normalize(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    normalized
}

/// Infer the preview route using the built-in conventions.
pub fn infer_preview_path(actions: &[Action]) -> Option<String> {
    infer_with_rules(actions, default_rules())
}

/// Infer the preview route with an explicit rule list.
///
/// The most recent path-bearing action matching any rule wins. Failing that,
/// touching a home page file yields `/`. Otherwise there is no opinion.
pub fn infer_with_rules(actions: &[Action], rules: &[RouteRule]) -> Option<String> {
    let paths: Vec<String> = actions.iter().rev().filter_map(Action::path).map(normalize).collect();

    for path in &paths {
        if let Some(route) = rules.iter().find_map(|rule| rule.route_for(path)) {
            return Some(route);
        }
    }

    if paths.iter().any(|path| HOME_PAGE_FILES.contains(&path.as_str())) {
        return Some(PREVIEW_FALLBACK.to_string());
    }

    None
}

/// Inferred route with the caller-level fallback applied.
pub fn preview_path_or_root(actions: &[Action]) -> String {
    infer_preview_path(actions).unwrap_or_else(|| PREVIEW_FALLBACK.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_compile() {
        let names: Vec<_> = default_rules().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["app-router", "pages-router"]);
    }

    #[test]
    fn test_home_page_then_dev_server() {
        let actions = vec![
            Action::create("app/page.tsx", "export default function Home() {}"),
            Action::run("npm run dev"),
        ];
        assert_eq!(infer_preview_path(&actions), Some("/".to_string()));
    }

    #[test]
    fn test_route_group_is_stripped() {
        let actions = vec![
            Action::create("app/page.tsx", "home"),
            Action::create("app/(marketing)/about/page.tsx", "about"),
        ];
        assert_eq!(infer_preview_path(&actions), Some("/about".to_string()));
    }

    #[test]
    fn test_parallel_slot_is_stripped() {
        let actions = vec![Action::create("app/dashboard/@stats/page.tsx", "stats")];
        assert_eq!(infer_preview_path(&actions), Some("/dashboard".to_string()));
    }

    #[test]
    fn test_pages_index_collapses_to_parent() {
        let actions = vec![Action::create("pages/blog/index.tsx", "blog")];
        assert_eq!(infer_preview_path(&actions), Some("/blog".to_string()));

        let actions = vec![Action::update("pages/index.tsx", "home")];
        assert_eq!(infer_preview_path(&actions), Some("/".to_string()));
    }

    #[test]
    fn test_pages_api_and_framework_files_are_not_routes() {
        let actions = vec![
            Action::create("pages/pricing.tsx", "pricing"),
            Action::create("pages/api/hello.ts", "handler"),
            Action::update("pages/_app.tsx", "app shell"),
        ];
        assert_eq!(infer_preview_path(&actions), Some("/pricing".to_string()));
    }

    #[test]
    fn test_most_recent_page_wins() {
        let actions = vec![
            Action::create("app/contact/page.tsx", "contact"),
            Action::create("components/Header.tsx", "header"),
            Action::update("app/blog/[slug]/page.tsx", "post"),
            Action::run("npm run build"),
        ];
        assert_eq!(infer_preview_path(&actions), Some("/blog/[slug]".to_string()));
    }

    #[test]
    fn test_src_directory_and_dot_prefix() {
        let actions = vec![Action::create("./src/app/settings/page.jsx", "settings")];
        assert_eq!(infer_preview_path(&actions), Some("/settings".to_string()));
    }

    #[test]
    fn test_backslash_separators() {
        let actions = vec![Action::create("app\\about\\page.tsx", "about")];
        assert_eq!(infer_preview_path(&actions), Some("/about".to_string()));

        let actions = vec![Action::update(".\\pages\\blog\\index.tsx", "blog")];
        assert_eq!(infer_preview_path(&actions), Some("/blog".to_string()));
    }

    #[test]
    fn test_broken_rule_is_left_out() {
        let rules = compile_rules(&[
            ("broken", r"^app/(?P<unclosed", app_router_route),
            ("pages-router", PAGES_ROUTER_PATTERN, pages_router_route),
        ]);

        let names: Vec<_> = rules.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["pages-router"]);
    }

    #[test]
    fn test_no_page_touched() {
        let actions = vec![
            Action::create("components/Button.tsx", "button"),
            Action::run("npm run lint"),
        ];
        assert_eq!(infer_preview_path(&actions), None);
        assert_eq!(preview_path_or_root(&actions), "/");
    }

    #[test]
    fn test_empty_plan() {
        assert_eq!(infer_preview_path(&[]), None);
        assert_eq!(preview_path_or_root(&[]), PREVIEW_FALLBACK);
    }

    #[test]
    fn test_home_file_fallback_without_rules() {
        let actions = vec![Action::delete("pages/index.tsx")];
        assert_eq!(infer_with_rules(&actions, &[]), Some("/".to_string()));
        assert_eq!(infer_with_rules(&[Action::delete("lib/a.ts")], &[]), None);
    }

    #[test]
    fn test_custom_rule_is_additive() {
        fn docs_route(captures: &Captures<'_>) -> Option<String> {
            Some(format!("/docs/{}", &captures["slug"]))
        }

        let rules =
            vec![RouteRule::new("docs", r"^content/docs/(?P<slug>[^/]+)\.md$", docs_route).unwrap()];

        let actions = vec![Action::create("content/docs/intro.md", "# Intro")];
        assert_eq!(infer_with_rules(&actions, &rules), Some("/docs/intro".to_string()));
        assert_eq!(infer_preview_path(&actions), None);
    }
}
