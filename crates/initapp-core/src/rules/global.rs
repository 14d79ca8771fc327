//! Root-level files every build gets, independent of framework

use super::constants::{ENTRYPOINT, UNIVERSAL_ENTRY_TEMPLATE};
use crate::framework::Framework;
use crate::templates::ManifestRule;

/// Root metadata: ignore file, readme, dependency manifest, env template, build helper
pub const CORE_METADATA_FILES: &[(&str, &str)] = &[
    ("common/gitignore.tpl", ".gitignore"),
    ("common/README.md.tpl", "README.md"),
    ("common/requirements.txt.tpl", "requirements.txt"),
    ("common/env.tpl", ".env"),
    ("common/Makefile.tpl", "Makefile"),
];

/// Server-rendered home page, placed inside the Django app package
pub const HOME_PAGE_TEMPLATE: &str = "common/index.html.tpl";

/// Root manifest for a build.
///
/// Plain Django builds also get a home page inside the app's own template
/// folder; every non-Django build gets the universal entrypoint.
pub fn global_manifest(fw: Framework, rest_mode: bool, app_name: &str) -> Vec<ManifestRule> {
    let mut manifest: Vec<ManifestRule> = CORE_METADATA_FILES
        .iter()
        .map(|(source, target)| ManifestRule::new(*source, *target))
        .collect();

    if fw.is_django() && !rest_mode {
        manifest.push(ManifestRule::new(
            HOME_PAGE_TEMPLATE,
            format!("{}/templates/index.html", app_name),
        ));
    }

    if !fw.is_django() {
        manifest.push(ManifestRule::new(UNIVERSAL_ENTRY_TEMPLATE, ENTRYPOINT));
    }

    manifest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(rules: &[ManifestRule]) -> Vec<&str> {
        rules.iter().map(|r| r.target.as_str()).collect()
    }

    #[test]
    fn test_non_django_gets_entrypoint() {
        let rules = global_manifest(Framework::FastApi, false, "core_app");
        let t = targets(&rules);
        assert!(t.contains(&"app.py"));
        assert!(t.contains(&"requirements.txt"));
        assert!(!t.iter().any(|p| p.ends_with("index.html")));
    }

    #[test]
    fn test_plain_django_gets_home_page_not_entrypoint() {
        let rules = global_manifest(Framework::Django, false, "shop");
        let t = targets(&rules);
        assert!(t.contains(&"shop/templates/index.html"));
        assert!(!t.contains(&"app.py"));
    }

    #[test]
    fn test_rest_django_has_no_views() {
        let rules = global_manifest(Framework::Django, true, "shop");
        assert!(!targets(&rules).iter().any(|p| p.ends_with("index.html")));
    }
}
