//! Django blueprints and the templates used to patch its generated settings

use super::blueprints::BlueprintRule;

/// Templates applied to the project created by `django startproject`
#[derive(Debug)]
pub struct DjangoPatches {
    /// Environment-driven replacement for the SECRET_KEY..ALLOWED_HOSTS block
    pub secret: &'static str,
    /// INSTALLED_APPS entries; plain builds only inject the app name
    pub apps: Option<&'static str>,
    /// REST_FRAMEWORK configuration block
    pub rest: Option<&'static str>,
    /// Replacement project `urls.py`
    pub urls: &'static str,
}

#[derive(Debug)]
pub struct DjangoRule {
    pub blueprint: BlueprintRule,
    pub patches: DjangoPatches,
}

static DJANGO_STANDARD: DjangoRule = DjangoRule {
    blueprint: BlueprintRule {
        packages: &["apps", "core", "middleware"],
        folders: &["apps", "core", "static", "templates", "middleware", "templates/layouts"],
        files: &[],
    },
    patches: DjangoPatches {
        secret: "django/secret.tpl",
        apps: None,
        rest: None,
        urls: "django/urls.tpl",
    },
};

static DJANGO_REST: DjangoRule = DjangoRule {
    blueprint: BlueprintRule {
        packages: &["api", "core", "middleware", "api/viewsets"],
        folders: &["api", "core", "static", "middleware", "api/viewsets"],
        files: &[
            ("django/drf/serializers.py.tpl", "api/serializers.py"),
            ("django/drf/urls.py.tpl", "api/urls.py"),
        ],
    },
    patches: DjangoPatches {
        secret: "django/secret.tpl",
        apps: Some("django/apps.tpl"),
        rest: Some("django/rest.tpl"),
        urls: "django/urls_rest.tpl",
    },
};

/// Django rule keyed by REST mode
pub fn django(rest_mode: bool) -> &'static DjangoRule {
    if rest_mode {
        &DJANGO_REST
    } else {
        &DJANGO_STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_mode_selects_serializer_layout() {
        let rest = django(true).blueprint.to_blueprint();
        assert!(rest.is_package("api/viewsets"));
        assert!(django(true).patches.rest.is_some());

        let plain = django(false).blueprint.to_blueprint();
        assert!(!plain.contains("api"));
        assert!(django(false).patches.rest.is_none());
    }
}
