//! Folder/package blueprints per framework and strategy family
//!
//! Lookups are exhaustive matches over [`Framework`] and [`Domain`], so every
//! combination resolves to some blueprint. Frameworks a family has no entry
//! for fall back to the family's first member (FastAPI).

use crate::framework::{Domain, Framework};
use crate::templates::{Blueprint, ManifestRule};

/// Static blueprint data plus any framework-specific scaffold files
#[derive(Debug)]
pub struct BlueprintRule {
    pub packages: &'static [&'static str],
    pub folders: &'static [&'static str],
    /// `(template, target)` pairs rendered alongside the global manifest
    pub files: &'static [(&'static str, &'static str)],
}

impl BlueprintRule {
    pub fn to_blueprint(&self) -> Blueprint {
        Blueprint::new(self.folders, self.packages)
    }

    pub fn manifest(&self) -> Vec<ManifestRule> {
        self.files
            .iter()
            .map(|(source, target)| ManifestRule::new(*source, *target))
            .collect()
    }
}

// Standard family: one `app` package, minimal overhead.

static STANDARD_FASTAPI: BlueprintRule = BlueprintRule {
    packages: &["app", "app/api", "tests"],
    folders: &["static", "public", "docs", "logs"],
    files: &[
        ("fastapi/standard/routes.py.tpl", "app/api/routes.py"),
        ("fastapi/standard/test_app.py.tpl", "tests/test_app.py"),
    ],
};

static STANDARD_FLASK: BlueprintRule = BlueprintRule {
    packages: &["app", "tests"],
    folders: &["static", "templates", "public", "docs", "logs", "ui"],
    files: &[("flask/standard/routes.py.tpl", "app/routes.py")],
};

static STANDARD_BOTTLE: BlueprintRule = BlueprintRule {
    packages: &["app", "tests"],
    folders: &["static", "views", "public", "docs", "logs", "ui"],
    files: &[],
};

static STANDARD_SANIC: BlueprintRule = BlueprintRule {
    packages: &["app", "tests"],
    folders: &["static", "public", "docs", "logs"],
    files: &[],
};

static STANDARD_FALCON: BlueprintRule = BlueprintRule {
    packages: &["app", "tests"],
    folders: &["public", "docs", "logs"],
    files: &[],
};

static STANDARD_TORNADO: BlueprintRule = BlueprintRule {
    packages: &["app", "tests"],
    folders: &["static", "templates", "public", "docs", "logs", "ui"],
    files: &[],
};

static STANDARD_PYRAMID: BlueprintRule = BlueprintRule {
    packages: &["app", "tests"],
    folders: &["static", "templates", "public", "docs", "logs", "ui"],
    files: &[],
};

/// Lightweight single-package blueprints
pub fn standard(fw: Framework) -> &'static BlueprintRule {
    match fw {
        Framework::FastApi => &STANDARD_FASTAPI,
        Framework::Flask => &STANDARD_FLASK,
        Framework::Bottle => &STANDARD_BOTTLE,
        Framework::Sanic => &STANDARD_SANIC,
        Framework::Falcon => &STANDARD_FALCON,
        Framework::Tornado => &STANDARD_TORNADO,
        Framework::Pyramid => &STANDARD_PYRAMID,
        Framework::Django | Framework::Others => &STANDARD_FASTAPI,
    }
}

// Production family: layered routes/services/models/schemas/middleware/tests.

static PRODUCTION_FASTAPI: BlueprintRule = BlueprintRule {
    packages: &[
        "api",
        "core",
        "database",
        "models",
        "schemas",
        "services",
        "repositories",
        "migrations",
        "middleware",
        "tests",
    ],
    folders: &["docs", "logs", "static", "scripts", "requirements"],
    files: &[
        ("fastapi/production/health.py.tpl", "api/health.py"),
        ("fastapi/production/config.py.tpl", "core/config.py"),
        ("fastapi/production/schemas.py.tpl", "schemas/example.py"),
    ],
};

static PRODUCTION_FLASK: BlueprintRule = BlueprintRule {
    packages: &[
        "routes",
        "database",
        "models",
        "schemas",
        "services",
        "middleware",
        "migrations",
        "utils",
        "tests",
    ],
    folders: &["templates", "static", "docs", "logs", "ui"],
    files: &[
        ("flask/production/routes.py.tpl", "routes/main.py"),
        ("flask/production/config.py.tpl", "utils/config.py"),
    ],
};

static PRODUCTION_BOTTLE: BlueprintRule = BlueprintRule {
    packages: &["routes", "services", "models", "schemas", "middleware", "tests"],
    folders: &["views", "static", "docs", "logs", "ui"],
    files: &[],
};

static PRODUCTION_SANIC: BlueprintRule = BlueprintRule {
    packages: &["routes", "models", "schemas", "listeners", "services", "middleware", "tests"],
    folders: &["static", "docs", "logs", "scripts"],
    files: &[],
};

static PRODUCTION_FALCON: BlueprintRule = BlueprintRule {
    packages: &["resources", "middleware", "database", "logic", "schemas", "tests"],
    folders: &["docs", "logs", "scripts"],
    files: &[],
};

static PRODUCTION_TORNADO: BlueprintRule = BlueprintRule {
    packages: &["handlers", "core", "database", "models", "services", "middleware", "tests"],
    folders: &["static", "templates", "logs", "docs", "scripts", "ui"],
    files: &[],
};

static PRODUCTION_PYRAMID: BlueprintRule = BlueprintRule {
    packages: &[
        "routes", "views", "models", "services", "security", "schemas", "scripts", "tests",
    ],
    folders: &["static", "templates", "logs", "docs", "db/migrations", "ui"],
    files: &[],
};

/// Layered enterprise blueprints
pub fn production(fw: Framework) -> &'static BlueprintRule {
    match fw {
        Framework::FastApi => &PRODUCTION_FASTAPI,
        Framework::Flask => &PRODUCTION_FLASK,
        Framework::Bottle => &PRODUCTION_BOTTLE,
        Framework::Sanic => &PRODUCTION_SANIC,
        Framework::Falcon => &PRODUCTION_FALCON,
        Framework::Tornado => &PRODUCTION_TORNADO,
        Framework::Pyramid => &PRODUCTION_PYRAMID,
        Framework::Django | Framework::Others => &PRODUCTION_FASTAPI,
    }
}

// Specialized family: nested `src/` layouts for non-web archetypes.

static SPECIALIZED_BASE: BlueprintRule = BlueprintRule {
    packages: &["src", "tests"],
    folders: &["docs", "logs", "scripts"],
    files: &[],
};

static SPECIALIZED_RAG: BlueprintRule = BlueprintRule {
    packages: &[
        "src",
        "src/api",
        "src/core",
        "src/engine",
        "src/engine/chains",
        "src/engine/retrievers",
        "src/engine/embedders",
        "src/storage",
        "src/prompts",
        "tests",
        "tests/integration",
        "tests/unit",
    ],
    folders: &[
        "data",
        "data/raw",
        "data/vector_store",
        "docs",
        "logs",
        "notebooks",
    ],
    files: &[("specialized/rag_ai/pipeline.py.tpl", "src/engine/chains/pipeline.py")],
};

static SPECIALIZED_MLOPS: BlueprintRule = BlueprintRule {
    packages: &[
        "src",
        "src/training",
        "src/inference",
        "src/preprocessing",
        "src/registry",
        "src/core",
        "internal",
        "tests",
    ],
    folders: &["artifacts", "data/validation", "data/train", "notebooks", "logs"],
    files: &[("specialized/mlops_core/train.py.tpl", "src/training/train.py")],
};

static SPECIALIZED_PIPELINE: BlueprintRule = BlueprintRule {
    packages: &[
        "src",
        "src/dags",
        "src/operators",
        "src/transformers",
        "src/connectors",
        "src/schemas",
        "tests",
    ],
    folders: &["staging", "sql", "assets", "logs"],
    files: &[("specialized/data_pipeline/flow.py.tpl", "src/dags/flow.py")],
};

static SPECIALIZED_DBT: BlueprintRule = BlueprintRule {
    packages: &["src", "tests"],
    folders: &[
        "models/staging",
        "models/marts",
        "seeds",
        "snapshots",
        "macros",
        "analyses",
        "logs",
    ],
    files: &[],
};

static SPECIALIZED_CLI: BlueprintRule = BlueprintRule {
    packages: &["src", "src/commands", "src/core", "src/ui", "internal", "tests"],
    folders: &["docs/man", "scripts/completions"],
    files: &[("specialized/hp_cli/commands.py.tpl", "src/commands/hello.py")],
};

/// Nested blueprints for non-web archetypes
pub fn specialized(domain: Domain) -> &'static BlueprintRule {
    match domain {
        Domain::Base => &SPECIALIZED_BASE,
        Domain::RagAi => &SPECIALIZED_RAG,
        Domain::MlOps => &SPECIALIZED_MLOPS,
        Domain::DataPipeline => &SPECIALIZED_PIPELINE,
        Domain::DbtAnalytics => &SPECIALIZED_DBT,
        Domain::Cli => &SPECIALIZED_CLI,
    }
}
