//! Dependency resolution: (framework, strategy, database, domain) -> library names
//!
//! Resolution is purely additive. Every input contributes a fixed set of
//! names (possibly none), and the union is deduplicated and sorted.

use crate::framework::{Database, Domain, Framework, Strategy};
use std::collections::BTreeSet;
use std::fmt;

const CORE: &[&str] = &["python-dotenv", "jinja2", "pyyaml", "loguru"];

fn framework_set(fw: Framework) -> &'static [&'static str] {
    match fw {
        Framework::FastApi => &[
            "fastapi",
            "uvicorn[standard]",
            "pydantic[email]",
            "pydantic-settings",
            "httpx",
        ],
        Framework::Flask => &["flask", "flask-cors", "flask-marshmallow", "gunicorn"],
        Framework::Django => &["django", "django-environ", "django-cors-headers"],
        Framework::Bottle => &["bottle", "waitress"],
        Framework::Falcon => &["falcon", "waitress"],
        Framework::Pyramid => &["pyramid", "waitress"],
        Framework::Sanic => &["sanic"],
        Framework::Tornado => &["tornado"],
        Framework::Others => &[],
    }
}

/// Security and ops libraries added by the hardened tiers
fn hardened_set(fw: Framework) -> &'static [&'static str] {
    match fw {
        Framework::FastApi => &[
            "slowapi",
            "fastapi-pagination",
            "python-jose[cryptography]",
            "passlib[bcrypt]",
            "gunicorn",
        ],
        Framework::Flask => &["flask-jwt-extended", "flask-migrate", "flask-smorest", "flask-limiter"],
        Framework::Django => &["django-redis", "django-health-check", "whitenoise", "gunicorn"],
        Framework::Sanic => &["sanic-ext"],
        Framework::Bottle | Framework::Falcon | Framework::Pyramid | Framework::Tornado => {
            &["gunicorn"]
        }
        Framework::Others => &[],
    }
}

const DJANGO_REST: &[&str] = &[
    "djangorestframework",
    "django-filter",
    "drf-spectacular",
    "djangorestframework-simplejwt",
];

fn database_set(db: Database, fw: Framework) -> &'static [&'static str] {
    match db {
        Database::Postgres => &["psycopg2-binary", "sqlalchemy", "alembic"],
        Database::MySql => &["mysqlclient", "sqlalchemy", "alembic"],
        Database::Mongo if fw == Framework::FastApi => &["pymongo", "motor", "beanie"],
        Database::Mongo => &["pymongo", "motor", "mongoengine"],
        Database::Sqlite => &["sqlalchemy", "alembic"],
        Database::None => &[],
    }
}

fn domain_set(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::RagAi => &[
            "openai",
            "langchain",
            "langchain-community",
            "chromadb",
            "qdrant-client",
            "tiktoken",
            "sentence-transformers",
            "unstructured",
            "pypdf",
        ],
        Domain::DataPipeline => &["pandas", "numpy", "sqlalchemy", "pyarrow", "dask", "prefect"],
        Domain::MlOps => &["scikit-learn", "mlflow", "joblib", "bentoml", "optuna"],
        Domain::Cli => &["click", "typer", "rich", "shellingham"],
        Domain::DbtAnalytics => &["dbt-core", "dbt-postgres", "sqlfluff"],
        Domain::Base => &[],
    }
}

/// Deduplicated, lexicographically sorted library names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyList(Vec<String>);

impl DependencyList {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|d| d == name)
    }

    /// Newline-joined form embedded into `requirements.txt`
    pub fn joined(&self) -> String {
        self.0.join("\n")
    }
}

impl fmt::Display for DependencyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.joined())
    }
}

/// Inputs to dependency resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyQuery {
    pub framework: Framework,
    pub strategy: Strategy,
    pub database: Database,
    pub domain: Domain,
    /// Django REST mode adds the serializer/API stack
    pub rest_api: bool,
}

impl DependencyQuery {
    pub fn new(framework: Framework, strategy: Strategy, database: Database, domain: Domain) -> Self {
        Self {
            framework,
            strategy,
            database,
            domain,
            rest_api: false,
        }
    }

    pub fn with_rest_api(mut self, rest_api: bool) -> Self {
        self.rest_api = rest_api;
        self
    }

    pub fn resolve(&self) -> DependencyList {
        let mut deps: BTreeSet<&str> = CORE.iter().copied().collect();

        deps.extend(framework_set(self.framework));
        if self.strategy.is_hardened() {
            deps.extend(hardened_set(self.framework));
        }
        if self.rest_api && self.framework.is_django() {
            deps.extend(DJANGO_REST);
        }
        deps.extend(database_set(self.database, self.framework));
        deps.extend(domain_set(self.domain));

        DependencyList(deps.into_iter().map(str::to_string).collect())
    }
}

/// Resolve the libraries for a build
pub fn resolve(
    framework: Framework,
    strategy: Strategy,
    database: Database,
    domain: Domain,
) -> DependencyList {
    DependencyQuery::new(framework, strategy, database, domain).resolve()
}
