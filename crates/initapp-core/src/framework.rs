//! Supported frameworks, strategies, databases, domains and infrastructure suites
//!
//! Every user-facing slug is parsed into one of these closed enums up front,
//! so rule lookups downstream are exhaustive matches instead of string keys.

use std::fmt;

/// Target backend framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Framework {
    FastApi,
    Flask,
    Django,
    Bottle,
    Sanic,
    Falcon,
    Tornado,
    Pyramid,
    /// Non-web specialized archetypes, refined by [`Domain`]
    Others,
}

impl Framework {
    pub const ALL: [Framework; 9] = [
        Framework::FastApi,
        Framework::Flask,
        Framework::Django,
        Framework::Bottle,
        Framework::Sanic,
        Framework::Falcon,
        Framework::Tornado,
        Framework::Pyramid,
        Framework::Others,
    ];

    /// Lower-case slug used in context values and rule lookups
    pub fn slug(&self) -> &'static str {
        match self {
            Framework::FastApi => "fastapi",
            Framework::Flask => "flask",
            Framework::Django => "django",
            Framework::Bottle => "bottle",
            Framework::Sanic => "sanic",
            Framework::Falcon => "falcon",
            Framework::Tornado => "tornado",
            Framework::Pyramid => "pyramid",
            Framework::Others => "others",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Framework::FastApi => "FastAPI",
            Framework::Flask => "Flask",
            Framework::Django => "Django",
            Framework::Bottle => "Bottle",
            Framework::Sanic => "Sanic",
            Framework::Falcon => "Falcon",
            Framework::Tornado => "Tornado",
            Framework::Pyramid => "Pyramid",
            Framework::Others => "Others",
        }
    }

    /// Parse a framework slug or display label.
    ///
    /// Accepts labels such as `"Django + Rest Framework"` or `"FastAPI (Standard)"`
    /// by looking only at the leading word.
    pub fn parse(s: &str) -> Option<Framework> {
        let lowered = s.trim().to_lowercase();
        let head = lowered
            .split(|c: char| c == '(' || c == '+' || c.is_whitespace())
            .next()
            .unwrap_or("");
        Framework::ALL.into_iter().find(|fw| fw.slug() == head)
    }

    pub fn is_django(&self) -> bool {
        matches!(self, Framework::Django)
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Structural ambition level of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Standard,
    Production,
    AutoConfig,
    Custom,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Standard,
        Strategy::Production,
        Strategy::AutoConfig,
        Strategy::Custom,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Strategy::Standard => "standard",
            Strategy::Production => "production",
            Strategy::AutoConfig => "auto_config",
            Strategy::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Strategy> {
        let lowered = s.trim().to_lowercase().replace(['-', ' '], "_");
        match lowered.as_str() {
            "standard" | "minimal" => Some(Strategy::Standard),
            "production" | "prod" => Some(Strategy::Production),
            "auto_config" | "auto" | "autoconfig" => Some(Strategy::AutoConfig),
            "custom" => Some(Strategy::Custom),
            _ => None,
        }
    }

    /// Hardened tiers pull in security and ops libraries and the layered blueprints
    pub fn is_hardened(&self) -> bool {
        matches!(self, Strategy::Production | Strategy::AutoConfig)
    }

    /// The lightest tier is the only one that ships with debug enabled
    pub fn is_lightest(&self) -> bool {
        matches!(self, Strategy::Standard)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Database engine, matched by case-insensitive substring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Database {
    Postgres,
    MySql,
    Sqlite,
    Mongo,
    None,
}

impl Database {
    pub fn slug(&self) -> &'static str {
        match self {
            Database::Postgres => "postgresql",
            Database::MySql => "mysql",
            Database::Sqlite => "sqlite",
            Database::Mongo => "mongodb",
            Database::None => "none",
        }
    }

    /// `"PostgreSQL"`, `"postgres"` and `"postgresql+asyncpg"` all resolve to Postgres.
    /// Anything unrecognized is `None`; resolution is additive so that is never an error.
    pub fn parse(s: &str) -> Database {
        let lowered = s.to_lowercase();
        if lowered.contains("postgres") {
            Database::Postgres
        } else if lowered.contains("mysql") {
            Database::MySql
        } else if lowered.contains("mongo") {
            Database::Mongo
        } else if lowered.contains("sqlite") {
            Database::Sqlite
        } else {
            Database::None
        }
    }
}

/// Project archetype for non-web builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Base,
    Cli,
    DataPipeline,
    DbtAnalytics,
    MlOps,
    RagAi,
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::Base,
        Domain::Cli,
        Domain::DataPipeline,
        Domain::DbtAnalytics,
        Domain::MlOps,
        Domain::RagAi,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Domain::Base => "base",
            Domain::Cli => "hp_cli",
            Domain::DataPipeline => "data_pipeline",
            Domain::DbtAnalytics => "dbt_analytics",
            Domain::MlOps => "mlops_core",
            Domain::RagAi => "rag_ai",
        }
    }

    pub fn parse(s: &str) -> Option<Domain> {
        let lowered = s.trim().to_lowercase().replace(['-', ' '], "_");
        match lowered.as_str() {
            "base" => Some(Domain::Base),
            "hp_cli" | "cli" => Some(Domain::Cli),
            "data_pipeline" | "pipeline" => Some(Domain::DataPipeline),
            "dbt_analytics" | "dbt" => Some(Domain::DbtAnalytics),
            "mlops_core" | "mlops" => Some(Domain::MlOps),
            "rag_ai" | "rag" => Some(Domain::RagAi),
            _ => None,
        }
    }
}

/// Infrastructure file suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InfraSuite {
    /// Containers
    Docker,
    /// CI pipelines
    Github,
    /// Orchestration manifests
    Kubernetes,
    /// Pipeline automation
    Jenkins,
}

impl InfraSuite {
    pub const ALL: [InfraSuite; 4] = [
        InfraSuite::Docker,
        InfraSuite::Github,
        InfraSuite::Kubernetes,
        InfraSuite::Jenkins,
    ];

    /// Directory name under `infra/` in the template pack
    pub fn name(&self) -> &'static str {
        match self {
            InfraSuite::Docker => "docker",
            InfraSuite::Github => "github",
            InfraSuite::Kubernetes => "k8s",
            InfraSuite::Jenkins => "jenkins",
        }
    }

    pub fn parse(s: &str) -> Option<InfraSuite> {
        match s.trim().to_lowercase().as_str() {
            "docker" | "containers" => Some(InfraSuite::Docker),
            "github" | "ci" | ".github" => Some(InfraSuite::Github),
            "k8s" | "kubernetes" => Some(InfraSuite::Kubernetes),
            "jenkins" => Some(InfraSuite::Jenkins),
            _ => None,
        }
    }

    /// Output directory relative to the project root
    pub fn target_dir(&self) -> &'static str {
        match self {
            InfraSuite::Github => ".github/workflows",
            other => other.name(),
        }
    }
}

impl fmt::Display for InfraSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
