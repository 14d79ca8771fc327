//! Global constants shared by every build
//!
//! All of these are merged into the build context, so any template can
//! reference them by name (e.g. `{{APP_NAME}}`).

use crate::framework::{Database, Domain, Framework, Strategy};

pub const APP_NAME: &str = "init-app";
pub const APP_TAGLINE: &str = "Python backend project scaffolding from declarative blueprints";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PROJECT_NAME: &str = "new_project";
pub const DEFAULT_APP_NAME: &str = "core_app";
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Canonical entrypoint for every non-Django build
pub const ENTRYPOINT: &str = "app.py";
/// Template every entry alias is redirected to
pub const UNIVERSAL_ENTRY_TEMPLATE: &str = "common/app.py.tpl";
/// Django's management script, created by its own bootstrap command
pub const DJANGO_ENTRYPOINT: &str = "manage.py";

pub const SERVER_OPTIONS: &[&str] = &["uvicorn", "gunicorn", "waitress", "gevent", "wsgiref", "na"];

pub const DB_STRUCTURE: &[&str] = &["db/migrations", "db/seeds", "db/schemas", "db/scripts"];

pub const RAG_LAYERS: &[&str] = &[
    "vectordb",
    "embeddings",
    "knowledge",
    "prompts",
    "retrievers",
    "chains",
];

pub const DATA_LAYERS: &[&str] = &["dags", "transformers", "staging", "analysis", "artifacts"];

/// Folder palette offered to custom builds; auto-config builds take all of it
pub const CUSTOM_FOLDERS: &[&str] = &[
    "config",
    "routes",
    "services",
    "models",
    "schemas",
    "middleware",
    "utils",
    "templates",
    "static",
    "assets",
    "logs",
    "tests",
    "docs",
    "scripts",
];

/// Folders from [`CUSTOM_FOLDERS`] that hold code and default to packages
pub const CODE_FOLDERS: &[&str] = &[
    "config",
    "routes",
    "services",
    "models",
    "schemas",
    "middleware",
    "utils",
    "tests",
];

/// Package default for a forced folder: code folders from the palette and
/// every layer folder become packages
pub fn is_package_by_default(folder: &str) -> bool {
    CODE_FOLDERS.contains(&folder) || !CUSTOM_FOLDERS.contains(&folder)
}

/// Every domain folder an auto-config build forces into the blueprint
pub fn all_domain_folders() -> Vec<&'static str> {
    CUSTOM_FOLDERS
        .iter()
        .chain(RAG_LAYERS)
        .chain(DATA_LAYERS)
        .copied()
        .collect()
}

pub fn default_port(fw: Framework) -> &'static str {
    match fw {
        Framework::FastApi | Framework::Django | Framework::Sanic | Framework::Falcon => "8000",
        Framework::Flask => "5000",
        Framework::Bottle => "8080",
        Framework::Tornado => "8888",
        Framework::Pyramid => "6543",
        Framework::Others => "na",
    }
}

/// Process servers per framework, preferred first
pub fn servers(fw: Framework) -> &'static [&'static str] {
    match fw {
        Framework::FastApi => &["uvicorn", "gunicorn"],
        Framework::Flask => &["gunicorn", "waitress", "gevent", "wsgiref", "na"],
        Framework::Django => &["gunicorn", "waitress", "wsgiref"],
        Framework::Bottle => &["waitress", "gevent", "wsgiref", "na"],
        Framework::Falcon => &["gunicorn", "waitress", "wsgiref"],
        Framework::Pyramid => &["waitress", "gunicorn", "wsgiref"],
        Framework::Sanic | Framework::Tornado | Framework::Others => &["na"],
    }
}

pub fn default_server(fw: Framework) -> &'static str {
    servers(fw).first().copied().unwrap_or("uvicorn")
}

/// Where server-rendered views live for each framework
pub fn ui_folder(fw: Framework) -> &'static str {
    match fw {
        Framework::Bottle => "views",
        Framework::Others => "assets",
        _ => "templates",
    }
}

/// Short description shown next to each choice in prompts
pub fn framework_description(fw: Framework) -> &'static str {
    match fw {
        Framework::FastApi => "High-performance async API with OpenAPI support",
        Framework::Flask => "Flexible and lightweight WSGI micro-framework",
        Framework::Django => "Feature-rich batteries-included web framework",
        Framework::Bottle => "Ultra-lightweight single-file WSGI micro-framework",
        Framework::Sanic => "Async Python web server and framework",
        Framework::Falcon => "Minimalist framework for high-performance APIs",
        Framework::Tornado => "Asynchronous networking library and web framework",
        Framework::Pyramid => "Small, fast, down-to-earth web framework",
        Framework::Others => "Specialized system and data engineering projects",
    }
}

pub fn strategy_description(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::Standard => "Clean single-package layout with basic configuration",
        Strategy::Production => "Layered enterprise layout with hardened dependencies",
        Strategy::AutoConfig => "Everything on: all folders, all infrastructure suites",
        Strategy::Custom => "Pick the folders and packages yourself",
    }
}

pub fn domain_description(domain: Domain) -> &'static str {
    match domain {
        Domain::Base => "Python base project",
        Domain::Cli => "Command line tool with Click/Typer",
        Domain::DataPipeline => "Workflow orchestration for data task graphs",
        Domain::DbtAnalytics => "SQL warehouse transformations and docs",
        Domain::MlOps => "Model training, tracking and serving",
        Domain::RagAi => "Retrieval augmented generation engine",
    }
}

/// Framework snippets spliced into the universal entry template
#[derive(Debug, Clone, Copy)]
pub struct EntrySnippet {
    pub import: &'static str,
    pub app: &'static str,
    pub run: &'static str,
}

pub fn entry_snippet(fw: Framework) -> EntrySnippet {
    match fw {
        Framework::FastApi => EntrySnippet {
            import: "from fastapi import FastAPI\nimport uvicorn",
            app: "app = FastAPI(title=PROJECT_NAME)\n\n\n@app.get(\"/\")\nasync def index():\n    return {\"message\": f\"{PROJECT_NAME} is running\"}",
            run: "    uvicorn.run(\"app:app\", host=HOST, port=int(PORT), reload=DEBUG)",
        },
        Framework::Flask => EntrySnippet {
            import: "from flask import Flask",
            app: "app = Flask(__name__)\n\n\n@app.route(\"/\")\ndef index():\n    return {\"message\": f\"{PROJECT_NAME} is running\"}",
            run: "    app.run(host=HOST, port=int(PORT), debug=DEBUG)",
        },
        Framework::Bottle => EntrySnippet {
            import: "from bottle import Bottle, run",
            app: "app = Bottle()\n\n\n@app.route(\"/\")\ndef index():\n    return {\"message\": f\"{PROJECT_NAME} is running\"}",
            run: "    run(app, host=HOST, port=int(PORT), debug=DEBUG)",
        },
        Framework::Sanic => EntrySnippet {
            import: "from sanic import Sanic\nfrom sanic.response import json",
            app: "app = Sanic(\"app\")\n\n\n@app.get(\"/\")\nasync def index(request):\n    return json({\"message\": f\"{PROJECT_NAME} is running\"})",
            run: "    app.run(host=HOST, port=int(PORT), debug=DEBUG)",
        },
        Framework::Falcon => EntrySnippet {
            import: "import falcon\nfrom wsgiref.simple_server import make_server",
            app: "class Index:\n    def on_get(self, req, resp):\n        resp.media = {\"message\": f\"{PROJECT_NAME} is running\"}\n\n\napp = falcon.App()\napp.add_route(\"/\", Index())",
            run: "    with make_server(HOST, int(PORT), app) as httpd:\n        httpd.serve_forever()",
        },
        Framework::Tornado => EntrySnippet {
            import: "import asyncio\n\nimport tornado.web",
            app: "class MainHandler(tornado.web.RequestHandler):\n    def get(self):\n        self.write({\"message\": f\"{PROJECT_NAME} is running\"})\n\n\ndef make_app():\n    return tornado.web.Application([(r\"/\", MainHandler)], debug=DEBUG)",
            run: "    async def main():\n        make_app().listen(int(PORT), address=HOST)\n        await asyncio.Event().wait()\n\n    asyncio.run(main())",
        },
        Framework::Pyramid => EntrySnippet {
            import: "from pyramid.config import Configurator\nfrom waitress import serve",
            app: "def index(request):\n    return {\"message\": f\"{PROJECT_NAME} is running\"}\n\n\ndef make_app():\n    with Configurator() as config:\n        config.add_route(\"index\", \"/\")\n        config.add_view(index, route_name=\"index\", renderer=\"json\")\n        return config.make_wsgi_app()",
            run: "    serve(make_app(), host=HOST, port=int(PORT))",
        },
        Framework::Django | Framework::Others => EntrySnippet {
            import: "import logging",
            app: "def main():\n    logging.basicConfig(level=logging.DEBUG if DEBUG else logging.INFO)\n    logging.info(\"%s started\", PROJECT_NAME)",
            run: "    main()",
        },
    }
}

/// Constants exposed to templates, keyed by their upper-case name
pub fn context_constants() -> Vec<(&'static str, String)> {
    let join = |items: &[&str]| items.join(", ");
    let frameworks: Vec<&str> = Framework::ALL.iter().map(|f| f.slug()).collect();
    let modes: Vec<&str> = Strategy::ALL.iter().map(|s| s.slug()).collect();
    let domains: Vec<&str> = Domain::ALL.iter().map(|d| d.slug()).collect();
    let engines: Vec<&str> = [
        Database::Postgres,
        Database::MySql,
        Database::Sqlite,
        Database::Mongo,
        Database::None,
    ]
    .iter()
    .map(|d| d.slug())
    .collect();

    vec![
        ("APP_NAME", APP_NAME.to_string()),
        ("APP_TAGLINE", APP_TAGLINE.to_string()),
        ("APP_VERSION", APP_VERSION.to_string()),
        ("DEFAULT_HOST", DEFAULT_HOST.to_string()),
        ("FRAMEWORKS", join(&frameworks)),
        ("PROJECT_MODES", join(&modes)),
        ("OTHERS_PROJECT_TYPES", join(&domains)),
        ("DB_ENGINES", join(&engines)),
        ("DB_STRUCTURE", join(DB_STRUCTURE)),
        ("SERVER_OPTIONS", join(SERVER_OPTIONS)),
        ("RAG_LAYERS", join(RAG_LAYERS)),
        ("DATA_LAYERS", join(DATA_LAYERS)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_defaults() {
        assert!(is_package_by_default("services"));
        assert!(is_package_by_default("retrievers"));
        assert!(!is_package_by_default("logs"));
        assert!(!is_package_by_default("static"));
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(default_port(Framework::Flask), "5000");
        assert_eq!(default_port(Framework::FastApi), "8000");
        assert_eq!(default_port(Framework::Pyramid), "6543");
    }

    #[test]
    fn test_server_mapping() {
        assert_eq!(default_server(Framework::FastApi), "uvicorn");
        assert_eq!(default_server(Framework::Bottle), "waitress");
        assert!(Framework::ALL.iter().all(|fw| !servers(*fw).is_empty()));
    }

    #[test]
    fn test_ui_mapping() {
        assert_eq!(ui_folder(Framework::Flask), "templates");
        assert_eq!(ui_folder(Framework::Bottle), "views");
    }

    #[test]
    fn test_context_constants_are_upper_case() {
        let constants = context_constants();
        assert!(constants
            .iter()
            .all(|(k, _)| k.chars().all(|c| c.is_ascii_uppercase() || c == '_')));
        assert!(constants.iter().any(|(k, v)| *k == "APP_NAME" && v == APP_NAME));
    }

    #[test]
    fn test_domain_folders_cover_layers() {
        let all = all_domain_folders();
        assert!(all.contains(&"retrievers"));
        assert!(all.contains(&"dags"));
        assert!(all.contains(&"services"));
    }
}
