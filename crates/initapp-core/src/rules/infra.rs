//! Infrastructure file suites (containers, CI, orchestration, pipeline automation)

use crate::framework::InfraSuite;
use crate::templates::ManifestRule;

const DOCKER_SUITE: &[&str] = &[
    "Dockerfile.tpl",
    "docker-compose.yml.tpl",
    "docker-compose.prod.yml.tpl",
    ".dockerignore.tpl",
    "DOCKER.md.tpl",
];

const GITHUB_SUITE: &[&str] = &["ci.yml.tpl", "security.yml.tpl"];

const K8S_SUITE: &[&str] = &[
    "deployment.yml.tpl",
    "service.yml.tpl",
    "ingress.yml.tpl",
    "hpa.yml.tpl",
    "configmap.yml.tpl",
];

const JENKINS_SUITE: &[&str] = &["Jenkinsfile.tpl", "build.groovy.tpl", "deploy.groovy.tpl"];

/// Every template file a suite knows about
pub fn suite_files(suite: InfraSuite) -> &'static [&'static str] {
    match suite {
        InfraSuite::Docker => DOCKER_SUITE,
        InfraSuite::Github => GITHUB_SUITE,
        InfraSuite::Kubernetes => K8S_SUITE,
        InfraSuite::Jenkins => JENKINS_SUITE,
    }
}

/// Manifest rule for one suite file.
///
/// The source lives under `infra/<suite>/`; the target drops the `.tpl`
/// extension and lands in the suite's output directory. CI files are
/// flattened into the workflow directory.
pub fn infra_rule(suite: InfraSuite, filename: &str) -> ManifestRule {
    let filename = filename.trim_start_matches("./");
    let clean = filename.strip_suffix(".tpl").unwrap_or(filename);
    let clean = match suite {
        InfraSuite::Github => clean.rsplit('/').next().unwrap_or(clean),
        _ => clean,
    };
    ManifestRule::new(
        format!("infra/{}/{}", suite.name(), filename),
        format!("{}/{}", suite.target_dir(), clean),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_goes_to_workflows() {
        let rule = infra_rule(InfraSuite::Github, "ci.yml.tpl");
        assert_eq!(rule.source, "infra/github/ci.yml.tpl");
        assert_eq!(rule.target, ".github/workflows/ci.yml");
    }

    #[test]
    fn test_other_suites_use_suite_dir() {
        let rule = infra_rule(InfraSuite::Docker, "Dockerfile.tpl");
        assert_eq!(rule.target, "docker/Dockerfile");
        let rule = infra_rule(InfraSuite::Kubernetes, "service.yml.tpl");
        assert_eq!(rule.target, "k8s/service.yml");
    }

    #[test]
    fn test_every_suite_has_files() {
        assert!(InfraSuite::ALL.iter().all(|s| !suite_files(*s).is_empty()));
    }
}
