//! Built-in DevOps tool catalog (display order).

use super::{Catalog, Item};

const TOOLS: &[(&str, &str, &str, &str)] = &[
    // (id, name, category, description)
    ("docker", "Docker", "Containerization", "Containerization Platform"),
    ("kubernetes", "Kubernetes", "Containerization", "Container Orchestration"),
    ("helm", "Helm", "Containerization", "Kubernetes Package Manager"),
    ("jenkins", "Jenkins", "CI/CD", "CI/CD Automation"),
    ("gitlab-ci", "GitLab CI", "CI/CD", "GitLab CI/CD Pipeline"),
    ("github-actions", "GitHub Actions", "CI/CD", "GitHub CI/CD Workflows"),
    ("git", "Git", "Version Control", "Version Control System"),
    ("svn", "SVN", "Version Control", "Subversion Version Control"),
    ("ansible", "Ansible", "Configuration Management", "Configuration Management"),
    ("chef", "Chef", "Configuration Management", "Infrastructure Automation"),
    ("puppet", "Puppet", "Configuration Management", "Configuration Management"),
    ("terraform", "Terraform", "Infrastructure as Code", "Infrastructure as Code"),
    ("cloudformation", "CloudFormation", "Infrastructure as Code", "AWS Infrastructure as Code"),
    ("prometheus", "Prometheus", "Monitoring", "Monitoring & Alerting"),
    ("grafana", "Grafana", "Monitoring", "Data Visualization"),
    ("nagios", "Nagios", "Monitoring", "Network Monitoring"),
    ("istio", "Istio", "Service Mesh", "Service Mesh"),
    ("linkerd", "Linkerd", "Service Mesh", "Lightweight Service Mesh"),
    ("argocd", "ArgoCD", "GitOps", "GitOps Continuous Delivery"),
    ("flux", "Flux", "GitOps", "GitOps Kubernetes Operator"),
    ("vault", "Vault", "Security", "Secrets Management"),
    ("falco", "Falco", "Security", "Cloud Native Security"),
];

/// The default wheel: 22 tools across 9 categories.
pub fn builtin() -> Catalog {
    TOOLS
        .iter()
        .map(|&(id, name, category, description)| {
            Item::new(id, name, category).with_description(description)
        })
        .collect()
}
