//! Plugin preparation before binding
//!
//! Installing a validator package is owned by the caller's environment. This
//! module only drives an injected [`PluginInstaller`] over every namespace a
//! spec references and records what happened.

use crate::model::RailSpec;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Installs or imports one validator package namespace
pub trait PluginInstaller {
    fn install(&self, namespace: &str) -> anyhow::Result<()>;
}

impl<F> PluginInstaller for F
where
    F: Fn(&str) -> anyhow::Result<()>,
{
    fn install(&self, namespace: &str) -> anyhow::Result<()> {
        self(namespace)
    }
}

/// What happened to one namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum PluginStatus {
    Installed,
    AlreadyPresent,
    Failed(String),
}

impl PluginStatus {
    pub fn is_available(&self) -> bool {
        !matches!(self, PluginStatus::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginOutcome {
    pub namespace: String,
    #[serde(flatten)]
    pub status: PluginStatus,
}

/// Outcome of preparing every plugin a spec references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PluginReport {
    pub outcomes: Vec<PluginOutcome>,
}

impl PluginReport {
    /// Whether a namespace was prepared successfully
    pub fn is_available(&self, namespace: &str) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.namespace == namespace && o.status.is_available())
    }

    /// Namespaces whose installation failed
    pub fn failures(&self) -> impl Iterator<Item = &PluginOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_available())
    }

    /// True when every namespace is available
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Install every plugin namespace the spec references, once each
///
/// Namespaces in `preinstalled` are reported as already present without
/// calling the installer. A failed install is recorded, not raised; callers
/// decide whether an incomplete report is fatal.
pub fn prepare_plugins<I>(spec: &RailSpec, installer: &I, preinstalled: &[String]) -> PluginReport
where
    I: PluginInstaller + ?Sized,
{
    let preinstalled: HashSet<&str> = preinstalled.iter().map(String::as_str).collect();
    let outcomes = spec
        .all_plugins()
        .into_iter()
        .map(|namespace| {
            let status = if preinstalled.contains(namespace.as_str()) {
                debug!(namespace = %namespace, "Plugin already present");
                PluginStatus::AlreadyPresent
            } else {
                match installer.install(&namespace) {
                    Ok(()) => {
                        info!(namespace = %namespace, "Installed plugin");
                        PluginStatus::Installed
                    }
                    Err(err) => {
                        warn!(namespace = %namespace, error = %err, "Plugin installation failed");
                        PluginStatus::Failed(format!("{:#}", err))
                    }
                }
            };
            PluginOutcome { namespace, status }
        })
        .collect();
    PluginReport { outcomes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataTypeNode, ElementType, Fields, SchemaTree};
    use std::cell::RefCell;

    fn spec_with_plugins() -> RailSpec {
        let mut fields = Fields::new();
        fields.insert(
            "a".into(),
            DataTypeNode::leaf(ElementType::String, "a")
                .with_plugin("acme-text")
                .with_plugin("broken"),
        );
        fields.insert(
            "b".into(),
            DataTypeNode::leaf(ElementType::String, "b")
                .with_plugin("acme-text")
                .with_plugin("core-validators"),
        );
        RailSpec::new("p").with_output(SchemaTree::Object(fields))
    }

    #[test]
    fn test_prepare_calls_installer_once_per_namespace() {
        let calls = RefCell::new(Vec::new());
        let installer = |namespace: &str| {
            calls.borrow_mut().push(namespace.to_string());
            if namespace == "broken" {
                anyhow::bail!("no matching distribution");
            }
            Ok(())
        };

        let report = prepare_plugins(
            &spec_with_plugins(),
            &installer,
            &["core-validators".to_string()],
        );

        assert_eq!(calls.into_inner(), vec!["acme-text", "broken"]);
        assert_eq!(report.len(), 3);
        assert_eq!(report.outcomes[0].status, PluginStatus::Installed);
        assert_eq!(
            report.outcomes[1].status,
            PluginStatus::Failed("no matching distribution".to_string())
        );
        assert_eq!(report.outcomes[2].status, PluginStatus::AlreadyPresent);
        assert!(report.is_available("acme-text"));
        assert!(!report.is_available("broken"));
        assert!(!report.is_available("never-mentioned"));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_report_serializes_with_status_tag() {
        let report = PluginReport {
            outcomes: vec![PluginOutcome {
                namespace: "broken".into(),
                status: PluginStatus::Failed("boom".into()),
            }],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"outcomes": [{"namespace": "broken", "status": "failed", "reason": "boom"}]})
        );
    }
}
