//! Kubeconfig persistence
//!
//! Reading and writing the credentials store. Parsing itself is delegated to
//! `kube::config::Kubeconfig`; this module only projects it into kubedeck types
//! and records context switches.
//!
//! `Kubeconfig::read_from` rewrites relative credential paths and drops
//! fields it does not model, so a switch is written back by editing the raw
//! document rather than serializing the parsed one.

use std::fs;
use std::path::Path;

use kube::config::{Context, Kubeconfig, NamedContext};
use serde_yaml::{Mapping, Value};

use kubedeck_types::{ContextInfo, CurrentContext};

use crate::KubeError;

/// Load the kubeconfig at `path`
pub fn load(path: &Path) -> Result<Kubeconfig, KubeError> {
    Kubeconfig::read_from(path).map_err(|source| KubeError::ReadKubeconfig {
        path: path.to_path_buf(),
        source,
    })
}

/// Record a context switch in the file at `path`.
///
/// Only `current-context` and the named context's `namespace` and `user`
/// change; every other key is written back as it was read.
pub fn persist_context(
    path: &Path,
    name: &str,
    namespace: &str,
    user: &str,
) -> Result<(), KubeError> {
    let write_error = |source: std::io::Error| KubeError::WriteKubeconfig {
        path: path.to_path_buf(),
        source,
    };

    let raw = fs::read_to_string(path).map_err(write_error)?;
    let mut root = match serde_yaml::from_str::<Value>(&raw)? {
        Value::Mapping(root) => root,
        _ => Mapping::new(),
    };

    let contexts = root
        .entry(Value::from("contexts"))
        .or_insert(Value::Null);
    if !contexts.is_sequence() {
        *contexts = Value::Sequence(Vec::new());
    }
    if let Value::Sequence(entries) = contexts {
        let existing = entries
            .iter_mut()
            .find(|entry| entry.get("name").and_then(Value::as_str) == Some(name));
        match existing {
            Some(entry) => update_context_entry(entry, name, namespace, user),
            None => {
                let mut entry = Value::Mapping(Mapping::new());
                update_context_entry(&mut entry, name, namespace, user);
                entries.push(entry);
            }
        }
    }
    root.insert(Value::from("current-context"), Value::from(name));

    let yaml = serde_yaml::to_string(&root)?;
    fs::write(path, yaml).map_err(write_error)
}

fn update_context_entry(entry: &mut Value, name: &str, namespace: &str, user: &str) {
    let Value::Mapping(entry) = entry else {
        return;
    };
    entry.insert(Value::from("name"), Value::from(name));

    let context = entry.entry(Value::from("context")).or_insert(Value::Null);
    if !context.is_mapping() {
        let mut fresh = Mapping::new();
        fresh.insert(Value::from("cluster"), Value::from(name));
        *context = Value::Mapping(fresh);
    }
    if let Value::Mapping(context) = context {
        set_or_remove(context, "namespace", namespace);
        set_or_remove(context, "user", user);
    }
}

fn set_or_remove(mapping: &mut Mapping, key: &str, value: &str) {
    if value.is_empty() {
        mapping.remove(key);
    } else {
        mapping.insert(Value::from(key), Value::from(value));
    }
}

/// Get all available contexts from kubeconfig
pub fn contexts(kubeconfig: &Kubeconfig) -> Vec<ContextInfo> {
    kubeconfig
        .contexts
        .iter()
        .map(|ctx| {
            let context = ctx.context.as_ref();
            ContextInfo::new(
                ctx.name.clone(),
                context.map(|c| c.cluster.clone()).unwrap_or_default(),
                context.and_then(|c| c.user.clone()).unwrap_or_default(),
                context.and_then(|c| c.namespace.clone()),
                Some(&ctx.name) == kubeconfig.current_context.as_ref(),
            )
        })
        .collect()
}

/// The current context as `(name, namespace, user)`.
///
/// A current context that has no entry yields empty namespace and user.
pub fn current(kubeconfig: &Kubeconfig) -> Option<CurrentContext> {
    let name = kubeconfig
        .current_context
        .as_deref()
        .filter(|name| !name.is_empty())?;

    let context = kubeconfig
        .contexts
        .iter()
        .find(|ctx| ctx.name == name)
        .and_then(|ctx| ctx.context.as_ref());

    Some(CurrentContext::new(
        name,
        context
            .and_then(|c| c.namespace.clone())
            .unwrap_or_default(),
        context.and_then(|c| c.user.clone()).unwrap_or_default(),
    ))
}

/// Make `name` the current context with the given namespace and user.
///
/// Unknown contexts are created pointing at a cluster of the same name.
pub fn apply_context(kubeconfig: &mut Kubeconfig, name: &str, namespace: &str, user: &str) {
    let namespace = non_empty(namespace);
    let user = non_empty(user);

    match kubeconfig.contexts.iter_mut().find(|ctx| ctx.name == name) {
        Some(named) => {
            let context = named.context.get_or_insert_with(|| Context {
                cluster: name.to_string(),
                ..Default::default()
            });
            context.namespace = namespace;
            context.user = user;
        }
        None => kubeconfig.contexts.push(NamedContext {
            name: name.to_string(),
            context: Some(Context {
                cluster: name.to_string(),
                user,
                namespace,
                ..Default::default()
            }),
        }),
    }

    kubeconfig.current_context = Some(name.to_string());
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
clusters:
- name: dev-cluster
  cluster:
    server: https://127.0.0.1:6443
- name: prod-cluster
  cluster:
    server: https://10.0.0.1:6443
users:
- name: dev-user
  user:
    token: dev-token
- name: ops
  user:
    token: ops-token
contexts:
- name: dev
  context:
    cluster: dev-cluster
    user: dev-user
    namespace: team-a
- name: prod
  context:
    cluster: prod-cluster
    user: ops
current-context: dev
"#;

    fn write_fixture() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), KUBECONFIG).unwrap();
        file
    }

    #[test]
    fn test_contexts_mark_current() {
        let file = write_fixture();
        let config = load(file.path()).unwrap();
        let contexts = contexts(&config);

        assert_eq!(contexts.len(), 2);
        assert_eq!(contexts[0].name, "dev");
        assert_eq!(contexts[0].cluster, "dev-cluster");
        assert_eq!(contexts[0].namespace.as_deref(), Some("team-a"));
        assert!(contexts[0].is_current);
        assert!(!contexts[1].is_current);
        assert_eq!(contexts[1].namespace, None);
    }

    #[test]
    fn test_current_context() {
        let file = write_fixture();
        let config = load(file.path()).unwrap();
        assert_eq!(
            current(&config),
            Some(CurrentContext::new("dev", "team-a", "dev-user"))
        );
    }

    #[test]
    fn test_set_context_round_trips_through_file() {
        let file = write_fixture();

        persist_context(file.path(), "prod", "payments", "ops").unwrap();

        let reloaded = load(file.path()).unwrap();
        assert_eq!(
            current(&reloaded),
            Some(CurrentContext::new("prod", "payments", "ops"))
        );
        // The other context is left untouched
        assert_eq!(
            contexts(&reloaded)[0].namespace.as_deref(),
            Some("team-a")
        );
    }

    #[test]
    fn test_persist_leaves_the_rest_of_the_file_alone() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let fixture = KUBECONFIG.replace(
            "    server: https://127.0.0.1:6443\n",
            "    server: https://127.0.0.1:6443\n    certificate-authority: certs/dev-ca.crt\n",
        ) + "x-team: platform\n";
        fs::write(file.path(), fixture).unwrap();

        persist_context(file.path(), "prod", "", "ops").unwrap();

        let written = fs::read_to_string(file.path()).unwrap();
        assert!(written.contains("certificate-authority: certs/dev-ca.crt"));
        assert!(written.contains("x-team: platform"));
        assert!(written.contains("token: dev-token"));
        assert!(written.contains("current-context: prod"));

        let reloaded = load(file.path()).unwrap();
        assert_eq!(current(&reloaded), Some(CurrentContext::new("prod", "", "ops")));
        assert_eq!(contexts(&reloaded)[0].namespace.as_deref(), Some("team-a"));
    }

    #[test]
    fn test_persist_unknown_context_appends_entry() {
        let file = write_fixture();

        persist_context(file.path(), "scratch", "sandbox", "me").unwrap();

        let reloaded = load(file.path()).unwrap();
        assert_eq!(contexts(&reloaded).len(), 3);
        assert_eq!(contexts(&reloaded)[2].cluster, "scratch");
        assert_eq!(
            current(&reloaded),
            Some(CurrentContext::new("scratch", "sandbox", "me"))
        );
    }

    #[test]
    fn test_apply_unknown_context_creates_entry() {
        let mut config = Kubeconfig::default();
        apply_context(&mut config, "scratch", "", "me");

        assert_eq!(config.contexts.len(), 1);
        assert_eq!(
            current(&config),
            Some(CurrentContext::new("scratch", "", "me"))
        );
        assert_eq!(contexts(&config)[0].cluster, "scratch");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, KubeError::ReadKubeconfig { .. }));
    }
}
