use std::io;
use std::path::PathBuf;

use kube::config::KubeconfigError;
use thiserror::Error;

/// Errors raised by the control-plane client
#[derive(Debug, Error)]
pub enum KubeError {
    #[error("failed to read kubeconfig {}: {source}", path.display())]
    ReadKubeconfig {
        path: PathBuf,
        #[source]
        source: KubeconfigError,
    },

    #[error("failed to update kubeconfig {}: {source}", path.display())]
    WriteKubeconfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize kubeconfig: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("kubeconfig has no current context")]
    NoCurrentContext,

    #[error("invalid configuration for context '{context}': {source}")]
    InvalidContext {
        context: String,
        #[source]
        source: KubeconfigError,
    },

    #[error("not connected to a cluster: {0}")]
    NotConnected(String),

    #[error("{0}")]
    Api(#[from] kube::Error),

    #[error("watch failed ({code}): {message}")]
    Watch { code: u16, message: String },

    #[error("log stream failed: {0}")]
    Stream(#[from] io::Error),
}
