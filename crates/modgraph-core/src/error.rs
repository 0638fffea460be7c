use modgraph_fs::NormalizedPath;

/// Errors that can occur while resolving a module graph.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem error from modgraph-fs.
    #[error(transparent)]
    Fs(#[from] modgraph_fs::Error),

    /// A package identifier could not be resolved to a manifest.
    ///
    /// Discovery records this as a missing dependency and keeps going.
    #[error("cannot find manifest for '{identifier}' from {from}")]
    ManifestNotFound {
        identifier: String,
        from: NormalizedPath,
    },

    /// A manifest exists but is not valid JSON of the expected shape.
    #[error("failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: NormalizedPath,
        #[source]
        source: serde_json::Error,
    },

    /// The configured core module installation has no manifest.
    #[error("core module '{name}' not found at {path}")]
    CoreModuleNotFound { name: String, path: NormalizedPath },

    /// No core module installation directory was configured.
    #[error("no installation directory configured for core module '{0}'")]
    CoreModuleUnconfigured(String),

    /// An initialization hook failed for a module.
    #[error("failed to initialize module '{name}': {reason}")]
    ModuleInit { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
