/*!
 * Where model weights come from.
 *
 * A local model directory only counts as installed when it holds real weight
 * files. Directories containing nothing but configuration (for example
 * placeholders created by setup scripts) are reported as incomplete and the
 * remote model identifier is used instead.
 */

use std::fmt;
use std::path::{Path, PathBuf};

use log::{info, warn};
use walkdir::WalkDir;

/// Configuration file every model directory must contain
const REQUIRED_CONFIG_FILE: &str = "config.json";

/// Single-file checkpoints recognised as weights
const WEIGHT_FILES: &[&str] = &[
    "model.safetensors",
    "pytorch_model.bin",
    "tf_model.h5",
    "flax_model.msgpack",
];

/// Resolved location of a model
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelSource {
    /// Local directory with configuration and weights
    LocalComplete(PathBuf),
    /// Local directory that is missing configuration or weights
    LocalIncomplete(PathBuf),
    /// Identifier to fetch from a model hub
    Remote(String),
}

impl ModelSource {
    /// Inspect a local directory. A missing directory is reported as incomplete.
    pub fn inspect<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        if dir.is_dir() && dir.join(REQUIRED_CONFIG_FILE).is_file() && has_weight_files(dir) {
            Self::LocalComplete(dir.to_path_buf())
        } else {
            Self::LocalIncomplete(dir.to_path_buf())
        }
    }

    /// Prefer a complete local directory, otherwise fall back to the remote identifier
    pub fn resolve(local_dir: Option<&Path>, remote_id: &str) -> Self {
        match local_dir.map(Self::inspect) {
            Some(source @ Self::LocalComplete(_)) => {
                info!("Using local model directory: {}", source);
                source
            }
            Some(Self::LocalIncomplete(path)) if path.exists() => {
                warn!(
                    "Local model directory {:?} has no weight files, using remote model {}",
                    path, remote_id
                );
                Self::Remote(remote_id.to_string())
            }
            _ => {
                info!("Local model not found, using remote model: {}", remote_id);
                Self::Remote(remote_id.to_string())
            }
        }
    }

    /// Key identifying the underlying base model; tokenizers and weights are shared per key
    pub fn identifier(&self) -> String {
        match self {
            Self::LocalComplete(path) | Self::LocalIncomplete(path) => path.display().to_string(),
            Self::Remote(id) => id.clone(),
        }
    }

    /// Whether weights can be loaded from this source
    pub fn is_loadable(&self) -> bool {
        !matches!(self, Self::LocalIncomplete(_))
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalComplete(path) => write!(f, "{}", path.display()),
            Self::LocalIncomplete(path) => write!(f, "{} (incomplete)", path.display()),
            Self::Remote(id) => write!(f, "{}", id),
        }
    }
}

/// Whether a directory holds at least one non-empty weight file, single or sharded
fn has_weight_files(dir: &Path) -> bool {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.metadata().map(|m| m.len() > 0).unwrap_or(false))
        .any(|e| is_weight_file_name(&e.file_name().to_string_lossy()))
}

fn is_weight_file_name(name: &str) -> bool {
    if WEIGHT_FILES.contains(&name) {
        return true;
    }
    // Sharded checkpoints: model-00001-of-00002.safetensors, pytorch_model-00001-of-00003.bin
    (name.starts_with("model-") && name.ends_with(".safetensors"))
        || (name.starts_with("pytorch_model-") && name.ends_with(".bin"))
}
