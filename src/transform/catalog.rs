//! Transform catalog loaded from YAML definitions.
//!
//! A catalog declares which transform identities exist, which implementation
//! backs each of them, and the default arguments the transform runs with
//! when the caller supplies none. It implements [`TransformCompiler`], so a
//! [`TransformCache`](crate::TransformCache) can be built straight on top of
//! it.

use crate::transform::arguments::{Argument, ArgumentList};
use crate::transform::cache::{TransformCompiler, TransformDescriptor};
use crate::transform::map::{CopyTransform, Transform, TransformError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Transform definition from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformDef {
    /// Transform identity (unique lookup key)
    pub identity: String,

    /// Documentation string
    #[serde(default)]
    pub doc: Option<String>,

    /// Default arguments applied unless overridden by the caller
    #[serde(default)]
    pub arguments: Vec<Argument>,

    /// Implementation binding
    pub implementation: Implementation,
}

/// Implementation binding for a declared transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Implementation {
    /// Passthrough: the output is the input, concatenated across messages.
    Copy,

    /// A transform registered on the catalog under the given name.
    Registered {
        /// Registration name to resolve at compile time
        name: String,
    },
}

/// Catalog of declared transforms and registered implementations.
///
/// Definitions come from YAML files with a top-level `transform` key:
///
/// ```yaml
/// transform:
///   identity: orders-to-invoice
///   doc: "Maps an order batch to an invoice"
///   arguments:
///     - name: currency
///       value: EUR
///   implementation:
///     type: registered
///     name: orders-to-invoice-v2
/// ```
///
/// Implementations referenced by `registered` definitions are supplied in
/// code through [`TransformCatalog::register`]; the binding is checked when
/// the transform is compiled, not when the definition is loaded, so files
/// and registrations may arrive in any order.
pub struct TransformCatalog {
    /// Loaded definitions: identity -> definition
    definitions: HashMap<String, TransformDef>,

    /// Registered implementations: name -> transform
    registered: HashMap<String, Arc<dyn Transform>>,
}

impl TransformCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            registered: HashMap::new(),
        }
    }

    /// Load a transform definition from a YAML file.
    ///
    /// # Arguments
    /// * `path` - Path to transform YAML file
    ///
    /// # Returns
    /// Loaded transform definition
    ///
    /// # Errors
    /// Returns error if the file doesn't exist or has invalid format
    pub fn load_transform<P: AsRef<Path>>(&mut self, path: P) -> Result<TransformDef, String> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read transform file {}: {}", path.display(), e))?;

        let yaml: serde_yaml::Value = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML: {}", e))?;

        let transform_yaml = yaml
            .get("transform")
            .ok_or_else(|| "Transform YAML missing 'transform' field".to_string())?;

        let transform: TransformDef = serde_yaml::from_value(transform_yaml.clone())
            .map_err(|e| format!("Failed to parse transform definition: {}", e))?;

        self.validate_transform(&transform)?;

        self.definitions
            .insert(transform.identity.clone(), transform.clone());

        Ok(transform)
    }

    /// Load all transform definitions from a directory.
    ///
    /// Malformed files are skipped with a warning so one bad definition does
    /// not block the rest of the catalog.
    ///
    /// # Returns
    /// Number of transforms loaded
    pub fn load_transforms_from_dir<P: AsRef<Path>>(
        &mut self,
        dir_path: P,
    ) -> Result<usize, String> {
        let dir_path = dir_path.as_ref();

        if !dir_path.exists() {
            return Err(format!(
                "Transform directory does not exist: {}",
                dir_path.display()
            ));
        }

        if !dir_path.is_dir() {
            return Err(format!("Path is not a directory: {}", dir_path.display()));
        }

        let mut count = 0;

        let entries = fs::read_dir(dir_path)
            .map_err(|e| format!("Failed to read directory {}: {}", dir_path.display(), e))?;

        for entry in entries {
            let entry = entry.map_err(|e| format!("Failed to read directory entry: {}", e))?;
            let path = entry.path();

            if let Some(ext) = path.extension() {
                if ext == "yaml" || ext == "yml" {
                    match self.load_transform(&path) {
                        Ok(_) => count += 1,
                        Err(e) => {
                            tracing::warn!(
                                file = %path.display(),
                                error = %e,
                                "skipping transform definition"
                            );
                        }
                    }
                }
            }
        }

        Ok(count)
    }

    /// Declare a transform definition programmatically.
    pub fn declare(&mut self, definition: TransformDef) -> Result<(), String> {
        self.validate_transform(&definition)?;
        self.definitions
            .insert(definition.identity.clone(), definition);
        Ok(())
    }

    /// Register an implementation under a name `registered` definitions can
    /// bind to.
    pub fn register(&mut self, name: impl Into<String>, transform: Arc<dyn Transform>) {
        self.registered.insert(name.into(), transform);
    }

    fn validate_transform(&self, transform: &TransformDef) -> Result<(), String> {
        if transform.identity.is_empty() {
            return Err("Transform identity cannot be empty".to_string());
        }
        Ok(())
    }

    /// Check if a transform identity is declared.
    pub fn has_transform(&self, identity: &str) -> bool {
        self.definitions.contains_key(identity)
    }

    /// Get a transform definition by identity.
    pub fn get_transform(&self, identity: &str) -> Option<&TransformDef> {
        self.definitions.get(identity)
    }

    /// Get all declared identities.
    pub fn identities(&self) -> Vec<&String> {
        self.definitions.keys().collect()
    }

    /// Get number of declared transforms.
    pub fn count(&self) -> usize {
        self.definitions.len()
    }
}

impl Default for TransformCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformCompiler for TransformCatalog {
    fn compile(&self, identity: &str) -> Result<TransformDescriptor, TransformError> {
        let definition = self
            .definitions
            .get(identity)
            .ok_or_else(|| TransformError::NotFound(identity.to_string()))?;

        let transform: Arc<dyn Transform> = match &definition.implementation {
            Implementation::Copy => Arc::new(CopyTransform),
            Implementation::Registered { name } => self
                .registered
                .get(name)
                .cloned()
                .ok_or_else(|| TransformError::CompileError {
                    identity: identity.to_string(),
                    reason: format!("no transform registered under '{}'", name),
                })?,
        };

        let defaults: ArgumentList = definition.arguments.iter().cloned().collect();
        Ok(TransformDescriptor::new(transform, defaults))
    }
}

impl std::fmt::Debug for TransformCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformCatalog")
            .field("definitions", &self.definitions.len())
            .field("registered", &self.registered.len())
            .finish()
    }
}
