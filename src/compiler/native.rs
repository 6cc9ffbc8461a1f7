//! Native-image reflection metadata export.
//!
//! ```text
//! <resource_directory>/META-INF/native-image/stencil-generated/<namespace>/
//! ├── native-image.properties
//! └── reflection-config.json
//! ```
//!
//! Both files are rewritten wholesale for every non-empty batch.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

use crate::codegen::UnitCollection;
use crate::config::CompilerConfig;
use crate::core::{CompileError, Result};
use crate::utils::path::write_file;

const METADATA_ROOT: &str = "META-INF/native-image/stencil-generated";

const PROPERTIES: &str =
    "Args = -H:ReflectionConfigurationResources=${.}/reflection-config.json\n";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReflectionEntry<'a> {
    name: &'a str,
    all_declared_methods: bool,
    all_declared_fields: bool,
}

/// Directory of the metadata files for `config`'s namespace.
pub fn metadata_directory(resource_directory: &Path, config: &CompilerConfig) -> PathBuf {
    resource_directory
        .join(METADATA_ROOT)
        .join(config.namespace())
}

/// Write native-image metadata for `units`.
///
/// Returns `false` without writing when disabled, when no resource
/// directory is configured, or when the batch is empty.
pub fn export(config: &CompilerConfig, units: &UnitCollection) -> Result<bool> {
    let Some(resource_directory) = config.resource_directory.as_deref() else {
        return Ok(false);
    };
    if !config.native_image || units.is_empty() {
        return Ok(false);
    }

    let dir = metadata_directory(resource_directory, config);

    let entries: Vec<_> = units
        .iter()
        .map(|unit| ReflectionEntry {
            name: unit.name(),
            all_declared_methods: true,
            all_declared_fields: true,
        })
        .collect();
    let reflection = serde_json::to_string_pretty(&entries).map_err(|err| {
        CompileError::io(dir.join("reflection-config.json"), io::Error::other(err))
    })?;

    for (file, contents) in [
        ("native-image.properties", PROPERTIES.to_string()),
        ("reflection-config.json", reflection),
    ] {
        let path = dir.join(file);
        write_file(&path, contents).map_err(|err| CompileError::io(&path, err))?;
    }

    Ok(true)
}
