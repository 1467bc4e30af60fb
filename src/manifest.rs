//! Project manifest (`package.json`) access.
//!
//! The manifest is kept as an ordered JSON object so that unknown keys survive a
//! version update. Output is always written with keys sorted at every level and
//! a four-space indent, which keeps diffs stable between releases.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::Version;
use crate::error::{ReleaseError, Result};

pub const VERSION_KEY: &str = "version";
pub const LICENSE_KEY: &str = "license";
pub const DEPENDENCIES_KEY: &str = "dependencies";
pub const DEV_DEPENDENCIES_KEY: &str = "devDependencies";

const INDENT: &[u8] = b"    ";

/// A parsed manifest file
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    path: PathBuf,
    fields: Map<String, Value>,
}

/// Reduced manifest used to install dependencies in container builds.
///
/// Fields are declared in alphabetical order of their JSON names, so the
/// serialized object has sorted keys like every other file we write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerManifest {
    pub dependencies: Value,

    #[serde(rename = "devDependencies")]
    pub dev_dependencies: Option<Value>,

    pub license: Value,
}

impl Manifest {
    /// Read and parse the manifest at `path`.
    ///
    /// # Returns
    /// * `Ok(Manifest)` - The top-level JSON object
    /// * `Err(ManifestRead)` - If the file is absent, not JSON, or not an object
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ReleaseError::manifest_read(path, e))?;
        let value: Value =
            serde_json::from_str(&content).map_err(|e| ReleaseError::manifest_read(path, e))?;

        match value {
            Value::Object(fields) => Ok(Manifest {
                path: path.to_path_buf(),
                fields,
            }),
            other => Err(ReleaseError::manifest_read(
                path,
                format!("expected a JSON object, found {}", json_kind(&other)),
            )),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn require(&self, key: &str) -> Result<&Value> {
        self.get(key)
            .ok_or_else(|| ReleaseError::missing_field(&self.path, key))
    }

    pub fn version(&self) -> Result<Version> {
        match self.require(VERSION_KEY)? {
            Value::String(raw) => Version::parse(raw),
            other => Err(ReleaseError::version(format!(
                "'{}' in {} must be a string, found {}",
                VERSION_KEY,
                self.path.display(),
                json_kind(other)
            ))),
        }
    }

    pub fn set_version(&mut self, version: &Version) {
        self.fields
            .insert(VERSION_KEY.to_string(), Value::String(version.to_string()));
    }

    /// Project the container-build subset. `devDependencies` may be absent.
    pub fn docker_subset(&self) -> Result<DockerManifest> {
        Ok(DockerManifest {
            dependencies: self.require(DEPENDENCIES_KEY)?.clone(),
            dev_dependencies: self.get(DEV_DEPENDENCIES_KEY).cloned(),
            license: self.require(LICENSE_KEY)?.clone(),
        })
    }

    /// Write the manifest back to where it was loaded from
    pub fn save(&self) -> Result<()> {
        write_json(&self.path, &self.fields)
    }
}

/// Read the current version from the manifest at `path`
pub fn read_version(path: impl AsRef<Path>) -> Result<Version> {
    Manifest::load(path)?.version()
}

/// Replace the manifest version in place, keeping every other key
pub fn write_version(path: impl AsRef<Path>, version: &Version) -> Result<()> {
    let mut manifest = Manifest::load(path)?;
    manifest.set_version(version);
    manifest.save()
}

/// Write the reduced dependency manifest for container builds to `dest`.
///
/// The source manifest is never modified.
pub fn export_docker_subset(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
) -> Result<DockerManifest> {
    let subset = Manifest::load(source)?.docker_subset()?;
    write_json(dest.as_ref(), &subset)?;
    Ok(subset)
}

/// Serialize with sorted keys, four-space indent and `": "` separators.
///
/// No trailing newline is written.
pub fn to_manifest_bytes<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    // Round-trip through Value so nested objects come out sorted as well.
    serde_json::to_value(value)?.serialize(&mut serializer)?;
    Ok(buf)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = to_manifest_bytes(value).map_err(|e| ReleaseError::manifest_write(path, e))?;
    fs::write(path, content).map_err(|e| ReleaseError::manifest_write(path, e))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
