//! `package.json` model.
//!
//! Field types are strict: a root that is not an object, or a `name` that is
//! not a string, makes the whole manifest invalid. `null` stands for the empty
//! value anywhere a string or collection is expected. `workspaces` degrades to
//! "none" when it has an unexpected shape.

use crate::provider::ProviderError;
use packplan_core::EvidenceView;
use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

pub const MANIFEST_FILE: &str = "package.json";

fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// `{"left-pad": null}` keeps the key with an empty value.
fn deserialize_string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<BTreeMap<String, Option<String>>> = Option::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}

/// Null list items carry nothing and are dropped.
fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default, rename = "type")]
    pub module_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub scripts: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub engines: Engines,
    #[serde(default)]
    pub package_manager: Option<String>,
    #[serde(default)]
    pub workspaces: Workspaces,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub cache_directories: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Engines {
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub npm: Option<String>,
    #[serde(default)]
    pub yarn: Option<String>,
    #[serde(default)]
    pub pnpm: Option<String>,
    #[serde(default)]
    pub bun: Option<String>,
}

/// Workspace globs, from either `["apps/*"]` or `{ "packages": ["apps/*"] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspaces {
    pub packages: Vec<String>,
}

impl<'de> Deserialize<'de> for Workspaces {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        let packages = match value {
            Value::Array(_) => Vec::<String>::deserialize(value).ok(),
            Value::Object(mut map) => map
                .remove("packages")
                .and_then(|packages| Vec::<String>::deserialize(packages).ok()),
            _ => None,
        };

        Ok(Self {
            packages: packages.unwrap_or_default(),
        })
    }
}

/// Declared package manager from the `packageManager` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManagerField {
    pub name: String,
    pub version: Option<String>,
}

impl PackageManagerField {
    /// Split `name@version+hash` into name and clean version.
    pub fn parse(raw: &str) -> Self {
        let (name, rest) = raw.split_once('@').unwrap_or((raw, ""));
        let version = rest.split_once('+').map_or(rest, |(v, _)| v);

        Self {
            name: name.to_string(),
            version: (!version.is_empty()).then(|| version.to_string()),
        }
    }
}

impl PackageJson {
    /// Read and parse the root manifest. A manifest that exists but is not
    /// valid JSON of the expected shape is a hard error.
    pub fn load(evidence: &EvidenceView) -> Result<Self, ProviderError> {
        let content = evidence.read_file(MANIFEST_FILE)?;
        Self::parse(&content)
    }

    pub fn parse(content: &[u8]) -> Result<Self, ProviderError> {
        let invalid = |source: serde_json::Error| ProviderError::Manifest {
            path: MANIFEST_FILE.to_string(),
            source,
        };

        // A derived struct visitor also accepts the sequence form, so the
        // root shape is checked before field mapping.
        let value: Value = serde_json::from_slice(content).map_err(invalid)?;
        if value.is_object() {
            return serde_json::from_value(value).map_err(invalid);
        }

        let unexpected = match &value {
            Value::Object(_) => Unexpected::Map,
            Value::Array(_) => Unexpected::Seq,
            Value::String(s) => Unexpected::Str(s),
            Value::Bool(b) => Unexpected::Bool(*b),
            Value::Number(_) => Unexpected::Other("number"),
            Value::Null => Unexpected::Unit,
        };

        Err(invalid(serde_json::Error::invalid_type(
            unexpected,
            &"a JSON object",
        )))
    }

    /// Presence in either dependency map; version ranges are never interpreted.
    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }

    pub fn has_any_dependency(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.has_dependency(name))
    }

    pub fn dependency_version(&self, name: &str) -> Option<&str> {
        self.dependencies
            .get(name)
            .or_else(|| self.dev_dependencies.get(name))
            .map(String::as_str)
    }

    pub fn has_script(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    pub fn package_manager_field(&self) -> Option<PackageManagerField> {
        self.package_manager
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(PackageManagerField::parse)
    }

    pub fn is_monorepo(&self) -> bool {
        !self.workspaces.packages.is_empty()
    }
}
