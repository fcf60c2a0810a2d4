//! Manifest entry types and serde defaults.

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How new branches are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Local `git checkout -b` followed by a push (default).
    #[default]
    Git,
    /// Branch created through the review server's REST API.
    Api,
}

impl StrategyKind {
    /// Parse a strategy from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "git" => Some(Self::Git),
            "api" => Some(Self::Api),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Api => "api",
        }
    }
}

/// The distinguished core repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreRepository {
    /// Path of the core repository relative to `repo_path`.
    pub name: String,
    /// File holding the version marker, relative to the core checkout.
    pub settings_file: String,
    /// Variable assigned the version string (without the `$` sigil).
    pub version_variable: String,
}

impl Default for CoreRepository {
    fn default() -> Self {
        Self {
            name: "core".to_string(),
            settings_file: "includes/DefaultSettings.php".to_string(),
            version_variable: "wgVersion".to_string(),
        }
    }
}

/// A dependent repository and the branch it is cloned from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RepositoryEntry")]
pub struct Repository {
    pub name: String,
    pub branch: String,
}

/// Manifest spelling of a repository: a bare name or `{ name, branch }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RepositoryEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default = "default_branch")]
        branch: String,
    },
}

impl From<RepositoryEntry> for Repository {
    fn from(entry: RepositoryEntry) -> Self {
        match entry {
            RepositoryEntry::Name(name) => Repository {
                name,
                branch: default_branch(),
            },
            RepositoryEntry::Detailed { name, branch } => Repository { name, branch },
        }
    }
}

/// A repository branched from an explicitly declared source branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialRepository {
    pub name: String,
    pub branch: String,
}

/// Review-server connection settings for the API strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReviewServer {
    /// Base URL of the REST API, e.g. `https://gerrit.example.org/r`.
    pub url: String,
    pub username: Option<String>,
    /// Environment variable holding the HTTP password.
    pub password_env: Option<String>,
}

/// Deserialize `name: branch` pairs keeping declaration order.
pub(crate) fn ordered_specials<'de, D>(deserializer: D) -> Result<Vec<SpecialRepository>, D::Error>
where
    D: Deserializer<'de>,
{
    struct SpecialsVisitor;

    impl<'de> Visitor<'de> for SpecialsVisitor {
        type Value = Vec<SpecialRepository>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of repository name to source branch")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut out = Vec::new();
            while let Some((name, branch)) = map.next_entry::<String, String>()? {
                out.push(SpecialRepository { name, branch });
            }
            Ok(out)
        }

        // Legacy manifests write an empty map as an empty array.
        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            if seq.next_element::<de::IgnoredAny>()?.is_some() {
                return Err(de::Error::custom(
                    "special repositories must be a map of name to branch",
                ));
            }
            Ok(Vec::new())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(SpecialsVisitor)
}

/// Deserialize a map whose values are a single submodule path or a list.
pub(crate) fn submodule_lists<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    // Legacy manifests write an empty map as `[]`.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lists {
        Map(BTreeMap<String, OneOrMany>),
        Empty(Vec<de::IgnoredAny>),
    }

    let raw = match Option::<Lists>::deserialize(deserializer)? {
        Some(Lists::Map(map)) => map,
        Some(Lists::Empty(items)) if items.is_empty() => BTreeMap::new(),
        Some(Lists::Empty(_)) => {
            return Err(de::Error::custom(
                "submodules must be a map of repository to submodule paths",
            ));
        }
        None => BTreeMap::new(),
    };
    Ok(raw
        .into_iter()
        .map(|(repo, subs)| {
            let subs = match subs {
                OneOrMany::One(s) => vec![s],
                OneOrMany::Many(v) => v,
            };
            (repo, subs)
        })
        .collect())
}

// Default value functions for serde
pub(crate) fn default_branch() -> String {
    "master".to_string()
}
