use serde::{Deserialize, Deserializer, Serialize, Serializer};
use crate::errors::RemediatorError;

/// An `owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: &str, name: &str) -> Result<Self, RemediatorError> {
        for part in [owner, name] {
            // A dots-only segment would walk out of the /repos/ path
            if part.is_empty() || !part.chars().all(is_repo_char) || part.chars().all(|c| c == '.') {
                return Err(RemediatorError::Config(format!(
                    "Invalid repository '{}/{}': expected owner/name",
                    owner, name
                )));
            }
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

fn is_repo_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

impl std::str::FromStr for Repository {
    type Err = RemediatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name)) => Repository::new(owner, name),
            None => Err(RemediatorError::Config(format!(
                "Invalid repository '{}': expected owner/name",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl Serialize for Repository {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Repository {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
