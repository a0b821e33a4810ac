use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MimeType(pub String);

impl MimeType {
    /// `image/{format}` with the format lowercased.
    pub fn image(format: &str) -> Self {
        Self(format!("image/{}", format.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part after the slash, e.g. `gif` for `image/gif`.
    pub fn subtype(&self) -> &str {
        self.0.split_once('/').map(|(_, sub)| sub).unwrap_or("")
    }

    /// Lowercased last path segment, used as the file extension of scale names.
    pub fn extension(&self) -> String {
        self.0.rsplit('/').next().unwrap_or("").to_lowercase()
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MimeType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MimeType(s.to_string()))
    }
}
