use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use thiserror::Error;
use url::Url;

/// Optional scheme, optional `www.`, `github.com`, then `/owner/repo` with an
/// optional `.git` suffix and trailing slash.
static GITHUB_REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?github\.com/[a-zA-Z0-9-]+/[a-zA-Z0-9._-]+(\.git)?/?$")
        .expect("repository URL pattern must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("The repository URL is required.")]
    Empty,
    /// Not parseable as a URL at all, even with `https://` in front.
    #[error("Please enter a valid URL.")]
    NotUrl,
    #[error("Please enter a valid GitHub repository URL.")]
    InvalidShape,
}

/// A repository URL that passed validation.
///
/// Inputs written without a scheme are stored with `https://` in front so
/// that they can always be parsed as a URL later on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoUrl(String);

impl RepoUrl {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.is_empty() {
            return Err(ValidationError::Empty);
        }
        let normalized = if input.contains("://") {
            input.to_string()
        } else {
            format!("https://{input}")
        };
        if Url::parse(&normalized).is_err() {
            return Err(ValidationError::NotUrl);
        }
        if !GITHUB_REPO_URL.is_match(input) {
            return Err(ValidationError::InvalidShape);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for RepoUrl {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for RepoUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
