use url::Url;

/// Name shown when no repository name can be derived.
pub const UNNAMED_PROJECT: &str = "Unnamed project";

/// Derive a display name from a repository URL: the second path segment
/// without its `.git` suffix, e.g. `bar` for `https://github.com/foo/bar.git`.
pub fn display_name(url: Option<&str>) -> String {
    url.and_then(|raw| Url::parse(raw).ok())
        .and_then(|parsed| {
            parsed
                .path()
                .split('/')
                .filter(|segment| !segment.is_empty())
                .nth(1)
                .map(|segment| segment.strip_suffix(".git").unwrap_or(segment).to_string())
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNNAMED_PROJECT.to_string())
}

/// Where the project view got its URL from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOrigin {
    /// The remembered project on the home route.
    Stored,
    /// The `repoUrl` parameter of the project route.
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    NotFound,
}

/// Everything the project view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOverview {
    pub name: String,
    pub repo_url: Option<String>,
    pub status: ConnectionStatus,
    pub origin: ProjectOrigin,
}

impl ProjectOverview {
    pub fn from_stored(url: &str) -> Self {
        Self::build(Some(url), ProjectOrigin::Stored)
    }

    /// Built straight from the route; the store is not consulted.
    pub fn from_query(url: Option<&str>) -> Self {
        Self::build(url.filter(|url| !url.is_empty()), ProjectOrigin::Query)
    }

    fn build(url: Option<&str>, origin: ProjectOrigin) -> Self {
        Self {
            name: display_name(url),
            repo_url: url.map(str::to_string),
            status: if url.is_some() {
                ConnectionStatus::Connected
            } else {
                ConnectionStatus::NotFound
            },
            origin,
        }
    }

    /// Only the remembered project can be cleared from its view.
    pub fn can_clear(&self) -> bool {
        self.origin == ProjectOrigin::Stored
    }
}

/// Open the repository page in the system browser.
pub fn open_repository(url: &str) -> std::io::Result<()> {
    tracing::debug!(%url, "Opening repository in browser");
    open::that_detached(url)
}
