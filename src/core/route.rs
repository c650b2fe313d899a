use thiserror::Error;
use url::{Url, form_urlencoded};

const ROUTE_BASE: &str = "repoimport://app/";
pub const PROJECT_PATH: &str = "/project";
pub const REPO_URL_PARAM: &str = "repoUrl";

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Malformed route {location:?}: {source}")]
    Malformed {
        location: String,
        source: url::ParseError,
    },
    #[error("No page at {0:?}")]
    NotFound(String),
}

/// The two places the application can be.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    /// Import form, or the remembered project if there is one.
    #[default]
    Home,
    /// A project given directly by URL, bypassing the store.
    Project { repo_url: Option<String> },
}

impl Route {
    pub fn project(repo_url: impl Into<String>) -> Self {
        Route::Project {
            repo_url: Some(repo_url.into()),
        }
    }

    /// Parse a location such as `/` or `/project?repoUrl=...`.
    pub fn parse(location: &str) -> Result<Self, RouteError> {
        let malformed = |source| RouteError::Malformed {
            location: location.to_string(),
            source,
        };
        let parsed = Url::parse(ROUTE_BASE)
            .and_then(|base| base.join(location))
            .map_err(malformed)?;

        match parsed.path().trim_end_matches('/') {
            "" => Ok(Route::Home),
            PROJECT_PATH => {
                let repo_url = parsed
                    .query_pairs()
                    .find(|(name, _)| name == REPO_URL_PARAM)
                    .map(|(_, value)| value.into_owned());
                Ok(Route::Project { repo_url })
            }
            other => Err(RouteError::NotFound(other.to_string())),
        }
    }

    pub fn to_location(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Project { repo_url: None } => PROJECT_PATH.to_string(),
            Route::Project {
                repo_url: Some(repo_url),
            } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(REPO_URL_PARAM, repo_url)
                    .finish();
                format!("{PROJECT_PATH}?{query}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_home() {
        assert_eq!(Route::parse("/").unwrap(), Route::Home);
        assert_eq!(Route::parse("").unwrap(), Route::Home);
    }

    #[test]
    fn parses_project_query() {
        assert_eq!(
            Route::parse("/project?repoUrl=https://github.com/foo/bar").unwrap(),
            Route::project("https://github.com/foo/bar")
        );
        assert_eq!(
            Route::parse("/project/?repoUrl=https%3A%2F%2Fgithub.com%2Ffoo%2Fbar.git").unwrap(),
            Route::project("https://github.com/foo/bar.git")
        );
        assert_eq!(
            Route::parse("/project").unwrap(),
            Route::Project { repo_url: None }
        );
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert!(matches!(
            Route::parse("/settings"),
            Err(RouteError::NotFound(path)) if path == "/settings"
        ));
    }

    #[test]
    fn location_round_trips() {
        let route = Route::project("https://github.com/foo/bar?x=1&y=2");
        assert_eq!(Route::parse(&route.to_location()).unwrap(), route);
        assert_eq!(Route::Home.to_location(), "/");
    }
}
