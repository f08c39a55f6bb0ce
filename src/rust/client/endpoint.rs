use url::Url;

use super::error::ClientError;

/// The backend routes this client knows about.
///
/// Each variant expands to the positional path template
/// `/{version}/...` documented by the backend. Segments are appended to the
/// base URL one by one, so they are percent-encoded as path segments and any
/// path prefix already on the base URL is kept.
///
/// `.` and `..` cannot be carried in a path at all: URL parsing drops them
/// in every spelling, `%2E%2E` included. Such values are refused rather than
/// letting the request land on a shorter route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// `GET /{version}/archs/{workspace_id}/{project_id}`
    ListModels {
        workspace_id: &'a str,
        project_id: &'a str,
    },
    /// `POST /{version}/fit`
    Train,
    /// `GET /{version}/track/{workspace_id}/{project_id}/{version_name}`
    TrainDetails {
        workspace_id: &'a str,
        project_id: &'a str,
        version_name: &'a str,
    },
}

impl<'a> Endpoint<'a> {
    /// Path segments that follow the API version.
    pub fn segments(&self) -> Vec<&'a str> {
        match *self {
            Endpoint::ListModels { workspace_id, project_id } => {
                vec!["archs", workspace_id, project_id]
            }
            Endpoint::Train => vec!["fit"],
            Endpoint::TrainDetails { workspace_id, project_id, version_name } => {
                vec!["track", workspace_id, project_id, version_name]
            }
        }
    }

    /// Builds the absolute URL for this endpoint under `base` and `version`.
    pub fn url(&self, base: &Url, version: &str) -> Result<Url, ClientError> {
        let segments = self.segments();
        if let Some(dot) = std::iter::once(version)
            .chain(segments.iter().copied())
            .find(|s| matches!(*s, "." | ".."))
        {
            return Err(ClientError::DotSegment(dot.to_string()));
        }

        let mut url = base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidBaseUrl(base.to_string()))?;
            path.pop_if_empty();
            path.push(version);
            path.extend(segments);
        }
        Ok(url)
    }
}
