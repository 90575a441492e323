use std::time::Duration;

use game_schema::{GameEvent, GameState};
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::actions::PlayerAction;
use crate::error::{ActionError, TransportError};
use crate::transport::{
    ActionResponse, ActionTransport, FeedFetch, FeedTransport, TaskStatusResponse, TaskTransport,
};

const SESSION_HEADER: &str = "X-Session-Id";

/// HTTP implementation of all three transport seams.
///
/// Cheap to clone: the underlying client is reference-counted, so one
/// transport can serve both pollers and the action client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    session_id: String,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        session_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: session_id.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl FeedTransport for HttpTransport {
    fn fetch_events(
        &self,
        after: Option<u64>,
        validator: Option<&str>,
    ) -> Result<FeedFetch, TransportError> {
        let mut request = self.client.get(self.url("events/feed"));
        if let Some(after) = after {
            request = request.query(&[("after", after.to_string())]);
        }
        if let Some(token) = validator {
            request = request.header(IF_NONE_MATCH, token);
        }
        let response = request.send()?;
        match response.status() {
            StatusCode::NOT_MODIFIED => Ok(FeedFetch::NotModified),
            StatusCode::NOT_FOUND => Ok(FeedFetch::NotFound),
            StatusCode::OK => {
                let validator = response
                    .headers()
                    .get(ETAG)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                let body = response.bytes()?;
                let events: Vec<GameEvent> = serde_json::from_slice(&body)?;
                Ok(FeedFetch::Events { events, validator })
            }
            status => Err(TransportError::Status(status.as_u16())),
        }
    }
}

impl TaskTransport for HttpTransport {
    fn task_status(&self) -> Result<TaskStatusResponse, TransportError> {
        let response = self.client.get(self.url("tasks/status")).send()?;
        if response.status() != StatusCode::OK {
            return Err(TransportError::Status(response.status().as_u16()));
        }
        let body = response.bytes()?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn fetch_state(&self) -> Result<GameState, TransportError> {
        let response = self.client.get(self.url("state")).send()?;
        if response.status() != StatusCode::OK {
            return Err(TransportError::Status(response.status().as_u16()));
        }
        let body = response.bytes()?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Error body an action endpoint returns on rejection.
#[derive(Debug, Deserialize)]
struct ActionRejection {
    #[serde(alias = "error")]
    message: String,
}

impl ActionTransport for HttpTransport {
    fn submit(
        &self,
        action: PlayerAction,
        state: &GameState,
    ) -> Result<ActionResponse, ActionError> {
        let response = self
            .client
            .post(self.url(&format!("actions/{}", action.endpoint())))
            .header(SESSION_HEADER, &self.session_id)
            .json(state)
            .send()
            .map_err(TransportError::from)?;
        let status = response.status();
        if status == StatusCode::OK {
            let body = response.bytes().map_err(TransportError::from)?;
            return Ok(serde_json::from_slice(&body).map_err(TransportError::from)?);
        }
        if status.is_client_error() {
            // A rejection carries a terminal, user-visible message.
            let body = response.bytes().map_err(TransportError::from)?;
            if let Ok(rejection) = serde_json::from_slice::<ActionRejection>(&body) {
                return Err(ActionError::Rejected {
                    message: rejection.message,
                });
            }
        }
        Err(TransportError::Status(status.as_u16()).into())
    }
}
