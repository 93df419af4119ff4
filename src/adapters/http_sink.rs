//! Local HTTP API sink adapter.
//!
//! Implements [`SinkPort`] by POSTing each reading as JSON to the node's
//! local API.  The request is blocking (`ureq`): the poll loop runs one
//! request per minute against localhost, bounded by the configured
//! timeout, so it never holds the executor for long.

use core::time::Duration;

use log::debug;

use crate::app::ports::SinkPort;
use crate::app::reading::SensorReading;
use crate::error::SinkError;

pub struct HttpSink {
    agent: ureq::Agent,
    url: String,
}

impl HttpSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SinkPort for HttpSink {
    async fn post(&mut self, reading: SensorReading) -> Result<(), SinkError> {
        let body = serde_json::to_string(&reading).map_err(|_| SinkError::Serialize)?;
        match self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_string(&body)
        {
            Ok(response) => {
                debug!("Sink: {} -> {}", self.url, response.status());
                Ok(())
            }
            Err(ureq::Error::Status(code, _)) => Err(SinkError::Status(code)),
            Err(ureq::Error::Transport(transport)) => {
                debug!("Sink: {} transport error: {}", self.url, transport);
                Err(SinkError::Transport)
            }
        }
    }
}
