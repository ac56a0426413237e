use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{
    CribRequest, CribResponse, DealResponse, ErrorBody, HealthResponse, ScoreRequest,
    ScoreResponse, ScoringService,
};
use crate::cards::Card;
use crate::config::Config;
use crate::error::{CribError, CribResult};

/// Blocking HTTP client for the scoring service. No retries: a failed
/// request is reported once and left to the caller.
pub struct HttpScoringClient {
    agent: ureq::Agent,
    config: Config,
}

impl HttpScoringClient {
    pub fn new(config: &Config) -> HttpScoringClient {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        HttpScoringClient {
            agent,
            config: config.clone(),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> CribResult<T> {
        debug!("GET {}", url);
        let response = self.agent.get(url).call().map_err(|e| translate(url, e))?;
        read_json(url, response)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> CribResult<T> {
        debug!("POST {}", url);
        let response = self
            .agent
            .post(url)
            .send_json(body)
            .map_err(|e| translate(url, e))?;
        read_json(url, response)
    }
}

impl ScoringService for HttpScoringClient {
    fn deal(&self) -> CribResult<Vec<Card>> {
        let body: DealResponse = self.get_json(&self.config.api_url("deal"))?;
        body.into_cards()
    }

    fn score(&self, request: &ScoreRequest) -> CribResult<ScoreResponse> {
        self.post_json(&self.config.api_url("score"), request)
    }

    fn score_crib(&self, request: &CribRequest) -> CribResult<CribResponse> {
        self.post_json(&self.config.api_url("score/crib"), request)
    }

    fn health(&self) -> CribResult<HealthResponse> {
        self.get_json(&self.config.health_url())
    }
}

fn read_json<T: DeserializeOwned>(url: &str, response: ureq::Response) -> CribResult<T> {
    response.into_json::<T>().map_err(|e| {
        warn!("{}: unreadable body: {}", url, e);
        CribError::MalformedResponse(e.to_string())
    })
}

fn translate(url: &str, err: ureq::Error) -> CribError {
    match err {
        ureq::Error::Status(status, response) => {
            let message = response
                .into_string()
                .ok()
                .and_then(|body| error_message(&body))
                .unwrap_or_else(|| format!("HTTP {}", status));
            warn!("{}: {} {}", url, status, message);
            CribError::Status { status, message }
        }
        ureq::Error::Transport(transport) => {
            warn!("{}: {}", url, transport);
            CribError::Transport(transport.to_string())
        }
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
}
