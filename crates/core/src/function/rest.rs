//! REST transport for match functions.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use super::{FunctionClient, FunctionError, Match, MatchProfile, Pool, TargetFunction};

/// Wire request for `POST /api/function`.
#[derive(Debug, Serialize)]
struct FunctionRequest<'a> {
    pools: Vec<Pool>,
    config: &'a serde_json::Value,
}

/// Match function client speaking JSON over HTTP.
///
/// The function endpoint is fixed at `/api/function`; the response body is
/// the function's proposed matches as a JSON list.
pub struct RestFunctionClient {
    client: Client,
    name: String,
    url: String,
}

impl RestFunctionClient {
    pub fn new(client: Client, target: &TargetFunction) -> Self {
        Self {
            client,
            name: target.name.clone(),
            url: format!("http://{}:{}/api/function", target.name, target.port),
        }
    }
}

#[async_trait::async_trait]
impl FunctionClient for RestFunctionClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, profile: &MatchProfile) -> Result<Vec<Match>, FunctionError> {
        let request = FunctionRequest {
            pools: profile
                .pools
                .iter()
                .map(|(name, filters)| Pool {
                    name: name.clone(),
                    filters: filters.clone(),
                })
                .collect(),
            config: &profile.config,
        };

        debug!(url = %self.url, pools = request.pools.len(), "calling match function");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FunctionError::Timeout
                } else {
                    FunctionError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, url = %self.url, "match function returned an error status");
            return Err(FunctionError::Unavailable(format!(
                "{status} from {}",
                self.url
            )));
        }

        let matches: Vec<Match> = response
            .json()
            .await
            .map_err(|e| FunctionError::Malformed(e.to_string()))?;

        debug!(function = %self.name, count = matches.len(), "match function returned proposals");
        Ok(matches)
    }
}
