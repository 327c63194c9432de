//! reqwest-backed [`DataFetcher`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, warn};

use bus_radar_transit::{DataFetcher, Result, TransitError};

#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bus-radar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransitError::DataUnavailable(format!("could not build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl DataFetcher for HttpFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.client.get(url).send().await.map_err(|e| {
                warn!(url, error = %e, "request failed");
                TransitError::DataUnavailable(e.to_string())
            })?;

            let status = response.status();
            debug!(url, %status, "response");
            if !status.is_success() {
                return Err(TransitError::HttpStatus {
                    url: url.to_owned(),
                    status: status.as_u16(),
                });
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| TransitError::DataUnavailable(e.to_string()))?;
            Ok(body.to_vec())
        })
    }
}
