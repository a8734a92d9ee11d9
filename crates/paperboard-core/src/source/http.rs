use std::time::Duration;

use super::{ShardSource, SourceFuture};
use crate::CatalogError;

/// Reads catalog files over HTTP(S) from a static base URL.
pub struct HttpSource {
    base: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(base: &str, timeout: Option<Duration>) -> Result<Self, CatalogError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("paperboard/", env!("CARGO_PKG_VERSION")));
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            base,
            client: builder.build()?,
        })
    }

    fn url_for(&self, file: &str) -> String {
        format!("{}{}", self.base, file)
    }
}

impl ShardSource for HttpSource {
    fn describe(&self) -> String {
        self.base.clone()
    }

    fn fetch<'a>(&'a self, file: &'a str) -> SourceFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let url = self.url_for(file);
            tracing::debug!(url = %url, "GET");
            let resp = self.client.get(&url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(CatalogError::Status {
                    url,
                    status: status.as_u16(),
                });
            }
            Ok(resp.bytes().await?.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_gets_trailing_slash() {
        let src = HttpSource::new("https://example.org/data", None).unwrap();
        assert_eq!(src.url_for("index.json"), "https://example.org/data/index.json");

        let src = HttpSource::new("https://example.org/data/", Some(Duration::from_secs(5))).unwrap();
        assert_eq!(src.url_for("2024-01.json"), "https://example.org/data/2024-01.json");
    }
}
