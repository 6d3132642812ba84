use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::info;
use report_core::{DailyReport, RangePreset};
use reqwest::{Client, Proxy, Url};
use serde_json::Value;

use crate::client_trait::AdminApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::sources::EntitySource;
use crate::utils::http_utils::{execute_get, read_json};

const DAILY_REPORT_PATH: &str = "admin/call-logs/reports/daily";

/// reqwest-backed client for the admin API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct AdminClient {
    client: Arc<Client>,
    base_url: Url,
    auth_token: Option<String>,
}

impl AdminClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Self::build_http_client(config)?;
        let base_url = Self::normalize_base(&config.api_base)?;
        info!("Admin client targeting {}", base_url);

        Ok(Self {
            client: Arc::new(client),
            base_url,
            auth_token: config
                .auth_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
        })
    }

    fn build_http_client(config: &ClientConfig) -> ClientResult<Client> {
        // Proxies come from the config only, never from ambient system settings.
        let mut builder = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(config.timeout_secs));
        if !config.http_proxy.is_empty() {
            builder = builder.proxy(Proxy::http(&config.http_proxy).map_err(ClientError::Build)?);
        }
        if !config.https_proxy.is_empty() {
            builder = builder.proxy(Proxy::https(&config.https_proxy).map_err(ClientError::Build)?);
        }
        builder.build().map_err(ClientError::Build)
    }

    // Url::join drops the last path segment unless the base ends with '/'.
    fn normalize_base(api_base: &str) -> ClientResult<Url> {
        let trimmed = api_base.trim();
        if trimmed.ends_with('/') {
            Ok(Url::parse(trimmed)?)
        } else {
            Ok(Url::parse(&format!("{trimmed}/"))?)
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        let response = execute_get(&self.client, url, self.auth_token.as_deref()).await?;
        read_json(response).await
    }
}

#[async_trait]
impl AdminApi for AdminClient {
    async fn fetch_entities(&self, source: EntitySource) -> ClientResult<Value> {
        let url = self.endpoint(source.path())?;
        self.get_json(url).await
    }

    async fn fetch_daily_report(
        &self,
        preset: RangePreset,
        service_id: Option<u64>,
    ) -> ClientResult<DailyReport> {
        let mut url = self.endpoint(DAILY_REPORT_PATH)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("range", preset.id());
            if let Some(service_id) = service_id {
                query.append_pair("serviceId", &service_id.to_string());
            }
        }
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(api_base: &str) -> AdminClient {
        AdminClient::new(&ClientConfig::default().with_api_base(api_base)).expect("client builds")
    }

    #[test]
    fn endpoints_keep_the_base_path() {
        let client = client_for("https://example.com/api");
        assert_eq!(
            client.endpoint("admin/orders").expect("url").as_str(),
            "https://example.com/api/admin/orders"
        );
        assert_eq!(
            client.endpoint("/admin/users").expect("url").as_str(),
            "https://example.com/api/admin/users"
        );
    }

    #[test]
    fn trailing_slash_is_not_doubled() {
        let client = client_for("https://example.com/api/");
        assert_eq!(client.base_url().as_str(), "https://example.com/api/");
    }

    #[test]
    fn invalid_base_is_rejected() {
        let result = AdminClient::new(&ClientConfig::default().with_api_base("not a url"));
        assert!(matches!(result, Err(ClientError::Url(_))));
    }

    #[test]
    fn blank_token_is_not_sent() {
        let config = ClientConfig::default().with_auth_token("   ");
        let client = AdminClient::new(&config).expect("client builds");
        assert!(client.auth_token.is_none());
    }
}
