use restsh_core::ast::HttpMethod;
use restsh_core::client::{ConnectOptions, Connector, HttpClient, HttpResponse};
use restsh_core::error::ClientError;
use tracing::debug;

/// A connection backed by the `reqwest` blocking client.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
    options: ConnectOptions,
    base: reqwest::Url,
}

impl ReqwestClient {
    pub fn new(options: ConnectOptions) -> Result<Self, ClientError> {
        let host = options.hosts.first().ok_or_else(|| ClientError::InvalidOption {
            name: "hosts".to_string(),
            reason: "at least one host is required".to_string(),
        })?;
        let base = reqwest::Url::parse(host).map_err(|e| ClientError::InvalidOption {
            name: "hosts".to_string(),
            reason: format!("{}: {}", host, e),
        })?;
        Ok(Self {
            client: reqwest::blocking::Client::new(),
            options,
            base,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }
}

impl HttpClient for ReqwestClient {
    fn perform_request(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&str>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, ClientError> {
        let url = self.url(path);
        debug!(%method, %url, "sending request");
        let mut builder = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        if let Some(username) = &self.options.username {
            builder = builder.basic_auth(username, self.options.password.as_ref());
        }
        if let Some(key) = &self.options.api_key {
            builder = builder.header("Authorization", format!("ApiKey {}", key));
        }
        for (k, v) in headers {
            builder = builder.header(k.as_str(), v.as_str());
        }

        if let Some(body) = payload {
            let content_type = if body.lines().count() > 1 {
                "application/x-ndjson"
            } else {
                "application/json"
            };
            builder = builder
                .header("Content-Type", content_type)
                .body(body.to_string());
        }

        let response = builder
            .send()
            .map_err(|e| ClientError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let mut out_headers = Vec::new();
        for (k, v) in response.headers() {
            out_headers.push((
                k.as_str().to_string(),
                v.to_str().unwrap_or("(binary)").to_string(),
            ));
        }

        let body = response
            .text()
            .map_err(|e| ClientError::Request(format!("failed to read response body: {}", e)))?;

        Ok(HttpResponse {
            status,
            headers: out_headers,
            body,
        })
    }

    fn describe(&self) -> String {
        self.options.hosts.join(",")
    }
}

/// Opens [`ReqwestClient`] connections for the `connect` function.
#[derive(Debug, Default)]
pub struct ReqwestConnector;

impl Connector for ReqwestConnector {
    fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn HttpClient>, ClientError> {
        Ok(Box::new(ReqwestClient::new(options.clone())?))
    }
}
