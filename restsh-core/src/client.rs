use crate::ast::HttpMethod;
use crate::error::ClientError;

/// Output of a completed HTTP request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// A connection to one cluster.
/// The host implements this trait so the VM stays independent of any HTTP library.
pub trait HttpClient {
    /// Send one request. `path` is relative to the connection's base URL and
    /// `payload` is newline-delimited JSON when present.
    fn perform_request(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&str>,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, ClientError>;

    /// Short human-readable description, e.g. the host list.
    fn describe(&self) -> String;
}

/// Settings for a new connection, as given to the `connect` function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    pub hosts: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
}

/// Opens new connections on behalf of the VM.
pub trait Connector {
    fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn HttpClient>, ClientError>;
}
