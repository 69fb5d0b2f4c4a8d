//! Resolution of authentication links on the home document.

use serde_json::Value;
use tokio::sync::Mutex;

use crate::clients::{HttpClient, HttpMethod};
use crate::config::HostUrl;
use crate::error::{Error, UsageError};
use crate::hypermedia::{ApiContext, Document};

/// The auth links of one API host, backed by its home document.
///
/// The home document is fetched on first use unless one was supplied.
#[derive(Debug)]
pub(crate) struct AuthEndpoint {
    host: HostUrl,
    http: HttpClient,
    home: Mutex<Option<Document>>,
}

impl AuthEndpoint {
    pub(crate) fn new(host: HostUrl, http: HttpClient, home: Option<Document>) -> Self {
        Self {
            host,
            http,
            home: Mutex::new(home),
        }
    }

    pub(crate) const fn host(&self) -> &HostUrl {
        &self.host
    }

    pub(crate) const fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Returns the home document, fetching it if needed.
    ///
    /// A home document that isn't there means the host is not an API.
    pub(crate) async fn home(&self) -> Result<Document, Error> {
        let mut home = self.home.lock().await;
        if let Some(doc) = home.as_ref() {
            return Ok(doc.clone());
        }

        // Fetched without a token: the token itself is issued through this document.
        let url = self.host.as_ref();
        let body = match self
            .http
            .bearer_request(HttpMethod::Get, url, None, None)
            .await
        {
            Ok(response) => response.into_body(),
            Err(Error::NotFound(mut e)) => {
                e.message = "Host not found".to_string();
                return Err(Error::Host(e));
            }
            Err(e) => return Err(e),
        };
        let doc = Document::from_body(
            Some(url.to_string()),
            body,
            ApiContext::new(self.http.clone()),
        );
        *home = Some(doc.clone());
        Ok(doc)
    }

    /// Returns the home document if it has been loaded.
    pub(crate) async fn cached_home(&self) -> Option<Document> {
        self.home.lock().await.clone()
    }

    /// Resolves the auth link `urn` to a method and URL.
    ///
    /// `data` only matters for templated links. The method is the first
    /// allowed method hint, or GET.
    pub(crate) async fn resolve(
        &self,
        urn: &str,
        data: &Value,
    ) -> Result<(HttpMethod, String), Error> {
        let home = self.home().await?;
        let link = home.auth(urn).ok_or_else(|| UsageError::MissingAuthLink {
            urn: urn.to_string(),
        })?;
        Ok((link.method()?, link.expand(data)?))
    }

    /// Issues a Basic-authenticated request against the auth link `urn`.
    pub(crate) async fn request(
        &self,
        urn: &str,
        data: &Value,
        basic_auth: &str,
    ) -> Result<Value, Error> {
        let (method, url) = self.resolve(urn, data).await?;
        let response = self
            .http
            .basic_request(method, &url, basic_auth, Some(data))
            .await?;
        Ok(response.into_body())
    }
}
