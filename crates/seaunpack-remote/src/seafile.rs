//! Seafile web API client.
//!
//! Uses the token endpoints of `api2` plus `api/v2.1` for repository details.
//! Download and upload go through one-off links issued by the server.

use std::path::Path;

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::data::{Credentials, RemoteEntry, Repo, RepoDetails};
use crate::error::{RemoteError, Result};
use crate::store::RemoteStore;

/// Authenticated Seafile session.
pub struct SeafileClient {
    client: Client,
    server: Url,
    token: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

impl SeafileClient {
    /// Exchange credentials for an API token.
    pub async fn login(server: &str, credentials: &Credentials) -> Result<Self> {
        let server = base_url(server)?;
        let client = Client::new();
        let url = server.join("api2/auth-token/")?;

        tracing::debug!("requesting token from {url}");
        let response = client
            .post(url)
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Authentication(format!("HTTP {status}: {body}")));
        }

        let TokenResponse { token } = response
            .json()
            .await
            .map_err(|e| RemoteError::Authentication(e.to_string()))?;

        Ok(Self {
            client,
            server,
            token,
        })
    }

    pub fn server(&self) -> &Url {
        &self.server
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.server.join(path)?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(
            reqwest::header::AUTHORIZATION,
            format!("Token {}", self.token),
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, &str)]) -> Result<T> {
        tracing::debug!("GET {url}");
        let response = self
            .authorized(self.client.get(url))
            .query(query)
            .send()
            .await?;
        let response = check_status(response)?;
        response
            .json()
            .await
            .map_err(|e| RemoteError::UnexpectedResponse(e.to_string()))
    }

    /// Resolve one of the endpoints that answer with a bare quoted link.
    async fn link(&self, url: Url, path: &str) -> Result<Url> {
        let link: String = self.get_json(url, &[("p", path)]).await?;
        Url::parse(&link).map_err(|e| RemoteError::UnexpectedResponse(format!("bad link '{link}': {e}")))
    }
}

impl RemoteStore for SeafileClient {
    async fn list_repos(&self) -> Result<Vec<Repo>> {
        self.get_json(self.endpoint("api2/repos/")?, &[]).await
    }

    async fn repo_details(&self, repo_id: &str) -> Result<RepoDetails> {
        let url = self.endpoint(&format!("api/v2.1/repos/{repo_id}/"))?;
        self.get_json(url, &[]).await
    }

    async fn list_dir(&self, repo_id: &str, path: &str) -> Result<Vec<RemoteEntry>> {
        let url = self.endpoint(&format!("api2/repos/{repo_id}/dir/"))?;
        self.get_json(url, &[("p", path)]).await
    }

    async fn download_file(&self, repo_id: &str, remote_path: &str, local_path: &Path) -> Result<()> {
        let url = self.endpoint(&format!("api2/repos/{repo_id}/file/"))?;
        let link = self.link(url, remote_path).await?;

        tracing::debug!("downloading {remote_path} to {}", local_path.display());
        let response = check_status(self.client.get(link).send().await?)?;

        let io_err = |source| RemoteError::Io {
            path: local_path.to_path_buf(),
            source,
        };
        let mut file = tokio::fs::File::create(local_path).await.map_err(io_err)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(io_err)?;
        }
        file.flush().await.map_err(io_err)?;
        Ok(())
    }

    async fn upload_file(&self, repo_id: &str, remote_dir: &str, local_path: &Path) -> Result<()> {
        let url = self.endpoint(&format!("api2/repos/{repo_id}/upload-link/"))?;
        let mut link = self.link(url, remote_dir).await?;
        link.query_pairs_mut().append_pair("ret-json", "1");

        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| RemoteError::NotFound(local_path.display().to_string()))?;
        let io_err = |source| RemoteError::Io {
            path: local_path.to_path_buf(),
            source,
        };
        let file = tokio::fs::File::open(local_path).await.map_err(io_err)?;
        let len = file.metadata().await.map_err(io_err)?.len();

        let part = Part::stream_with_length(reqwest::Body::from(file), len).file_name(file_name);
        let form = Form::new()
            .text("parent_dir", remote_dir.to_string())
            .text("replace", "1")
            .part("file", part);

        tracing::debug!("uploading {} into {remote_dir}", local_path.display());
        let response = self
            .authorized(self.client.post(link))
            .multipart(form)
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }

    async fn create_dir(&self, repo_id: &str, path: &str) -> Result<()> {
        let url = self.endpoint(&format!("api2/repos/{repo_id}/dir/"))?;
        tracing::debug!("mkdir {path}");
        let response = self
            .authorized(self.client.post(url))
            .query(&[("p", path)])
            .form(&[("operation", "mkdir")])
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }
}

/// Parse the server address so relative endpoint joins keep its path prefix.
fn base_url(server: &str) -> Result<Url> {
    let trimmed = server.trim();
    if trimmed.is_empty() {
        return Err(RemoteError::InvalidUrl("server URL is empty".into()));
    }
    let mut url = Url::parse(trimmed)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(RemoteError::NotFound(response.url().path().to_string()));
    }
    Err(RemoteError::Status {
        status: status.as_u16(),
        url: response.url().to_string(),
    })
}
