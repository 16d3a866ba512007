use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use futures::StreamExt;
use hex::FromHex;
use hyper::{Body, Client, Request, Response, StatusCode, Uri};
use hyper::body::to_bytes;
use hyper::client::HttpConnector;
use hyper::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_LENGTH, USER_AGENT};
use hyper_tls::HttpsConnector;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs::{remove_file, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

use crate::config::RepositoryConfig;
use crate::util::fetcher::{FetchError, Fetcher};
use crate::util::validating_http_body::{Checksum, ValidatingHttpBody};

/// Talks to Nexus: fetches listings into memory and downloads artifacts to disk, checking the
///  downloaded data against a checksum if the server sends one in a header.
///
/// Instances do HTTP connection caching internally, so one instance should serve all requests
///  of a run.
pub struct ValidatingHttpDownloader {
    client: Client<HttpsConnector<HttpConnector>>,
    user_agent: HeaderValue,
    authorization: Option<HeaderValue>,
    timeout: Duration,
    quiet: bool,
}
impl ValidatingHttpDownloader {
    pub fn new(config: &RepositoryConfig, quiet: bool) -> anyhow::Result<ValidatingHttpDownloader> {
        let authorization = match &config.credentials {
            Some(c) => {
                let encoded = BASE64.encode(format!("{}:{}", c.username, c.password));
                let mut value = HeaderValue::try_from(format!("Basic {}", encoded))?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };

        Ok(ValidatingHttpDownloader {
            client: Client::builder()
                .build::<_, Body>(HttpsConnector::new()),
            user_agent: HeaderValue::try_from(config.user_agent.as_str())?,
            authorization,
            timeout: config.timeout,
            quiet,
        })
    }

    async fn get(&self, uri: &str, accept: Option<&'static str>) -> Result<Response<Body>, FetchError> {
        let parsed_uri = Uri::try_from(uri)
            .map_err(|e| FetchError::Transport(format!("not a valid URI {:?}: {}", uri, e)))?;

        let mut builder = Request::builder()
            .method("GET")
            .uri(parsed_uri)
            .header(USER_AGENT, self.user_agent.clone());
        if let Some(accept) = accept {
            builder = builder.header(ACCEPT, accept);
        }
        if let Some(authorization) = &self.authorization {
            builder = builder.header(AUTHORIZATION, authorization.clone());
        }
        let request = builder.body(Body::empty())
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        trace!("getting {:?}", request);

        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| FetchError::Timeout { uri: uri.to_string() })?
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        debug!("GET {} -> {}", uri, status);
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound { uri: uri.to_string() });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                message: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Ok(response)
    }

    /// Downloads `uri` to `destination`. A partially written file is removed if the download
    ///  fails.
    pub async fn download(&self, uri: &str, name: &str, destination: &Path) -> anyhow::Result<()> {
        if !self.quiet {
            println!("Fetching {}", name);
        }

        let response = self.get(uri, None).await?;

        let checksums = expected_checksums(response.headers());
        let content_length = response.headers().get(CONTENT_LENGTH)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let progress = match content_length {
            Some(len) if !self.quiet => {
                let bar = ProgressBar::new(len);
                bar.set_style(ProgressStyle::with_template("Downloading... {bar:40} {percent:>3}%")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()));
                Some(bar)
            }
            _ => None,
        };

        let body = ValidatingHttpBody::new(response.into_body(), checksums);
        let result = write_to_file(body, destination, progress.as_ref()).await;
        if let Some(bar) = progress {
            bar.finish();
        }

        if let Err(e) = result {
            if let Err(cleanup) = remove_file(destination).await {
                warn!("failed to remove partial download {}: {}", destination.display(), cleanup);
            }
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl Fetcher for ValidatingHttpDownloader {
    async fn fetch(&self, uri: &str) -> Result<Bytes, FetchError> {
        if !self.quiet {
            println!("Fetching {}", uri);
        }

        let response = self.get(uri, Some("application/xml")).await?;
        tokio::time::timeout(self.timeout, to_bytes(response.into_body()))
            .await
            .map_err(|_| FetchError::Timeout { uri: uri.to_string() })?
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}

async fn write_to_file(mut body: ValidatingHttpBody, destination: &Path, progress: Option<&ProgressBar>) -> anyhow::Result<()> {
    let mut file = File::create(destination).await?;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        if let Some(bar) = progress {
            bar.inc(chunk.len() as u64);
        }
    }
    file.flush().await?;
    Ok(())
}

/// Collects the checksums a server announces in the response headers. Headers that do not hold a
///  well-formed checksum are ignored.
fn expected_checksums(headers: &HeaderMap) -> Vec<Checksum> {
    let mut checksums = vec![];

    let sha1_string = headers.get("x-checksum-sha1")
        .or_else(|| headers.get("etag"))
        .and_then(|h| h.to_str().ok())
        .map(unwrap_etag);
    if let Some(sha1) = sha1_string {
        match <[u8; 20]>::from_hex(sha1) {
            Ok(expected_hash) => checksums.push(Checksum::Sha1(expected_hash)),
            Err(_) => warn!("ignoring unparseable SHA1 checksum {:?}", sha1),
        }
    }

    let md5_string = headers.get("x-checksum-md5")
        .and_then(|h| h.to_str().ok());
    if let Some(md5) = md5_string {
        match <[u8; 16]>::from_hex(md5) {
            Ok(expected_hash) => checksums.push(Checksum::Md5(expected_hash)),
            Err(_) => warn!("ignoring unparseable MD5 checksum {:?}", md5),
        }
    }

    checksums
}

/// strips quotes and Nexus' `{SHA1{...}}` wrapper from an ETag
fn unwrap_etag(s: &str) -> &str {
    let s = s.trim_matches('"');
    s.strip_prefix("{SHA1{")
        .and_then(|s| s.strip_suffix("}}"))
        .unwrap_or(s)
}
