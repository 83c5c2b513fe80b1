// Remote service boundary: a small blocking HTTP client for the cloud-disk
// REST API, behind the `DiskApi` trait so the upload workflow can be driven
// against an in-memory disk in tests.

use crate::error::{Error, Result};
use reqwest::blocking::{Body, Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

pub const DEFAULT_API_URL: &str = "https://cloud-api.yandex.net/v1/disk";

/// The five calls the uploader needs from the storage service.
///
/// Implementations classify responses themselves: `Ok` means the service
/// reported success for that step, anything else is an `Err` the caller may
/// retry.
pub trait DiskApi {
    /// Create the folder at `path`, or confirm that it already exists.
    fn create_folder(&self, path: &str) -> Result<()>;

    /// Ask for a time-limited upload endpoint for `path`. An existing file at
    /// that path is overwritten.
    fn upload_target(&self, path: &str) -> Result<String>;

    /// Stream the bytes of `file` to an endpoint from [`DiskApi::upload_target`].
    fn transfer(&self, target: &str, file: &Path) -> Result<()>;

    /// Make the resource at `path` publicly accessible.
    fn publish(&self, path: &str) -> Result<()>;

    /// Public link of the published resource at `path`.
    fn public_url(&self, path: &str) -> Result<String>;
}

/// Upload endpoint returned by `GET /resources/upload`.
#[derive(Deserialize, Debug)]
struct Link {
    href: Option<String>,
}

/// The part of the resource metadata we care about.
#[derive(Deserialize, Debug)]
struct Resource {
    public_url: Option<String>,
}

/// Blocking client holding the reqwest client, the API base URL and the
/// OAuth token sent with every API call.
#[derive(Clone)]
pub struct DiskClient {
    client: Client,
    base_url: String,
    token: String,
}

impl DiskClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(DiskClient {
            client,
            base_url,
            token: token.into(),
        })
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let val = HeaderValue::from_str(&format!("OAuth {}", self.token))
            .map_err(|_| Error::Config("access token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, val);
        Ok(headers)
    }

    fn api(&self, method: reqwest::Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = format!("{}{}", self.base_url, endpoint);
        Ok(self.client.request(method, url).headers(self.auth_headers()?))
    }

    /// Turn a response into `Ok` when its status is one of `accepted`.
    fn check(
        res: Response,
        accepted: &[u16],
        operation: &'static str,
        path: &str,
    ) -> Result<Response> {
        let status = res.status().as_u16();
        log::debug!("{operation} {path}: HTTP {status}");
        if accepted.contains(&status) {
            return Ok(res);
        }
        let body = res.text().unwrap_or_default();
        Err(Error::Status {
            operation,
            path: path.to_string(),
            status,
            body,
        })
    }
}

impl DiskApi for DiskClient {
    fn create_folder(&self, path: &str) -> Result<()> {
        let res = self
            .api(reqwest::Method::PUT, "/resources")?
            .query(&[("path", path)])
            .send()?;
        // 409: the folder is already there
        Self::check(res, &[201, 409], "create folder", path)?;
        Ok(())
    }

    fn upload_target(&self, path: &str) -> Result<String> {
        let res = self
            .api(reqwest::Method::GET, "/resources/upload")?
            .query(&[("path", path), ("overwrite", "true")])
            .send()?;
        let link: Link = Self::check(res, &[200, 201], "request upload link", path)?.json()?;
        link.href.filter(|h| !h.is_empty()).ok_or(Error::MissingField {
            operation: "request upload link",
            path: path.to_string(),
            field: "href",
        })
    }

    fn transfer(&self, target: &str, file: &Path) -> Result<()> {
        let f = File::open(file).map_err(|e| Error::io(file, e))?;
        // pre-signed endpoint: no Authorization header
        let res = self.client.put(target).body(Body::from(f)).send()?;
        Self::check(res, &[200, 201], "transfer", &file.display().to_string())?;
        Ok(())
    }

    fn publish(&self, path: &str) -> Result<()> {
        let res = self
            .api(reqwest::Method::PUT, "/resources/publish")?
            .query(&[("path", path)])
            .send()?;
        Self::check(res, &[200, 201], "publish", path)?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> Result<String> {
        let res = self
            .api(reqwest::Method::GET, "/resources")?
            .query(&[("path", path), ("fields", "public_url")])
            .send()?;
        let resource: Resource = Self::check(res, &[200, 201], "fetch metadata", path)?.json()?;
        resource.public_url.ok_or(Error::MissingField {
            operation: "fetch metadata",
            path: path.to_string(),
            field: "public_url",
        })
    }
}
