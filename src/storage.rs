// S3 client: wraps a `rust-s3` bucket handle and a current-thread tokio
// runtime so the pipeline can drive it as plain blocking calls.

use crate::config::Config;
use crate::error::{Result, ShareError};
use crate::store::{ObjectStore, ProgressReader, ProgressSink, RemoteObject};
use reqwest::StatusCode;
use ::s3::bucket::Bucket;
use ::s3::creds::Credentials;
use ::s3::Region;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

const PUBLIC_READ: &str = "public-read";

/// How the bucket appears in request URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// `https://host/bucket/key`
    PathStyle,
    /// `https://bucket.host/key`
    VirtualHosted,
}

impl Addressing {
    /// Dotted bucket names get virtual-hosted addressing, everything else
    /// path-style.
    pub fn for_bucket(bucket: &str) -> Self {
        if bucket.contains('.') {
            Addressing::VirtualHosted
        } else {
            Addressing::PathStyle
        }
    }

    /// Virtual-hosted names with dots do not match the service's wildcard
    /// certificate, so verification has to be relaxed for them.
    pub fn needs_relaxed_tls(self) -> bool {
        self == Addressing::VirtualHosted
    }
}

/// Where a bucket lives and how its objects are addressed.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub host: String,
    pub bucket: String,
    pub addressing: Addressing,
    pub secure: bool,
}

impl Endpoint {
    pub fn from_config(config: &Config) -> Self {
        Endpoint {
            host: config.host.clone(),
            bucket: config.bucket_name.clone(),
            addressing: Addressing::for_bucket(&config.bucket_name),
            secure: config.is_secure,
        }
    }

    /// Service endpoint handed to the client, e.g. `https://s3.amazonaws.com`.
    pub fn service_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}", scheme, self.host)
    }

    /// Public link for `key`: plain http, no query authentication.
    pub fn public_url(&self, key: &str) -> String {
        let key = encode_key(key);
        match self.addressing {
            Addressing::PathStyle => format!("http://{}/{}/{}", self.host, self.bucket, key),
            Addressing::VirtualHosted => format!("http://{}.{}/{}", self.bucket, self.host, key),
        }
    }
}

/// Percent-encode each path segment of an object key.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Blocking client bound to one bucket.
pub struct S3Client {
    runtime: Runtime,
    /// Handle for lookups.
    bucket: Box<Bucket>,
    /// Same bucket, with the public-read ACL header on every request.
    writer: Box<Bucket>,
    endpoint: Endpoint,
}

impl S3Client {
    /// Build a client for the configured bucket. Relaxed certificate
    /// verification, when needed, applies to this bucket handle only.
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = Endpoint::from_config(config);
        let setup_err = |e: &dyn std::fmt::Display| ShareError::ClientSetup(e.to_string());

        let credentials = match config.credentials() {
            Some(c) => Credentials::new(
                Some(&c.access_key_id),
                Some(&c.secret_access_key),
                c.session_token.as_deref(),
                None,
                None,
            ),
            None => {
                debug!("no credentials found, sending anonymous requests");
                Credentials::anonymous()
            }
        }
        .map_err(|e| setup_err(&e))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: endpoint.service_url(),
        };
        let bucket = Bucket::new(&endpoint.bucket, region, credentials).map_err(|e| setup_err(&e))?;

        let bucket = if endpoint.addressing.needs_relaxed_tls() {
            if endpoint.secure {
                warn!(
                    bucket = %endpoint.bucket,
                    "bucket name contains dots; TLS certificate verification is disabled for this session"
                );
            }
            Box::new(bucket.set_dangereous_config(true, true).map_err(|e| setup_err(&e))?)
        } else {
            bucket.with_path_style()
        };

        let mut writer = bucket.clone();
        writer.add_header("x-amz-acl", PUBLIC_READ);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| setup_err(&e))?;

        Ok(S3Client { runtime, bucket, writer, endpoint })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Check that the bucket exists and is reachable with our credentials.
    pub fn resolve_bucket(&self) -> Result<()> {
        let (_, status) = self.runtime.block_on(self.bucket.head_object("/"))?;
        debug!(status, bucket = %self.endpoint.bucket, "bucket lookup");
        match status {
            200..=299 => Ok(()),
            404 => Err(ShareError::BucketNotFound(self.endpoint.bucket.clone())),
            403 => Err(ShareError::CredentialsInvalid),
            _ => Err(service_error(status, "")),
        }
    }

    fn uploaded(&self, key: &str, size: u64, content_type: &str) -> RemoteObject {
        info!(key, size, "uploaded object");
        RemoteObject {
            key: key.to_string(),
            size,
            content_type: content_type.to_string(),
            url: self.endpoint.public_url(key),
        }
    }
}

impl ObjectStore for S3Client {
    fn exists(&self, key: &str) -> Result<bool> {
        let (_, status) = self.runtime.block_on(self.bucket.head_object(key))?;
        match status {
            200..=299 => Ok(true),
            404 => Ok(false),
            403 => Err(ShareError::CredentialsInvalid),
            _ => Err(service_error(status, "")),
        }
    }

    fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<RemoteObject> {
        let local_err = |source: std::io::Error| ShareError::LocalIo { path: path.to_path_buf(), source };
        let size = std::fs::metadata(path).map_err(local_err)?.len();

        let response = self.runtime.block_on(async {
            let file = tokio::fs::File::open(path).await.map_err(local_err)?;
            let mut reader = ProgressReader::new(file, size, progress.clone());
            let response = self
                .writer
                .put_object_stream_with_content_type(&mut reader, key, content_type)
                .await?;
            Ok::<_, ShareError>(response)
        })?;

        match response.status_code() {
            200..=299 => {
                progress.finish();
                Ok(self.uploaded(key, size, content_type))
            }
            403 => Err(ShareError::CredentialsInvalid),
            status => Err(service_error(status, "")),
        }
    }

    fn put_bytes(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<RemoteObject> {
        let response = self
            .runtime
            .block_on(self.writer.put_object_with_content_type(key, &body, content_type))?;
        match response.status_code() {
            200..=299 => Ok(self.uploaded(key, body.len() as u64, content_type)),
            403 => Err(ShareError::CredentialsInvalid),
            status => Err(service_error(status, &String::from_utf8_lossy(response.bytes()))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        self.endpoint.public_url(key)
    }
}

/// S3 XML error document, e.g. `<Error><Code>..</Code><Message>..</Message></Error>`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "Code", default)]
    code: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

/// Build `StorageService` from a status and the response body, preferring
/// the service's own message over the generic reason phrase.
fn service_error(status: u16, body: &str) -> ShareError {
    let parsed = quick_xml::de::from_str::<ErrorBody>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|e| e.message.clone().or_else(|| e.code.clone()))
        .or_else(|| {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string)
        })
        .unwrap_or_default();
    ShareError::StorageService { status, message }
}
