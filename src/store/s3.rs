//! S3 remote store.
//!
//! Wraps the AWS SDK. The client is built on first use from the default
//! credential chain, in the bucket's region; `METASYNC_S3_ENDPOINT` points it
//! at an S3-compatible service (path-style addressing is forced then).

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::{document_to_string, parse_document, RemoteLocation, RemoteRead, RemoteStore};
use crate::sync::ConfigDocument;

/// Region that must not be sent as a location constraint.
const DEFAULT_REGION: &str = "us-east-1";

pub struct S3RemoteStore {
    endpoint: Option<String>,
    client: OnceCell<Client>,
}

impl S3RemoteStore {
    #[must_use]
    pub const fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            client: OnceCell::const_new(),
        }
    }

    async fn client(&self, region: &str) -> &Client {
        let region = region.to_string();
        let endpoint = self.endpoint.clone();
        self.client
            .get_or_init(|| async move {
                let mut loader =
                    aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region));
                if let Some(endpoint) = &endpoint {
                    loader = loader.endpoint_url(endpoint);
                }
                let sdk_config = loader.load().await;

                let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
                    .force_path_style(endpoint.is_some())
                    .build();
                Client::from_conf(s3_config)
            })
            .await
    }

    fn store_error(location: &RemoteLocation, operation: &'static str, message: String) -> Error {
        Error::Store {
            operation,
            bucket: location.bucket.clone(),
            key: location.key.clone(),
            message,
        }
    }
}

impl RemoteStore for S3RemoteStore {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn read(&self, location: &RemoteLocation) -> Result<RemoteRead> {
        let client = self.client(&location.region).await;
        debug!(%location, "Fetching remote copy");

        let output = match client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let service = err.as_service_error();
                if service.is_some_and(|e| e.is_no_such_key()) {
                    debug!(%location, "No remote copy");
                    return Ok(RemoteRead::Absent);
                }
                if service.and_then(|e| e.code()) == Some("NoSuchBucket") {
                    debug!(bucket = %location.bucket, "Bucket does not exist");
                    return Ok(RemoteRead::BucketMissing);
                }
                return Err(Self::store_error(
                    location,
                    "reading",
                    DisplayErrorContext(&err).to_string(),
                ));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| Self::store_error(location, "reading body of", e.to_string()))?
            .into_bytes();
        parse_document(&bytes, &location.to_string()).map(RemoteRead::Present)
    }

    async fn write(&self, location: &RemoteLocation, doc: &ConfigDocument) -> Result<()> {
        let body = document_to_string(doc)?;
        let client = self.client(&location.region).await;
        debug!(%location, keys = doc.len(), "Uploading remote copy");

        client
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .content_type("application/json")
            .body(ByteStream::from(body.into_bytes()))
            .send()
            .await
            .map_err(|e| {
                Self::store_error(location, "writing", DisplayErrorContext(&e).to_string())
            })?;
        Ok(())
    }

    async fn ensure_bucket(&self, location: &RemoteLocation) -> Result<()> {
        let client = self.client(&location.region).await;
        debug!(bucket = %location.bucket, region = %location.region, "Creating bucket");

        let mut request = client.create_bucket().bucket(&location.bucket);
        if location.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(location.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_bucket_already_owned_by_you()) =>
            {
                Ok(())
            }
            Err(err) => Err(Self::store_error(
                location,
                "creating bucket for",
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }
}
