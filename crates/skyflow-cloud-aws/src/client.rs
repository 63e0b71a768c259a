//! AWS connection construction.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::ProvideCredentials;
use skyflow_core::{ClientConfig, Connect, DomainError, Result};
use tracing::debug;

/// One live AWS connection: the resolved shared config plus the service
/// clients derived from it. Built once per [`ClientConfig`] and held for the
/// rest of the process; credential rotation after the build is not observed.
pub struct AwsHandle {
    config: aws_config::SdkConfig,
    ec2: aws_sdk_ec2::Client,
    s3: aws_sdk_s3::Client,
    sqs: aws_sdk_sqs::Client,
}

impl AwsHandle {
    pub fn ec2(&self) -> &aws_sdk_ec2::Client {
        &self.ec2
    }

    pub fn s3(&self) -> &aws_sdk_s3::Client {
        &self.s3
    }

    pub fn sqs(&self) -> &aws_sdk_sqs::Client {
        &self.sqs
    }

    pub fn region(&self) -> Option<&str> {
        self.config.region().map(|region| region.as_ref())
    }
}

/// Connector used by the CLI's client cache.
#[derive(Debug, Default)]
pub struct AwsConnector;

#[async_trait]
impl Connect for AwsConnector {
    type Handle = AwsHandle;

    /// Resolve the AWS environment for `config` and hand out a ready handle.
    ///
    /// Region and credentials are verified up front so that a broken
    /// environment surfaces as one `Configuration` error here instead of as
    /// an opaque failure inside the first API call.
    async fn connect(&self, config: &ClientConfig) -> Result<AwsHandle> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk = loader.load().await;

        if sdk.region().is_none() {
            return Err(DomainError::configuration(
                "connect",
                "AWSリージョンを解決できません。--region か AWS_REGION を指定してください",
            ));
        }

        let provider = sdk.credentials_provider().ok_or_else(|| {
            DomainError::configuration("connect", "AWS認証情報のプロバイダが設定されていません")
        })?;
        provider.provide_credentials().await.map_err(|err| {
            let message = format!("AWS認証情報を解決できません: {err}");
            DomainError::configuration("connect", message).with_cause(err)
        })?;

        debug!(
            region = ?sdk.region(),
            profile = ?config.profile,
            "AWS connection established"
        );

        Ok(AwsHandle {
            ec2: aws_sdk_ec2::Client::new(&sdk),
            s3: aws_sdk_s3::Client::new(&sdk),
            sqs: aws_sdk_sqs::Client::new(&sdk),
            config: sdk,
        })
    }
}
