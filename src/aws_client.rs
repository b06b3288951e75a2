// src/aws_client.rs

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_cloudwatchlogs::config::Credentials;
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use aws_sdk_cloudwatchlogs::operation::filter_log_events::FilterLogEventsOutput;
use aws_sdk_cloudwatchlogs::Client;
use log::debug;

use crate::config::{CheckConfig, StaticCredentials};
use crate::poll::{LogEventSource, LogPage, PageRequest};

const CREDENTIALS_PROVIDER_NAME: &str = "check-cloudwatch-logs";

/// Build a CloudWatch Logs client from the resolved check configuration.
///
/// If `config.region` is `None`, this respects:
/// - AWS_REGION / AWS_DEFAULT_REGION
/// - profile / config files
/// - IMDS, etc.
///
/// Static credentials replace the default credential chain only when both
/// halves were supplied.
pub async fn make_client(config: &CheckConfig) -> Result<Client> {
    let region_provider = match config.region.as_deref() {
        Some(explicit) => RegionProviderChain::first_try(Region::new(explicit.to_string()))
            .or_default_provider(),
        None => RegionProviderChain::default_provider(),
    };

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
    if let Some(creds) = &config.credentials {
        debug!("using static credentials for {}", creds.access_key_id);
        loader = loader.credentials_provider(static_credentials(creds));
    }

    let sdk_config = loader.load().await;
    Ok(Client::new(&sdk_config))
}

fn static_credentials(creds: &StaticCredentials) -> Credentials {
    Credentials::new(
        creds.access_key_id.clone(),
        creds.secret_access_key.clone(),
        None,
        None,
        CREDENTIALS_PROVIDER_NAME,
    )
}

#[async_trait]
impl LogEventSource for Client {
    async fn fetch_page(&self, request: &PageRequest) -> Result<LogPage> {
        let resp = self
            .filter_log_events()
            .log_group_name(&request.log_group_name)
            .start_time(request.start_time_millis)
            .set_next_token(request.next_token.clone())
            .send()
            .await
            .map_err(|err| anyhow!("{}", DisplayErrorContext(&err)))?;

        Ok(page_from_output(&resp))
    }
}

/// Only a missing token ends pagination; an empty one is sent back as-is.
fn page_from_output(resp: &FilterLogEventsOutput) -> LogPage {
    LogPage {
        event_count: resp.events().len(),
        next_token: resp.next_token().map(str::to_string),
    }
}
