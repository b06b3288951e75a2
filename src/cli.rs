use clap::Parser;

use crate::config::{CheckConfig, StaticCredentials};

/**
CloudWatch Logs monitoring check.
*/
#[derive(Debug, Parser)]
#[command(name = "check-cloudwatch-logs")]
#[command(version, about = "Check that recent CloudWatch Logs events can be fetched.", long_about = None)]
pub struct Cli {
    /// AWS region (falls back to AWS_REGION / profile if omitted).
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// AWS access key id. Only used together with --secret-access-key.
    #[arg(long, value_name = "ACCESS-KEY-ID")]
    pub access_key_id: Option<String>,

    /// AWS secret access key. Only used together with --access-key-id.
    #[arg(long, value_name = "SECRET-ACCESS-KEY")]
    pub secret_access_key: Option<String>,

    /// Log group to poll.
    #[arg(long, value_name = "LOG-GROUP-NAME", default_value = "")]
    pub log_group_name: String,

    /// Give up after this many pages if the service keeps returning tokens.
    #[arg(long, value_name = "PAGES", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_pages: Option<u32>,
}

impl Cli {
    pub fn into_config(self) -> CheckConfig {
        let credentials = match (self.access_key_id, self.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key))
                if !access_key_id.is_empty() && !secret_access_key.is_empty() =>
            {
                Some(StaticCredentials {
                    access_key_id,
                    secret_access_key,
                })
            }
            _ => None,
        };

        CheckConfig {
            region: self.region.filter(|r| !r.is_empty()),
            credentials,
            log_group_name: self.log_group_name,
            max_pages: self.max_pages,
        }
    }
}
