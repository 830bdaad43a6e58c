use aws_sdk_dynamodb::{Client, config};
use std::net;

/// Where items are kept.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum StoreBackend {
    /// A DynamoDB table.
    #[default]
    Dynamodb,
    /// Process memory; contents are lost on exit.
    Memory,
}

/// Server configuration, read from flags with environment fallbacks.
#[derive(Clone, Debug, clap::Parser)]
#[command(name = "dynamodb-item-patch")]
#[command(about = "CRUD HTTP server over a DynamoDB table with nested partial updates")]
pub struct Config {
    /// Table holding the items (required for the dynamodb backend)
    #[arg(long, env = "DYNAMO_TABLE_NAME")]
    pub table_name: Option<String>,

    /// AWS region; the SDK default chain applies when unset
    #[arg(long, env = "REGION")]
    pub region: Option<String>,

    /// Endpoint override, e.g. a local DynamoDB
    #[arg(long, env = "DYNAMO_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Name of the string partition key attribute
    #[arg(long, default_value = crate::repository::DEFAULT_KEY_NAME, env = "ITEM_KEY_NAME")]
    pub key_name: String,

    /// Listen address
    #[arg(long, default_value = "0.0.0.0:80", env = "LISTEN_ADDR")]
    pub listen: net::SocketAddr,

    /// Item store backend
    #[arg(long, value_enum, default_value_t, env = "STORE_BACKEND")]
    pub store: StoreBackend,

    /// Items evaluated per scan request when listing
    #[arg(long, env = "SCAN_PAGE_SIZE", value_parser = clap::value_parser!(u16).range(1..))]
    pub scan_page_size: Option<u16>,
}

impl Config {
    /// Build a DynamoDB client from the shared AWS configuration plus the overrides given here.
    pub async fn dynamodb_client(&self) -> Client {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(config::Region::new(region.clone()));
        }
        let shared = loader.load().await;
        let mut builder = config::Builder::from(&shared);
        if let Some(endpoint_url) = &self.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }
        Client::from_conf(builder.build())
    }
}
