use aws_sdk_dynamodb::{Client, error, operation, types};
use std::collections;

/// scan operation
#[derive(Clone, Debug, Default, PartialEq)]
struct ScanInput {
    consistent_read: Option<bool>,
    exclusive_start_key: Option<collections::HashMap<String, types::AttributeValue>>,
    limit: Option<i32>,
    table_name: String,
}

/// Scan operation for a single page.
///
/// Pagination is left to the caller: feed the `last_evaluated_key` of one page into
/// `exclusive_start_key` of the next until it comes back empty.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_item_patch::read;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let scan = read::scan::Scan {
///     limit: Some(100),
///     table_name: "items".to_string(),
///     ..Default::default()
/// };
/// let page = scan.send(client).await?;
/// let next = page.last_evaluated_key;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scan {
    /// Whether to use strongly consistent reads.
    pub consistent_read: Option<bool>,
    /// The key to continue from, as returned by the previous page.
    pub exclusive_start_key: Option<collections::HashMap<String, types::AttributeValue>>,
    /// Maximum number of items to evaluate for this page; ignored unless positive.
    pub limit: Option<i32>,
    /// The name of the table to scan.
    pub table_name: String,
}

impl From<Scan> for ScanInput {
    fn from(scan: Scan) -> Self {
        Self {
            consistent_read: scan.consistent_read,
            exclusive_start_key: scan.exclusive_start_key.filter(|key| !key.is_empty()),
            limit: scan.limit.filter(|limit| *limit > 0),
            table_name: scan.table_name,
        }
    }
}

impl Scan {
    /// Execute the scan operation for one page.
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<operation::scan::ScanOutput, error::SdkError<operation::scan::ScanError>> {
        let scan: ScanInput = self.into();
        client
            .scan()
            .set_consistent_read(scan.consistent_read)
            .set_exclusive_start_key(scan.exclusive_start_key)
            .set_limit(scan.limit)
            .table_name(scan.table_name)
            .send()
            .await
    }
}
