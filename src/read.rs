//! Read operations for retrieving items from DynamoDB tables.
//!
//! This module provides operations for reading data from DynamoDB:
//! - Getting individual items by key
//! - Scanning a table one page at a time

/// Get item operation for retrieving a single item by key.
pub mod get_item;

/// Scan operation for reading a table page by page.
pub mod scan;
