#![deny(missing_docs)]
#![deny(warnings)]

//! # DynamoDB item patch
//!
//! Translate nested JSON patches into DynamoDB update expressions, and serve items through a
//! small repository and CRUD HTTP API built on top of it.
//!
//! ## Overview
//!
//! A partial update such as `{"name": {"last": "Ng"}}` should change one nested attribute,
//! not replace the whole `name` map. This library:
//! - Flattens a [`Patch`](patch::Patch) depth-first into one attribute path per leaf
//! - Assembles the leaves into a `SET` expression with collision-free name and value
//!   placeholders
//! - Issues the request through typed request builders that share the placeholder maps with
//!   the condition expression
//! - Wraps it all in an [`ItemRepository`](repository::ItemRepository) over a pluggable
//!   [`ItemStore`](store::ItemStore)
//!
//! ## Quick Example
//!
//! ```rust
//! use dynamodb_item_patch::patch::Patch;
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let patch = Patch::try_from(json!({
//!     "name": {"last": "Ng"},
//!     "tags": ["a", "b"],
//! }))?;
//! let update = patch.compile()?;
//! assert_eq!(update.update_expression, "SET #name.#last = :v0, #tags = :v1");
//! assert_eq!(update.expression_attribute_names["#last"], "last");
//! assert_eq!(update.expression_attribute_values.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@patch`] - Patches, flattening and expression assembly
//! - [`mod@common`] - Compiled updates, keys, conditions and placeholder allocation
//! - [`mod@read`] - Read requests (GetItem, Scan)
//! - [`mod@write`] - Write requests (PutItem, UpdateItem, DeleteItem)
//! - [`mod@store`] - The store capability and its DynamoDB and in-memory implementations
//! - [`mod@repository`] - CRUD over a store
//! - `http` and `config` - The HTTP API and server configuration (`server` feature)

/// Compiled updates, keys, conditions and placeholder allocation.
pub mod common;

/// Server configuration.
#[cfg(feature = "server")]
pub mod config;

/// Error types returned by the repository.
pub mod error;

/// HTTP routes over an item repository.
#[cfg(feature = "server")]
pub mod http;

/// Patches, flattening and expression assembly.
pub mod patch;

/// Read requests against DynamoDB tables.
///
/// This module provides operations for:
/// - Getting individual items by key
/// - Scanning a table one page at a time
pub mod read;

/// CRUD operations over an item store.
pub mod repository;

/// Item store clients.
pub mod store;

/// Write requests against DynamoDB tables.
///
/// This module provides operations for:
/// - Putting new items or replacing existing ones
/// - Updating items with a compiled update expression
/// - Deleting items by key
pub mod write;

pub use error::{Error, Result};
