//! Message-pattern dispatcher for the products service.
//!
//! # Responsibility
//! - Decode JSON payloads for each message pattern and call the store.
//! - Map store errors to `RpcError { message, status }` for the transport.
//!
//! # Invariants
//! - Dispatch never panics; every failure becomes an `RpcError`.
//! - `update_product` routes by the payload `id` but never merges it.

use crate::model::page::PageRequest;
use crate::model::product::{Product, ProductFields, ProductPatch};
use crate::model::resource::ResourceId;
use crate::repo::resource_repo::ResourceRepository;
use crate::service::resource_store::{ErrorKind, ResourceStore, StoreError};
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const CREATE_PRODUCT: &str = "create_product";
pub const FIND_ALL_PRODUCTS: &str = "find_all_products";
pub const FIND_ONE_PRODUCT: &str = "find_one_product";
pub const UPDATE_PRODUCT: &str = "update_product";
pub const DELETE_PRODUCT: &str = "delete_product";

pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_INTERNAL: u16 = 500;

/// Structured error returned across the RPC boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub message: String,
    pub status: u16,
}

impl RpcError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: STATUS_BAD_REQUEST,
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: STATUS_INTERNAL,
        }
    }
}

impl Display for RpcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (status {})", self.message, self.status)
    }
}

impl Error for RpcError {}

impl From<StoreError> for RpcError {
    fn from(value: StoreError) -> Self {
        let status = match value.kind() {
            ErrorKind::BadRequest => STATUS_BAD_REQUEST,
            ErrorKind::NotFound => STATUS_NOT_FOUND,
            ErrorKind::Internal => STATUS_INTERNAL,
        };
        Self {
            message: value.to_string(),
            status,
        }
    }
}

/// Accepts both `{"id": 1}` and a bare `1`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdPayload {
    Wrapped { id: ResourceId },
    Bare(ResourceId),
}

impl IdPayload {
    fn id(self) -> ResourceId {
        match self {
            Self::Wrapped { id } | Self::Bare(id) => id,
        }
    }
}

/// Routes one message to the product store and returns the JSON result.
pub fn dispatch<R>(
    store: &ResourceStore<Product, R>,
    pattern: &str,
    payload: Value,
) -> Result<Value, RpcError>
where
    R: ResourceRepository<Product>,
{
    let result = route(store, pattern, payload);
    match &result {
        Ok(_) => debug!("event=rpc_dispatch module=rpc status=ok pattern={pattern}"),
        Err(err) if err.status == STATUS_INTERNAL => error!(
            "event=rpc_dispatch module=rpc status=error pattern={pattern} error={}",
            err.message
        ),
        Err(err) => debug!(
            "event=rpc_dispatch module=rpc status=rejected pattern={pattern} code={}",
            err.status
        ),
    }
    result
}

fn route<R>(
    store: &ResourceStore<Product, R>,
    pattern: &str,
    payload: Value,
) -> Result<Value, RpcError>
where
    R: ResourceRepository<Product>,
{
    match pattern {
        CREATE_PRODUCT => {
            let fields: ProductFields = decode(pattern, payload)?;
            encode(&store.create(&fields)?)
        }
        FIND_ALL_PRODUCTS => {
            let request: PageRequest = if payload.is_null() {
                PageRequest::default()
            } else {
                decode(pattern, payload)?
            };
            encode(&store.list(request)?)
        }
        FIND_ONE_PRODUCT => {
            let id = decode::<IdPayload>(pattern, payload)?.id();
            encode(&store.get_by_id(id)?)
        }
        UPDATE_PRODUCT => {
            let patch: ProductPatch = decode(pattern, payload)?;
            let id = patch.id.ok_or_else(|| {
                RpcError::bad_request(format!("{pattern} payload requires `id`"))
            })?;
            encode(&store.update(id, patch)?)
        }
        DELETE_PRODUCT => {
            let id = decode::<IdPayload>(pattern, payload)?.id();
            encode(&store.remove(id)?)
        }
        other => Err(RpcError::bad_request(format!(
            "unknown message pattern `{other}`"
        ))),
    }
}

fn decode<T: DeserializeOwned>(pattern: &str, payload: Value) -> Result<T, RpcError> {
    serde_json::from_value(payload)
        .map_err(|err| RpcError::bad_request(format!("invalid {pattern} payload: {err}")))
}

fn encode<T: Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value)
        .map_err(|err| RpcError::internal(format!("failed to encode response: {err}")))
}
