//! Data models for the fleet telemetry API.
//!
//! - `call`: the logical calls placed inside a batch (`ApiCall`, `GetParams`, `SearchFilter`).
//! - `rpc`: the JSON-RPC envelope the client puts on the wire and reads back.

mod call;
mod rpc;

pub use call::{ApiCall, GetParams, IdRef, SearchFilter};
pub use rpc::{
    MultiCallParams, RpcCredentials, RpcError, RpcRequest, RpcResponse, json_kind,
};
