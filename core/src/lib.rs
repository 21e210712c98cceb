//! Synchronous client core for the WeNet platform components.
//!
//! # Overview
//! Typed access to the task manager and the service API: domain entities with
//! their JSON wire codecs, listing filters, client-side aggregation of paged
//! endpoints, and one interface method per remote operation.
//!
//! # Design
//! - The network is behind the [`RestClient`] trait. The host supplies the
//!   transport (and its authentication); requests and responses are plain
//!   data, so everything above the trait is deterministic and testable with
//!   a scripted client.
//! - Entities implement [`Repr`] (`to_repr` / `from_repr`) over
//!   `serde_json::Value`, with hand-written codecs that keep the server's
//!   field names and report typed [`DecodeError`]s.
//! - Listing operations return one page for an explicit `limit` and
//!   aggregate every page for `limit: None`; see [`pagination`].
//! - The library logs through `tracing` and never installs a subscriber.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod model;
pub mod pagination;
pub mod query;
pub mod service_api;
pub mod task_manager;

#[cfg(test)]
mod testing;

pub use client::ComponentClient;
pub use codec::Repr;
pub use config::{
    ServiceApiConfig, TaskManagerConfig, COMPONENT_PATH_OAUTH, DEVELOPMENT_INSTANCE, PRODUCTION_INSTANCE,
};
pub use error::{ApiError, ConfigError, DecodeError};
pub use filter::{ServiceTaskFilter, TaskFilter, TransactionFilter};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse, RestClient};
pub use model::{
    App, Content, CoreUserProfile, IdentifiersPage, Message, MessageType, Norm, NormOperator, Page, ProfilePage,
    Task, TaskGoal, TaskPage, TaskTransaction, TaskTransactionPage, TokenDetails, UserProfile,
};
pub use pagination::{collect_all, PageRequest, Strategy, DEFAULT_PAGE_SIZE};
pub use query::{Direction, Order, QueryParams};
pub use service_api::{ProfileSection, ServiceApiInterface};
pub use task_manager::TaskManagerInterface;
