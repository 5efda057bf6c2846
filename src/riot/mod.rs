//! Riot API access.
//!
//! ## Layers
//!
//! - **transport**: one HTTP attempt
//! - **quota** / **queue**: per-partition sliding windows and FIFO
//! - **retry**: what to do after a 429
//! - **gateway**: ties the above together behind `request(path, partition)`
//! - **validate**: payload to DTO, or a field-level failure
//! - **client**: typed endpoint methods

pub mod client;
pub mod gateway;
pub mod outcome;
pub mod queue;
pub mod quota;
pub mod retry;
pub mod routing;
pub mod transport;
pub mod validate;

pub use client::{MatchIdQuery, RiotClient, RiotError};
pub use gateway::{Gateway, GatewayConfig, GatewayError};
pub use outcome::ApiOutcome;
pub use quota::{QuotaLimits, QuotaTracker};
pub use retry::{RetryDecision, RetryPolicy};
pub use routing::{ApexTier, Platform, QueueType, Region};
pub use transport::{HttpTransport, HttpTransportConfig, RawResponse, Transport, TransportError};
pub use validate::{validate, EndpointFamily, ValidationFailure, Violation};
