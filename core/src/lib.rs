// core/src/lib.rs

//! Spare-parts request lifecycle engine.
//!
//! A customer asks for a part; the request is stored, priced, paid for and
//! dispatched, and the customer is messaged at each stage. This crate holds:
//!  - A record store over PostgreSQL (and an in-memory one) with filtered
//!    listing, partial updates and aggregate statistics.
//!  - The cost breakdown (parts + freight, in SAR).
//!  - Payment session generation with a hosted URL and a 24 hour expiry.
//!  - Templated customer notifications and a messaging transport seam.
//!  - A small async workflow engine running the lifecycle flows step by step.

pub mod dashboard;
pub mod error;
pub mod flows;
pub mod models;
pub mod notify;
pub mod payment;
pub mod pricing;
pub mod store;
pub mod workflow;

// --- Re-exports for the Public API ---

pub use crate::error::{LifecycleError, Result, WorkflowError};
pub use crate::models::{NewRequest, PaymentStatus, RequestStatus, RequestUpdate, SparePartRequest};
pub use crate::store::{InMemoryStore, PgRequestStore, RequestFilter, RequestStats, RequestStore, StatusDistribution};

pub use crate::pricing::{CostBreakdown, CURRENCY};
pub use crate::payment::{PaymentOrder, PaymentSession, PaymentSessionGenerator};
pub use crate::notify::{
  DeliveryReceipt, MessageKind, MessageTransport, NotificationConfig, NotificationEngine, OutboundMessage,
  SimulatedTransport,
};

pub use crate::flows::{FlowOutcome, LifecycleFlows, LifecycleServices, PaymentLinkInput, PaymentLinkOutcome};
pub use crate::workflow::{ContextData, Pipeline, PipelineControl, PipelineResult};
pub use crate::dashboard::DashboardSummary;
