// core/src/notify/mod.rs

//! Customer notifications: template rendering and delivery through a transport.

pub mod engine;
pub mod template;
pub mod transport;

pub use engine::{NotificationConfig, NotificationEngine};
pub use template::{DispatchVars, MessageKind, PaymentVars, WelcomeVars};
pub use transport::{DeliveryReceipt, MessageTransport, OutboundMessage, SimulatedTransport};
