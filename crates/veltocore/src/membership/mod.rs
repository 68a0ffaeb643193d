//! Group membership: statuses, the transport gateway and join/leave reconciliation

pub mod gateway;
pub mod reconciler;
pub mod status;

pub use gateway::{GatewayError, GroupGateway, InviteLink};
pub use reconciler::{MembershipEvent, MembershipReconciler, ReconcileOutcome};
pub use status::MemberStatus;
