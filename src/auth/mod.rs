//! Admin Session Core
//! Mission: Hold admin credentials safely and gate every protected surface

pub mod api;
pub mod codec;
pub mod gateway;
pub mod guard;
pub mod models;
pub mod session;
pub mod signal;
pub mod store;

pub use api::AuthApi;
pub use codec::TokenCodec;
pub use gateway::ApiGateway;
pub use guard::{RouteDecision, RouteGuard};
pub use models::AdminRole;
pub use session::{RoleSession, RoleState};
pub use signal::SessionSignal;
pub use store::TokenStore;
