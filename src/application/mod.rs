//! Application layer: the readiness gate, the event relay, the payment and wallet
//! flows, and [`session::BridgeSession`] which wires them together for one game
//! session.

pub mod gate;
pub mod payment;
pub mod provider;
pub mod relay;
pub mod session;
pub mod wallet;
