//! Client for the external conversational agent.
//!
//! The agent is an opaque collaborator: a prompt goes out as JSON and the
//! reply's `message` field comes back. [`AgentClient`] is the seam the HTTP
//! layer depends on, so handler tests can swap in a stub.

pub mod client;

pub use client::{AgentClient, AgentError, HttpAgentClient, NO_MESSAGE_RETURNED};
