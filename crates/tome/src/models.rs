//! These models represent the objects passed around by the conversation loop
//!
//! The internal structs are close to, but not exactly, the Anthropic messages
//! wire format: tool requests and tool results carry their `AgentResult` so a
//! malformed call from the model can travel through the history in-band. The
//! to/from wire conversions live in [`crate::providers::utils`].
pub mod content;
pub mod message;
pub mod role;
pub mod tool;
