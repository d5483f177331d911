//! Server-side protocol engine: session negotiation, catalog registries,
//! and method dispatch.

pub mod registry;
pub mod router;
pub mod session;

pub use registry::{PromptRegistry, ResourceRegistry, ToolRegistry};
pub use router::MethodRouter;
pub use session::{Session, SessionState};
