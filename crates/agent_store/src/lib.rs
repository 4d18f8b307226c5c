mod error;
mod paths;
mod schema;
mod store;

pub use error::AgentStoreError;
pub use paths::{agent_file_name, agents_root, validate_agent_name, AGENT_DIR};
pub use schema::{AgentRecord, AgentScope};
pub use store::{AgentStore, StoredAgent};
