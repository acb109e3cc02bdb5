//! The serialized form of a running [`crate::Machine`] (§6.3).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `{ stack_path, context, actors }` — JSON-serializable, round-trips
/// through `dump -> load -> dump` idempotently (§8 round-trip laws).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub stack_path: Vec<String>,
    pub context: Value,
    /// State path (joined with `/`) → that state's invoked actor's own
    /// dump. Always empty in this engine: every checkpoint point is a
    /// natural pause (§4.6) with no in-flight invoke, so there is never
    /// actor state to capture. The field is retained for wire-format
    /// compatibility (§6.3) and round-trips an empty map.
    pub actors: BTreeMap<String, Value>,
}
