//! Persistable state with change notification.

use serde_json::Value;

use crate::signal::Signal;

/// State that can be saved to and restored from JSON and reports changes.
///
/// All mutation goes through `&self`; implementors use interior mutability
/// so listeners can read the new state while a change is being dispatched.
pub trait Trackable {
    /// Signal dispatched after every mutation.
    fn changed(&self) -> &Signal;

    /// Current state as JSON, or `None` when the state is entirely unset.
    fn to_json(&self) -> Option<Value>;

    /// Best-effort restore. Malformed input falls back to defaults and
    /// never fails.
    fn restore_state(&self, value: &Value);

    /// Return to the default state.
    fn reset(&self);
}
