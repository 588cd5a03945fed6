//! Errors surfaced by the occlusion graph.

use thiserror::Error;

/// A background rebuild that did not produce a snapshot.
///
/// The previously published snapshot stays current in both cases.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
  #[error("graph rebuild panicked: {0}")]
  RebuildPanicked(String),

  #[error("graph rebuild worker exited without a result")]
  RebuildDisconnected,
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "unknown panic payload".to_string()
  }
}
