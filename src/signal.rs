//! Signal discovery and the display-name/identifier mapping.
//!
//! Chart containers in the front end are addressed by DOM id, so every signal
//! needs an HTML-safe token derived from its display name. Display names look
//! like `"runtime (s)"`; the transform folds the unit suffix into a single
//! underscore, giving `"runtime_s"`. The mapping must be reversible: the
//! server recovers the display name from the identifier a request carries,
//! so a name whose round trip is lossy is rejected rather than corrupted.

use serde::Serialize;

use crate::store::{ReportStore, StoreError};

/// A signal available for charting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signal {
    /// Display name as stored, e.g. `"runtime (s)"`.
    pub name: String,
    /// Derived DOM-safe identifier, e.g. `"runtime_s"`.
    pub id: String,
}

/// Raised when a display name cannot survive the identifier round trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalNameError {
    #[error("signal name {name:?} does not round-trip through identifier {id:?} (recovered {recovered:?}); expected exactly one \" (...)\" unit suffix")]
    LossyName {
        name: String,
        id: String,
        recovered: String,
    },
}

/// Derive the DOM-safe identifier for a display name.
///
/// Replaces the first `" ("` with `"_"`, then drops the first `")"`. The
/// result is checked against the inverse transform: names without exactly
/// one `" (...)"` unit suffix, or with an underscore before it, would come
/// back different and are rejected with [`SignalNameError::LossyName`].
pub fn to_identifier(name: &str) -> Result<String, SignalNameError> {
    let id = name.replacen(" (", "_", 1).replacen(')', "", 1);
    let recovered = to_display_name(&id);
    if recovered != name {
        return Err(SignalNameError::LossyName {
            name: name.to_string(),
            id,
            recovered,
        });
    }
    Ok(id)
}

/// Invert [`to_identifier`]: restore the first `"_"` to `" ("` and close the
/// parenthesis at the end.
pub fn to_display_name(id: &str) -> String {
    let mut name = id.replacen('_', " (", 1);
    name.push(')');
    name
}

/// List the signals available in the store, in source order.
///
/// Names that fail identifier validation are skipped with a warning rather
/// than failing the listing; one malformed name must not blank out the
/// dashboard. Store failure propagates.
pub async fn list_signals(store: &dyn ReportStore) -> Result<Vec<Signal>, StoreError> {
    let names = store.signal_names().await?;
    let mut signals = Vec::with_capacity(names.len());
    for name in names {
        match to_identifier(&name) {
            Ok(id) => signals.push(Signal { name, id }),
            Err(e) => {
                tracing::warn!(signal = %name, error = %e, "Skipping signal with lossy identifier");
            }
        }
    }
    Ok(signals)
}
