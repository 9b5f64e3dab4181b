//! Converters from producer-specific trajectory records into generic [`Pathway`]s.
//!
//! Each producer keeps its own field mapping in its own module; the core data model
//! never sees producer field names.
use serde::Serialize;

use crate::error::{PathwayError, Result};
use crate::pathway::{Metadata, Pathway};

pub mod ignition;
pub mod swimm;
pub mod swm;

pub use ignition::{IgnitionPathway, IgnitionRecord, LandscapeSettings};
pub use swimm::{SwimmPathway, SwimmState};
pub use swm::{RewardBlend, SwmTrajectory};

/// A raw trajectory format that can be normalised into a [`Pathway`].
pub trait TrajectorySource {
    /// Build the generic pathway for this record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is internally inconsistent (mismatched lengths or
    /// probabilities outside `[0, 1]`) or its leftover fields cannot be encoded as metadata.
    fn to_pathway(&self) -> Result<Pathway>;
}

/// Serialise `value` into a metadata map, leaving out the `excluded` top-level keys.
pub(crate) fn metadata_from<T: Serialize>(value: &T, excluded: &[&str]) -> Result<Metadata> {
    let encoded =
        serde_json::to_value(value).map_err(|err| PathwayError::MetadataEncoding(err.to_string()))?;
    let serde_json::Value::Object(map) = encoded else {
        return Err(PathwayError::MetadataEncoding(String::from(
            "record did not encode as a JSON object",
        )));
    };
    Ok(map
        .into_iter()
        .filter(|(key, _)| !excluded.contains(&key.as_str()))
        .collect())
}
