//! High-frequency position samples.
//!
//! Distributed through the latest-value hub, bypassing the event store.
//! Produced in-process from waypoint events, and by external capture
//! pipelines (opaque to this core) that publish into the same hub.

use serde::{Deserialize, Serialize};

/// One position sample. Flat shape, matching the live-stream surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Sample time in epoch milliseconds.
    pub ts_ms: i64,
    /// Planet name, if the OCR pass resolved one.
    pub planet_name: Option<String>,
    /// World X coordinate.
    pub x: i64,
    /// World Y coordinate.
    pub y: i64,
    /// World Z coordinate (altitude), if resolved.
    pub z: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip() {
        let s = PositionSample {
            ts_ms: 123,
            planet_name: Some("Calypso".into()),
            x: 61_000,
            y: 75_000,
            z: None,
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: PositionSample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
