//! Water parameter snapshot

use serde::{Deserialize, Serialize};

/// A point-in-time reading of a tank's water chemistry.
///
/// Every field is optional: test kits rarely cover all parameters, and a
/// tank created without readings is still a valid tank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterParams {
    #[serde(default)]
    pub ammonia: Option<f64>,
    #[serde(default)]
    pub nitrate: Option<f64>,
    #[serde(default)]
    pub nitrite: Option<f64>,
    #[serde(default)]
    pub hardness: Option<f64>,
    #[serde(default)]
    pub chlorine: Option<f64>,
    #[serde(default)]
    pub alkalinity: Option<f64>,
    #[serde(default, rename = "pH")]
    pub ph: Option<f64>,
}

impl WaterParams {
    /// Merge another snapshot into this one, keeping existing readings for
    /// parameters the other snapshot does not carry.
    pub fn merge(&self, patch: &WaterParams) -> WaterParams {
        WaterParams {
            ammonia: patch.ammonia.or(self.ammonia),
            nitrate: patch.nitrate.or(self.nitrate),
            nitrite: patch.nitrite.or(self.nitrite),
            hardness: patch.hardness.or(self.hardness),
            chlorine: patch.chlorine.or(self.chlorine),
            alkalinity: patch.alkalinity.or(self.alkalinity),
            ph: patch.ph.or(self.ph),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_existing_readings() {
        let base = WaterParams {
            ammonia: Some(0.25),
            ph: Some(7.0),
            ..Default::default()
        };
        let patch = WaterParams {
            ph: Some(7.4),
            nitrate: Some(10.0),
            ..Default::default()
        };

        let merged = base.merge(&patch);
        assert_eq!(merged.ammonia, Some(0.25));
        assert_eq!(merged.ph, Some(7.4));
        assert_eq!(merged.nitrate, Some(10.0));
        assert_eq!(merged.chlorine, None);
    }

    #[test]
    fn ph_serializes_with_chemistry_casing() {
        let params = WaterParams {
            ph: Some(7.2),
            ..Default::default()
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["pH"], 7.2);
    }
}
