//! Shareable scenario tokens
//!
//! A token is URL-safe base64 (no padding) over a JSON object with three
//! required keys: `parameters`, `objects` and `forces`. The physics core only
//! reads `parameters`; `objects` and `forces` belong to the scene editor and
//! are carried through untouched.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SimError, SimResult};
use crate::params::{ParamKey, SimulationParameters};
use crate::sim::ParticleSystemState;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub parameters: BTreeMap<String, f64>,
    pub objects: Vec<Value>,
    pub forces: Vec<Value>,
}

impl Scenario {
    /// Snapshot a parameter set under its wire names
    pub fn from_parameters(params: &SimulationParameters) -> Self {
        let parameters = ParamKey::ALL
            .iter()
            .map(|key| (key.as_str().to_string(), params.get(*key)))
            .collect();
        Self {
            parameters,
            ..Default::default()
        }
    }

    /// Encode as a token. Every parameter must be finite.
    pub fn encode(&self) -> SimResult<String> {
        if let Some((key, _)) = self.parameters.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SimError::NonFinite { key: key.clone() });
        }
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode and validate a token.
    ///
    /// Non-numeric entries under `parameters` are dropped; everything else
    /// of the wrong shape is an error.
    pub fn decode(token: &str) -> SimResult<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(token.trim().trim_end_matches('='))?;
        let value: Value = serde_json::from_slice(&bytes)?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> SimResult<Self> {
        let Value::Object(mut root) = value else {
            return Err(SimError::WrongType {
                key: "scenario",
                expected: "an object",
            });
        };

        let parameters = match root.remove("parameters") {
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(SimError::WrongType {
                    key: "parameters",
                    expected: "an object",
                });
            }
            None => return Err(SimError::MissingKey { key: "parameters" }),
        };
        let objects = take_array(&mut root, "objects")?;
        let forces = take_array(&mut root, "forces")?;

        let parameters = parameters
            .into_iter()
            .filter_map(|(name, value)| match value.as_f64() {
                Some(v) => Some((name, v)),
                None => {
                    log::debug!("Dropping non-numeric scenario parameter '{}'", name);
                    None
                }
            })
            .collect();

        Ok(Self {
            parameters,
            objects,
            forces,
        })
    }
}

fn take_array(root: &mut serde_json::Map<String, Value>, key: &'static str) -> SimResult<Vec<Value>> {
    match root.remove(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(SimError::WrongType {
            key,
            expected: "an array",
        }),
        None => Err(SimError::MissingKey { key }),
    }
}

impl ParticleSystemState {
    /// Current parameters as a scenario with no objects or forces
    pub fn to_scenario(&self) -> Scenario {
        Scenario::from_parameters(&self.params)
    }

    /// Apply every recognized parameter. Returns how many keys matched.
    pub fn apply_scenario(&mut self, scenario: &Scenario) -> usize {
        let mut applied = 0;
        for (name, &value) in &scenario.parameters {
            if let Some(key) = ParamKey::from_name(name) {
                self.set_param(key, value);
                applied += 1;
            }
        }
        let ignored = scenario.parameters.len() - applied;
        log::info!(
            "Applied scenario: {} parameter(s), {} unrecognized",
            applied,
            ignored
        );
        applied
    }

    /// Decode and apply a token.
    ///
    /// A malformed token leaves the current parameters untouched.
    pub fn load_scenario_token(&mut self, token: &str) -> SimResult<usize> {
        match Scenario::decode(token) {
            Ok(scenario) => Ok(self.apply_scenario(&scenario)),
            Err(err) => {
                log::warn!("Failed to load scenario, keeping current parameters: {}", err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_of(value: Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&value).unwrap())
    }

    #[test]
    fn test_round_trip() {
        let mut scenario = Scenario::from_parameters(&SimulationParameters::default());
        scenario.parameters.insert("legacyKnob".into(), -2.25);
        scenario.objects.push(json!({"type": "sphere", "radius": 1.5}));
        scenario.forces.push(json!({"kind": "wind", "strength": 0.1}));

        let token = scenario.encode().unwrap();
        assert!(!token.contains('+') && !token.contains('/') && !token.contains('='));
        assert_eq!(Scenario::decode(&token).unwrap(), scenario);
    }

    #[test]
    fn test_non_finite_values_refuse_to_encode() {
        let mut scenario = Scenario::default();
        scenario.parameters.insert("viscosity".into(), 1.0);
        scenario.parameters.insert("timeScale".into(), f64::INFINITY);
        assert!(matches!(
            scenario.encode(),
            Err(SimError::NonFinite { key }) if key == "timeScale"
        ));

        scenario.parameters.insert("timeScale".into(), f64::NAN);
        assert!(scenario.encode().is_err());
    }

    #[test]
    fn test_missing_keys() {
        let token = token_of(json!({"parameters": {}, "objects": []}));
        assert!(matches!(
            Scenario::decode(&token),
            Err(SimError::MissingKey { key: "forces" })
        ));

        let token = token_of(json!({"objects": [], "forces": []}));
        assert!(matches!(
            Scenario::decode(&token),
            Err(SimError::MissingKey { key: "parameters" })
        ));
    }

    #[test]
    fn test_wrong_shapes() {
        let token = token_of(json!({"parameters": [], "objects": [], "forces": []}));
        assert!(matches!(
            Scenario::decode(&token),
            Err(SimError::WrongType { key: "parameters", .. })
        ));

        let token = token_of(json!([1, 2, 3]));
        assert!(matches!(
            Scenario::decode(&token),
            Err(SimError::WrongType { key: "scenario", .. })
        ));
    }

    #[test]
    fn test_garbage_tokens() {
        assert!(matches!(
            Scenario::decode("!!not base64!!"),
            Err(SimError::TokenEncoding(_))
        ));
        let token = URL_SAFE_NO_PAD.encode(b"{not json");
        assert!(matches!(Scenario::decode(&token), Err(SimError::Json(_))));
    }

    #[test]
    fn test_non_numeric_parameters_dropped() {
        let token = token_of(json!({
            "parameters": {"viscosity": 2.0, "label": "calm"},
            "objects": [],
            "forces": []
        }));
        let scenario = Scenario::decode(&token).unwrap();
        assert_eq!(scenario.parameters.len(), 1);
        assert_eq!(scenario.parameters["viscosity"], 2.0);
    }

    #[test]
    fn test_apply_ignores_unknown_keys() {
        let mut state = ParticleSystemState::new(1);
        let mut scenario = Scenario::default();
        scenario.parameters.insert("viscosity".into(), 3.5);
        scenario.parameters.insert("gravity".into(), 2.0e-10);
        scenario.parameters.insert("colorMixing".into(), 1.0);

        assert_eq!(state.apply_scenario(&scenario), 2);
        assert_eq!(state.params().viscosity, 3.5);
        assert_eq!(state.params().gravitational_constant, 2.0e-10);
    }

    #[test]
    fn test_state_round_trip() {
        let mut a = ParticleSystemState::new(1);
        a.set_parameter("viscosity", 6.0);
        a.set_parameter("particleCount", 300.0);
        let token = a.to_scenario().encode().unwrap();

        let mut b = ParticleSystemState::new(2);
        assert_eq!(b.load_scenario_token(&token).unwrap(), ParamKey::ALL.len());
        assert_eq!(b.params(), a.params());
        assert_eq!(b.particle_count(), 300);
    }

    #[test]
    fn test_bad_token_keeps_parameters() {
        let mut state = ParticleSystemState::new(1);
        state.set_parameter("viscosity", 6.0);
        let before = state.params().clone();
        assert!(state.load_scenario_token("%%%").is_err());
        assert_eq!(state.params(), &before);
    }
}
