use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Number, Value};

use super::error::{ComputerenderError, Result};

/// A generation parameter under its canonical wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Param {
    Width,
    Height,
    Seed,
    Guidance,
    Iterations,
}

impl Param {
    pub const ALL: [Param; 5] = [
        Param::Width,
        Param::Height,
        Param::Seed,
        Param::Guidance,
        Param::Iterations,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Param::Width => "width",
            Param::Height => "height",
            Param::Seed => "seed",
            Param::Guidance => "guidance",
            Param::Iterations => "iterations",
        }
    }

    pub fn alias(self) -> Option<&'static str> {
        match self {
            Param::Width => Some("w"),
            Param::Height => Some("h"),
            Param::Guidance => Some("cfg_scale"),
            Param::Seed | Param::Iterations => None,
        }
    }

    fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized generation parameters. Only canonical keys can be stored, and
/// absent fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationParams {
    values: BTreeMap<Param, Number>,
}

impl GenerationParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes loosely-keyed parameters such as `{"w": 512, "cfg_scale": 7.5}`.
    ///
    /// Aliases are renamed to their canonical key. Giving both a key and its
    /// alias, an unknown key, or a non-numeric value is a validation error.
    pub fn from_raw<I, K, V>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut raw: BTreeMap<String, Value> = raw
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        for param in Param::ALL {
            let Some(alias) = param.alias() else {
                continue;
            };
            if raw.contains_key(param.as_str()) && raw.contains_key(alias) {
                return Err(ComputerenderError::Validation(format!(
                    "cannot specify both `{param}` and its alias `{alias}`"
                )));
            }
            if let Some(value) = raw.remove(alias) {
                raw.insert(param.as_str().to_string(), value);
            }
        }

        let unexpected: Vec<&str> = raw
            .keys()
            .filter(|k| Param::from_canonical(k).is_none())
            .map(String::as_str)
            .collect();
        if !unexpected.is_empty() {
            return Err(ComputerenderError::Validation(format!(
                "unexpected parameters: {}",
                unexpected.join(", ")
            )));
        }

        let mut values = BTreeMap::new();
        for (key, value) in raw {
            let Some(param) = Param::from_canonical(&key) else {
                continue;
            };
            match value {
                Value::Number(n) => {
                    values.insert(param, n);
                }
                other => {
                    return Err(ComputerenderError::Validation(format!(
                        "parameter `{param}` must be a number, got {other}"
                    )));
                }
            }
        }

        Ok(Self { values })
    }

    #[must_use]
    pub fn width(mut self, width: u32) -> Self {
        self.values.insert(Param::Width, width.into());
        self
    }

    #[must_use]
    pub fn height(mut self, height: u32) -> Self {
        self.values.insert(Param::Height, height.into());
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.values.insert(Param::Seed, seed.into());
        self
    }

    #[must_use]
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.values.insert(Param::Iterations, iterations.into());
        self
    }

    /// Sets the guidance scale. Fails on NaN or infinity.
    pub fn guidance(mut self, guidance: f64) -> Result<Self> {
        let n = Number::from_f64(guidance).ok_or_else(|| {
            ComputerenderError::Validation(format!("guidance must be finite, got {guidance}"))
        })?;
        self.values.insert(Param::Guidance, n);
        Ok(self)
    }

    pub fn get(&self, param: Param) -> Option<&Number> {
        self.values.get(&param)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Query pairs in canonical field order.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&'static str, String)> + '_ {
        self.values.iter().map(|(p, v)| (p.as_str(), v.to_string()))
    }
}
