//! Adjustment method selection, options and results

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::watering::SourceObservation;
use crate::error::DomainError;

/// Flat diagnostics forwarded to firmware for logging (`rawData`)
pub type RawDiagnostics = BTreeMap<String, Value>;

/// Bit 7 of the method byte enables watering restrictions
pub const RESTRICTION_FLAG: u8 = 0x80;

/// Low seven bits of the method byte select the adjustment method
pub const METHOD_ID_MASK: u8 = 0x7F;

/// Single byte sent by controller firmware packing method id and restriction flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodByte(pub u8);

/// A method byte split into its two fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedMethod {
    pub adjustment_method_id: u8,
    pub restrictions_enabled: bool,
}

impl MethodByte {
    pub fn decode(self) -> DecodedMethod {
        DecodedMethod {
            adjustment_method_id: self.0 & METHOD_ID_MASK,
            restrictions_enabled: (self.0 >> 7) & 1 == 1,
        }
    }

    pub fn restrictions_enabled(self) -> bool {
        self.decode().restrictions_enabled
    }
}

impl std::fmt::Display for MethodByte {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of watering adjustment algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentMethodId {
    /// Leave the configured watering level alone
    Manual,
    /// Scale by deviation of temperature, humidity and rain from baselines
    Zimmerman,
    /// Delay watering while it is raining
    RainDelay,
    /// Scale by recent ETₒ against the site's baseline ETₒ
    EvapotranspirationScaling,
}

impl AdjustmentMethodId {
    /// Map a decoded method id to its algorithm
    pub fn from_id(id: u8) -> Result<Self, DomainError> {
        match id {
            0 => Ok(AdjustmentMethodId::Manual),
            1 => Ok(AdjustmentMethodId::Zimmerman),
            2 => Ok(AdjustmentMethodId::RainDelay),
            3 => Ok(AdjustmentMethodId::EvapotranspirationScaling),
            other => Err(DomainError::InvalidAdjustmentMethod(other as u32)),
        }
    }

    pub fn id(self) -> u8 {
        match self {
            AdjustmentMethodId::Manual => 0,
            AdjustmentMethodId::Zimmerman => 1,
            AdjustmentMethodId::RainDelay => 2,
            AdjustmentMethodId::EvapotranspirationScaling => 3,
        }
    }
}

impl std::fmt::Display for AdjustmentMethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdjustmentMethodId::Manual => write!(f, "Manual"),
            AdjustmentMethodId::Zimmerman => write!(f, "Zimmerman"),
            AdjustmentMethodId::RainDelay => write!(f, "Rain Delay"),
            AdjustmentMethodId::EvapotranspirationScaling => write!(f, "ETo Scaling"),
        }
    }
}

/// Method-specific tuning parameters (`wto`)
///
/// Keys are kept sorted so the JSON serialization is canonical.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjustmentOptions(BTreeMap<String, Value>);

impl AdjustmentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Parse the options blob sent by firmware
    ///
    /// Firmware sends the object body without braces and may escape characters
    /// as `\xNN`; those are percent-decoded before the braces are restored.
    pub fn from_firmware(raw: &str) -> Result<Self, DomainError> {
        let unescaped = raw.replace("\\x", "%");
        let decoded = urlencoding::decode(&unescaped)
            .map_err(|e| DomainError::MalformedAdjustmentOptions(e.to_string()))?;

        let map: BTreeMap<String, Value> = serde_json::from_str(&format!("{{{}}}", decoded))
            .map_err(|e| DomainError::MalformedAdjustmentOptions(e.to_string()))?;

        Ok(Self(map))
    }

    /// A finite numeric option; numeric strings are accepted
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable JSON form used in cache keys
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Output of an adjustment method after restrictions are applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentMethodResult {
    /// Integer percent in [0, 200]; `None` means "do not change the watering level"
    pub scale: Option<u8>,
    /// Hours to delay watering; `None` means no fixed delay
    pub rain_delay_hours: Option<f64>,
    pub raw_diagnostics: RawDiagnostics,
    pub timezone_offset_minutes: Option<i32>,
    pub source_observation: Option<SourceObservation>,
}

impl AdjustmentMethodResult {
    /// Result that leaves watering untouched, tagged with its origin
    pub fn unchanged(provider: &str) -> Self {
        let mut raw_diagnostics = RawDiagnostics::new();
        raw_diagnostics.insert("wp".to_string(), Value::from(provider));
        Self {
            scale: None,
            rain_delay_hours: None,
            raw_diagnostics,
            timezone_offset_minutes: None,
            source_observation: None,
        }
    }
}
