//! Watering scale endpoint used by controller firmware
//!
//! `GET /:method?loc=&wto=&format=` answers in the legacy query-string form
//! unless `format=json` is requested. Errors are reported with `errCode`
//! and, for every method except Manual, a reset scale of 100.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{
    AdjustmentMethodId, AdjustmentOptions, DomainError, ErrorCode, MethodByte, RawDiagnostics,
};

use crate::services::geocoder::resolve_coordinates;
use crate::services::solar::solar_times;
use crate::services::timezone::encode_timezone;
use crate::AppState;

/// Scale firmware falls back to after an error
const RESET_SCALE: u8 = 100;

#[derive(Debug, Deserialize)]
pub struct WateringQuery {
    #[serde(default)]
    pub loc: String,
    #[serde(default)]
    pub wto: String,
    pub format: Option<String>,
}

/// Body sent to firmware
#[derive(Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WateringResponse {
    pub err_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tz: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<i32>,
    /// Client IPv4 address as a big-endian integer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<RawDiagnostics>,
}

impl WateringResponse {
    /// Failure body; Manual keeps the controller's own watering level
    pub fn error(error: &DomainError, reset_scale: bool) -> Self {
        Self {
            err_code: error.code().as_u8(),
            scale: reset_scale.then_some(RESET_SCALE),
            ..Default::default()
        }
    }

    /// Legacy `&key=value` encoding; absent fields are skipped
    pub fn to_query_string(&self) -> String {
        let mut fields: Vec<(&str, Value)> = vec![("errCode", Value::from(self.err_code))];
        if let Some(scale) = self.scale {
            fields.push(("scale", Value::from(scale)));
        }
        if let Some(rd) = self.rd {
            fields.push(("rd", Value::from(rd)));
        }
        if let Some(tz) = self.tz {
            fields.push(("tz", Value::from(tz)));
        }
        if let Some(sunrise) = self.sunrise {
            fields.push(("sunrise", Value::from(sunrise)));
        }
        if let Some(sunset) = self.sunset {
            fields.push(("sunset", Value::from(sunset)));
        }
        if let Some(eip) = self.eip {
            fields.push(("eip", Value::from(eip)));
        }
        if let Some(raw) = &self.raw_data {
            fields.push(("rawData", serde_json::to_value(raw).unwrap_or(Value::Null)));
        }

        fields
            .into_iter()
            .map(|(key, value)| format!("&{}={}", key, encode_value(&value)))
            .collect()
    }

    fn into_response_with(self, use_json: bool) -> Response {
        if use_json {
            Json(self).into_response()
        } else {
            (
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                self.to_query_string(),
            )
                .into_response()
        }
    }
}

fn encode_value(value: &Value) -> String {
    match value {
        Value::String(text) => escape_text(text),
        Value::Number(number) => format_number(number.as_f64().unwrap_or_default(), number),
        Value::Object(_) | Value::Array(_) => escape_text(&value.to_string()),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => String::new(),
    }
}

/// Whole floats are written without a fractional part
fn format_number(as_float: f64, number: &serde_json::Number) -> String {
    if number.is_f64() && as_float.fract() == 0.0 && as_float.abs() < 1e15 {
        format!("{}", as_float as i64)
    } else {
        number.to_string()
    }
}

fn escape_text(text: &str) -> String {
    text.replace(' ', "+")
        .replace('\n', "\\n")
        .replace('&', "AMPERSAND")
}

/// Client address reported back to firmware
///
/// Proxy headers win over the socket address; only the first
/// `x-forwarded-for` hop is used. IPv6 clients have no encoding.
pub fn client_ip(headers: &HeaderMap, remote: Option<IpAddr>) -> Option<u32> {
    let forwarded = ["x-forwarded-for", "cf-connecting-ip"]
        .iter()
        .find_map(|name| {
            let first = headers.get(*name)?.to_str().ok()?.split(',').next()?.trim();
            (!first.is_empty()).then(|| first.to_string())
        });

    let address = match forwarded {
        Some(address) => address.parse::<IpAddr>().ok()?,
        None => remote?,
    };
    match address {
        IpAddr::V4(v4) => Some(u32::from(v4)),
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(u32::from),
    }
}

/// Watering scale handler
pub async fn get_watering_data(
    State(state): State<AppState>,
    Path(method): Path<String>,
    Query(query): Query<WateringQuery>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> Response {
    let use_json = query.format.as_deref() == Some("json");

    // Manual leaves the controller in charge, so its errors carry no scale.
    let method_byte = method.parse::<u8>().ok().map(MethodByte);
    let is_manual = method_byte
        .and_then(|m| AdjustmentMethodId::from_id(m.decode().adjustment_method_id).ok())
        == Some(AdjustmentMethodId::Manual);

    let response = match watering_data(&state, &method, method_byte, &query).await {
        Ok(response) => WateringResponse {
            eip: client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr.ip())),
            ..response
        },
        Err(error) => {
            if error.code() == ErrorCode::UnexpectedError {
                tracing::error!("An unexpected error occurred during the watering scale calculation: {}", error);
            } else {
                tracing::debug!(%method, loc = %query.loc, "Watering scale request failed: {}", error);
            }
            WateringResponse::error(&error, !is_manual)
        }
    };

    response.into_response_with(use_json)
}

async fn watering_data(
    state: &AppState,
    method: &str,
    method_byte: Option<MethodByte>,
    query: &WateringQuery,
) -> Result<WateringResponse, DomainError> {
    let method_byte = method_byte
        .ok_or_else(|| DomainError::InvalidAdjustmentMethod(method.parse::<u32>().unwrap_or(u32::MAX)))?;
    let options = AdjustmentOptions::from_firmware(&query.wto)?;
    let coordinates = resolve_coordinates(&query.loc, state.geocoder.as_ref()).await?;

    let scale = state
        .watering
        .calculate(method_byte, &options, &coordinates)
        .await?;

    let times = solar_times(Utc::now(), &coordinates, scale.timezone_offset_minutes);

    Ok(WateringResponse {
        err_code: ErrorCode::NoError.as_u8(),
        scale: scale.entry.scale,
        rd: scale.entry.rain_delay_hours,
        tz: Some(encode_timezone(scale.timezone_offset_minutes)),
        sunrise: Some(times.sunrise),
        sunset: Some(times.sunset),
        eip: None,
        raw_data: Some(scale.entry.raw_diagnostics),
    })
}
