use crate::{
    error::{CardstockError, CardstockResult},
    transform::BlurParams,
};

/// Untyped transform description, as hosts configure it.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TransformSpec {
    pub kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformParams {
    Blur(BlurParams),
    None,
}

pub fn parse_transform(spec: &TransformSpec) -> CardstockResult<TransformParams> {
    let kind = spec.kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(CardstockError::validation("transform kind must be non-empty"));
    }

    match kind.as_str() {
        "none" | "identity" => Ok(TransformParams::None),
        "blur" => {
            let radius_px = get_u32(&spec.params, "radius_px")?;
            if radius_px > 256 {
                return Err(CardstockError::validation("blur.radius_px must be <= 256"));
            }
            let sigma = match spec.params.get("sigma") {
                Some(v) => {
                    let s = v
                        .as_f64()
                        .ok_or_else(|| CardstockError::validation("blur.sigma must be a number"))?
                        as f32;
                    if !s.is_finite() || s <= 0.0 {
                        return Err(CardstockError::validation(
                            "blur.sigma must be finite and > 0",
                        ));
                    }
                    s
                }
                None => (radius_px as f32) / 2.0,
            };
            let tint = match spec.params.get("tint") {
                Some(v) => Some(parse_rgba(v)?),
                None => None,
            };
            let saturation = match spec.params.get("saturation") {
                Some(v) => {
                    let s = v.as_f64().ok_or_else(|| {
                        CardstockError::validation("blur.saturation must be a number")
                    })? as f32;
                    if !s.is_finite() || s < 0.0 {
                        return Err(CardstockError::validation(
                            "blur.saturation must be finite and >= 0",
                        ));
                    }
                    s
                }
                None => 1.0,
            };
            Ok(TransformParams::Blur(BlurParams {
                radius_px,
                sigma,
                tint,
                saturation,
            }))
        }
        _ => Err(CardstockError::validation(format!(
            "unknown transform kind '{kind}'"
        ))),
    }
}

fn get_u32(obj: &serde_json::Value, key: &str) -> CardstockResult<u32> {
    let Some(v) = obj.get(key) else {
        return Err(CardstockError::validation(format!(
            "missing transform param '{key}'"
        )));
    };
    let Some(n) = v.as_u64() else {
        return Err(CardstockError::validation(format!(
            "transform param '{key}' must be an integer"
        )));
    };
    u32::try_from(n)
        .map_err(|_| CardstockError::validation(format!("transform param '{key}' is out of range")))
}

fn parse_rgba(v: &serde_json::Value) -> CardstockResult<[u8; 4]> {
    let Some(arr) = v.as_array() else {
        return Err(CardstockError::validation("tint must be [r,g,b,a]"));
    };
    if arr.len() != 4 {
        return Err(CardstockError::validation("tint must have length 4"));
    }
    let mut out = [0u8; 4];
    for (i, item) in arr.iter().enumerate() {
        let n = item
            .as_u64()
            .ok_or_else(|| CardstockError::validation("tint entries must be integers"))?;
        out[i] = u8::try_from(n)
            .map_err(|_| CardstockError::validation("tint entries must be 0..=255"))?;
    }
    Ok(out)
}
