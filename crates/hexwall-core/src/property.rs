//! Wallpaper host user properties.
//!
//! The host pushes loosely typed `{ name: { value } }` records. Each known
//! property is validated and mapped onto a settings key; anything malformed
//! is rejected so the previous setting stays in effect.

use crate::color::{darkened_base_color, Rgb};
use crate::constants::FPS_MAX;
use crate::settings::{SettingKey, SettingValue};
use thiserror::Error;

/// Raw property value as delivered by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl PropertyValue {
    /// Numeric reading with the host's loose coercion: numeric strings and
    /// booleans count as numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Text(s) => s.trim().parse::<f64>().ok(),
            PropertyValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        }
        .filter(|n| n.is_finite())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            PropertyValue::Number(n) => Some(*n != 0.0),
            PropertyValue::Text(s) => match s.trim() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PropertyError {
    #[error("unknown property `{0}`")]
    Unknown(String),
    #[error("property `{name}` is not a number")]
    NotANumber { name: &'static str },
    #[error("property `{name}` is not a boolean")]
    NotABool { name: &'static str },
    #[error("property `{name}` value {value} is out of range")]
    OutOfRange { name: &'static str, value: f64 },
    #[error("malformed color `{0}`, expected three space separated floats")]
    MalformedColor(String),
}

/// Property names the host may send.
pub const PROPERTY_NAMES: [&str; 7] = [
    "fps",
    "basecolor",
    "tilesize",
    "tileopacity",
    "animationspeed",
    "beatimpact",
    "beatenabled",
];

fn number(name: &'static str, value: &PropertyValue) -> Result<f64, PropertyError> {
    value.as_number().ok_or(PropertyError::NotANumber { name })
}

/// Map one host property onto a setting.
pub fn parse_property(
    name: &str,
    value: &PropertyValue,
) -> Result<(SettingKey, SettingValue), PropertyError> {
    match name {
        "fps" => {
            let v = number("fps", value)?;
            if !(0.0..=FPS_MAX as f64).contains(&v) {
                return Err(PropertyError::OutOfRange { name: "fps", value: v });
            }
            Ok((SettingKey::Fps, SettingValue::Uint(v.floor() as u32)))
        }
        "basecolor" => {
            let PropertyValue::Text(text) = value else {
                return Err(PropertyError::MalformedColor(format!("{:?}", value)));
            };
            let color = parse_color(text)?;
            Ok((SettingKey::BaseColor, SettingValue::Color(darkened_base_color(color))))
        }
        "tilesize" => {
            let v = number("tilesize", value)?;
            if v == 0.0 {
                return Err(PropertyError::OutOfRange {
                    name: "tilesize",
                    value: v,
                });
            }
            Ok((SettingKey::TileSize, SettingValue::Float(v.abs() as f32)))
        }
        "tileopacity" => {
            let v = number("tileopacity", value)?;
            if !(0.0..=100.0).contains(&v) {
                return Err(PropertyError::OutOfRange {
                    name: "tileopacity",
                    value: v,
                });
            }
            Ok((
                SettingKey::TileOpacity,
                SettingValue::Float((v.floor() / 100.0) as f32),
            ))
        }
        "animationspeed" => {
            let v = number("animationspeed", value)?;
            if v < 0.0 {
                return Err(PropertyError::OutOfRange {
                    name: "animationspeed",
                    value: v,
                });
            }
            Ok((SettingKey::AnimationSpeed, SettingValue::Float((v / 10.0) as f32)))
        }
        "beatimpact" => {
            let v = number("beatimpact", value)?;
            if v < 0.0 {
                return Err(PropertyError::OutOfRange {
                    name: "beatimpact",
                    value: v,
                });
            }
            Ok((SettingKey::BeatImpact, SettingValue::Float((v / 10.0) as f32)))
        }
        "beatenabled" => {
            let b = value
                .as_bool()
                .ok_or(PropertyError::NotABool { name: "beatenabled" })?;
            Ok((SettingKey::BeatEnabled, SettingValue::Bool(b)))
        }
        other => Err(PropertyError::Unknown(other.to_string())),
    }
}

/// Parse `"r g b"` with components in \[0, 1\].
pub fn parse_color(text: &str) -> Result<Rgb, PropertyError> {
    let parts: Vec<f32> = text
        .split_whitespace()
        .map(|p| p.parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|_| PropertyError::MalformedColor(text.to_string()))?;
    match parts.as_slice() {
        [r, g, b] if parts.iter().all(|c| c.is_finite()) => Ok(Rgb::new(*r, *g, *b)),
        _ => Err(PropertyError::MalformedColor(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> PropertyValue {
        PropertyValue::Number(n)
    }

    #[test]
    fn fps_is_floored_and_zero_allowed() {
        assert_eq!(
            parse_property("fps", &num(59.9)),
            Ok((SettingKey::Fps, SettingValue::Uint(59)))
        );
        assert_eq!(
            parse_property("fps", &num(0.0)),
            Ok((SettingKey::Fps, SettingValue::Uint(0)))
        );
        assert!(matches!(
            parse_property("fps", &num(241.0)),
            Err(PropertyError::OutOfRange { .. })
        ));
    }

    #[test]
    fn numeric_strings_coerce() {
        let v = PropertyValue::Text(" 25 ".into());
        assert_eq!(
            parse_property("animationspeed", &v),
            Ok((SettingKey::AnimationSpeed, SettingValue::Float(2.5)))
        );
        let bad = PropertyValue::Text("fast".into());
        assert_eq!(
            parse_property("animationspeed", &bad),
            Err(PropertyError::NotANumber {
                name: "animationspeed"
            })
        );
    }

    #[test]
    fn tile_size_takes_magnitude() {
        assert_eq!(
            parse_property("tilesize", &num(-2.0)),
            Ok((SettingKey::TileSize, SettingValue::Float(2.0)))
        );
        assert!(parse_property("tilesize", &num(0.0)).is_err());
    }

    #[test]
    fn opacity_is_percent() {
        assert_eq!(
            parse_property("tileopacity", &num(55.7)),
            Ok((SettingKey::TileOpacity, SettingValue::Float(0.55)))
        );
        assert!(parse_property("tileopacity", &num(101.0)).is_err());
    }

    #[test]
    fn base_color_is_darkened() {
        let (key, value) =
            parse_property("basecolor", &PropertyValue::Text("1 0 0".into())).unwrap();
        assert_eq!(key, SettingKey::BaseColor);
        let c = value.as_color().unwrap();
        let (h, s, l) = c.to_hsl();
        assert!(h.abs() < 1e-4);
        assert!((s - 1.0).abs() < 1e-4);
        assert!((l - 0.05).abs() < 1e-4);
    }

    #[test]
    fn malformed_colors_are_rejected() {
        for text in ["1 0", "1 0 0 1", "a b c", ""] {
            assert!(matches!(
                parse_color(text),
                Err(PropertyError::MalformedColor(_))
            ));
        }
        assert!(parse_property("basecolor", &num(3.0)).is_err());
    }

    #[test]
    fn unknown_property_is_reported() {
        assert_eq!(
            parse_property("schemecolor", &num(1.0)),
            Err(PropertyError::Unknown("schemecolor".into()))
        );
    }
}
