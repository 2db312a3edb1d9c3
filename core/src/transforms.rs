//! Attribute, name and value transforms, and the groups that bundle them.

use std::fmt;

use convert_case::{Boundary, Case, Casing};
use indexmap::IndexMap;
use itertools::Itertools;
use serde_json::Value;
use tracing::warn;

use crate::{format_number, BuildError, FlatToken, PlatformConfig, TransformError};

pub const ATTRIBUTE_CTI: &str = "attribute/cti";
pub const NAME_CTI_KEBAB: &str = "name/cti/kebab";
pub const SIZE_PX: &str = "size/px";
pub const COLOR_HEX: &str = "color/hex";
pub const TOKENS_JS: &str = "tokens-js";

const CTI_KEYS: [&str; 5] = ["category", "type", "item", "subitem", "state"];

pub type AttributeTransformer = fn(&FlatToken) -> IndexMap<String, Value>;
pub type NameTransformer = fn(&FlatToken, &PlatformConfig) -> String;
pub type Matcher = fn(&FlatToken) -> bool;
pub type ValueTransformer = fn(&FlatToken) -> Result<Value, TransformError>;

#[derive(Clone, Copy)]
pub enum Transform {
    Attribute(AttributeTransformer),
    Name(NameTransformer),
    Value {
        matcher: Matcher,
        transformer: ValueTransformer,
    },
}
impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Attribute(_) => f.write_str("Transform::Attribute"),
            Transform::Name(_) => f.write_str("Transform::Name"),
            Transform::Value { .. } => f.write_str("Transform::Value"),
        }
    }
}
impl Transform {
    pub fn is_value(&self) -> bool {
        matches!(self, Transform::Value { .. })
    }
    pub fn apply(&self, token: &mut FlatToken, platform: &PlatformConfig) -> Result<(), TransformError> {
        match self {
            Transform::Attribute(transformer) => token.token.attributes = transformer(token),
            Transform::Name(transformer) => token.token.name = Some(transformer(token, platform)),
            Transform::Value {
                matcher,
                transformer,
            } => {
                if matcher(token) {
                    token.token.value = transformer(token)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TransformRegistry {
    transforms: IndexMap<String, Transform>,
    groups: IndexMap<String, Vec<String>>,
}
impl Default for TransformRegistry {
    fn default() -> Self {
        let mut registry = Self {
            transforms: IndexMap::new(),
            groups: IndexMap::new(),
        };
        registry.register(ATTRIBUTE_CTI, Transform::Attribute(attribute_cti));
        registry.register(NAME_CTI_KEBAB, Transform::Name(name_cti_kebab));
        registry.register(
            SIZE_PX,
            Transform::Value {
                matcher: is_size,
                transformer: size_px,
            },
        );
        registry.register(
            COLOR_HEX,
            Transform::Value {
                matcher: is_color,
                transformer: color_hex,
            },
        );
        registry.groups.insert(
            TOKENS_JS.to_string(),
            [NAME_CTI_KEBAB, SIZE_PX, COLOR_HEX]
                .iter()
                .map(|x| x.to_string())
                .collect(),
        );
        registry
    }
}
impl TransformRegistry {
    pub fn register(&mut self, name: impl Into<String>, transform: Transform) {
        self.transforms.insert(name.into(), transform);
    }
    pub fn register_group(&mut self, name: impl Into<String>, transforms: Vec<String>) -> Result<(), BuildError> {
        if let Some(unknown) = transforms.iter().find(|t| !self.transforms.contains_key(*t)) {
            return Err(BuildError::UnknownTransform(unknown.clone()));
        }
        self.groups.insert(name.into(), transforms);
        Ok(())
    }
    pub fn has_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }
    /// The transforms of a group, in application order.
    pub fn group(&self, name: &str) -> Result<Vec<Transform>, BuildError> {
        let names = self
            .groups
            .get(name)
            .ok_or_else(|| BuildError::UnknownTransformGroup(name.to_string()))?;
        names
            .iter()
            .map(|n| {
                self.transforms
                    .get(n)
                    .copied()
                    .ok_or_else(|| BuildError::UnknownTransform(n.clone()))
            })
            .collect()
    }
}

/// Category/type/item/subitem/state from the token's path. Attributes the
/// author set explicitly take precedence.
pub fn attribute_cti(token: &FlatToken) -> IndexMap<String, Value> {
    let mut attributes: IndexMap<String, Value> = CTI_KEYS
        .iter()
        .zip(&token.path)
        .map(|(key, segment)| (key.to_string(), Value::String(segment.clone())))
        .collect();
    for (key, value) in &token.token.attributes {
        attributes.insert(key.clone(), value.clone());
    }
    attributes
}

pub fn name_cti_kebab(token: &FlatToken, platform: &PlatformConfig) -> String {
    let words = platform.prefix.iter().chain(&token.path).join(" ");
    kebab(&words)
}

pub(crate) fn kebab(s: &str) -> String {
    let words = deunicode::deunicode(s)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>();
    words
        .with_boundaries(&[
            Boundary::Space,
            Boundary::LowerUpper,
            Boundary::Acronym,
            Boundary::LowerDigit,
            Boundary::UpperDigit,
            Boundary::DigitLower,
            Boundary::DigitUpper,
        ])
        .to_case(Case::Kebab)
}

fn category(token: &FlatToken) -> Option<&str> {
    token.token.attributes.get("category").and_then(Value::as_str)
}
fn is_size(token: &FlatToken) -> bool {
    category(token) == Some("size")
}
fn is_color(token: &FlatToken) -> bool {
    category(token) == Some("color")
}

pub fn size_px(token: &FlatToken) -> Result<Value, TransformError> {
    let number = match &token.token.value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float(s),
        _ => None,
    };
    match number {
        Some(n) => Ok(Value::String(format!("{}px", format_number(n)))),
        None => Err(TransformError::InvalidSize {
            path: token.dotted_path(),
            value: token.token.value.to_string(),
        }),
    }
}

pub fn color_hex(token: &FlatToken) -> Result<Value, TransformError> {
    let Value::String(raw) = &token.token.value else {
        return Ok(token.token.value.clone());
    };
    match csscolorparser::parse(raw) {
        Ok(color) => {
            let [r, g, b, _] = color.to_rgba8();
            Ok(Value::String(format!("#{r:02x}{g:02x}{b:02x}")))
        }
        Err(err) => {
            warn!(token = %token.dotted_path(), value = %raw, "not a color, left unchanged: {err}");
            Ok(token.token.value.clone())
        }
    }
}

/// Parses the longest numeric prefix of `s`, ignoring leading whitespace,
/// so `"16px"` gives 16 and `"1.5rem"` gives 1.5.
pub(crate) fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while fraction_end < bytes.len() && bytes[fraction_end].is_ascii_digit() {
            fraction_end += 1;
        }
        if has_digits || fraction_end > fraction_start {
            end = fraction_end;
            has_digits = true;
        }
    }
    if !has_digits {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}
