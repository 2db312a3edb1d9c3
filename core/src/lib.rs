use std::{fs, path::Path};

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub mod dictionary;
pub mod engine;
pub mod error;
mod expression;
pub mod formats;
pub mod generate;
pub mod platform;
pub mod transforms;
pub mod tree;

pub use dictionary::{Dictionary, FlatToken};
pub use engine::StyleDictionary;
pub use error::{BuildError, TransformError, TreeError};
pub use generate::generate_tokens;
pub use platform::{FileConfig, PlatformConfig};
pub use tree::{flatten_by_key, object_paths, Shape};

/// A parsed token document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DesignTokens {
    pub root: TokenOrGroup,
}
impl DesignTokens {
    pub fn from_json(value: Value) -> Result<Self, TreeError> {
        if !value.is_object() {
            return Err(TreeError::NotAnObject);
        }
        Ok(Self {
            root: TokenOrGroup::from_json(value),
        })
    }
    pub fn from_json_str(data: &str) -> Result<Self, TreeError> {
        Self::from_json(serde_json::from_str(data)?)
    }
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| TreeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data)
    }
    pub fn describe_shape(&self) -> Shape {
        self.root.describe_shape()
    }
    pub fn materialize_values(&self) -> TokenOrGroup {
        self.root.materialize_values()
    }
    pub fn paths(&self) -> Vec<String> {
        object_paths(&self.describe_shape())
    }
}
impl From<TokenOrGroup> for DesignTokens {
    fn from(root: TokenOrGroup) -> Self {
        Self { root }
    }
}
impl<'de> Deserialize<'de> for DesignTokens {
    fn deserialize<D>(deserializer: D) -> Result<DesignTokens, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        DesignTokens::from_json(value).map_err(de::Error::custom)
    }
}

/// A leaf of the token tree.
///
/// Anything carrying a `value` field is a token, even `"value": null`.
/// Fields the generator doesn't know about are kept in `extra` and written
/// back out unchanged. So are known fields holding an unexpected JSON type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub themeable: Option<bool>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}
impl Token {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            variable: None,
            name: None,
            comment: None,
            themeable: None,
            attributes: IndexMap::new(),
            extra: IndexMap::new(),
        }
    }
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    /// Builds a token from the fields of a JSON object. Never fails: a
    /// missing `value` is null and mistyped fields land in `extra`.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        let mut token = Token::new(Value::Null);
        for (key, field) in fields {
            let rest = match (key.as_str(), field) {
                ("value", v) => {
                    token.value = v;
                    None
                }
                ("variable", Value::String(s)) => {
                    token.variable = Some(s);
                    None
                }
                ("name", Value::String(s)) => {
                    token.name = Some(s);
                    None
                }
                ("comment", Value::String(s)) => {
                    token.comment = Some(s);
                    None
                }
                ("themeable", Value::Bool(b)) => {
                    token.themeable = Some(b);
                    None
                }
                ("attributes", Value::Object(map)) => {
                    token.attributes = map.into_iter().collect();
                    None
                }
                ("attributes", Value::Null) => None,
                (_, other) => Some(other),
            };
            if let Some(other) = rest {
                token.extra.insert(key, other);
            }
        }
        token
    }
    /// Looks up a field by its serialized name.
    pub fn field(&self, key: &str) -> Option<Value> {
        let typed = match key {
            "value" => Some(self.value.clone()),
            "variable" => self.variable.clone().map(Value::String),
            "name" => self.name.clone().map(Value::String),
            "comment" => self.comment.clone().map(Value::String),
            "themeable" => self.themeable.map(Value::Bool),
            "attributes" if !self.attributes.is_empty() => Some(Value::Object(
                self.attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )),
            _ => None,
        };
        typed.or_else(|| self.extra.get(key).cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenOrGroup {
    Token(Token),
    Group(IndexMap<String, TokenOrGroup>),
}
impl TokenOrGroup {
    /// Converts raw JSON into a tree. An object with a `value` key is a token,
    /// any other object is a group. Non-object children of a group are not
    /// tokens and are dropped.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) if map.contains_key("value") => TokenOrGroup::Token(Token::from_fields(map)),
            Value::Object(map) => TokenOrGroup::Group(
                map.into_iter()
                    .filter(|(_, child)| child.is_object())
                    .map(|(key, child)| (key, Self::from_json(child)))
                    .collect(),
            ),
            _ => TokenOrGroup::Group(IndexMap::new()),
        }
    }
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            TokenOrGroup::Token(token) => Some(token),
            TokenOrGroup::Group(_) => None,
        }
    }
    pub fn get(&self, path: &[&str]) -> Option<&TokenOrGroup> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => match self {
                TokenOrGroup::Group(group) => group.get(*head)?.get(rest),
                TokenOrGroup::Token(_) => None,
            },
        }
    }
}
impl<'de> Deserialize<'de> for TokenOrGroup {
    fn deserialize<D>(deserializer: D) -> Result<TokenOrGroup, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(TokenOrGroup::from_json(value))
    }
}

/// Formats a number the way JavaScript's `String(n)` prints it: no trailing
/// `.0`, and exponent notation below 1e-6 or from 1e21 up.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // -0 prints as 0 in JavaScript.
        return "0".to_string();
    }
    let magnitude = n.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        // `{:e}` is already the shortest round-trip form, e.g. `1.5e-7`.
        let exponent = format!("{n:e}");
        return match exponent.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => exponent,
        };
    }
    n.to_string()
}

/// Renders a token value as it appears inside generated stylesheets.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format_number(f),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
