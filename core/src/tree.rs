//! Shape and value mirrors of a token tree, and the `$tokens` lookup.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::TokenOrGroup;

/// Placeholder written in place of every token in a shape mirror.
pub const DESIGN_TOKEN_MARKER: &str = "DesignToken";

/// Default field projected by [`flatten_by_key`].
pub const DEFAULT_KEY: &str = "variable";

/// The structure of a token tree with every token replaced by a marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Token,
    Group(IndexMap<String, Shape>),
}
impl Serialize for Shape {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Shape::Token => serializer.serialize_str(DESIGN_TOKEN_MARKER),
            Shape::Group(group) => group.serialize(serializer),
        }
    }
}

pub fn variable_reference(name: &str) -> String {
    format!("var(--{name})")
}

impl TokenOrGroup {
    pub fn describe_shape(&self) -> Shape {
        match self {
            TokenOrGroup::Token(_) => Shape::Token,
            TokenOrGroup::Group(group) => Shape::Group(
                group
                    .iter()
                    .map(|(key, child)| (key.clone(), child.describe_shape()))
                    .collect(),
            ),
        }
    }

    /// Returns a copy of the tree where each token carries its CSS variable
    /// reference. The receiver is left untouched.
    pub fn materialize_values(&self) -> TokenOrGroup {
        self.materialize_at(&mut Vec::new())
    }
    fn materialize_at(&self, path: &mut Vec<String>) -> TokenOrGroup {
        match self {
            TokenOrGroup::Token(token) => {
                let mut token = token.clone();
                // Tokens that never went through a name transform fall back to their path.
                let name = token.name.clone().unwrap_or_else(|| path.join("-"));
                token.variable = Some(variable_reference(&name));
                TokenOrGroup::Token(token)
            }
            TokenOrGroup::Group(group) => {
                let mut out = IndexMap::with_capacity(group.len());
                for (key, child) in group {
                    path.push(key.clone());
                    out.insert(key.clone(), child.materialize_at(path));
                    path.pop();
                }
                TokenOrGroup::Group(out)
            }
        }
    }
}

/// Dotted paths to every token of a shape, depth first.
pub fn object_paths(shape: &Shape) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths(shape, "", &mut paths);
    paths
}
fn collect_paths(shape: &Shape, prefix: &str, paths: &mut Vec<String>) {
    match shape {
        Shape::Token => paths.push(prefix.to_string()),
        Shape::Group(group) => {
            for (key, child) in group {
                collect_paths(child, &join_key(prefix, key), paths);
            }
        }
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Mirrors JavaScript truthiness, which is what the emitted accessor tests.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

enum Resolved<'a> {
    Node(&'a TokenOrGroup),
    Field(Value),
}

fn resolve<'a>(mirror: &'a TokenOrGroup, path: &str) -> Option<Resolved<'a>> {
    let mut current = Resolved::Node(mirror);
    for segment in path.split('.') {
        current = match current {
            Resolved::Node(TokenOrGroup::Group(group)) => Resolved::Node(group.get(segment)?),
            Resolved::Node(TokenOrGroup::Token(token)) => Resolved::Field(token.field(segment)?),
            Resolved::Field(Value::Object(mut map)) => Resolved::Field(map.remove(segment)?),
            Resolved::Field(Value::Array(mut items)) => {
                let index: usize = segment.parse().ok()?;
                if index >= items.len() {
                    return None;
                }
                Resolved::Field(items.swap_remove(index))
            }
            Resolved::Field(_) => return None,
        };
    }
    Some(current)
}

/// Looks up `path` in a value mirror and projects `key` out of what it finds.
///
/// A token carrying a truthy `key` yields that field directly. With `flatten`,
/// a group yields a flat object of every descendant token's `key`, keyed by the
/// token's path relative to the group, so `color` over `{red: {50}, blue: {50}}`
/// gives `red.50` and `blue.50` rather than one `50` overwriting the other.
/// Without `flatten` the node itself is returned. `None` means the path
/// doesn't exist.
pub fn flatten_by_key(
    mirror: &TokenOrGroup,
    path: &str,
    key: &str,
    flatten: bool,
) -> Option<Value> {
    match resolve(mirror, path)? {
        Resolved::Node(TokenOrGroup::Token(token)) => {
            if let Some(field) = token.field(key).filter(is_truthy) {
                return Some(field);
            }
            if flatten {
                Some(Value::Object(Map::new()))
            } else {
                serde_json::to_value(token).ok()
            }
        }
        Resolved::Node(TokenOrGroup::Group(group)) => {
            if flatten {
                let mut flattened = Map::new();
                flatten_group(group, key, "", &mut flattened);
                Some(Value::Object(flattened))
            } else {
                serde_json::to_value(group).ok()
            }
        }
        Resolved::Field(value) => Some(flatten_field(value, key, flatten)),
    }
}

fn flatten_group(
    group: &IndexMap<String, TokenOrGroup>,
    key: &str,
    prefix: &str,
    out: &mut Map<String, Value>,
) {
    for (child_key, child) in group {
        let flat_key = join_key(prefix, child_key);
        match child {
            TokenOrGroup::Token(token) => {
                if let Some(field) = token.field(key).filter(is_truthy) {
                    out.insert(flat_key, field);
                }
            }
            TokenOrGroup::Group(group) => flatten_group(group, key, &flat_key, out),
        }
    }
}

// Plain JSON reached through a token's fields follows the same rules, with
// "has a `value` key" standing in for "is a token".
fn flatten_field(value: Value, key: &str, flatten: bool) -> Value {
    let Value::Object(map) = value else {
        return value;
    };
    if let Some(field) = map.get(key).filter(|v| is_truthy(v)) {
        return field.clone();
    }
    if !flatten {
        return Value::Object(map);
    }
    let mut flattened = Map::new();
    if !map.contains_key("value") {
        flatten_object(&map, key, "", &mut flattened);
    }
    Value::Object(flattened)
}
fn flatten_object(map: &Map<String, Value>, key: &str, prefix: &str, out: &mut Map<String, Value>) {
    for (child_key, child) in map {
        let Value::Object(child) = child else {
            continue;
        };
        let flat_key = join_key(prefix, child_key);
        if let Some(field) = child.get(key).filter(|v| is_truthy(v)) {
            out.insert(flat_key, field.clone());
        } else if !child.contains_key("value") {
            flatten_object(child, key, &flat_key, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DesignTokens, Token};
    use serde_json::json;

    fn palette() -> TokenOrGroup {
        DesignTokens::from_json(json!({
            "color": {
                "primary": { "value": "#f00", "name": "color-primary" },
                "secondary": { "value": "#0f0", "name": "color-secondary" },
                "red": {
                    "50": { "value": "#fee", "name": "color-red-50" },
                    "100": { "value": "#fcc", "name": "color-red-100" }
                },
                "blue": {
                    "50": { "value": "#eef", "name": "color-blue-50" }
                }
            },
            "space": {
                "sm": { "value": "4px", "name": "space-sm", "themeable": false }
            }
        }))
        .unwrap()
        .materialize_values()
    }

    #[test]
    fn shape_of_single_token() {
        let tokens = DesignTokens::from_json(json!({
            "color": { "primary": { "value": "#f00", "name": "color-primary" } }
        }))
        .unwrap();
        let shape = tokens.describe_shape();
        assert_eq!(
            serde_json::to_value(&shape).unwrap(),
            json!({ "color": { "primary": "DesignToken" } })
        );
        assert_eq!(object_paths(&shape), ["color.primary"]);
    }

    #[test]
    fn shape_keeps_empty_groups_without_paths() {
        let tokens = DesignTokens::from_json(json!({
            "a": { "b": { "value": 1 } },
            "broken": { "label": "no value here" },
            "c": { "value": 2 }
        }))
        .unwrap();
        let shape = tokens.describe_shape();
        assert_eq!(
            serde_json::to_value(&shape).unwrap(),
            json!({ "a": { "b": "DesignToken" }, "broken": {}, "c": "DesignToken" })
        );
        assert_eq!(object_paths(&shape), ["a.b", "c"]);
    }

    #[test]
    fn materialize_sets_variable_from_name() {
        let mirror = palette();
        let token = mirror.get(&["color", "primary"]).unwrap().as_token().unwrap();
        assert_eq!(token.variable.as_deref(), Some("var(--color-primary)"));
    }

    #[test]
    fn materialize_falls_back_to_path() {
        let tree = DesignTokens::from_json(json!({ "font": { "body": { "value": "serif" } } }))
            .unwrap()
            .materialize_values();
        let token = tree.get(&["font", "body"]).unwrap().as_token().unwrap();
        assert_eq!(token.variable.as_deref(), Some("var(--font-body)"));
    }

    #[test]
    fn materialize_copies() {
        let tokens = DesignTokens::from_json(json!({
            "color": { "primary": { "value": "#f00", "name": "color-primary" } }
        }))
        .unwrap();
        let before = tokens.clone();
        let first = tokens.materialize_values();
        let second = tokens.materialize_values();
        assert_eq!(tokens, before);
        assert_eq!(first, second);
        assert_eq!(
            tokens.root.get(&["color", "primary"]).unwrap().as_token(),
            Some(&Token::new("#f00").with_name("color-primary"))
        );
    }

    #[test]
    fn leaf_path_returns_field() {
        let mirror = palette();
        assert_eq!(
            flatten_by_key(&mirror, "color.primary", DEFAULT_KEY, true),
            Some(json!("var(--color-primary)"))
        );
        assert_eq!(
            flatten_by_key(&mirror, "color.primary", "value", false),
            Some(json!("#f00"))
        );
    }

    #[test]
    fn group_path_flattens_children() {
        let mirror = palette();
        assert_eq!(
            flatten_by_key(&mirror, "color.red", DEFAULT_KEY, true),
            Some(json!({ "50": "var(--color-red-50)", "100": "var(--color-red-100)" }))
        );
    }

    #[test]
    fn nested_groups_are_namespaced() {
        let mirror = palette();
        assert_eq!(
            flatten_by_key(&mirror, "color", "value", true),
            Some(json!({
                "primary": "#f00",
                "secondary": "#0f0",
                "red.50": "#fee",
                "red.100": "#fcc",
                "blue.50": "#eef"
            }))
        );
    }

    #[test]
    fn missing_path_is_none() {
        let mirror = palette();
        assert_eq!(flatten_by_key(&mirror, "nonexistent.path", DEFAULT_KEY, true), None);
        assert_eq!(flatten_by_key(&mirror, "color.primary.nope", DEFAULT_KEY, true), None);
    }

    #[test]
    fn unflattened_group_is_returned_whole() {
        let mirror = palette();
        let group = flatten_by_key(&mirror, "color.blue", DEFAULT_KEY, false).unwrap();
        assert_eq!(
            group,
            json!({ "50": { "value": "#eef", "variable": "var(--color-blue-50)", "name": "color-blue-50" } })
        );
    }

    #[test]
    fn falsy_fields_are_not_projected() {
        let mirror = palette();
        assert_eq!(
            flatten_by_key(&mirror, "space.sm", "themeable", true),
            Some(json!({}))
        );
        assert_eq!(
            flatten_by_key(&mirror, "space", "themeable", true),
            Some(json!({}))
        );
        let token = flatten_by_key(&mirror, "space.sm", "themeable", false).unwrap();
        assert_eq!(token["name"], json!("space-sm"));
    }

    #[test]
    fn paths_descend_into_token_fields() {
        let tree = DesignTokens::from_json(json!({
            "shadow": {
                "value": { "x": "1px", "layers": ["a", "b"] },
                "name": "shadow"
            }
        }))
        .unwrap()
        .materialize_values();
        assert_eq!(
            flatten_by_key(&tree, "shadow.value.x", DEFAULT_KEY, true),
            Some(json!("1px"))
        );
        assert_eq!(
            flatten_by_key(&tree, "shadow.value.layers.1", DEFAULT_KEY, true),
            Some(json!("b"))
        );
        assert_eq!(
            flatten_by_key(&tree, "shadow.value.layers.5", DEFAULT_KEY, true),
            None
        );
        assert_eq!(
            flatten_by_key(&tree, "shadow.value", DEFAULT_KEY, true),
            Some(json!({}))
        );
    }
}
