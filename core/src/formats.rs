//! Renderers that turn a [`Dictionary`] into the text of one output file.

use indexmap::IndexMap;
use itertools::Itertools;
use serde_json::{Map, Value};

use crate::{
    tree::{object_paths, Shape, DESIGN_TOKEN_MARKER},
    value_to_string, BuildError, Dictionary, FileConfig, PlatformConfig,
};

pub const CSS_VARIABLES: &str = "css/variables";
pub const SCSS_VARIABLES: &str = "scss/variables";
pub const JSON_FLAT: &str = "json/flat";
pub const TYPESCRIPT_DECLARATION: &str = "typescript/css-variables-declaration";
pub const TYPESCRIPT_MODULE: &str = "typescript/css-variables";
pub const JAVASCRIPT_MODULE: &str = "javascript/css-variables";

pub struct FormatArgs<'a> {
    pub dictionary: &'a Dictionary,
    pub platform: &'a PlatformConfig,
    pub file: &'a FileConfig,
}

pub type Formatter = fn(&FormatArgs<'_>) -> Result<String, BuildError>;

#[derive(Clone)]
pub struct FormatRegistry {
    formats: IndexMap<String, Formatter>,
}
impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = Self {
            formats: IndexMap::new(),
        };
        registry.register(CSS_VARIABLES, css_variables);
        registry.register(SCSS_VARIABLES, scss_variables);
        registry.register(JSON_FLAT, json_flat);
        registry.register(TYPESCRIPT_DECLARATION, typescript_declaration);
        registry.register(TYPESCRIPT_MODULE, typescript_module);
        registry.register(JAVASCRIPT_MODULE, javascript_module);
        registry
    }
}
impl FormatRegistry {
    pub fn register(&mut self, name: impl Into<String>, formatter: Formatter) {
        self.formats.insert(name.into(), formatter);
    }
    pub fn get(&self, name: &str) -> Result<Formatter, BuildError> {
        self.formats
            .get(name)
            .copied()
            .ok_or_else(|| BuildError::UnknownFormat(name.to_string()))
    }
    pub fn contains(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }
}

const DESIGN_TOKEN_TYPE: &str = "interface DesignToken {
  /* The raw value you specified in your token declaration. */
  value: any;
  /* CSS Variable reference that gets generated. */
  variable: string;
  name?: string;
  comment?: string;
  themeable?: boolean;
  attributes?: {
    category?: string;
    type?: string;
    item?: string;
    subitem?: string;
    state?: string;
    [key: string]: any;
  };
  [key: string]: any;
}";

const DESIGN_TOKENS_TYPE: &str = "interface DesignTokens {
  [key: string]: DesignTokens | DesignToken;
}";

// Body shared by the TypeScript and JavaScript accessors. Nested groups are
// keyed by their path relative to the requested node so that equal leaf keys
// in sibling groups never overwrite each other.
const ACCESSOR_BODY: &str = "  const token = get(themeTokens, path)

  if (key && token?.[key]) { return token[key] }

  if (key && flatten && token && typeof token === 'object') {
    const flattened = {}

    const flattenNode = (obj, prefix = '') => {
      Object.entries(obj).forEach(([objectKey, value]) => {
        if (!value || typeof value !== 'object') { return }

        const flatKey = prefix ? `${prefix}.${objectKey}` : objectKey

        if (value[key]) {
          flattened[flatKey] = value[key]
          return
        }

        if (!('value' in value)) { flattenNode(value, flatKey) }
      })
    }

    if (!('value' in token)) { flattenNode(token) }

    return flattened
  }

  return token
}";

fn css_value(value: &Value) -> String {
    value_to_string(value)
}

pub fn css_variables(args: &FormatArgs<'_>) -> Result<String, BuildError> {
    let body = args
        .dictionary
        .all_tokens
        .iter()
        .map(|t| {
            let line = format!("  --{}: {};", t.name(), css_value(&t.token.value));
            match &t.token.comment {
                Some(comment) => format!("{line} /* {} */", comment.replace("*/", "*\\/")),
                None => line,
            }
        })
        .join("\n");
    Ok(format!(":root {{\n{body}\n}}\n"))
}

pub fn scss_variables(args: &FormatArgs<'_>) -> Result<String, BuildError> {
    let mut out = args
        .dictionary
        .all_tokens
        .iter()
        .map(|t| {
            let line = format!("${}: {};", t.name(), css_value(&t.token.value));
            match &t.token.comment {
                Some(comment) => format!("{line} // {comment}"),
                None => line,
            }
        })
        .join("\n");
    out.push('\n');
    Ok(out)
}

pub fn json_flat(args: &FormatArgs<'_>) -> Result<String, BuildError> {
    let flat: Map<String, Value> = args
        .dictionary
        .all_tokens
        .iter()
        .map(|t| (t.name(), t.token.value.clone()))
        .collect();
    let mut out = serde_json::to_string_pretty(&flat)?;
    out.push('\n');
    Ok(out)
}

fn quote_path(path: &str) -> String {
    format!("'{}'", path.replace('\\', "\\\\").replace('\'', "\\'"))
}

pub fn typescript_declaration(args: &FormatArgs<'_>) -> Result<String, BuildError> {
    let shape = args.dictionary.tokens.describe_shape();
    let shape_object = match &shape {
        Shape::Group(_) => serde_json::to_string_pretty(&shape)?,
        Shape::Token => "{}".to_string(),
    };
    // Markers only ever sit in value position.
    let shape_object = shape_object.replace(
        &format!(": \"{DESIGN_TOKEN_MARKER}\""),
        &format!(": {DESIGN_TOKEN_MARKER}"),
    );
    let paths = object_paths(&shape);
    let paths = if paths.is_empty() {
        "never".to_string()
    } else {
        paths.iter().map(|p| quote_path(p)).join(" | \n")
    };

    let mut result = String::from("import type { Ref } from 'vue'\n\n");
    result += &format!("export {DESIGN_TOKENS_TYPE}\n\n");
    result += &format!("export {DESIGN_TOKEN_TYPE}\n\n");
    result += &format!("export interface ThemeTokens extends DesignTokens {shape_object}\n\n");
    result += &format!("export type TokensPaths = {paths}\n\n");
    Ok(result)
}

fn value_mirror(args: &FormatArgs<'_>) -> Result<String, BuildError> {
    Ok(serde_json::to_string_pretty(
        &args.dictionary.tokens.materialize_values(),
    )?)
}

pub fn typescript_module(args: &FormatArgs<'_>) -> Result<String, BuildError> {
    let types = args
        .platform
        .files
        .iter()
        .find(|f| f.format == TYPESCRIPT_DECLARATION)
        .map(|f| f.destination.trim_end_matches(".ts"))
        .unwrap_or("tokens-types.d");

    let mut result = String::from("import get from 'lodash.get'\n\n");
    result += &format!(
        "import type {{ ThemeTokens, TokensPaths, DesignToken }} from './{types}'\n\n"
    );
    result += &format!("export * from './{types}'\n\n");
    result += &format!("export const themeTokens: ThemeTokens = {}\n", value_mirror(args)?);
    result += "\n
/**
 * Get a theme token by its path
 */
export const $tokens = (path: TokensPaths, key: keyof DesignToken = 'variable', flatten: boolean = true) => {
";
    result += ACCESSOR_BODY;
    result += "\n\n";
    result += "export const $dt = $tokens\n\n";
    Ok(result)
}

pub fn javascript_module(args: &FormatArgs<'_>) -> Result<String, BuildError> {
    let mut result = String::from("import get from 'lodash.get'\n\n");
    result += &format!("export const themeTokens = {}\n", value_mirror(args)?);
    result += "\n
/**
 * Get a theme token by its path
 * @typedef {import('tokens-types').TokensPaths} TokensPaths
 * @typedef {import('tokens-types').DesignToken} DesignToken
 * @param {TokensPaths} path The path to the theme token
 * @param {keyof DesignToken} key The token field to return
 * @param {boolean} flatten If the path gives an object, returns a flat object of every nested token's `key`, keyed by relative path.
 */
export const $tokens = (path, key = 'variable', flatten = true) => {
";
    result += ACCESSOR_BODY;
    result += "\n\n";
    result += "export const $to = $tokens\n\n";
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{transforms::TransformRegistry, DesignTokens};
    use serde_json::json;

    fn render(format: &str, tokens: Value) -> String {
        let tokens = DesignTokens::from_json(tokens).unwrap();
        let platform = PlatformConfig::new("tokens-js", "out")
            .with_file("tokens-types.d.ts", TYPESCRIPT_DECLARATION)
            .with_file("out.txt", format);
        let transforms = TransformRegistry::default().group("tokens-js").unwrap();
        let dictionary = Dictionary::build(&tokens.root, &transforms, &platform).unwrap();
        let formatter = FormatRegistry::default().get(format).unwrap();
        formatter(&FormatArgs {
            dictionary: &dictionary,
            platform: &platform,
            file: &platform.files[1],
        })
        .unwrap()
    }

    fn sample() -> Value {
        json!({
            "color": {
                "primary": { "value": "#f00", "comment": "brand" }
            },
            "size": { "gap": { "value": 8, "attributes": { "category": "size" } } }
        })
    }

    #[test]
    fn css() {
        assert_eq!(
            render(CSS_VARIABLES, sample()),
            ":root {\n  --color-primary: #f00; /* brand */\n  --size-gap: 8px;\n}\n"
        );
    }

    #[test]
    fn css_comments_cannot_close_early() {
        let out = render(
            CSS_VARIABLES,
            json!({ "gap": { "value": "4px", "comment": "see */ below" } }),
        );
        assert_eq!(out, ":root {\n  --gap: 4px; /* see *\\/ below */\n}\n");
    }

    #[test]
    fn scss() {
        assert_eq!(
            render(SCSS_VARIABLES, sample()),
            "$color-primary: #f00; // brand\n$size-gap: 8px;\n"
        );
    }

    #[test]
    fn json() {
        assert_eq!(
            render(JSON_FLAT, sample()),
            "{\n  \"color-primary\": \"#f00\",\n  \"size-gap\": \"8px\"\n}\n"
        );
    }

    #[test]
    fn declaration() {
        let out = render(TYPESCRIPT_DECLARATION, sample());
        assert!(out.starts_with("import type { Ref } from 'vue'\n\n"));
        assert!(out.contains("export interface DesignTokens {"));
        assert!(out.contains("export interface DesignToken {"));
        assert!(out.contains(
            "export interface ThemeTokens extends DesignTokens {\n  \"color\": {\n    \"primary\": DesignToken\n  },\n  \"size\": {\n    \"gap\": DesignToken\n  }\n}\n\n"
        ));
        assert!(out.ends_with("export type TokensPaths = 'color.primary' | \n'size.gap'\n\n"));
    }

    #[test]
    fn declaration_without_tokens() {
        let out = render(TYPESCRIPT_DECLARATION, json!({}));
        assert!(out.contains("export interface ThemeTokens extends DesignTokens {}\n\n"));
        assert!(out.ends_with("export type TokensPaths = never\n\n"));
    }

    #[test]
    fn quoted_paths_are_escaped() {
        let out = render(TYPESCRIPT_DECLARATION, json!({ "it's": { "value": 1 } }));
        assert!(out.ends_with("export type TokensPaths = 'it\\'s'\n\n"));
    }

    #[test]
    fn typescript_module_embeds_value_mirror() {
        let out = render(TYPESCRIPT_MODULE, sample());
        assert!(out.starts_with("import get from 'lodash.get'\n\n"));
        assert!(out.contains("from './tokens-types.d'\n\n"));
        assert!(out.contains("\"variable\": \"var(--color-primary)\""));
        assert!(out.contains("export const themeTokens: ThemeTokens = {"));
        assert!(out.contains("export const $tokens = (path: TokensPaths"));
        assert!(out.ends_with("export const $dt = $tokens\n\n"));
    }

    #[test]
    fn javascript_module_is_untyped() {
        let out = render(JAVASCRIPT_MODULE, sample());
        assert!(out.contains("export const themeTokens = {"));
        assert!(out.contains("export const $tokens = (path, key = 'variable', flatten = true) => {"));
        assert!(!out.contains("TokensPaths = "));
        assert!(out.ends_with("export const $to = $tokens\n\n"));
    }

    #[test]
    fn unknown_format() {
        assert!(matches!(
            FormatRegistry::default().get("xml/android"),
            Err(BuildError::UnknownFormat(_))
        ));
    }
}
