use std::{fs, path::Path};

use rstest::rstest;
use serde_json::{json, Value};
use theme_tokens_core::{generate_tokens, BuildError, DesignTokens};

const THEME: &str = include_str!("fixtures/theme.json");

fn theme() -> DesignTokens {
    DesignTokens::from_json_str(THEME).unwrap()
}

fn read(dir: &Path, file: &str) -> String {
    fs::read_to_string(dir.join(file)).unwrap()
}

#[rstest]
#[case("_variables.scss")]
#[case("tokens.json")]
#[case("tokens.ts")]
#[case("tokens-types.d.ts")]
#[case("tokens.js")]
#[case("variables.css")]
fn writes_artifact(#[case] file: &str) {
    let dir = tempfile::tempdir().unwrap();
    let written = generate_tokens(&theme(), dir.path(), true).unwrap();
    assert!(written.contains(&dir.path().join(file)));
    assert!(!read(dir.path(), file).is_empty());
}

#[test]
fn css_variables() {
    let dir = tempfile::tempdir().unwrap();
    generate_tokens(&theme(), dir.path(), true).unwrap();
    assert_eq!(
        read(dir.path(), "variables.css"),
        ":root {
  --color-white: #fff;
  --color-primary-50: #eff6ff;
  --color-primary-500: #3b82f6; /* brand */
  --color-danger-50: #fef2f2;
  --color-danger-500: #3b82f6;
  --size-radius: 4px;
  --size-gutter: 1.5;
  --font-body: Inter, sans-serif;
  --border-focus: 4px solid #3b82f6;
}
"
    );
}

#[test]
fn flat_json() {
    let dir = tempfile::tempdir().unwrap();
    generate_tokens(&theme(), dir.path(), true).unwrap();
    let flat: Value = serde_json::from_str(&read(dir.path(), "tokens.json")).unwrap();
    assert_eq!(flat["color-danger-500"], json!("#3b82f6"));
    assert_eq!(flat["border-focus"], json!("4px solid #3b82f6"));
    assert_eq!(flat.as_object().unwrap().len(), 9);
}

#[test]
fn type_declarations_list_every_path() {
    let dir = tempfile::tempdir().unwrap();
    generate_tokens(&theme(), dir.path(), true).unwrap();
    let declaration = read(dir.path(), "tokens-types.d.ts");
    for path in theme().paths() {
        assert!(declaration.contains(&format!("'{path}'")), "missing {path}");
    }
    assert!(declaration.contains("\"white\": DesignToken"));
    assert!(!declaration.contains("\"DesignToken\""));
}

#[test]
fn modules_carry_variables() {
    let dir = tempfile::tempdir().unwrap();
    generate_tokens(&theme(), dir.path(), true).unwrap();
    for file in ["tokens.ts", "tokens.js"] {
        let module = read(dir.path(), file);
        assert!(module.contains("\"variable\": \"var(--color-primary-500)\""), "{file}");
        assert!(module.contains("\"themeable\": true"), "{file}");
    }
}

#[test]
fn reruns_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let tokens = theme();
    let first = generate_tokens(&tokens, dir.path(), true).unwrap();
    let before = first.iter().map(|p| fs::read(p).unwrap()).collect::<Vec<_>>();
    let second = generate_tokens(&tokens, dir.path(), true).unwrap();
    let after = second.iter().map(|p| fs::read(p).unwrap()).collect::<Vec<_>>();
    assert_eq!(first, second);
    assert_eq!(before, after);
}

#[test]
fn stale_output_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tokens.json"), "stale").unwrap();
    generate_tokens(&theme(), dir.path(), true).unwrap();
    assert!(read(dir.path(), "tokens.json").starts_with('{'));
}

#[test]
fn creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a/b/theme");
    generate_tokens(&theme(), &nested, true).unwrap();
    assert!(nested.join("variables.css").exists());
}

#[test]
fn input_is_not_consumed() {
    let dir = tempfile::tempdir().unwrap();
    let tokens = theme();
    generate_tokens(&tokens, dir.path(), true).unwrap();
    assert_eq!(tokens, theme());
}

#[test]
fn reference_errors_propagate() {
    let dir = tempfile::tempdir().unwrap();
    let tokens = DesignTokens::from_json(json!({ "a": { "value": "{missing}" } })).unwrap();
    assert!(matches!(
        generate_tokens(&tokens, dir.path(), true),
        Err(BuildError::UnresolvedReference { .. })
    ));
}

#[test]
fn uncategorized_values_pass_through() {
    let dir = tempfile::tempdir().unwrap();
    let tokens = DesignTokens::from_json(json!({
        "size": { "base": { "value": "1rem" }, "auto": { "value": "auto" } },
        "color": { "primary": { "value": "#f00" } }
    }))
    .unwrap();
    generate_tokens(&tokens, dir.path(), true).unwrap();
    assert_eq!(
        read(dir.path(), "variables.css"),
        ":root {\n  --size-base: 1rem;\n  --size-auto: auto;\n  --color-primary: #f00;\n}\n"
    );
}

#[test]
fn invalid_sizes_propagate() {
    let dir = tempfile::tempdir().unwrap();
    let tokens = DesignTokens::from_json(json!({
        "size": { "auto": { "value": "auto", "attributes": { "category": "size" } } }
    }))
    .unwrap();
    assert!(matches!(
        generate_tokens(&tokens, dir.path(), true),
        Err(BuildError::Transform(_))
    ));
}

#[test]
fn digits_split_variable_names() {
    let dir = tempfile::tempdir().unwrap();
    let tokens = DesignTokens::from_json(json!({
        "fontSize": { "2xl": { "value": "24px" } },
        "text": { "h1": { "value": "x" } }
    }))
    .unwrap();
    generate_tokens(&tokens, dir.path(), true).unwrap();
    let css = read(dir.path(), "variables.css");
    assert!(css.contains("--font-size-2-xl: 24px;"), "{css}");
    assert!(css.contains("--text-h-1: x;"), "{css}");
}
