use itertools::Itertools;

/// A piece of a token value string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Ref(Vec<String>),
}

/// A token value string split into literal text and `{path.to.token}` references.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub segments: Vec<Segment>,
}
impl Expression {
    pub fn parse(value: &str) -> Self {
        let segments = expr_parser::template(value)
            .unwrap_or_else(|_| vec![Segment::Literal(value.to_string())]);
        Self {
            segments: merge_literals(segments),
        }
    }
    pub fn has_references(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Ref(_)))
    }
    /// The path when the whole value is a single reference, e.g. `{color.primary}`.
    pub fn single_reference(&self) -> Option<&[String]> {
        match self.segments.as_slice() {
            [Segment::Ref(path)] => Some(path.as_slice()),
            _ => None,
        }
    }
}

fn reference_path(v: &str) -> Vec<String> {
    let mut path = v.trim().split('.').map(|x| x.to_string()).collect_vec();
    // `{color.primary.value}` and `{color.primary}` address the same token.
    if path.len() > 1 && path.last().map(|x| x.as_str()) == Some("value") {
        path.pop();
    }
    path
}

fn merge_literals(segments: Vec<Segment>) -> Vec<Segment> {
    segments
        .into_iter()
        .coalesce(|a, b| match (a, b) {
            (Segment::Literal(a), Segment::Literal(b)) => Ok(Segment::Literal(a + &b)),
            (a, b) => Err((a, b)),
        })
        .collect()
}

peg::parser! {
  grammar expr_parser() for str {
    rule reference() -> Segment
        = "{" v:$((!"}" !"{" [_])+) "}" { Segment::Ref(reference_path(v)) }
    rule literal() -> Segment
        = v:$((!"{" [_])+) { Segment::Literal(v.to_string()) }
    rule stray() -> Segment
        = "{" { Segment::Literal("{".to_string()) }

    pub(crate) rule template() -> Vec<Segment>
        = (reference() / literal() / stray())*
  }
}

#[test]
fn test() {
    let path = |p: &[&str]| p.iter().map(|x| x.to_string()).collect::<Vec<_>>();
    assert_eq!(
        Expression::parse("{hello.world}").segments,
        vec![Segment::Ref(path(&["hello", "world"]))]
    );
    assert_eq!(
        Expression::parse("{hello.world.value}").segments,
        vec![Segment::Ref(path(&["hello", "world"]))]
    );
    assert_eq!(
        Expression::parse("#ff00ff").segments,
        vec![Segment::Literal("#ff00ff".to_string())]
    );
    assert_eq!(
        Expression::parse("1px solid {color.border}").segments,
        vec![
            Segment::Literal("1px solid ".to_string()),
            Segment::Ref(path(&["color", "border"])),
        ]
    );
    assert_eq!(
        Expression::parse("{a} {b}").segments,
        vec![
            Segment::Ref(path(&["a"])),
            Segment::Literal(" ".to_string()),
            Segment::Ref(path(&["b"])),
        ]
    );
    assert_eq!(
        Expression::parse("calc({x} * 2").single_reference(),
        None
    );
    assert_eq!(
        Expression::parse("{x}").single_reference(),
        Some(path(&["x"]).as_slice())
    );
    assert!(!Expression::parse("").has_references());
}

#[test]
fn unclosed_braces_are_text() {
    assert_eq!(
        Expression::parse("a { b").segments,
        vec![Segment::Literal("a { b".to_string())]
    );
    assert_eq!(
        Expression::parse("{{x}").segments,
        vec![
            Segment::Literal("{".to_string()),
            Segment::Ref(vec!["x".to_string()]),
        ]
    );
    assert!(!Expression::parse("{}").has_references());
}
