use std::collections::HashMap;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    expression::{Expression, Segment},
    transforms::Transform,
    value_to_string, BuildError, PlatformConfig, Token, TokenOrGroup,
};

/// A token together with its position in the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatToken {
    pub path: Vec<String>,
    #[serde(flatten)]
    pub token: Token,
}
impl FlatToken {
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
    /// The transformed name, or the dotted path for tokens no name transform touched.
    pub fn name(&self) -> String {
        self.token.name.clone().unwrap_or_else(|| self.dotted_path())
    }
}

/// The transformed tokens of one platform, as a tree and as a depth-first list.
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    pub tokens: TokenOrGroup,
    pub all_tokens: Vec<FlatToken>,
}
impl Dictionary {
    pub fn build(
        tree: &TokenOrGroup,
        transforms: &[Transform],
        platform: &PlatformConfig,
    ) -> Result<Self, BuildError> {
        let mut all_tokens = Vec::new();
        collect_tokens(tree, &mut Vec::new(), &mut all_tokens);

        let expressions = all_tokens
            .iter()
            .map(|t| match &t.token.value {
                Value::String(s) => Some(Expression::parse(s)).filter(Expression::has_references),
                _ => None,
            })
            .collect_vec();

        for (token, expression) in all_tokens.iter_mut().zip(&expressions) {
            for transform in transforms {
                // Values made of references take the referenced token's
                // already-transformed value instead.
                if transform.is_value() && expression.is_some() {
                    continue;
                }
                transform.apply(token, platform)?;
            }
        }

        let resolved = Resolver::new(&all_tokens, expressions).resolve_all()?;
        for (token, value) in all_tokens.iter_mut().zip(resolved) {
            token.token.value = value;
        }

        debug!(tokens = all_tokens.len(), group = %platform.transform_group, "built dictionary");

        let mut leaves = all_tokens.iter().map(|t| t.token.clone());
        let tokens = rebuild(tree, &mut leaves);
        Ok(Self { tokens, all_tokens })
    }
}

fn collect_tokens(node: &TokenOrGroup, path: &mut Vec<String>, out: &mut Vec<FlatToken>) {
    match node {
        TokenOrGroup::Token(token) => out.push(FlatToken {
            path: path.clone(),
            token: token.clone(),
        }),
        TokenOrGroup::Group(group) => {
            for (key, child) in group {
                path.push(key.clone());
                collect_tokens(child, path, out);
                path.pop();
            }
        }
    }
}

// Same traversal order as `collect_tokens`, so leaves line up one to one.
fn rebuild(node: &TokenOrGroup, leaves: &mut impl Iterator<Item = Token>) -> TokenOrGroup {
    match node {
        TokenOrGroup::Token(token) => TokenOrGroup::Token(leaves.next().unwrap_or_else(|| token.clone())),
        TokenOrGroup::Group(group) => {
            let mut out = IndexMap::with_capacity(group.len());
            for (key, child) in group {
                out.insert(key.clone(), rebuild(child, leaves));
            }
            TokenOrGroup::Group(out)
        }
    }
}

struct Resolver<'a> {
    tokens: &'a [FlatToken],
    expressions: Vec<Option<Expression>>,
    index: HashMap<String, usize>,
    resolved: Vec<Option<Value>>,
    stack: Vec<usize>,
}
impl<'a> Resolver<'a> {
    fn new(tokens: &'a [FlatToken], expressions: Vec<Option<Expression>>) -> Self {
        let index = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.dotted_path(), i))
            .collect();
        Self {
            tokens,
            expressions,
            index,
            resolved: vec![None; tokens.len()],
            stack: Vec::new(),
        }
    }
    fn resolve_all(mut self) -> Result<Vec<Value>, BuildError> {
        (0..self.tokens.len()).map(|i| self.value_of(i)).collect()
    }
    fn value_of(&mut self, i: usize) -> Result<Value, BuildError> {
        if let Some(value) = &self.resolved[i] {
            return Ok(value.clone());
        }
        let Some(expression) = self.expressions[i].clone() else {
            return Ok(self.tokens[i].token.value.clone());
        };
        if let Some(start) = self.stack.iter().position(|&j| j == i) {
            let chain = self.stack[start..]
                .iter()
                .chain([&i])
                .map(|&j| self.tokens[j].dotted_path())
                .collect();
            return Err(BuildError::CircularReference { chain });
        }

        self.stack.push(i);
        let value = match expression.single_reference() {
            Some(path) => self.lookup(i, path),
            None => self.interpolate(i, &expression),
        };
        self.stack.pop();
        let value = value?;

        self.resolved[i] = Some(value.clone());
        Ok(value)
    }
    fn interpolate(&mut self, i: usize, expression: &Expression) -> Result<Value, BuildError> {
        let mut out = String::new();
        for segment in &expression.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Ref(path) => out.push_str(&value_to_string(&self.lookup(i, path)?)),
            }
        }
        Ok(Value::String(out))
    }
    fn lookup(&mut self, from: usize, path: &[String]) -> Result<Value, BuildError> {
        let reference = path.join(".");
        let Some(&target) = self.index.get(&reference) else {
            return Err(BuildError::UnresolvedReference {
                token: self.tokens[from].dotted_path(),
                reference,
            });
        };
        self.value_of(target)
    }
}
