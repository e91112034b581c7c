//! Minimal Go-template-style engine for chart templates.
//!
//! Supports the subset charts lean on in practice: field lookups
//! (`.Values.*`, `.Release.*`, `.Chart.*`), `if`/`else`, `with`, `range`,
//! comments, trim markers, and a small filter set. Partials (`_*.tpl`) and
//! `NOTES.txt` are parsed for delimiter errors but never rendered as
//! manifests.
//!
//! Delimiter errors are loud by design: an unclosed or nested `{{` is the
//! one malformed input that can wedge a full template engine, so it is
//! rejected at tokenize time with the offending character and line.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::chart::TemplateFile;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("template parse error in {file}: invalid character '{{' at line {line}")]
    InvalidCharacter { file: String, line: usize },

    #[error("template parse error in {file}: unexpected {{{{end}}}} at line {line}")]
    UnexpectedEnd { file: String, line: usize },

    #[error("template parse error in {file}: unclosed '{keyword}' block")]
    UnclosedBlock { file: String, keyword: String },
}

/// Synthetic release identity injected into the render context.
#[derive(Debug, Clone)]
pub struct Release {
    pub name: String,
    pub namespace: String,
    pub service: String,
}

/// Chart identity injected into the render context.
#[derive(Debug, Clone, Default)]
pub struct ChartInfo {
    pub name: String,
    pub version: String,
    pub app_version: String,
}

/// Everything a template can reference.
#[derive(Debug, Clone)]
pub struct Context {
    pub values: Mapping,
    pub release: Release,
    pub chart: ChartInfo,
}

/// One rendered manifest body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub name: String,
    pub content: String,
}

/// Render every manifest template in the chart.
///
/// All templates (partials included) are tokenized and parsed so delimiter
/// errors surface regardless of where they live; only non-partial
/// `.yaml`/`.yml` files are evaluated and returned.
///
/// # Errors
/// Returns the first [`RenderError`] encountered.
pub fn render_chart(
    templates: &[TemplateFile],
    ctx: &Context,
) -> Result<Vec<RenderedFile>, RenderError> {
    let mut rendered = Vec::new();
    for template in templates {
        let tokens = apply_trim(tokenize(&template.name, &template.data)?);
        let nodes = parse(&template.name, &tokens)?;
        if is_manifest_template(&template.name) {
            let mut out = String::new();
            eval_nodes(&nodes, &Value::Null, ctx, &mut out);
            rendered.push(RenderedFile {
                name: template.name.clone(),
                content: out,
            });
        }
    }
    Ok(rendered)
}

fn is_manifest_template(name: &str) -> bool {
    let base = name.rsplit('/').next().unwrap_or(name);
    !base.starts_with('_') && (base.ends_with(".yaml") || base.ends_with(".yml"))
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Action {
        content: String,
        trim_left: bool,
        trim_right: bool,
        line: usize,
    },
}

fn line_of(src: &str, offset: usize) -> usize {
    src[..offset].matches('\n').count() + 1
}

fn tokenize(file: &str, src: &str) -> Result<Vec<Token>, RenderError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(found) = src[pos..].find("{{") {
        let open = pos + found;
        if found > 0 {
            tokens.push(Token::Text(src[pos..open].to_string()));
        }
        let line = line_of(src, open);
        pos = consume_action(file, src, open, line, &mut tokens)?;
    }

    if pos < src.len() {
        tokens.push(Token::Text(src[pos..].to_string()));
    }
    Ok(tokens)
}

/// Consume one `{{ ... }}` action (or comment) starting at `open`; returns
/// the offset just past its closing delimiter.
fn consume_action(
    file: &str,
    src: &str,
    open: usize,
    line: usize,
    tokens: &mut Vec<Token>,
) -> Result<usize, RenderError> {
    let mut body_start = open + 2;
    let trim_left = src[body_start..].starts_with('-');
    if trim_left {
        body_start += 1;
    }

    // Comments run to `*/` + closing delimiter and render as nothing; an
    // empty action token keeps their trim markers effective.
    if src[body_start..].trim_start().starts_with("/*") {
        let Some(comment_end) = src[body_start..].find("*/") else {
            return Err(RenderError::InvalidCharacter {
                file: file.to_string(),
                line,
            });
        };
        let mut after = body_start + comment_end + 2;
        while src[after..].starts_with(char::is_whitespace) {
            after += src[after..].chars().next().map_or(1, char::len_utf8);
        }
        let trim_right = src[after..].starts_with('-');
        if trim_right {
            after += 1;
        }
        if !src[after..].starts_with("}}") {
            return Err(RenderError::InvalidCharacter {
                file: file.to_string(),
                line,
            });
        }
        tokens.push(Token::Action {
            content: String::new(),
            trim_left,
            trim_right,
            line,
        });
        return Ok(after + 2);
    }

    let Some(close) = src[body_start..].find("}}") else {
        return Err(RenderError::InvalidCharacter {
            file: file.to_string(),
            line,
        });
    };
    let mut content = &src[body_start..body_start + close];

    // A delimiter opened inside an open action cannot be valid.
    if let Some(nested) = content.find("{{") {
        return Err(RenderError::InvalidCharacter {
            file: file.to_string(),
            line: line_of(src, body_start + nested),
        });
    }

    let trim_right = content.ends_with('-');
    if trim_right {
        content = &content[..content.len() - 1];
    }

    tokens.push(Token::Action {
        content: content.trim().to_string(),
        trim_left,
        trim_right,
        line,
    });
    Ok(body_start + close + 2)
}

/// Apply `{{-`/`-}}` whitespace trimming to neighboring text tokens.
fn apply_trim(mut tokens: Vec<Token>) -> Vec<Token> {
    for i in 0..tokens.len() {
        let (trim_left, trim_right) = match &tokens[i] {
            Token::Action {
                trim_left,
                trim_right,
                ..
            } => (*trim_left, *trim_right),
            Token::Text(_) => continue,
        };
        if trim_left
            && i > 0
            && let Token::Text(text) = &mut tokens[i - 1]
        {
            text.truncate(text.trim_end().len());
        }
        if trim_right
            && i + 1 < tokens.len()
            && let Token::Text(text) = &mut tokens[i + 1]
        {
            *text = text.trim_start().to_string();
        }
    }
    tokens
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Expr(String),
    If {
        cond: String,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    With {
        path: String,
        body: Vec<Node>,
    },
    Range {
        path: String,
        body: Vec<Node>,
    },
}

enum Terminator {
    End,
    Else(String),
    Eof,
}

struct Parser<'t> {
    file: String,
    tokens: &'t [Token],
    pos: usize,
}

fn parse(file: &str, tokens: &[Token]) -> Result<Vec<Node>, RenderError> {
    let mut parser = Parser {
        file: file.to_string(),
        tokens,
        pos: 0,
    };
    let (nodes, terminator) = parser.parse_nodes(false)?;
    match terminator {
        Terminator::Eof => Ok(nodes),
        Terminator::End | Terminator::Else(_) => Err(RenderError::UnexpectedEnd {
            file: file.to_string(),
            line: parser.current_line(),
        }),
    }
}

impl Parser<'_> {
    fn current_line(&self) -> usize {
        match self.tokens.get(self.pos.saturating_sub(1)) {
            Some(Token::Action { line, .. }) => *line,
            _ => 1,
        }
    }

    /// Parse nodes until `end`/`else` (inside a block) or end of input.
    fn parse_nodes(&mut self, in_block: bool) -> Result<(Vec<Node>, Terminator), RenderError> {
        let mut nodes = Vec::new();

        while self.pos < self.tokens.len() {
            let token = &self.tokens[self.pos];
            self.pos += 1;
            match token {
                Token::Text(text) => nodes.push(Node::Text(text.clone())),
                Token::Action { content, line, .. } => {
                    let keyword = content.split_whitespace().next().unwrap_or_default();
                    match keyword {
                        "end" => {
                            if in_block {
                                return Ok((nodes, Terminator::End));
                            }
                            return Err(RenderError::UnexpectedEnd {
                                file: self.file.clone(),
                                line: *line,
                            });
                        }
                        "else" => {
                            if in_block {
                                let rest = content["else".len()..].trim().to_string();
                                return Ok((nodes, Terminator::Else(rest)));
                            }
                            return Err(RenderError::UnexpectedEnd {
                                file: self.file.clone(),
                                line: *line,
                            });
                        }
                        "if" => nodes.push(self.parse_if(content["if".len()..].trim())?),
                        "with" => {
                            let path = content["with".len()..].trim().to_string();
                            let body = self.parse_simple_block("with")?;
                            nodes.push(Node::With { path, body });
                        }
                        "range" => {
                            let path = range_path(content["range".len()..].trim());
                            let body = self.parse_simple_block("range")?;
                            nodes.push(Node::Range { path, body });
                        }
                        "define" => {
                            // Named template bodies are not evaluated here.
                            let _ = self.parse_simple_block("define")?;
                        }
                        "block" => {
                            let body = self.parse_simple_block("block")?;
                            nodes.extend(body);
                        }
                        _ => nodes.push(Node::Expr(content.clone())),
                    }
                }
            }
        }

        Ok((nodes, Terminator::Eof))
    }

    fn parse_if(&mut self, cond: &str) -> Result<Node, RenderError> {
        let (then, terminator) = self.parse_nodes(true)?;
        let otherwise = match terminator {
            Terminator::End => Vec::new(),
            Terminator::Else(rest) if rest.is_empty() => {
                let (nodes, terminator) = self.parse_nodes(true)?;
                self.expect_end("if", terminator)?;
                nodes
            }
            // `else if`: the remainder is a nested if sharing our `end`.
            Terminator::Else(rest) if rest.starts_with("if") => {
                vec![self.parse_if(rest["if".len()..].trim())?]
            }
            Terminator::Else(_) | Terminator::Eof => {
                return Err(RenderError::UnclosedBlock {
                    file: self.file.clone(),
                    keyword: "if".to_string(),
                });
            }
        };
        Ok(Node::If {
            cond: cond.to_string(),
            then,
            otherwise,
        })
    }

    fn parse_simple_block(&mut self, keyword: &str) -> Result<Vec<Node>, RenderError> {
        let (nodes, terminator) = self.parse_nodes(true)?;
        self.expect_end(keyword, terminator)?;
        Ok(nodes)
    }

    fn expect_end(&self, keyword: &str, terminator: Terminator) -> Result<(), RenderError> {
        match terminator {
            Terminator::End => Ok(()),
            Terminator::Else(_) | Terminator::Eof => Err(RenderError::UnclosedBlock {
                file: self.file.clone(),
                keyword: keyword.to_string(),
            }),
        }
    }
}

/// `range $i, $v := .path` keeps only the iterated path.
fn range_path(spec: &str) -> String {
    spec.rsplit(":=")
        .next()
        .unwrap_or(spec)
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

fn eval_nodes(nodes: &[Node], dot: &Value, ctx: &Context, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Expr(expr) => out.push_str(&value_to_string(&eval_expr(expr, dot, ctx))),
            Node::If {
                cond,
                then,
                otherwise,
            } => {
                if truthy(&eval_expr(cond, dot, ctx)) {
                    eval_nodes(then, dot, ctx, out);
                } else {
                    eval_nodes(otherwise, dot, ctx, out);
                }
            }
            Node::With { path, body } => {
                let value = eval_expr(path, dot, ctx);
                if truthy(&value) {
                    eval_nodes(body, &value, ctx, out);
                }
            }
            Node::Range { path, body } => match eval_expr(path, dot, ctx) {
                Value::Sequence(items) => {
                    for item in items {
                        eval_nodes(body, &item, ctx, out);
                    }
                }
                Value::Mapping(map) => {
                    for (_, item) in map {
                        eval_nodes(body, &item, ctx, out);
                    }
                }
                _ => {}
            },
        }
    }
}

/// Evaluate a pipeline expression: an operand followed by `|` filters.
fn eval_expr(expr: &str, dot: &Value, ctx: &Context) -> Value {
    let mut segments = expr.split('|').map(str::trim);
    let Some(first) = segments.next() else {
        return Value::Null;
    };
    let mut value = eval_operand(first, dot, ctx);
    for filter in segments {
        value = apply_filter(filter, value, dot, ctx);
    }
    value
}

/// Evaluate a single operand: a literal, a path, or a function call.
fn eval_operand(operand: &str, dot: &Value, ctx: &Context) -> Value {
    let words = split_words(operand);
    match words.as_slice() {
        [] => Value::Null,
        [single] => eval_atom(single, dot, ctx),
        ["not", rest @ ..] => Value::Bool(!truthy(&eval_operand(&rest.join(" "), dot, ctx))),
        ["default", fallback, given] => {
            let given = eval_atom(given, dot, ctx);
            if truthy(&given) {
                given
            } else {
                eval_atom(fallback, dot, ctx)
            }
        }
        ["quote", arg] => quote(&eval_atom(arg, dot, ctx)),
        ["upper", arg] => Value::String(value_to_string(&eval_atom(arg, dot, ctx)).to_uppercase()),
        ["lower", arg] => Value::String(value_to_string(&eval_atom(arg, dot, ctx)).to_lowercase()),
        ["toYaml", arg] => to_yaml(&eval_atom(arg, dot, ctx)),
        // Named-template inclusion and unknown calls render as nothing.
        _ => Value::Null,
    }
}

fn eval_atom(atom: &str, dot: &Value, ctx: &Context) -> Value {
    if let Some(literal) = atom.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return Value::String(literal.to_string());
    }
    if atom == "true" {
        return Value::Bool(true);
    }
    if atom == "false" {
        return Value::Bool(false);
    }
    if let Ok(n) = atom.parse::<i64>() {
        return Value::Number(n.into());
    }
    if atom.starts_with('.') || atom.starts_with('$') {
        return resolve_path(atom.trim_start_matches('$'), dot, ctx);
    }
    Value::Null
}

/// Apply one filter segment (`name [args...]`) to the piped value.
fn apply_filter(filter: &str, input: Value, dot: &Value, ctx: &Context) -> Value {
    let words = split_words(filter);
    match words.as_slice() {
        ["quote"] => quote(&input),
        ["upper"] => Value::String(value_to_string(&input).to_uppercase()),
        ["lower"] => Value::String(value_to_string(&input).to_lowercase()),
        ["trim"] => Value::String(value_to_string(&input).trim().to_string()),
        ["toYaml"] => to_yaml(&input),
        ["default", fallback] => {
            if truthy(&input) {
                input
            } else {
                eval_atom(fallback, dot, ctx)
            }
        }
        ["indent", n] => indent(&input, n.parse().unwrap_or(0), false),
        ["nindent", n] => indent(&input, n.parse().unwrap_or(0), true),
        // Unknown filters pass the value through untouched.
        _ => input,
    }
}

fn quote(value: &Value) -> Value {
    Value::String(format!("\"{}\"", value_to_string(value)))
}

fn to_yaml(value: &Value) -> Value {
    serde_yaml::to_string(value).map_or(Value::Null, |s| {
        Value::String(s.trim_end().to_string())
    })
}

fn indent(value: &Value, width: usize, leading_newline: bool) -> Value {
    let pad = " ".repeat(width);
    let body = value_to_string(value)
        .lines()
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n");
    Value::String(if leading_newline {
        format!("\n{body}")
    } else {
        body
    })
}

/// Split on whitespace outside double quotes.
fn split_words(s: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = None;
    let mut in_quotes = false;
    for (i, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        }
        if c.is_whitespace() && !in_quotes {
            if let Some(word_start) = start.take() {
                words.push(&s[word_start..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(word_start) = start {
        words.push(&s[word_start..]);
    }
    words
}

fn resolve_path(path: &str, dot: &Value, ctx: &Context) -> Value {
    if path == "." {
        return dot.clone();
    }
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        ["Values", rest @ ..] => walk(&Value::Mapping(ctx.values.clone()), rest),
        ["Release", "Name"] => Value::String(ctx.release.name.clone()),
        ["Release", "Namespace"] => Value::String(ctx.release.namespace.clone()),
        ["Release", "Service"] => Value::String(ctx.release.service.clone()),
        ["Chart", "Name"] => Value::String(ctx.chart.name.clone()),
        ["Chart", "Version"] => Value::String(ctx.chart.version.clone()),
        ["Chart", "AppVersion"] => Value::String(ctx.chart.app_version.clone()),
        ["Release" | "Chart" | "Capabilities" | "Template", ..] => Value::Null,
        rest => walk(dot, rest),
    }
}

fn walk(value: &Value, segments: &[&str]) -> Value {
    let mut current = value;
    for segment in segments {
        current = match current {
            Value::Mapping(map) => match map.get(*segment) {
                Some(next) => next,
                None => return Value::Null,
            },
            _ => return Value::Null,
        };
    }
    current.clone()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(items) => !items.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => truthy(&tagged.value),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
