//! Reader for the GML graph markup language.
//!
//! The grammar lives in `gml.pest`. [`parse`] walks the pest tree into
//! [`GmlValue`]s and [`read_graph`] interprets the first `graph` object;
//! everything else in the document is ignored.

use crate::attributes::Value;
use pest::error::LineColLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GmlError {
    #[error("GML syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("GML structure error: {0}")]
    Structure(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GmlValue {
    Int(i64),
    Real(f64),
    Str(String),
    List(Vec<(String, GmlValue)>),
}

impl GmlValue {
    fn as_scalar(&self) -> Option<Value> {
        match self {
            GmlValue::Int(i) => Some(Value::Numeric(*i as f64)),
            GmlValue::Real(r) => Some(Value::Numeric(*r)),
            GmlValue::Str(s) => Some(Value::Text(s.clone())),
            GmlValue::List(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GmlNode {
    pub id: i64,
    /// Scalar attributes in document order, `id` included.
    pub attributes: Vec<(String, Value)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GmlEdge {
    /// Positions in `GmlGraph::nodes`, not GML ids.
    pub source: usize,
    pub target: usize,
    pub attributes: Vec<(String, Value)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GmlGraph {
    pub directed: bool,
    pub nodes: Vec<GmlNode>,
    pub edges: Vec<GmlEdge>,
}

#[derive(Parser)]
#[grammar = "gml.pest"]
struct GmlParser;

fn syntax_error(error: pest::error::Error<Rule>) -> GmlError {
    let line = match error.line_col {
        LineColLocation::Pos((line, _)) | LineColLocation::Span((line, _), _) => line,
    };
    GmlError::Syntax {
        line,
        message: error.variant.message().into_owned(),
    }
}

fn malformed(pair: &Pair<'_, Rule>, message: String) -> GmlError {
    GmlError::Syntax {
        line: pair.line_col().0,
        message,
    }
}

/// The `key value` pairs directly inside `document` or `list`.
fn entries(pair: Pair<'_, Rule>) -> Result<Vec<(String, GmlValue)>, GmlError> {
    let mut out = Vec::new();
    for entry in pair.into_inner().filter(|p| p.as_rule() == Rule::entry) {
        let line = entry.line_col().0;
        let mut inner = entry.into_inner();
        let (Some(key), Some(value)) = (inner.next(), inner.next()) else {
            return Err(GmlError::Syntax {
                line,
                message: "key without a value".into(),
            });
        };
        out.push((key.as_str().to_string(), value_of(value)?));
    }
    Ok(out)
}

fn value_of(pair: Pair<'_, Rule>) -> Result<GmlValue, GmlError> {
    let raw = pair.as_str();
    match pair.as_rule() {
        // Integers too wide for i64 are kept as reals.
        Rule::int => raw
            .parse::<i64>()
            .map(GmlValue::Int)
            .or_else(|_| raw.parse::<f64>().map(GmlValue::Real))
            .map_err(|e| malformed(&pair, format!("invalid number `{raw}`: {e}"))),
        Rule::real => raw
            .parse::<f64>()
            .map(GmlValue::Real)
            .map_err(|e| malformed(&pair, format!("invalid number `{raw}`: {e}"))),
        Rule::string => Ok(GmlValue::Str(
            raw.strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(raw)
                .to_string(),
        )),
        Rule::list => Ok(GmlValue::List(entries(pair)?)),
        other => Err(malformed(&pair, format!("unexpected {other:?}"))),
    }
}

/// Parses a document into its generic key/value tree.
pub fn parse(input: &str) -> Result<Vec<(String, GmlValue)>, GmlError> {
    let document = GmlParser::parse(Rule::document, input)
        .map_err(syntax_error)?
        .next()
        .ok_or_else(|| GmlError::Syntax {
            line: 1,
            message: "empty document".into(),
        })?;
    entries(document)
}

fn int_field(entries: &[(String, GmlValue)], key: &str) -> Option<i64> {
    entries.iter().find_map(|(k, v)| match v {
        GmlValue::Int(i) if k == key => Some(*i),
        _ => None,
    })
}

fn scalars<'a>(
    entries: &'a [(String, GmlValue)],
    skip: &'a [&'a str],
) -> impl Iterator<Item = (String, Value)> + 'a {
    entries
        .iter()
        .filter(move |(k, _)| !skip.contains(&k.as_str()))
        .filter_map(|(k, v)| v.as_scalar().map(|value| (k.clone(), value)))
}

/// Reads the first `graph` object of a document.
pub fn read_graph(input: &str) -> Result<GmlGraph, GmlError> {
    let document = parse(input)?;
    let graph = document
        .iter()
        .find_map(|(k, v)| match v {
            GmlValue::List(entries) if k == "graph" => Some(entries),
            _ => None,
        })
        .ok_or_else(|| GmlError::Structure("no `graph` object in document".into()))?;

    let directed = int_field(graph, "directed").is_some_and(|d| d != 0);

    let mut positions: HashMap<i64, usize> = HashMap::new();
    let mut nodes = Vec::new();
    for (key, value) in graph {
        let GmlValue::List(entries) = value else {
            continue;
        };
        if key != "node" {
            continue;
        }
        let id = int_field(entries, "id")
            .ok_or_else(|| GmlError::Structure("node without an integer `id`".into()))?;
        if positions.insert(id, nodes.len()).is_some() {
            return Err(GmlError::Structure(format!("duplicate node id {id}")));
        }
        nodes.push(GmlNode {
            id,
            attributes: scalars(entries, &[]).collect(),
        });
    }

    let mut edges = Vec::new();
    for (key, value) in graph {
        let GmlValue::List(entries) = value else {
            continue;
        };
        if key != "edge" {
            continue;
        }
        let endpoint = |field: &str| -> Result<usize, GmlError> {
            let id = int_field(entries, field).ok_or_else(|| {
                GmlError::Structure(format!("edge without an integer `{field}`"))
            })?;
            positions
                .get(&id)
                .copied()
                .ok_or_else(|| GmlError::Structure(format!("edge {field} {id} is not a node")))
        };
        edges.push(GmlEdge {
            source: endpoint("source")?,
            target: endpoint("target")?,
            attributes: scalars(entries, &["source", "target"]).collect(),
        });
    }

    Ok(GmlGraph {
        directed,
        nodes,
        edges,
    })
}
