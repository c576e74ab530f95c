//! Text input: coordinate triples, edge lists and setting assignments
use nalgebra::Point3;
use nom::{
    branch::alt,
    character::complete::{char, space0, space1},
    combinator::{all_consuming, recognize},
    number::complete::double,
    sequence::{delimited, tuple},
    IResult,
};
use orienter_core::Edge;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("expected three numbers 'X,Y,Z', got '{0}'")]
    Triple(String),
    #[error("box dimensions must be positive, got '{0}'")]
    Dimensions(String),
    #[error("line {0}: expected six coordinates 'x1 y1 z1 x2 y2 z2'")]
    EdgeLine(usize),
    #[error("expected KEY=VALUE, got '{0}'")]
    Assignment(String),
}

pub type InputResult<T> = Result<T, InputError>;

/// A comma (optionally padded) or a run of blanks
fn separator(input: &str) -> IResult<&str, &str> {
    alt((recognize(delimited(space0, char(','), space0)), space1))(input)
}

fn triple(input: &str) -> IResult<&str, [f64; 3]> {
    let (input, (x, _, y, _, z)) = tuple((double, separator, double, separator, double))(input)?;
    Ok((input, [x, y, z]))
}

fn edge(input: &str) -> IResult<&str, Edge> {
    let (input, (start, _, end)) = tuple((triple, separator, triple))(input)?;
    Ok((input, Edge::new(Point3::from(start), Point3::from(end))))
}

/// Parse `X,Y,Z` (commas or blanks)
pub fn parse_triple(text: &str) -> InputResult<[f64; 3]> {
    match all_consuming(delimited(space0, triple, space0))(text) {
        Ok((_, values)) if values.iter().all(|v| v.is_finite()) => Ok(values),
        _ => Err(InputError::Triple(text.to_owned())),
    }
}

pub fn parse_point(text: &str) -> InputResult<Point3<f64>> {
    parse_triple(text).map(Point3::from)
}

/// Parse an edge list, one edge per line.
///
/// Blank lines and `#` comments are skipped.
pub fn parse_edges(text: &str) -> InputResult<Vec<Edge>> {
    let mut edges = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let parsed = all_consuming(edge)(line).map(|(_, edge)| edge);
        match parsed {
            Ok(edge) if edge.start.iter().chain(edge.end.iter()).all(|v| v.is_finite()) => {
                edges.push(edge)
            }
            _ => return Err(InputError::EdgeLine(index + 1)),
        }
    }
    Ok(edges)
}

/// Split `KEY=VALUE`; the value is read as JSON, falling back to a plain string
pub fn parse_assignment(text: &str) -> InputResult<(String, Value)> {
    let Some((key, raw)) = text.split_once('=') else {
        return Err(InputError::Assignment(text.to_owned()));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(InputError::Assignment(text.to_owned()));
    }
    let raw = raw.trim();
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
    Ok((key.to_owned(), value))
}
