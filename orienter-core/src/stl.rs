//! STL import for definition geometry, binary and ASCII
use nalgebra::Point3;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{multispace0, multispace1},
    multi::many0,
    number::complete::double,
    sequence::preceded,
    IResult,
};
use thiserror::Error;

use crate::geometry::{Mesh, Triangle};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StlError {
    #[error("file too small to be a valid STL ({0} bytes)")]
    TooSmall(usize),
    #[error("unexpected end of file in facet {0}")]
    Truncated(usize),
    #[error("failed to parse ASCII STL: {0}")]
    Ascii(String),
}

pub type StlResult<T> = Result<T, StlError>;

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> StlResult<Mesh> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooSmall(data.len()));
    }

    // Skip 80-byte header
    let data = &data[HEADER_LEN..];
    let triangle_count = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let facets = &data[4..];

    let mut mesh = Mesh::with_capacity(triangle_count.min(facets.len() / FACET_LEN));
    for index in 0..triangle_count {
        let facet = facets
            .get(index * FACET_LEN..(index + 1) * FACET_LEN)
            .ok_or(StlError::Truncated(index))?;

        // 12 bytes of normal, then three vertices; the trailing attribute
        // count is ignored. Normals are recomputed from the winding.
        let vertex = |slot: usize| {
            let offset = 12 + slot * 12;
            Point3::new(
                read_f32(facet, offset),
                read_f32(facet, offset + 4),
                read_f32(facet, offset + 8),
            )
        };
        mesh.add_triangle(Triangle::new(vertex(0), vertex(1), vertex(2)));
    }

    Ok(mesh)
}

fn read_f32(bytes: &[u8], offset: usize) -> f64 {
    let raw = [bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]];
    f64::from(f32::from_le_bytes(raw))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> StlResult<Mesh> {
    match parse_ascii_stl_impl(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(e) => Err(StlError::Ascii(format!("{e:?}"))),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = take_till(|c| c == '\n')(input)?; // Optional name
    let (input, triangles) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;

    let mut mesh = Mesh::with_capacity(triangles.len());
    for triangle in triangles {
        mesh.add_triangle(triangle);
    }

    Ok((input, mesh))
}

fn parse_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = parse_point(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, Triangle::new(v1, v2, v3)))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f64>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    parse_point(input)
}

fn parse_point(input: &str) -> IResult<&str, Point3<f64>> {
    let (input, _) = multispace0(input)?;
    let (input, x) = double(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = double(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = double(input)?;
    Ok((input, Point3::new(x, y, z)))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> StlResult<Mesh> {
    // Binary files may also start with "solid", so fall back on failure
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }

    parse_binary_stl(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "solid part
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 2 0 0
      vertex 0 3 1.5
    endloop
  endfacet
endsolid part
";

    fn binary(triangles: &[[f32; 9]], declared: u32) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&declared.to_le_bytes());
        for triangle in triangles {
            data.extend_from_slice(&[0u8; 12]);
            for value in triangle {
                data.extend_from_slice(&value.to_le_bytes());
            }
            data.extend_from_slice(&[0u8; 2]);
        }
        data
    }

    #[test]
    fn test_parse_binary_header() {
        let data = binary(&[], 0);
        let mesh = parse_binary_stl(&data).unwrap();
        assert_eq!(mesh.triangles.len(), 0);
    }

    #[test]
    fn test_parse_binary_triangle() {
        let data = binary(&[[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 4.0]], 1);
        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.triangles.len(), 1);
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.depth(), 4.0);
    }

    #[test]
    fn test_binary_too_small() {
        assert_eq!(parse_binary_stl(&[0u8; 10]), Err(StlError::TooSmall(10)));
    }

    #[test]
    fn test_binary_truncated() {
        let data = binary(&[[0.0; 9]], 2);
        assert_eq!(parse_binary_stl(&data), Err(StlError::Truncated(1)));
    }

    #[test]
    fn test_parse_ascii() {
        let mesh = parse_stl(TRIANGLE.as_bytes()).unwrap();
        assert_eq!(mesh.triangles.len(), 1);
        assert_eq!(mesh.triangles[0].vertices[2], Point3::new(0.0, 3.0, 1.5));
    }

    #[test]
    fn test_ascii_garbage() {
        assert!(matches!(parse_ascii_stl("solid x\nfacet nonsense"), Err(StlError::Ascii(_))));
    }
}
