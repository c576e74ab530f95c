//! Source definitions: an STL file or a generated box
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use nalgebra::Point3;
use orienter_core::stl::{self, StlError};
use orienter_core::{BoundingBox, Mesh};
use thiserror::Error;

use crate::input::{self, InputError};

const BOX_PREFIX: &str = "box:";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Stl(#[from] StlError),
    #[error("source definition has no geometry")]
    Empty,
}

/// Where the copied definition comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    Stl(PathBuf),
    /// Box spanning from the local origin to `(width, height, depth)`
    Cuboid { width: f64, height: f64, depth: f64 },
}

impl SourceSpec {
    /// Definition name shown in reports
    pub fn name(&self) -> String {
        match self {
            SourceSpec::Stl(path) => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "stl".to_string()),
            SourceSpec::Cuboid { .. } => "box".to_string(),
        }
    }

    pub fn load(&self) -> Result<Mesh, SourceError> {
        match self {
            SourceSpec::Stl(path) => {
                let data = fs::read(path).map_err(|source| SourceError::Io {
                    path: path.clone(),
                    source,
                })?;
                let mesh = stl::parse_stl(&data)?;
                if mesh.triangles.is_empty() {
                    return Err(SourceError::Empty);
                }
                log::debug!("loaded {} triangles from {}", mesh.triangles.len(), path.display());
                Ok(mesh)
            }
            SourceSpec::Cuboid { width, height, depth } => Ok(Mesh::cuboid(&BoundingBox::new(
                Point3::origin(),
                Point3::new(*width, *height, *depth),
            ))),
        }
    }
}

impl FromStr for SourceSpec {
    type Err = InputError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let Some(dimensions) = text.strip_prefix(BOX_PREFIX) else {
            return Ok(SourceSpec::Stl(PathBuf::from(text)));
        };
        let [width, height, depth] = input::parse_triple(dimensions)?;
        if width <= 0.0 || height <= 0.0 || depth <= 0.0 {
            return Err(InputError::Dimensions(dimensions.to_owned()));
        }
        Ok(SourceSpec::Cuboid { width, height, depth })
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Stl(path) => write!(f, "{}", path.display()),
            SourceSpec::Cuboid { width, height, depth } => {
                write!(f, "{BOX_PREFIX}{width},{height},{depth}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "solid tri
facet normal 0 0 1
outer loop
vertex 0 0 0
vertex 1 0 0
vertex 0 1 3
endloop
endfacet
endsolid tri
";

    #[test]
    fn test_parse_box() {
        let spec: SourceSpec = "box:1,2,3".parse().unwrap();
        assert_eq!(
            spec,
            SourceSpec::Cuboid {
                width: 1.0,
                height: 2.0,
                depth: 3.0
            }
        );
        assert_eq!(spec.to_string(), "box:1,2,3");
        assert_eq!(spec.name(), "box");
    }

    #[test]
    fn test_parse_box_rejects_flat() {
        assert!(matches!("box:1,0,3".parse::<SourceSpec>(), Err(InputError::Dimensions(_))));
        assert!(matches!("box:1,2".parse::<SourceSpec>(), Err(InputError::Triple(_))));
    }

    #[test]
    fn test_box_mesh_bounds() {
        let mesh = "box:2,4,6".parse::<SourceSpec>().unwrap().load().unwrap();
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Point3::origin());
        assert_eq!(bounds.max, Point3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_load_stl_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wedge.stl");
        fs::write(&path, TRIANGLE).unwrap();

        let spec: SourceSpec = path.to_str().unwrap().parse().unwrap();
        assert_eq!(spec.name(), "wedge");
        let mesh = spec.load().unwrap();
        assert_eq!(mesh.bounds().unwrap().depth(), 3.0);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let spec = SourceSpec::Stl(dir.path().join("absent.stl"));
        assert!(matches!(spec.load(), Err(SourceError::Io { .. })));
    }
}
