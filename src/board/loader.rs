//! Sources of board data.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::board::layout::{SpaceDescriptor, TerrainTable, parse_layout, parse_terrains};
use crate::error::LoadError;

/// Name of the layout embedded in the library.
pub const DEFAULT_LAYOUT: &str = "usa";

const USA_LAYOUT: &str = include_str!("../../assets/map/usa.layout");
const USA_TERRAINS: &str = include_str!("../../assets/map/usa.terrains");

/// Parsed board data, ready for [`crate::board::Board::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSource {
    /// Spaces in board order.
    pub layout: Vec<SpaceDescriptor>,
    /// Economics of every terrain.
    pub terrains: TerrainTable,
}

impl BoardSource {
    /// Parse a layout and a terrain table.
    ///
    /// # Errors
    ///
    /// Returns the first parse error of either text.
    pub fn parse(layout: &str, terrains: &str) -> Result<Self, LoadError> {
        Ok(Self {
            layout: parse_layout(layout)?,
            terrains: parse_terrains(terrains)?,
        })
    }
}

/// Resolves a layout name to board data.
pub trait BoardLoader {
    /// Load the named layout.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] if no such layout exists, or a parse
    /// error if it is malformed.
    fn load(&self, name: &str) -> Result<BoardSource, LoadError>;
}

/// Layouts compiled into the library.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLoader;

impl BoardLoader for BuiltinLoader {
    fn load(&self, name: &str) -> Result<BoardSource, LoadError> {
        match name {
            DEFAULT_LAYOUT => BoardSource::parse(USA_LAYOUT, USA_TERRAINS),
            _ => Err(LoadError::NotFound(name.to_string())),
        }
    }
}

/// Layouts read from `<root>/<name>.layout` and `<root>/<name>.terrains`.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    /// Loader rooted at a directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory searched for layouts.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, name: &str, extension: &str) -> Result<String, LoadError> {
        let path = self.root.join(format!("{name}.{extension}"));
        fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => LoadError::NotFound(path.display().to_string()),
            _ => LoadError::Io {
                path: path.display().to_string(),
                source,
            },
        })
    }
}

impl BoardLoader for DirectoryLoader {
    fn load(&self, name: &str) -> Result<BoardSource, LoadError> {
        let layout = self.read(name, "layout")?;
        let terrains = self.read(name, "terrains")?;
        BoardSource::parse(&layout, &terrains)
    }
}
