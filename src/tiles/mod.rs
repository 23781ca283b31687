//! Tile discovery and the grid model.
//!
//! A rendered map directory contains one image per region, named
//! `tile.<x>.<z>.png`, plus optional downscaled variants named
//! `tile.<x>.<z>.1-<scale>.png`. Only the full-size images become tiles;
//! everything else in the directory is ignored.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("failed to read {dir}: {source}")]
    ReadDir {
        dir: PathBuf,
        source: std::io::Error,
    },
}

/// One discovered tile image.
#[derive(Debug, Clone, Serialize)]
pub struct Tile {
    /// Filename stem, e.g. `tile.3.-2`. This is the name the selection
    /// and the mirror panel operate on.
    pub name: String,
    pub x: i32,
    pub z: i32,
    pub path: PathBuf,
    /// Selected mark, driven by the selection widget.
    #[serde(skip)]
    pub marked: bool,
}

/// Inclusive coordinate bounds of the discovered tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridBounds {
    pub min_x: i32,
    pub min_z: i32,
    pub max_x: i32,
    pub max_z: i32,
}

impl GridBounds {
    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x + 1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max_z - self.min_z + 1) as u32
    }
}

/// All tiles found in a map directory, addressable by name or coordinates.
#[derive(Debug, Default)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    bounds: Option<GridBounds>,
}

impl TileGrid {
    /// Scan `dir` for full-size tile images.
    ///
    /// Files that are not tiles are skipped quietly; unreadable directory
    /// entries are skipped with a warning.
    pub fn scan(dir: &Path) -> Result<Self, ScanError> {
        if !dir.is_dir() {
            return Err(ScanError::NotADirectory(dir.to_path_buf()));
        }

        let entries = std::fs::read_dir(dir).map_err(|source| ScanError::ReadDir {
            dir: dir.to_path_buf(),
            source,
        })?;

        let mut tiles = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some((x, z)) = parse_tile_filename(file_name) {
                tiles.push(Tile {
                    name: format!("tile.{}.{}", x, z),
                    x,
                    z,
                    path,
                    marked: false,
                });
            }
        }

        let grid = Self::from_tiles(tiles);
        tracing::info!("Found {} tiles in {}", grid.tiles.len(), dir.display());
        Ok(grid)
    }

    pub fn from_tiles(mut tiles: Vec<Tile>) -> Self {
        // Row-major order, matching how the grid is drawn
        tiles.sort_by_key(|t| (t.z, t.x));
        Self {
            bounds: compute_bounds(&tiles),
            tiles,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn bounds(&self) -> Option<GridBounds> {
        self.bounds
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.name == name)
    }

    pub fn tile_at(&self, x: i32, z: i32) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.x == x && t.z == z)
    }

    /// Set or clear the selected mark on one tile. Returns false when no
    /// tile has this name.
    pub fn set_mark(&mut self, name: &str, marked: bool) -> bool {
        match self.tiles.iter_mut().find(|t| t.name == name) {
            Some(tile) => {
                tile.marked = marked;
                true
            }
            None => false,
        }
    }

    pub fn clear_marks(&mut self) {
        for tile in &mut self.tiles {
            tile.marked = false;
        }
    }
}

fn compute_bounds(tiles: &[Tile]) -> Option<GridBounds> {
    let first = tiles.first()?;
    let mut b = GridBounds {
        min_x: first.x,
        min_z: first.z,
        max_x: first.x,
        max_z: first.z,
    };
    for t in tiles {
        b.min_x = b.min_x.min(t.x);
        b.min_z = b.min_z.min(t.z);
        b.max_x = b.max_x.max(t.x);
        b.max_z = b.max_z.max(t.z);
    }
    Some(b)
}

/// Parse `tile.<x>.<z>.png` into coordinates.
///
/// Scale variants (`tile.<x>.<z>.1-<scale>.png`) and anything else return
/// None.
fn parse_tile_filename(file_name: &str) -> Option<(i32, i32)> {
    let stem = file_name.strip_suffix(".png")?;
    let rest = stem.strip_prefix("tile.")?;
    let (x, z) = rest.split_once('.')?;
    // A remaining dot means a scale suffix, e.g. "0.0.1-2"
    if z.contains('.') {
        return None;
    }
    Some((x.parse().ok()?, z.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(x: i32, z: i32) -> Tile {
        Tile {
            name: format!("tile.{}.{}", x, z),
            x,
            z,
            path: PathBuf::from(format!("tile.{}.{}.png", x, z)),
            marked: false,
        }
    }

    #[test]
    fn test_parse_tile_filename() {
        assert_eq!(parse_tile_filename("tile.0.0.png"), Some((0, 0)));
        assert_eq!(parse_tile_filename("tile.-3.12.png"), Some((-3, 12)));
        assert_eq!(parse_tile_filename("tile.7.-1.png"), Some((7, -1)));
    }

    #[test]
    fn test_parse_rejects_scale_variants_and_foreign_files() {
        assert_eq!(parse_tile_filename("tile.0.0.1-2.png"), None);
        assert_eq!(parse_tile_filename("tile.0.0.1-8.png"), None);
        assert_eq!(parse_tile_filename("tiles.html"), None);
        assert_eq!(parse_tile_filename("tiles.css"), None);
        assert_eq!(parse_tile_filename("tile.a.b.png"), None);
        assert_eq!(parse_tile_filename("tile.0.png"), None);
        assert_eq!(parse_tile_filename("region.0.0.png"), None);
    }

    #[test]
    fn test_scan_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "tile.0.0.png",
            "tile.1.0.png",
            "tile.-1.2.png",
            "tile.0.0.1-2.png",
            "tiles.html",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let grid = TileGrid::scan(dir.path()).unwrap();
        assert_eq!(grid.len(), 3, "Scale variants and html must be skipped");
        assert!(grid.find_by_name("tile.-1.2").is_some());
        assert_eq!(
            grid.bounds(),
            Some(GridBounds {
                min_x: -1,
                min_z: 0,
                max_x: 1,
                max_z: 2,
            })
        );
    }

    #[test]
    fn test_scan_missing_directory() {
        let err = TileGrid::scan(Path::new("/no/such/map/dir")).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }

    #[test]
    fn test_marks() {
        let mut grid = TileGrid::from_tiles(vec![tile(0, 0), tile(1, 0)]);

        assert!(grid.set_mark("tile.1.0", true));
        assert!(!grid.set_mark("tile.9.9", true), "Unknown names report false");
        assert!(grid.find_by_name("tile.1.0").unwrap().marked);

        grid.clear_marks();
        assert!(!grid.find_by_name("tile.1.0").unwrap().marked);
    }

    #[test]
    fn test_lookup_by_coordinates() {
        let grid = TileGrid::from_tiles(vec![tile(0, 0), tile(2, -1)]);
        assert!(grid.tile_at(2, -1).is_some());
        assert!(grid.tile_at(1, 1).is_none(), "Gaps stay empty");
    }
}
