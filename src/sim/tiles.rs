//! Tile-type registry
//!
//! A static table shared by every map. Maps refer to tiles by name through
//! their own index -> name table.

use crate::Rgb;

/// Static description of one kind of tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileType {
    pub name: &'static str,
    pub walkable: bool,
    pub sprite: &'static str,
    pub color: Option<Rgb>,
    pub interactive: bool,
}

/// Returned for anything off the grid or unresolvable
pub const VOID: TileType = TileType {
    name: "void",
    walkable: false,
    sprite: " ",
    color: Some(Rgb::BLACK),
    interactive: false,
};

const REGISTRY: &[TileType] = &[
    VOID,
    TileType {
        name: "sky",
        walkable: false,
        sprite: "·",
        color: Some(Rgb(135, 206, 235)),
        interactive: false,
    },
    TileType {
        name: "cloud",
        walkable: true,
        sprite: "☁",
        color: Some(Rgb(245, 248, 255)),
        interactive: false,
    },
    TileType {
        name: "storm_cloud",
        walkable: false,
        sprite: "⛈",
        color: Some(Rgb(96, 104, 128)),
        interactive: false,
    },
    TileType {
        name: "rainbow",
        walkable: true,
        sprite: "🌈",
        color: Some(Rgb(255, 214, 240)),
        interactive: false,
    },
    TileType {
        name: "flower",
        walkable: true,
        sprite: "🌸",
        color: Some(Rgb(232, 245, 233)),
        interactive: false,
    },
    TileType {
        name: "tree",
        walkable: false,
        sprite: "🌳",
        color: Some(Rgb(200, 230, 201)),
        interactive: false,
    },
    TileType {
        name: "castle_wall",
        walkable: false,
        sprite: "🧱",
        color: Some(Rgb(176, 160, 200)),
        interactive: false,
    },
    TileType {
        name: "castle_floor",
        walkable: true,
        sprite: " ",
        color: Some(Rgb(224, 214, 240)),
        interactive: false,
    },
    TileType {
        name: "fountain",
        walkable: false,
        sprite: "⛲",
        color: Some(Rgb(179, 229, 252)),
        interactive: true,
    },
];

/// Look up a tile type by registry name
pub fn tile_type(name: &str) -> Option<&'static TileType> {
    REGISTRY.iter().find(|t| t.name == name)
}

/// Look up a tile type, falling back to void for unknown names
pub fn tile_type_or_void(name: &str) -> &'static TileType {
    tile_type(name).unwrap_or(&VOID)
}

/// Every registered tile type, in registry order
pub fn all() -> &'static [TileType] {
    REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_is_registered_and_blocking() {
        let void = tile_type("void").unwrap();
        assert!(!void.walkable);
        assert_eq!(*void, VOID);
    }

    #[test]
    fn test_unknown_name_falls_back_to_void() {
        assert_eq!(tile_type_or_void("lava").name, "void");
        assert!(tile_type_or_void("cloud").walkable);
    }

    #[test]
    fn test_names_unique() {
        let names: std::collections::HashSet<_> = all().iter().map(|t| t.name).collect();
        assert_eq!(names.len(), all().len());
    }
}
