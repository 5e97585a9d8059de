//! Texture-atlas descriptor parsing
//!
//! At level setup the renderer needs one UV tile per entity class. The
//! descriptor is a plain text file, one line per class:
//!
//! ```text
//! arena: 0 0 512 512
//! brick: 512 0 64 32
//! ```
//!
//! Tiles are given in pixel space and converted to UV space against the
//! atlas dimensions. A missing or malformed entry is fatal at setup; the
//! game cannot render without it.

use std::error::Error;
use std::fmt;

use crate::render::ENTITY_CLASS_COUNT;

/// The five entity classes with a dedicated atlas tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityClass {
    Arena,
    Brick,
    Ball,
    Paddle,
    Bonus,
}

impl EntityClass {
    pub const ALL: [EntityClass; ENTITY_CLASS_COUNT] = [
        EntityClass::Arena,
        EntityClass::Brick,
        EntityClass::Ball,
        EntityClass::Paddle,
        EntityClass::Bonus,
    ];

    /// Slot in the UV-transform buffer
    pub fn uv_slot(self) -> usize {
        match self {
            EntityClass::Arena => 0,
            EntityClass::Brick => 1,
            EntityClass::Ball => 2,
            EntityClass::Paddle => 3,
            EntityClass::Bonus => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EntityClass::Arena => "arena",
            EntityClass::Brick => "brick",
            EntityClass::Ball => "ball",
            EntityClass::Paddle => "paddle",
            EntityClass::Bonus => "bonus",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.name() == name)
    }
}

/// One atlas tile, in pixels until converted
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextureTile {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl TextureTile {
    /// Rescale from pixel space to [0, 1] UV space
    pub fn to_uv_space(self, atlas_width: u32, atlas_height: u32) -> Self {
        assert!(atlas_width > 0 && atlas_height > 0);

        let w = atlas_width as f32;
        let h = atlas_height as f32;
        Self {
            x: self.x / w,
            y: self.y / h,
            width: self.width / w,
            height: self.height / h,
        }
    }
}

/// Why an atlas descriptor was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtlasError {
    /// Line did not match `name: x y w h`
    MalformedLine { line: usize },
    /// Name is not one of the five entity classes
    UnknownEntity { line: usize, name: String },
    /// The same class appeared twice
    DuplicateEntity { line: usize, name: String },
    /// A required class never appeared
    MissingEntity { name: &'static str },
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::MalformedLine { line } => {
                write!(f, "atlas descriptor line {line}: expected `name: x y w h`")
            }
            AtlasError::UnknownEntity { line, name } => {
                write!(f, "atlas descriptor line {line}: unknown entity `{name}`")
            }
            AtlasError::DuplicateEntity { line, name } => {
                write!(f, "atlas descriptor line {line}: duplicate entity `{name}`")
            }
            AtlasError::MissingEntity { name } => {
                write!(f, "atlas descriptor: missing entity `{name}`")
            }
        }
    }
}

impl Error for AtlasError {}

/// UV tiles for all five entity classes, indexed by UV slot
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasLayout {
    tiles: [TextureTile; ENTITY_CLASS_COUNT],
}

impl AtlasLayout {
    pub fn tile(&self, uv_slot: usize) -> TextureTile {
        self.tiles[uv_slot]
    }
}

/// Parse a descriptor and convert every tile to UV space. Blank lines are
/// skipped; every entity class must appear exactly once.
pub fn parse_atlas(
    descriptor: &str,
    atlas_width: u32,
    atlas_height: u32,
) -> Result<AtlasLayout, AtlasError> {
    let mut tiles = [None; ENTITY_CLASS_COUNT];

    for (index, raw_line) in descriptor.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (name, rest) = trimmed
            .split_once(':')
            .ok_or(AtlasError::MalformedLine { line })?;
        let name = name.trim();

        let class = EntityClass::from_name(name).ok_or_else(|| AtlasError::UnknownEntity {
            line,
            name: name.to_owned(),
        })?;

        let mut numbers = rest
            .split_whitespace()
            .map(|token| token.parse::<f32>().map_err(|_| AtlasError::MalformedLine { line }));
        let mut next = || numbers.next().ok_or(AtlasError::MalformedLine { line })?;
        let tile = TextureTile {
            x: next()?,
            y: next()?,
            width: next()?,
            height: next()?,
        };

        let slot = &mut tiles[class.uv_slot()];
        if slot.is_some() {
            return Err(AtlasError::DuplicateEntity { line, name: name.to_owned() });
        }
        *slot = Some(tile.to_uv_space(atlas_width, atlas_height));
    }

    let mut layout = AtlasLayout { tiles: [TextureTile::default(); ENTITY_CLASS_COUNT] };
    for class in EntityClass::ALL {
        layout.tiles[class.uv_slot()] =
            tiles[class.uv_slot()].ok_or(AtlasError::MissingEntity { name: class.name() })?;
    }

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = "\
arena: 0 0 512 256
brick: 0 256 64 32
ball: 64 256 32 32
paddle: 96 256 96 16
bonus: 192 256 32 16
";

    #[test]
    fn test_parse_well_formed_descriptor() {
        let layout = parse_atlas(DESCRIPTOR, 512, 512).unwrap();

        let brick = layout.tile(EntityClass::Brick.uv_slot());
        assert_eq!(brick.x, 0.0);
        assert_eq!(brick.y, 0.5);
        assert_eq!(brick.width, 0.125);
        assert_eq!(brick.height, 32.0 / 512.0);
    }

    #[test]
    fn test_missing_entity_is_an_error() {
        let partial = "arena: 0 0 512 256\nbrick: 0 256 64 32\n";
        assert_eq!(
            parse_atlas(partial, 512, 512),
            Err(AtlasError::MissingEntity { name: "ball" })
        );
    }

    #[test]
    fn test_unknown_entity_is_an_error() {
        let bad = "vaus: 0 0 64 16\n";
        assert_eq!(
            parse_atlas(bad, 512, 512),
            Err(AtlasError::UnknownEntity { line: 1, name: "vaus".into() })
        );
    }

    #[test]
    fn test_malformed_numbers_are_an_error() {
        let bad = "arena: 0 zero 512 256\n";
        assert_eq!(parse_atlas(bad, 512, 512), Err(AtlasError::MalformedLine { line: 1 }));
    }

    #[test]
    fn test_duplicate_entity_is_an_error() {
        let dup = "arena: 0 0 512 256\narena: 0 0 1 1\n";
        assert_eq!(
            parse_atlas(dup, 512, 512),
            Err(AtlasError::DuplicateEntity { line: 2, name: "arena".into() })
        );
    }
}
