use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{MimeType, NamedImage};
use crate::ids::ScaleId;

/// Named size catalog: scale name to `(width, height)`.
pub type SizeCatalog = BTreeMap<String, (u32, u32)>;

/// Point in time derived from the content object's modification timestamp.
///
/// Only compared for cache freshness, never displayed.
pub type ModificationMarker = DateTime<Local>;

/// Resize policy passed to the resize primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Direction {
    /// Fit within the requested box keeping the aspect ratio, never upscale.
    #[default]
    Thumbnail,
    /// Crop to the requested box without upscaling.
    Down,
    /// Cover the requested box and crop, upscaling when needed.
    Up,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Thumbnail => "thumbnail",
            Direction::Down => "scale-crop-to-fit",
            Direction::Up => "scale-crop-to-fill",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thumbnail" | "keep" => Ok(Direction::Thumbnail),
            "scale-crop-to-fit" | "down" => Ok(Direction::Down),
            "scale-crop-to-fill" | "up" => Ok(Direction::Up),
            other => Err(format!("unknown scaling direction: {other}")),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        direction.as_str().to_string()
    }
}

/// Parameters handed to the resize primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScaleParams {
    pub direction: Direction,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<u8>,
    /// Extra primitive specific parameters, kept sorted so they hash stably.
    pub extra: BTreeMap<String, String>,
}

impl ScaleParams {
    /// True when no transform was asked for.
    pub fn is_pass_through(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// A fully resolved scale request for one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScaleRequest {
    pub fieldname: String,
    /// Name of the catalog size the dimensions came from, if any.
    pub scale: Option<String>,
    pub params: ScaleParams,
}

impl ScaleRequest {
    pub fn new(fieldname: impl Into<String>, params: ScaleParams) -> Self {
        Self {
            fieldname: fieldname.into(),
            scale: None,
            params,
        }
    }

    pub fn key(&self) -> ScaleKey {
        ScaleKey(self.clone())
    }
}

/// Mutable addressing key of a scale: field name plus every parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScaleKey(ScaleRequest);

/// Output of the resize primitive.
#[derive(Debug, Clone)]
pub struct ResizedImage {
    pub data: Bytes,
    /// Image format name as reported by the codec, e.g. `JPEG`.
    pub format: String,
    pub dimensions: (u32, u32),
}

/// Result of the scale factory.
#[derive(Debug, Clone)]
pub enum GeneratedScale {
    Scaled {
        value: NamedImage,
        format: String,
        dimensions: (u32, u32),
    },
    /// No transform requested: original format and dimensions, no payload.
    PassThrough {
        format: String,
        dimensions: (u32, u32),
    },
}

/// One cached scale. Never mutated once created.
#[derive(Debug, Clone)]
pub struct ScaleRecord {
    pub uid: ScaleId,
    pub fieldname: String,
    /// Unset for pass-through records; the field value is read instead.
    pub data: Option<NamedImage>,
    pub mimetype: MimeType,
    pub width: u32,
    pub height: u32,
    pub key: ScaleKey,
    pub modified: ModificationMarker,
}

impl ScaleRecord {
    /// Build a record with a fresh identifier from factory output.
    pub fn from_generated(
        request: &ScaleRequest,
        generated: GeneratedScale,
        modified: ModificationMarker,
    ) -> Self {
        let (data, mimetype, (width, height)) = match generated {
            GeneratedScale::Scaled {
                value,
                format,
                dimensions,
            } => {
                let mimetype = MimeType::image(&format);
                (Some(value), mimetype, dimensions)
            }
            GeneratedScale::PassThrough { format, dimensions } => {
                (None, MimeType::image(&format), dimensions)
            }
        };
        Self {
            uid: ScaleId::new(),
            fieldname: request.fieldname.clone(),
            data,
            mimetype,
            width,
            height,
            key: request.key(),
            modified,
        }
    }

    /// Whether the record is still valid for content last modified at `current`.
    pub fn is_fresh(&self, current: &ModificationMarker) -> bool {
        self.modified >= *current
    }
}
