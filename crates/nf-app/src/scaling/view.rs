use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, TimeZone};
use nf_core::ports::{
    ImageContentPort, ImageScaleFactoryPort, ScaleStoragePort, ScaleStorageProviderPort,
};
use nf_core::{
    Direction, ModificationMarker, ScaleId, ScaleParams, ScaleRequest, ScalingError, SizeCatalog,
};
use tracing::{debug, warn};

use super::{ImageScale, ScalingUtilities, TagOptions};

/// Collaborators of the serving view.
#[derive(Clone)]
pub struct ScalingDeps {
    pub factory: Arc<dyn ImageScaleFactoryPort>,
    pub storages: Arc<dyn ScaleStorageProviderPort>,
    pub utilities: Arc<ScalingUtilities>,
}

/// A scale request as callers phrase it.
///
/// A named `scale` takes precedence over `width`/`height`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaleQuery {
    pub fieldname: Option<String>,
    pub scale: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub direction: Option<Direction>,
    pub quality: Option<u8>,
    pub extra: BTreeMap<String, String>,
}

impl ScaleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, fieldname: impl Into<String>) -> Self {
        self.fieldname = Some(fieldname.into());
        self
    }

    pub fn scale(mut self, scale: impl Into<String>) -> Self {
        self.scale = Some(scale.into());
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Image scaling view bound to one content object.
pub struct ImageScaling {
    content: Arc<dyn ImageContentPort>,
    deps: ScalingDeps,
    default_sizes: SizeCatalog,
    default_direction: Direction,
}

impl ImageScaling {
    pub fn new(
        content: Arc<dyn ImageContentPort>,
        deps: ScalingDeps,
        default_sizes: SizeCatalog,
    ) -> Self {
        Self {
            content,
            deps,
            default_sizes,
            default_direction: Direction::default(),
        }
    }

    /// Direction used when a query names none.
    pub fn with_default_direction(mut self, direction: Direction) -> Self {
        self.default_direction = direction;
        self
    }

    /// Modification marker of the content object.
    pub fn modified(&self) -> ModificationMarker {
        Local
            .timestamp_millis_opt(self.content.modified_ms())
            .single()
            .unwrap_or_default()
    }

    /// The size catalog in effect: the registered one when it is non-empty,
    /// the view's default otherwise.
    pub fn available_sizes(&self) -> SizeCatalog {
        self.deps
            .utilities
            .available_sizes()
            .unwrap_or_else(|| self.default_sizes.clone())
    }

    pub fn set_available_sizes(&mut self, sizes: SizeCatalog) {
        self.default_sizes = sizes;
    }

    /// Sizes offered for `fieldname`; currently the same for every field.
    pub fn get_available_sizes(&self, _fieldname: Option<&str>) -> SizeCatalog {
        self.available_sizes()
    }

    /// Pixel size of a field, `(0, 0)` when it is unset.
    pub fn get_image_size(&self, fieldname: Option<&str>) -> (u32, u32) {
        self.resolve_field(fieldname)
            .and_then(|name| self.content.field(&name))
            .map(|value| value.image_size())
            .unwrap_or((0, 0))
    }

    /// Resolve one `@@images/{name}` segment.
    ///
    /// Names shaped like a stable identifier are looked up in the cache;
    /// anything else is a field name. A trailing extension is ignored.
    #[tracing::instrument(name = "usecase.scaling.publish_traverse", skip(self))]
    pub fn publish_traverse(&self, name: &str) -> Result<ImageScale, ScalingError> {
        let stem = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name);

        if ScaleId::looks_like_uid(stem) {
            let storage = self.deps.storages.storage_for(self.content.as_ref());
            let record = storage
                .get(&ScaleId::from(stem))
                .ok_or_else(|| ScalingError::NotFound(name.to_string()))?;
            return Ok(ImageScale::new(self.content.clone(), record));
        }

        let value = self
            .content
            .field(stem)
            .ok_or_else(|| ScalingError::NotFound(name.to_string()))?;
        Ok(ImageScale::for_field(self.content.clone(), stem, value))
    }

    /// Resolve `{name}` or `{field}/{scale}` below `@@images`.
    pub fn traverse(&self, path: &str) -> Result<ImageScale, ScalingError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [name] => self.publish_traverse(name),
            [field, scale] => self
                .scale(&ScaleQuery::new().field(*field).scale(*scale))?
                .ok_or_else(|| ScalingError::NotFound(path.to_string())),
            _ => Err(ScalingError::NotFound(path.to_string())),
        }
    }

    /// Get or create a scale.
    ///
    /// `Ok(None)` when the object has no such field, the named size is
    /// unknown, or no scale could be produced.
    #[tracing::instrument(name = "usecase.scaling.scale", skip(self))]
    pub fn scale(&self, query: &ScaleQuery) -> Result<Option<ImageScale>, ScalingError> {
        let Some(fieldname) = self.resolve_field(query.fieldname.as_deref()) else {
            debug!("no field given and no primary field");
            return Ok(None);
        };

        let mut params = ScaleParams {
            direction: query.direction.unwrap_or(self.default_direction),
            width: query.width,
            height: query.height,
            quality: query.quality,
            extra: query.extra.clone(),
        };

        if let Some(scale) = &query.scale {
            if query.width.is_some() || query.height.is_some() {
                warn!(
                    scale = %scale,
                    width = ?query.width,
                    height = ?query.height,
                    "named scale given together with explicit dimensions; using the named scale"
                );
            }
            let sizes = self.get_available_sizes(Some(&fieldname));
            let Some(&(width, height)) = sizes.get(scale) else {
                debug!(scale = %scale, "unknown scale name");
                return Ok(None);
            };
            params.width = Some(width);
            params.height = Some(height);
        }

        let request = ScaleRequest {
            fieldname,
            scale: query.scale.clone(),
            params,
        };
        let storage = self.deps.storages.storage_for(self.content.as_ref());
        let record = storage.scale(&request, &|| self.modified(), &|request| {
            self.deps.factory.create(self.content.as_ref(), request)
        })?;
        Ok(record.map(|record| ImageScale::new(self.content.clone(), record)))
    }

    /// Render the tag of a scale, `None` when there is no such scale.
    pub fn tag(
        &self,
        query: &ScaleQuery,
        options: &TagOptions,
    ) -> Result<Option<String>, ScalingError> {
        Ok(self.scale(query)?.map(|scale| scale.tag(options)))
    }

    fn resolve_field(&self, fieldname: Option<&str>) -> Option<String> {
        fieldname
            .map(str::to_string)
            .or_else(|| self.content.primary_field_name())
    }
}
