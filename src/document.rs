//! A content object backed by one image file on disk.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use anyhow::Context;
use nf_core::ports::{BlobPort, ImageContentPort, ScaleAnnotation};
use nf_core::{NamedFileSource, NamedImage, SourcePayload};
use nf_infra::image::named_image_from_payload;
use tracing::info;

/// Content object holding a single image field ingested from a file.
pub struct FileDocument {
    url: String,
    title: String,
    fieldname: String,
    value: NamedImage,
    modified_ms: i64,
    scales: ScaleAnnotation,
}

impl FileDocument {
    /// Ingest `path` into `blob` as field `fieldname`.
    ///
    /// The handle is passed without its path, so the file is copied into the
    /// blob rather than adopted; the source file is left in place.
    pub fn ingest(
        path: &Path,
        fieldname: &str,
        url: &str,
        blob: Arc<dyn BlobPort>,
    ) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open image: {}", path.display()))?;
        let modified_ms = file
            .metadata()
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or_default();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let source = SourcePayload::File(NamedFileSource::from_file(file));
        let value = named_image_from_payload(source, blob, filename)
            .with_context(|| format!("Failed to ingest image: {}", path.display()))?;
        info!(
            field = fieldname,
            content_type = %value.content_type(),
            width = value.width(),
            height = value.height(),
            "ingested image"
        );

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            title,
            fieldname: fieldname.to_string(),
            value,
            modified_ms,
            scales: ScaleAnnotation::new(),
        })
    }
}

impl ImageContentPort for FileDocument {
    fn field(&self, name: &str) -> Option<NamedImage> {
        (name == self.fieldname).then(|| self.value.clone())
    }

    fn primary_field_name(&self) -> Option<String> {
        Some(self.fieldname.clone())
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn modified_ms(&self) -> i64 {
        self.modified_ms
    }

    fn absolute_url(&self) -> String {
        self.url.clone()
    }

    fn scale_annotation(&self) -> &ScaleAnnotation {
        &self.scales
    }
}
