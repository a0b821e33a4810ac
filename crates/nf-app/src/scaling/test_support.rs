//! Test doubles shared by the scaling unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use bytes::Bytes;
use mockall::mock;
use nf_core::ports::{ImageContentPort, ImageResizerPort, ScaleAnnotation};
use nf_core::{MimeType, NamedImage, ResizedImage, ScaleParams, ScalingError};

mock! {
    pub Resizer {}

    impl ImageResizerPort for Resizer {
        fn scale_image(
            &self,
            data: &[u8],
            params: &ScaleParams,
        ) -> Result<Option<ResizedImage>, ScalingError>;
    }
}

/// Content object with settable fields and modification time.
pub struct FakeContent {
    url: String,
    title: String,
    primary: Option<String>,
    fields: Mutex<HashMap<String, NamedImage>>,
    modified_ms: AtomicI64,
    scales: ScaleAnnotation,
}

impl FakeContent {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            title: "foo".to_string(),
            primary: None,
            fields: Mutex::new(HashMap::new()),
            modified_ms: AtomicI64::new(1_000),
            scales: ScaleAnnotation::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_primary(mut self, fieldname: &str) -> Self {
        self.primary = Some(fieldname.to_string());
        self
    }

    pub fn with_field(self, name: &str, value: NamedImage) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn set_field(&self, name: &str, value: NamedImage) {
        self.fields.lock().unwrap().insert(name.to_string(), value);
    }

    pub fn touch(&self, modified_ms: i64) {
        self.modified_ms.store(modified_ms, Ordering::SeqCst);
    }
}

impl ImageContentPort for FakeContent {
    fn field(&self, name: &str) -> Option<NamedImage> {
        self.fields.lock().unwrap().get(name).cloned()
    }

    fn primary_field_name(&self) -> Option<String> {
        self.primary.clone()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn modified_ms(&self) -> i64 {
        self.modified_ms.load(Ordering::SeqCst)
    }

    fn absolute_url(&self) -> String {
        self.url.clone()
    }

    fn scale_annotation(&self) -> &ScaleAnnotation {
        &self.scales
    }
}

pub fn gif_value(dimensions: (u32, u32)) -> NamedImage {
    NamedImage::inline(
        Bytes::from_static(b"GIF89a-not-really"),
        MimeType("image/gif".to_string()),
        Some("image.gif".to_string()),
        dimensions,
    )
}

/// Resized output honoring the requested box, as a fit-within resize would.
pub fn fake_resize(params: &ScaleParams, source: (u32, u32)) -> ResizedImage {
    let (w, h) = source;
    let tw = params.width.unwrap_or(w);
    let th = params.height.unwrap_or(h);
    let side = tw.min(th).min(w.min(h));
    ResizedImage {
        data: Bytes::from_static(b"\xff\xd8jpeg"),
        format: "JPEG".to_string(),
        dimensions: (side, side),
    }
}
