use std::sync::Arc;

use nf_core::ports::{ImageContentPort, ImageResizerPort, ImageScaleFactoryPort};
use nf_core::{GeneratedScale, MimeType, ResizedImage, ScaleRequest, ScalingError};
use tracing::{debug, error};

use super::ScalingUtilities;

/// Builds scale payloads from a content object's image fields.
/// 根据内容对象的图片字段生成缩放数据。
pub struct ImageScaleFactory {
    resizer: Arc<dyn ImageResizerPort>,
    utilities: Arc<ScalingUtilities>,
}

impl ImageScaleFactory {
    pub fn new(resizer: Arc<dyn ImageResizerPort>, utilities: Arc<ScalingUtilities>) -> Self {
        Self { resizer, utilities }
    }
}

impl ImageScaleFactoryPort for ImageScaleFactory {
    /// Produce a scale of `request.fieldname`.
    ///
    /// Without width and height the original format and size are reported and
    /// nothing is resized. Resize failures other than conflicts and
    /// interruptions are logged and reported as `Ok(None)`.
    #[tracing::instrument(
        name = "usecase.scaling.create_scale",
        skip(self, content, request),
        fields(fieldname = %request.fieldname)
    )]
    fn create(
        &self,
        content: &dyn ImageContentPort,
        request: &ScaleRequest,
    ) -> Result<Option<GeneratedScale>, ScalingError> {
        let Some(orig_value) = content.field(&request.fieldname) else {
            debug!("field is unset");
            return Ok(None);
        };

        if request.params.is_pass_through() {
            return Ok(Some(GeneratedScale::PassThrough {
                format: orig_value.content_type().subtype().to_string(),
                dimensions: orig_value.image_size(),
            }));
        }

        let orig_data = orig_value.read_bytes()?;
        if orig_data.is_empty() {
            debug!("field holds no data");
            return Ok(None);
        }

        let mut params = request.params.clone();
        if params.quality.is_none() {
            params.quality = self.utilities.quality();
        }

        let resized = match self.resizer.scale_image(&orig_data, &params) {
            Ok(resized) => resized,
            Err(err) if err.must_propagate() => return Err(err),
            Err(err) => {
                error!(
                    error = %err,
                    value = ?orig_value,
                    url = %content.absolute_url(),
                    "could not scale image"
                );
                return Ok(None);
            }
        };
        let Some(ResizedImage {
            data,
            format,
            dimensions,
        }) = resized
        else {
            return Ok(None);
        };

        let value = orig_value
            .derive(data, MimeType::image(&format), dimensions)?
            .with_fieldname(request.fieldname.as_str());
        Ok(Some(GeneratedScale::Scaled {
            value,
            format,
            dimensions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use nf_core::{
        FileChunk, ImageData, ImageKind, MemoryBlob, NamedImage, ScaleParams, SourcePayload,
    };

    use super::*;
    use crate::scaling::test_support::{fake_resize, gif_value, FakeContent, MockResizer};

    fn request(width: Option<u32>, height: Option<u32>) -> ScaleRequest {
        ScaleRequest::new(
            "image",
            ScaleParams {
                width,
                height,
                ..ScaleParams::default()
            },
        )
    }

    fn factory(resizer: MockResizer) -> ImageScaleFactory {
        ImageScaleFactory::new(Arc::new(resizer), Arc::new(ScalingUtilities::new()))
    }

    #[test]
    fn test_pass_through_skips_resizer() {
        let mut resizer = MockResizer::new();
        resizer.expect_scale_image().times(0);
        let content = FakeContent::new("http://nohost/item").with_field("image", gif_value((200, 200)));

        let generated = factory(resizer)
            .create(&content, &request(None, None))
            .unwrap()
            .unwrap();

        match generated {
            GeneratedScale::PassThrough { format, dimensions } => {
                assert_eq!(format, "gif");
                assert_eq!(dimensions, (200, 200));
            }
            other => panic!("expected pass-through, got {other:?}"),
        }
    }

    #[test]
    fn test_absent_field_is_none() {
        let mut resizer = MockResizer::new();
        resizer.expect_scale_image().times(0);
        let content = FakeContent::new("http://nohost/item");

        let generated = factory(resizer).create(&content, &request(Some(10), Some(10)));

        assert!(generated.unwrap().is_none());
    }

    #[test]
    fn test_empty_data_is_none() {
        let mut resizer = MockResizer::new();
        resizer.expect_scale_image().times(0);
        let empty = NamedImage::inline(Bytes::new(), MimeType::image("gif"), None, (0, 0));
        let content = FakeContent::new("http://nohost/item").with_field("image", empty);

        let generated = factory(resizer).create(&content, &request(Some(10), Some(10)));

        assert!(generated.unwrap().is_none());
    }

    #[test]
    fn test_scaled_value_keeps_filename_and_tags_field() {
        let mut resizer = MockResizer::new();
        resizer
            .expect_scale_image()
            .times(1)
            .returning(|_, params| Ok(Some(fake_resize(params, (200, 200)))));
        let content = FakeContent::new("http://nohost/item").with_field("image", gif_value((200, 200)));

        let generated = factory(resizer)
            .create(&content, &request(Some(100), Some(80)))
            .unwrap()
            .unwrap();

        let GeneratedScale::Scaled {
            value,
            format,
            dimensions,
        } = generated
        else {
            panic!("expected a scaled value");
        };
        assert_eq!(format, "JPEG");
        assert_eq!(dimensions, (80, 80));
        assert_eq!(value.content_type().as_str(), "image/jpeg");
        assert_eq!(value.filename(), Some("image.gif"));
        assert_eq!(value.fieldname(), Some("image"));
        assert_eq!(value.kind(), ImageKind::Inline);
    }

    #[test]
    fn test_blob_source_yields_blob_scale() {
        let mut resizer = MockResizer::new();
        resizer
            .expect_scale_image()
            .withf(|data, _| data == b"GIF89a")
            .returning(|_, params| Ok(Some(fake_resize(params, (200, 200)))));
        let blob = MemoryBlob::new();
        nf_core::storage::store_payload(&mut SourcePayload::Bytes(b"GIF89a".to_vec()), &blob)
            .unwrap();
        let source = NamedImage::new(
            ImageData::Blob(Arc::new(blob)),
            MimeType::image("gif"),
            None,
            (200, 200),
        );
        let content = FakeContent::new("http://nohost/item").with_field("image", source);

        let generated = factory(resizer)
            .create(&content, &request(Some(50), Some(50)))
            .unwrap();

        let Some(GeneratedScale::Scaled { value, .. }) = generated else {
            panic!("expected a scaled value");
        };
        assert_eq!(value.kind(), ImageKind::Blob);
        assert_eq!(value.read_bytes().unwrap(), Bytes::from_static(b"\xff\xd8jpeg"));
    }

    #[test]
    fn test_chunked_source_is_materialized() {
        let mut resizer = MockResizer::new();
        resizer
            .expect_scale_image()
            .withf(|data, _| data == b"GIF89a")
            .returning(|_, params| Ok(Some(fake_resize(params, (200, 200)))));
        let chunks = FileChunk::from_chunks(vec![b"GIF".to_vec(), b"89a".to_vec()]).unwrap();
        let source = NamedImage::new(
            ImageData::Chunked(Arc::new(chunks)),
            MimeType::image("gif"),
            None,
            (200, 200),
        );
        let content = FakeContent::new("http://nohost/item").with_field("image", source);

        let generated = factory(resizer).create(&content, &request(Some(50), Some(50)));

        assert!(generated.unwrap().is_some());
    }

    #[test]
    fn test_registered_quality_is_injected() {
        let mut resizer = MockResizer::new();
        resizer
            .expect_scale_image()
            .withf(|_, params| params.quality == Some(42))
            .times(1)
            .returning(|_, params| Ok(Some(fake_resize(params, (200, 200)))));
        let utilities = Arc::new(ScalingUtilities::new());
        utilities.register_quality(Arc::new(|| Some(42u8)));
        let factory = ImageScaleFactory::new(Arc::new(resizer), utilities);
        let content = FakeContent::new("http://nohost/item").with_field("image", gif_value((200, 200)));

        assert!(factory
            .create(&content, &request(Some(50), Some(50)))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_explicit_quality_wins_over_utility() {
        let mut resizer = MockResizer::new();
        resizer
            .expect_scale_image()
            .withf(|_, params| params.quality == Some(10))
            .times(1)
            .returning(|_, params| Ok(Some(fake_resize(params, (200, 200)))));
        let utilities = Arc::new(ScalingUtilities::new());
        utilities.register_quality(Arc::new(|| Some(42u8)));
        let factory = ImageScaleFactory::new(Arc::new(resizer), utilities);
        let content = FakeContent::new("http://nohost/item").with_field("image", gif_value((200, 200)));
        let mut request = request(Some(50), Some(50));
        request.params.quality = Some(10);

        assert!(factory.create(&content, &request).unwrap().is_some());
    }

    #[test]
    fn test_transform_error_is_absorbed() {
        let mut resizer = MockResizer::new();
        resizer
            .expect_scale_image()
            .returning(|_, _| Err(ScalingError::Transform("cannot identify image".into())));
        let content = FakeContent::new("http://nohost/item").with_field("image", gif_value((200, 200)));

        let generated = factory(resizer).create(&content, &request(Some(50), Some(50)));

        assert!(generated.unwrap().is_none());
    }

    #[test]
    fn test_conflict_and_interrupt_propagate() {
        let content = FakeContent::new("http://nohost/item").with_field("image", gif_value((200, 200)));

        let mut resizer = MockResizer::new();
        resizer
            .expect_scale_image()
            .returning(|_, _| Err(ScalingError::Conflict("concurrent commit".into())));
        let result = factory(resizer).create(&content, &request(Some(50), Some(50)));
        assert!(matches!(result, Err(ScalingError::Conflict(_))));

        let mut resizer = MockResizer::new();
        resizer
            .expect_scale_image()
            .returning(|_, _| Err(ScalingError::Interrupted));
        let result = factory(resizer).create(&content, &request(Some(50), Some(50)));
        assert!(matches!(result, Err(ScalingError::Interrupted)));
    }

    #[test]
    fn test_declined_resize_is_none() {
        let mut resizer = MockResizer::new();
        resizer.expect_scale_image().returning(|_, _| Ok(None));
        let content = FakeContent::new("http://nohost/item").with_field("image", gif_value((200, 200)));

        let generated = factory(resizer).create(&content, &request(Some(50), Some(50)));

        assert!(generated.unwrap().is_none());
    }
}
