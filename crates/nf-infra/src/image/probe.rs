use std::io::Cursor;
use std::sync::Arc;

use anyhow::{Context, Result};
use image::ImageReader;
use nf_core::ports::BlobPort;
use nf_core::storage::store_payload;
use nf_core::{ImageData, MimeType, NamedImage, SourcePayload};

/// Content type and pixel size read from an encoded image header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub content_type: MimeType,
    pub width: u32,
    pub height: u32,
}

/// Read format and dimensions without decoding pixel data.
pub fn probe_image(bytes: &[u8]) -> Result<ImageInfo> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("read image header")?;
    let format = reader.format().context("unrecognized image format")?;
    let (width, height) = reader
        .into_dimensions()
        .context("read image dimensions")?;
    Ok(ImageInfo {
        content_type: MimeType(format.to_mime_type().to_string()),
        width,
        height,
    })
}

/// Ingest `source` into `blob` and wrap it as a blob backed image value.
pub fn named_image_from_payload(
    mut source: SourcePayload,
    blob: Arc<dyn BlobPort>,
    filename: Option<String>,
) -> Result<NamedImage> {
    store_payload(&mut source, blob.as_ref()).context("store image payload")?;
    let value = NamedImage::new(
        ImageData::Blob(blob),
        MimeType("application/octet-stream".to_string()),
        filename,
        (0, 0),
    );
    let bytes = value.read_bytes()?;
    let info = probe_image(&bytes)?;
    Ok(NamedImage::new(
        value.data().clone(),
        info.content_type,
        value.filename().map(str::to_string),
        (info.width, info.height),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_core::{ImageKind, MemoryBlob};

    fn gif_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Gif)
            .unwrap();
        bytes
    }

    #[test]
    fn test_probe_reads_gif_header() {
        let info = probe_image(&gif_bytes(200, 120)).unwrap();
        assert_eq!(info.content_type.as_str(), "image/gif");
        assert_eq!((info.width, info.height), (200, 120));
    }

    #[test]
    fn test_probe_rejects_garbage() {
        assert!(probe_image(b"definitely not an image").is_err());
    }

    #[test]
    fn test_named_image_from_upload() {
        let upload = nf_core::FileUpload::new(Cursor::new(gif_bytes(64, 32)))
            .with_filename("image.gif");
        let value = named_image_from_payload(
            SourcePayload::Upload(upload),
            Arc::new(MemoryBlob::new()),
            Some("image.gif".to_string()),
        )
        .unwrap();

        assert_eq!(value.kind(), ImageKind::Blob);
        assert_eq!(value.content_type().as_str(), "image/gif");
        assert_eq!(value.image_size(), (64, 32));
        assert_eq!(value.filename(), Some("image.gif"));
    }
}
