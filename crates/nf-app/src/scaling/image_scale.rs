use std::fmt::Write as _;
use std::sync::Arc;

use bytes::Bytes;
use nf_core::ports::ImageContentPort;
use nf_core::{MimeType, NamedImage, ScaleId, ScaleRecord, ScalingError};

/// Value of an extra `<img>` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Int(i64),
    /// Decoded as UTF-8 when rendered.
    Bytes(Vec<u8>),
    /// Attribute is omitted.
    None,
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        AttrValue::Int(i64::from(value))
    }
}

impl From<Vec<u8>> for AttrValue {
    fn from(value: Vec<u8>) -> Self {
        AttrValue::Bytes(value)
    }
}

impl From<&[u8]> for AttrValue {
    fn from(value: &[u8]) -> Self {
        AttrValue::Bytes(value.to_vec())
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(AttrValue::None)
    }
}

impl AttrValue {
    fn render(&self) -> Option<String> {
        match self {
            AttrValue::Text(text) => Some(text.clone()),
            AttrValue::Int(n) => Some(n.to_string()),
            AttrValue::Bytes(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            AttrValue::None => None,
        }
    }
}

/// Attribute overrides for [`ImageScale::tag`].
///
/// Height, width, alt and title default to the scale's size and the content
/// title; each can be overridden or removed.
#[derive(Debug, Clone, Default)]
pub struct TagOptions {
    height: Option<AttrValue>,
    width: Option<AttrValue>,
    alt: Option<AttrValue>,
    title: Option<AttrValue>,
    css_class: Option<String>,
    extra: Vec<(String, AttrValue)>,
}

impl TagOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn height(mut self, height: impl Into<AttrValue>) -> Self {
        self.height = Some(height.into());
        self
    }

    pub fn width(mut self, width: impl Into<AttrValue>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn alt(mut self, alt: impl Into<AttrValue>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    pub fn title(mut self, title: impl Into<AttrValue>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn css_class(mut self, css_class: impl Into<String>) -> Self {
        self.css_class = Some(css_class.into());
        self
    }

    /// Extra attribute, rendered after the standard ones in call order.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.extra.push((name.into(), value.into()));
        self
    }
}

/// Quote an attribute value the way XML attribute serialization does.
///
/// `&`, `<`, `>` and the whitespace controls are escaped. The value is
/// wrapped in double quotes unless it contains a double quote and no single
/// quote; with both, double quotes become `&quot;`.
pub fn quote_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            other => escaped.push(other),
        }
    }
    if escaped.contains('"') {
        if escaped.contains('\'') {
            format!("\"{}\"", escaped.replace('"', "&quot;"))
        } else {
            format!("'{escaped}'")
        }
    } else {
        format!("\"{escaped}\"")
    }
}

/// Serving response of a scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleResponse {
    pub content_type: MimeType,
    pub content_length: u64,
    /// Empty for `HEAD`.
    pub body: Bytes,
}

/// One scale of a content object's image field.
///
/// Name and address are computed once at construction.
pub struct ImageScale {
    content: Arc<dyn ImageContentPort>,
    uid: Option<ScaleId>,
    fieldname: String,
    data: Option<NamedImage>,
    mimetype: MimeType,
    width: u32,
    height: u32,
    name: String,
    url: String,
}

impl ImageScale {
    /// Wrap a cached record. Pass-through records read the field itself.
    pub fn new(content: Arc<dyn ImageContentPort>, record: ScaleRecord) -> Self {
        let data = record
            .data
            .or_else(|| content.field(&record.fieldname));
        Self::build(
            content,
            Some(record.uid),
            record.fieldname,
            data,
            record.mimetype,
            (record.width, record.height),
        )
    }

    /// The unscaled field value, addressed by field name.
    pub fn for_field(
        content: Arc<dyn ImageContentPort>,
        fieldname: impl Into<String>,
        value: NamedImage,
    ) -> Self {
        let mimetype = value.content_type().clone();
        let dimensions = value.image_size();
        Self::build(content, None, fieldname.into(), Some(value), mimetype, dimensions)
    }

    fn build(
        content: Arc<dyn ImageContentPort>,
        uid: Option<ScaleId>,
        fieldname: String,
        data: Option<NamedImage>,
        mimetype: MimeType,
        (width, height): (u32, u32),
    ) -> Self {
        let extension = data
            .as_ref()
            .map(|value| value.content_type().extension())
            .unwrap_or_else(|| mimetype.extension());
        let stem = uid.as_ref().map(ScaleId::as_str).unwrap_or(fieldname.as_str());
        let name = format!("{stem}.{extension}");
        let url = format!("{}/@@images/{}", content.absolute_url(), name);
        Self {
            content,
            uid,
            fieldname,
            data,
            mimetype,
            width,
            height,
            name,
            url,
        }
    }

    pub fn uid(&self) -> Option<&ScaleId> {
        self.uid.as_ref()
    }

    pub fn fieldname(&self) -> &str {
        &self.fieldname
    }

    /// `{uid-or-fieldname}.{format}`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn absolute_url(&self) -> &str {
        &self.url
    }

    pub fn data(&self) -> Option<&NamedImage> {
        self.data.as_ref()
    }

    pub fn mimetype(&self) -> &MimeType {
        &self.mimetype
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded scale bytes.
    pub fn bytes(&self) -> Result<Bytes, ScalingError> {
        Ok(self.require_data()?.read_bytes()?)
    }

    /// Render an `<img>` tag.
    pub fn tag(&self, options: &TagOptions) -> String {
        let title = self.content.title();
        let values = [
            ("src", AttrValue::Text(self.url.clone())),
            ("alt", pick(&options.alt, || AttrValue::Text(title.clone()))),
            ("title", pick(&options.title, || AttrValue::Text(title.clone()))),
            ("height", pick(&options.height, || self.height.into())),
            ("width", pick(&options.width, || self.width.into())),
            ("class", options.css_class.clone().into()),
        ];

        let mut tag = String::from("<img");
        let extra = options.extra.iter().map(|(k, v)| (k.as_str(), v.clone()));
        for (name, value) in values.into_iter().chain(extra) {
            if let Some(value) = value.render() {
                let _ = write!(tag, " {}={}", name, quote_attr(&value));
            }
        }
        tag.push_str(" />");
        tag
    }

    /// Full `GET` response.
    pub fn index_html(&self) -> Result<ScaleResponse, ScalingError> {
        let body = self.bytes()?;
        Ok(ScaleResponse {
            content_type: self.response_type()?,
            content_length: body.len() as u64,
            body,
        })
    }

    /// `HEAD` response: headers of [`index_html`](Self::index_html), no body.
    pub fn head(&self) -> Result<ScaleResponse, ScalingError> {
        let data = self.require_data()?;
        Ok(ScaleResponse {
            content_type: self.response_type()?,
            content_length: data.size()?,
            body: Bytes::new(),
        })
    }

    fn response_type(&self) -> Result<MimeType, ScalingError> {
        Ok(self.require_data()?.content_type().clone())
    }

    fn require_data(&self) -> Result<&NamedImage, ScalingError> {
        self.data
            .as_ref()
            .ok_or_else(|| ScalingError::NotFound(self.name.clone()))
    }
}

fn pick(option: &Option<AttrValue>, default: impl FnOnce() -> AttrValue) -> AttrValue {
    option.clone().unwrap_or_else(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaling::test_support::{gif_value, FakeContent};
    use chrono::Local;
    use nf_core::{GeneratedScale, ScaleParams, ScaleRequest};

    fn content() -> Arc<FakeContent> {
        Arc::new(FakeContent::new("http://nohost/item").with_field("image", gif_value((200, 200))))
    }

    fn scaled_record() -> ScaleRecord {
        let request = ScaleRequest::new(
            "image",
            ScaleParams {
                width: Some(100),
                height: Some(80),
                ..ScaleParams::default()
            },
        );
        let value = NamedImage::inline(
            Bytes::from_static(b"\xff\xd8jpeg"),
            MimeType::image("JPEG"),
            None,
            (80, 80),
        );
        ScaleRecord::from_generated(
            &request,
            GeneratedScale::Scaled {
                value,
                format: "JPEG".to_string(),
                dimensions: (80, 80),
            },
            Local::now(),
        )
    }

    #[test]
    fn test_quote_attr() {
        assert_eq!(quote_attr("foo"), "\"foo\"");
        assert_eq!(quote_attr("a & <b>"), "\"a &amp; &lt;b&gt;\"");
        assert_eq!(quote_attr("say \"hi\""), "'say \"hi\"'");
        assert_eq!(quote_attr("it's \"x\""), "\"it's &quot;x&quot;\"");
        assert_eq!(quote_attr("a\nb\tc\r"), "\"a&#10;b&#9;c&#13;\"");
    }

    #[test]
    fn test_name_and_url_from_uid() {
        let record = scaled_record();
        let uid = record.uid.clone();
        let scale = ImageScale::new(content(), record);

        assert_eq!(scale.name(), format!("{uid}.jpeg"));
        assert_eq!(
            scale.url(),
            format!("http://nohost/item/@@images/{uid}.jpeg")
        );
        assert_eq!(scale.absolute_url(), scale.url());
    }

    #[test]
    fn test_field_scale_is_named_after_field() {
        let scale = ImageScale::for_field(content(), "image", gif_value((200, 200)));
        assert_eq!(scale.name(), "image.gif");
        assert_eq!(scale.url(), "http://nohost/item/@@images/image.gif");
        assert!(scale.uid().is_none());
    }

    #[test]
    fn test_pass_through_record_reads_field() {
        let request = ScaleRequest::new("image", ScaleParams::default());
        let record = ScaleRecord::from_generated(
            &request,
            GeneratedScale::PassThrough {
                format: "gif".to_string(),
                dimensions: (200, 200),
            },
            Local::now(),
        );
        let scale = ImageScale::new(content(), record);

        assert_eq!(scale.bytes().unwrap(), Bytes::from_static(b"GIF89a-not-really"));
        assert!(scale.name().ends_with(".gif"));
    }

    #[test]
    fn test_tag_defaults() {
        let record = scaled_record();
        let uid = record.uid.clone();
        let scale = ImageScale::new(content(), record);

        assert_eq!(
            scale.tag(&TagOptions::new()),
            format!(
                "<img src=\"http://nohost/item/@@images/{uid}.jpeg\" alt=\"foo\" \
                 title=\"foo\" height=\"80\" width=\"80\" />"
            )
        );
    }

    #[test]
    fn test_tag_overrides_and_extras() {
        let content = Arc::new(
            FakeContent::new("http://nohost/item").with_title("Tom \"The Cat\""),
        );
        let scale = ImageScale::for_field(content, "image", gif_value((200, 200)));

        let tag = scale.tag(
            &TagOptions::new()
                .alt(AttrValue::None)
                .height(AttrValue::None)
                .width(24u32)
                .css_class("thumb")
                .attr("data-caption", b"caf\xc3\xa9".as_slice())
                .attr("loading", "lazy")
                .attr("skipped", AttrValue::None),
        );

        assert_eq!(
            tag,
            "<img src=\"http://nohost/item/@@images/image.gif\" \
             title='Tom \"The Cat\"' width=\"24\" class=\"thumb\" \
             data-caption=\"café\" loading=\"lazy\" />"
        );
    }

    #[test]
    fn test_index_html_and_head() {
        let scale = ImageScale::new(content(), scaled_record());

        let get = scale.index_html().unwrap();
        assert_eq!(get.content_type.as_str(), "image/jpeg");
        assert_eq!(get.content_length, 6);
        assert_eq!(get.body, Bytes::from_static(b"\xff\xd8jpeg"));

        let head = scale.head().unwrap();
        assert_eq!(head.content_length, 6);
        assert!(head.body.is_empty());
    }

    #[test]
    fn test_missing_data_is_not_found() {
        let request = ScaleRequest::new("gone", ScaleParams::default());
        let record = ScaleRecord::from_generated(
            &request,
            GeneratedScale::PassThrough {
                format: "gif".to_string(),
                dimensions: (1, 1),
            },
            Local::now(),
        );
        let scale = ImageScale::new(content(), record);

        assert!(matches!(scale.index_html(), Err(ScalingError::NotFound(_))));
        assert!(matches!(scale.bytes(), Err(ScalingError::NotFound(_))));
    }
}
