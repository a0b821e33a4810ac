use crate::image::SizeCatalog;

/// Site-wide scaling quality setting.
pub trait ScaledImageQualityPort: Send + Sync {
    fn quality(&self) -> Option<u8>;
}

/// Site-wide named size catalog.
///
/// `None` or an empty catalog means "no override".
pub trait AvailableSizesPort: Send + Sync {
    fn available_sizes(&self) -> Option<SizeCatalog>;
}

impl<F> ScaledImageQualityPort for F
where
    F: Fn() -> Option<u8> + Send + Sync,
{
    fn quality(&self) -> Option<u8> {
        self()
    }
}

impl<F> AvailableSizesPort for F
where
    F: Fn() -> Option<SizeCatalog> + Send + Sync,
{
    fn available_sizes(&self) -> Option<SizeCatalog> {
        self()
    }
}
