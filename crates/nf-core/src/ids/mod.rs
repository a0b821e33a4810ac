//! ID type wrappers for type safety.

mod id_macro;
pub mod scale_id;

pub use scale_id::ScaleId;
