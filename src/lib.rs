//! Memory-mapped geographic tile store plus the feature classification and
//! rasterization pipeline that turns stored map features into bitmap
//! tiles.
//!
//! Out of scope, per the governing spec: the build pipeline that produces
//! `.tiles` files, HTTP/CLI frontends, and logger/config initialization —
//! callers wire those up. This crate owns the mapped file format, the
//! classifier, the shape model, and the rasterizer.

pub mod canvas;
pub mod classifier;
pub mod coordinate;
pub mod error;
pub mod feature;
pub mod format;
pub mod renderer;
pub mod shape;
pub mod store;
pub mod style;

pub use canvas::{Canvas, TinySkiaCanvas};
pub use classifier::{classify, EnvironmentCategory, GeometryKind, PropertyMap};
pub use coordinate::{Coordinate, GeographicBoundingBox, ScreenBoundingBox};
pub use error::{LayoutError, OpenError};
pub use feature::{for_each_feature, LabelView, MapFeatureData};
pub use renderer::{render, tessellate, ShapeQueue};
pub use shape::{GeoFeatureKind, Shape, ShapeHeader};
pub use store::Store;
pub use style::StyleConfig;
