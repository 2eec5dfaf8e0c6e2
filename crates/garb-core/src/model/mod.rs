//! Catalog data model: typed ids, garments, tags, collections.

pub mod collection;
pub mod garment;
pub mod id;
pub mod tag;

pub use collection::Collection;
pub use garment::{Garment, Status};
pub use id::{CollectionId, GarmentId, TagId, UserId};
pub use tag::Tag;
