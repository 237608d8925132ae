//! Item metadata model.

use diesel::prelude::*;
use lookalike_core::types::{ItemId, ItemMetadata};

use crate::schema::item_metadata;

/// A row of the application-owned `item_metadata` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = item_metadata)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ItemMetadataRow {
    /// Item id.
    pub id: ItemId,
    /// Storage path of the original image.
    pub path: String,
    /// Storage path of the thumbnail, if one was generated.
    pub thumbnail_path: Option<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
}

impl From<ItemMetadataRow> for ItemMetadata {
    fn from(row: ItemMetadataRow) -> Self {
        ItemMetadata {
            id: row.id,
            path: row.path,
            thumbnail_path: row.thumbnail_path,
            tags: row.tags,
        }
    }
}
