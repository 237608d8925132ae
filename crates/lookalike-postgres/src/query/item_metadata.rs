//! Item metadata repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use lookalike_core::types::ItemId;

use crate::model::ItemMetadataRow;
use crate::{PgConnection, PgError, PgResult, schema};

/// Read-only repository over the `item_metadata` table.
pub trait ItemMetadataRepository {
    /// Loads metadata rows for the given ids. Unknown ids are skipped.
    fn find_item_metadata(
        &mut self,
        ids: &[ItemId],
    ) -> impl Future<Output = PgResult<Vec<ItemMetadataRow>>> + Send;

    /// Gets the total number of metadata rows.
    fn count_item_metadata(&mut self) -> impl Future<Output = PgResult<i64>> + Send;
}

impl ItemMetadataRepository for PgConnection {
    async fn find_item_metadata(&mut self, ids: &[ItemId]) -> PgResult<Vec<ItemMetadataRow>> {
        use schema::item_metadata::{self, dsl};

        if ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = item_metadata::table
            .filter(dsl::id.eq_any(ids))
            .select(ItemMetadataRow::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(rows)
    }

    async fn count_item_metadata(&mut self) -> PgResult<i64> {
        use schema::item_metadata;

        let count = item_metadata::table
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(count)
    }
}
