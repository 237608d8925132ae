//! Vector records repository for inserts, deletes and distance queries.

use std::future::Future;

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double};
use diesel_async::RunQueryDsl;
use lookalike_core::store::{NearestQuery, SortOrder};
use lookalike_core::types::{ItemId, Modality};
use pgvector::Vector;

use crate::model::{NewVectorRecord, ScoredVectorRecord};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for vector record database operations.
pub trait VectorRecordRepository {
    /// Inserts a vector record.
    ///
    /// An existing id fails with a unique violation.
    fn create_vector_record(
        &mut self,
        new_record: NewVectorRecord,
    ) -> impl Future<Output = PgResult<()>> + Send;

    /// Deletes a vector record, returning the number of deleted rows.
    fn delete_vector_record(&mut self, id: ItemId) -> impl Future<Output = PgResult<usize>> + Send;

    /// Returns ids and cosine distances of the records matching `query`.
    ///
    /// Records without an embedding for the queried modality are skipped.
    fn find_nearest_records(
        &mut self,
        query: &NearestQuery,
    ) -> impl Future<Output = PgResult<Vec<ScoredVectorRecord>>> + Send;

    /// Gets the total number of stored records.
    fn count_vector_records(&mut self) -> impl Future<Output = PgResult<i64>> + Send;
}

/// Boxed `(id, distance)` select over `vector_records`.
pub(crate) type NearestStatement = schema::vector_records::BoxedQuery<'static, Pg, (BigInt, Double)>;

/// Range-filtered distance select against one embedding column.
///
/// `$column` must be a non-nullable vector expression; `$present` filters out
/// rows lacking the embedding.
macro_rules! nearest_statement {
    ($query:expr, $present:expr, $column:expr) => {{
        let query: &NearestQuery = $query;
        let vector = Vector::from(query.vector.as_slice().to_vec());
        let distance = || $column.cosine_distance(vector.clone());

        let mut statement = schema::vector_records::table
            .filter($present)
            .select((schema::vector_records::id, distance()))
            .into_boxed();

        if let Some(min) = query.range.min {
            statement = statement.filter(distance().ge(min));
        }
        if let Some(max) = query.range.max {
            statement = statement.filter(distance().le(max));
        }

        statement = match query.order {
            SortOrder::Ascending => {
                statement.order((distance().asc(), schema::vector_records::id.asc()))
            }
            SortOrder::Descending => {
                statement.order((distance().desc(), schema::vector_records::id.asc()))
            }
        };

        if let Some(limit) = query.limit {
            statement = statement.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        statement
    }};
}

/// Builds the distance query for `query` without running it.
pub(crate) fn nearest_statement(query: &NearestQuery) -> NearestStatement {
    use pgvector::VectorExpressionMethods;
    use schema::vector_records::dsl;

    match query.modality {
        Modality::Image => {
            nearest_statement!(query, dsl::image_embedding.is_not_null(), dsl::image_embedding)
        }
        Modality::Text => nearest_statement!(
            query,
            dsl::text_embedding.is_not_null(),
            dsl::text_embedding.assume_not_null()
        ),
    }
}

impl VectorRecordRepository for PgConnection {
    async fn create_vector_record(&mut self, new_record: NewVectorRecord) -> PgResult<()> {
        use schema::vector_records;

        diesel::insert_into(vector_records::table)
            .values(&new_record)
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }

    async fn delete_vector_record(&mut self, id: ItemId) -> PgResult<usize> {
        use schema::vector_records::{self, dsl};

        let affected = diesel::delete(vector_records::table.filter(dsl::id.eq(id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(affected)
    }

    async fn find_nearest_records(
        &mut self,
        query: &NearestQuery,
    ) -> PgResult<Vec<ScoredVectorRecord>> {
        nearest_statement(query)
            .load::<ScoredVectorRecord>(self)
            .await
            .map_err(PgError::from)
    }

    async fn count_vector_records(&mut self) -> PgResult<i64> {
        use schema::vector_records;

        let count = vector_records::table
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use lookalike_core::store::DistanceRange;
    use lookalike_core::types::EmbeddingVector;

    use super::*;

    fn render(query: &NearestQuery) -> String {
        diesel::debug_query::<Pg, _>(&nearest_statement(query)).to_string()
    }

    fn query(modality: Modality) -> NearestQuery {
        NearestQuery::new(EmbeddingVector::new(vec![0.6, 0.8]), modality)
    }

    #[test]
    fn test_duplicate_lookup_sql() {
        let sql = render(
            &query(Modality::Image)
                .with_range(DistanceRange::between(0.0, 0.02))
                .with_limit(1)
                .with_order(SortOrder::Ascending),
        );

        assert!(sql.contains(r#""image_embedding" <=> "#), "{sql}");
        assert!(sql.contains(r#""image_embedding" IS NOT NULL"#), "{sql}");
        assert!(sql.contains(" >= "), "{sql}");
        assert!(sql.contains(" <= "), "{sql}");
        assert!(sql.contains(" ORDER BY "), "{sql}");
        assert!(sql.contains(r#"ASC, "vector_records"."id" ASC"#), "{sql}");
        assert!(sql.contains(" LIMIT "), "{sql}");
    }

    #[test]
    fn test_candidate_lookup_sql_is_unbounded() {
        let sql = render(
            &query(Modality::Image)
                .with_range(DistanceRange::at_least(0.02))
                .with_order(SortOrder::Ascending),
        );

        assert!(sql.contains(" >= "), "{sql}");
        assert!(!sql.contains(" <= "), "{sql}");
        assert!(!sql.contains(" LIMIT "), "{sql}");
        assert!(sql.contains(" ASC"), "{sql}");
    }

    #[test]
    fn test_text_lookup_skips_missing_embeddings() {
        let sql = render(
            &query(Modality::Text)
                .with_range(DistanceRange::at_least(0.02))
                .with_order(SortOrder::Descending),
        );

        assert!(sql.contains(r#""text_embedding" IS NOT NULL"#), "{sql}");
        assert!(sql.contains(r#""text_embedding" <=> "#), "{sql}");
        assert!(!sql.contains("image_embedding"), "{sql}");
        assert!(sql.contains(" DESC"), "{sql}");
    }
}
