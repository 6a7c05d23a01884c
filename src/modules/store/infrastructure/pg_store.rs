/// Diesel-based implementation of the store ports
///
/// Inserts go through PostgreSQL `COPY ... FROM STDIN`; updates are one
/// `UPDATE ... FROM UNNEST(...)` statement per batch.
use crate::log_debug;
use crate::modules::anime::domain::{
    AnimeId, HashedRecord, IdKind, ManualMapping, PersistedAnime, Platform, SnapshotRow,
};
use crate::modules::change_log::domain::{ChangeKind, ChangeLogEntry, ChangeLogId};
use crate::modules::store::infrastructure::models::{
    AnimeRow, ChangeLogRow, ManualMappingRow, NewAnimeRow, NewChangeLogRow,
};
use crate::modules::store::ports::{AnimeStore, CatalogQueries, StoreTransaction};
use crate::schema::{anime, change_log, manual_mapping};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::LogContext;
use crate::shared::Database;
use chrono::Utc;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::sql_types::{Array, Int4, Int8, Nullable, Text};
use std::sync::{Arc, OnceLock};

pub struct PgAnimeStore {
    db: Arc<Database>,
}

impl PgAnimeStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

/// Statements issued on the connection that owns the open transaction
pub struct PgStoreTransaction<'c> {
    conn: &'c mut PgConnection,
}

/// `UPDATE` keyed by id over parallel arrays, one array per column.
/// Platform columns keep their stored value when the new one is NULL.
fn update_statement() -> &'static str {
    static SQL: OnceLock<String> = OnceLock::new();
    SQL.get_or_init(|| {
        let mut assignments = vec!["title = v.title".to_string()];
        let mut arrays = vec!["$1::int4[]".to_string(), "$2::text[]".to_string()];
        let mut names = vec!["id", "title"];

        for (index, platform) in Platform::ALL.iter().enumerate() {
            let column = platform.as_str();
            assignments.push(format!("{column} = COALESCE(v.{column}, a.{column})"));
            let array_type = match platform.id_kind() {
                IdKind::Numeric => "int8[]",
                IdKind::Text => "text[]",
            };
            arrays.push(format!("${}::{}", index + 3, array_type));
            names.push(column);
        }

        arrays.push(format!("${}::text[]", Platform::ALL.len() + 3));
        names.push("data_hash");
        assignments.push("data_hash = v.data_hash".to_string());
        assignments.push("updated_at = NOW()".to_string());

        format!(
            "UPDATE anime AS a SET {} FROM UNNEST({}) AS v({}) WHERE a.id = v.id",
            assignments.join(", "),
            arrays.join(", "),
            names.join(", ")
        )
    })
}

/// Explicit platform → column table for non-null counts
macro_rules! count_non_null {
    ($conn:expr, $column:expr) => {
        anime::table
            .filter($column.is_not_null())
            .count()
            .get_result::<i64>($conn)
    };
}

impl StoreTransaction for PgStoreTransaction<'_> {
    fn bulk_load(&mut self, rows: &[HashedRecord]) -> AppResult<usize> {
        let new_rows: Vec<NewAnimeRow> = rows.iter().map(NewAnimeRow::from_hashed).collect();

        let loaded = diesel::copy_from(anime::table)
            .from_insertable(&new_rows)
            .execute(&mut *self.conn)?;

        log_debug!("Bulk loaded {} anime rows using COPY FROM", loaded);
        Ok(loaded)
    }

    fn lookup_ids(&mut self, primary_ids: &[i64], titles: &[String]) -> AppResult<Vec<AnimeId>> {
        let mut ids = Vec::with_capacity(primary_ids.len() + titles.len());

        if !primary_ids.is_empty() {
            let found: Vec<AnimeId> = anime::table
                .filter(anime::myanimelist.eq_any(primary_ids.to_vec()))
                .select(anime::id)
                .order(anime::id.asc())
                .load(&mut *self.conn)?;
            ids.extend(found);
        }

        if !titles.is_empty() {
            let found: Vec<AnimeId> = anime::table
                .filter(anime::myanimelist.is_null())
                .filter(anime::title.eq_any(titles.to_vec()))
                .select(anime::id)
                .order(anime::id.asc())
                .load(&mut *self.conn)?;
            ids.extend(found);
        }

        Ok(ids)
    }

    fn update_batch(&mut self, rows: &[(AnimeId, HashedRecord)]) -> AppResult<usize> {
        let ids: Vec<i32> = rows.iter().map(|(id, _)| *id).collect();
        let titles: Vec<String> = rows.iter().map(|(_, r)| r.record.title.clone()).collect();
        let hashes: Vec<String> = rows.iter().map(|(_, r)| r.data_hash.clone()).collect();

        let mut query = diesel::sql_query(update_statement())
            .into_boxed::<Pg>()
            .bind::<Array<Int4>, _>(ids)
            .bind::<Array<Text>, _>(titles);

        for platform in Platform::ALL {
            query = match platform.id_kind() {
                IdKind::Numeric => {
                    let values: Vec<Option<i64>> = rows
                        .iter()
                        .map(|(_, r)| r.record.numeric_id(platform))
                        .collect();
                    query.bind::<Array<Nullable<Int8>>, _>(values)
                }
                IdKind::Text => {
                    let values: Vec<Option<String>> = rows
                        .iter()
                        .map(|(_, r)| r.record.text_id(platform))
                        .collect();
                    query.bind::<Array<Nullable<Text>>, _>(values)
                }
            };
        }

        let updated = query.bind::<Array<Text>, _>(hashes).execute(&mut *self.conn)?;
        Ok(updated)
    }

    fn delete_batch(&mut self, ids: &[AnimeId]) -> AppResult<usize> {
        let deleted = diesel::delete(anime::table.filter(anime::id.eq_any(ids.to_vec())))
            .execute(&mut *self.conn)?;
        Ok(deleted)
    }

    fn append_change_log(&mut self, anime_ids: &[AnimeId], kind: ChangeKind) -> AppResult<usize> {
        let rows: Vec<NewChangeLogRow> = anime_ids
            .iter()
            .map(|anime_id| NewChangeLogRow {
                anime_id: *anime_id,
                change_type: kind,
            })
            .collect();

        let inserted = diesel::insert_into(change_log::table)
            .values(&rows)
            .execute(&mut *self.conn)?;
        Ok(inserted)
    }

    fn mark_processed(&mut self, entry_ids: &[ChangeLogId]) -> AppResult<usize> {
        let updated = diesel::update(
            change_log::table
                .filter(change_log::id.eq_any(entry_ids.to_vec()))
                .filter(change_log::processed.eq(false)),
        )
        .set((
            change_log::processed.eq(true),
            change_log::processed_at.eq(Some(Utc::now())),
        ))
        .execute(&mut *self.conn)?;
        Ok(updated)
    }
}

impl AnimeStore for PgAnimeStore {
    fn load_snapshot(&self) -> AppResult<Vec<SnapshotRow>> {
        let mut conn = self.db.get_connection()?;
        let start = std::time::Instant::now();
        LogContext::db_operation("snapshot read", "anime", None);

        let rows: Vec<(i32, String, Option<i64>, String)> = anime::table
            .select((anime::id, anime::title, anime::myanimelist, anime::data_hash))
            .order(anime::id.asc())
            .load(&mut conn)?;

        LogContext::db_operation(
            "snapshot read",
            "anime",
            Some(start.elapsed().as_millis() as u64),
        );

        Ok(rows
            .into_iter()
            .map(|(id, title, primary_id, data_hash)| SnapshotRow {
                id,
                title,
                primary_id,
                data_hash,
            })
            .collect())
    }

    fn within_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn StoreTransaction) -> AppResult<()>,
    ) -> AppResult<()> {
        let mut pooled = self.db.get_connection()?;
        let conn: &mut PgConnection = &mut pooled;

        conn.transaction::<_, AppError, _>(|conn| {
            let mut tx = PgStoreTransaction { conn };
            work(&mut tx)
        })
    }

    fn pending_changes(&self) -> AppResult<Vec<ChangeLogEntry>> {
        let mut conn = self.db.get_connection()?;

        let rows: Vec<ChangeLogRow> = change_log::table
            .filter(change_log::processed.eq(false))
            .order((change_log::created_at.asc(), change_log::id.asc()))
            .select(ChangeLogRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(ChangeLogRow::into_entry).collect())
    }
}

impl CatalogQueries for PgAnimeStore {
    fn count_anime(&self) -> AppResult<i64> {
        let mut conn = self.db.get_connection()?;
        let count = anime::table.count().get_result::<i64>(&mut conn)?;
        Ok(count)
    }

    fn count_platform(&self, platform: Platform) -> AppResult<i64> {
        let mut conn = self.db.get_connection()?;
        let conn = &mut conn;

        let count = match platform {
            Platform::AniDb => count_non_null!(conn, anime::anidb),
            Platform::AniList => count_non_null!(conn, anime::anilist),
            Platform::AnimeNewsNetwork => count_non_null!(conn, anime::animenewsnetwork),
            Platform::AnimePlanet => count_non_null!(conn, anime::animeplanet),
            Platform::AniSearch => count_non_null!(conn, anime::anisearch),
            Platform::Annict => count_non_null!(conn, anime::annict),
            Platform::Imdb => count_non_null!(conn, anime::imdb),
            Platform::Kaize => count_non_null!(conn, anime::kaize),
            Platform::Kitsu => count_non_null!(conn, anime::kitsu),
            Platform::LiveChart => count_non_null!(conn, anime::livechart),
            Platform::MyAnimeList => count_non_null!(conn, anime::myanimelist),
            Platform::Nautiljon => count_non_null!(conn, anime::nautiljon),
            Platform::Notify => count_non_null!(conn, anime::notify),
            Platform::OtakOtaku => count_non_null!(conn, anime::otakotaku),
            Platform::Shikimori => count_non_null!(conn, anime::shikimori),
            Platform::Shoboi => count_non_null!(conn, anime::shoboi),
            Platform::SilverYasha => count_non_null!(conn, anime::silveryasha),
            Platform::Simkl => count_non_null!(conn, anime::simkl),
            Platform::TheMovieDb => count_non_null!(conn, anime::themoviedb),
            Platform::Trakt => count_non_null!(conn, anime::trakt),
        }?;

        Ok(count)
    }

    fn manual_mappings(&self, platform: Platform) -> AppResult<Vec<ManualMapping>> {
        let mut conn = self.db.get_connection()?;

        let rows: Vec<ManualMappingRow> = manual_mapping::table
            .filter(manual_mapping::platform.eq(platform.as_str()))
            .order(manual_mapping::id.asc())
            .select(ManualMappingRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(ManualMappingRow::into_mapping).collect())
    }

    fn all_anime(&self) -> AppResult<Vec<PersistedAnime>> {
        let mut conn = self.db.get_connection()?;

        let rows: Vec<AnimeRow> = anime::table
            .order(anime::id.asc())
            .select(AnimeRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(AnimeRow::into_persisted).collect())
    }
}
