/// Diesel models for the anime, change_log and manual_mapping tables
use crate::modules::anime::domain::{
    AnimeRecord, ExternalId, HashedRecord, ManualMapping, PersistedAnime, Platform,
};
use crate::modules::change_log::domain::{ChangeKind, ChangeLogEntry};
use crate::schema::{anime, change_log, manual_mapping};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row fed to the bulk-load path. Every column is written explicitly,
/// so `None` is sent as NULL rather than as a default.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = anime)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewAnimeRow {
    pub title: String,
    pub anidb: Option<i64>,
    pub anilist: Option<i64>,
    pub animenewsnetwork: Option<i64>,
    pub animeplanet: Option<String>,
    pub anisearch: Option<i64>,
    pub annict: Option<i64>,
    pub imdb: Option<String>,
    pub kaize: Option<String>,
    pub kitsu: Option<i64>,
    pub livechart: Option<i64>,
    pub myanimelist: Option<i64>,
    pub nautiljon: Option<String>,
    pub notify: Option<String>,
    pub otakotaku: Option<i64>,
    pub shikimori: Option<i64>,
    pub shoboi: Option<i64>,
    pub silveryasha: Option<i64>,
    pub simkl: Option<i64>,
    pub themoviedb: Option<i64>,
    pub trakt: Option<i64>,
    pub data_hash: String,
}

impl NewAnimeRow {
    pub fn from_hashed(hashed: &HashedRecord) -> Self {
        let r = &hashed.record;
        Self {
            title: r.title.clone(),
            anidb: r.numeric_id(Platform::AniDb),
            anilist: r.numeric_id(Platform::AniList),
            animenewsnetwork: r.numeric_id(Platform::AnimeNewsNetwork),
            animeplanet: r.text_id(Platform::AnimePlanet),
            anisearch: r.numeric_id(Platform::AniSearch),
            annict: r.numeric_id(Platform::Annict),
            imdb: r.text_id(Platform::Imdb),
            kaize: r.text_id(Platform::Kaize),
            kitsu: r.numeric_id(Platform::Kitsu),
            livechart: r.numeric_id(Platform::LiveChart),
            myanimelist: r.numeric_id(Platform::MyAnimeList),
            nautiljon: r.text_id(Platform::Nautiljon),
            notify: r.text_id(Platform::Notify),
            otakotaku: r.numeric_id(Platform::OtakOtaku),
            shikimori: r.numeric_id(Platform::Shikimori),
            shoboi: r.numeric_id(Platform::Shoboi),
            silveryasha: r.numeric_id(Platform::SilverYasha),
            simkl: r.numeric_id(Platform::Simkl),
            themoviedb: r.numeric_id(Platform::TheMovieDb),
            trakt: r.numeric_id(Platform::Trakt),
            data_hash: hashed.data_hash.clone(),
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = anime)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AnimeRow {
    pub id: i32,
    pub title: String,
    pub anidb: Option<i64>,
    pub anilist: Option<i64>,
    pub animenewsnetwork: Option<i64>,
    pub animeplanet: Option<String>,
    pub anisearch: Option<i64>,
    pub annict: Option<i64>,
    pub imdb: Option<String>,
    pub kaize: Option<String>,
    pub kitsu: Option<i64>,
    pub livechart: Option<i64>,
    pub myanimelist: Option<i64>,
    pub nautiljon: Option<String>,
    pub notify: Option<String>,
    pub otakotaku: Option<i64>,
    pub shikimori: Option<i64>,
    pub shoboi: Option<i64>,
    pub silveryasha: Option<i64>,
    pub simkl: Option<i64>,
    pub themoviedb: Option<i64>,
    pub trakt: Option<i64>,
    pub data_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnimeRow {
    pub fn into_persisted(self) -> PersistedAnime {
        let numeric = [
            (Platform::AniDb, self.anidb),
            (Platform::AniList, self.anilist),
            (Platform::AnimeNewsNetwork, self.animenewsnetwork),
            (Platform::AniSearch, self.anisearch),
            (Platform::Annict, self.annict),
            (Platform::Kitsu, self.kitsu),
            (Platform::LiveChart, self.livechart),
            (Platform::MyAnimeList, self.myanimelist),
            (Platform::OtakOtaku, self.otakotaku),
            (Platform::Shikimori, self.shikimori),
            (Platform::Shoboi, self.shoboi),
            (Platform::SilverYasha, self.silveryasha),
            (Platform::Simkl, self.simkl),
            (Platform::TheMovieDb, self.themoviedb),
            (Platform::Trakt, self.trakt),
        ];
        let text = [
            (Platform::AnimePlanet, self.animeplanet),
            (Platform::Imdb, self.imdb),
            (Platform::Kaize, self.kaize),
            (Platform::Nautiljon, self.nautiljon),
            (Platform::Notify, self.notify),
        ];

        let mut record = AnimeRecord::new(self.title);
        for (platform, value) in numeric {
            if let Some(value) = value {
                record.ids.insert(platform, ExternalId::Numeric(value));
            }
        }
        for (platform, value) in text {
            if let Some(value) = value {
                record.ids.insert(platform, ExternalId::Text(value));
            }
        }

        PersistedAnime {
            id: self.id,
            record,
            data_hash: self.data_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = change_log)]
pub struct NewChangeLogRow {
    pub anime_id: i32,
    pub change_type: ChangeKind,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = change_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChangeLogRow {
    pub id: i64,
    pub anime_id: i32,
    pub change_type: ChangeKind,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl ChangeLogRow {
    pub fn into_entry(self) -> ChangeLogEntry {
        ChangeLogEntry {
            id: self.id,
            anime_id: self.anime_id,
            change_type: self.change_type,
            processed: self.processed,
            created_at: self.created_at,
            processed_at: self.processed_at,
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = manual_mapping)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ManualMappingRow {
    pub id: i32,
    pub platform: String,
    pub platform_id: String,
    pub platform_slug: Option<String>,
}

impl ManualMappingRow {
    pub fn into_mapping(self) -> ManualMapping {
        ManualMapping {
            platform: self.platform,
            platform_id: self.platform_id,
            platform_slug: self.platform_slug,
        }
    }
}
