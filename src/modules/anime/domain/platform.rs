use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of the identifiers a platform hands out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Numeric,
    Text,
}

/// External catalogs tracked by the cross-reference store.
///
/// Declaration order is the canonical field order used for content hashing,
/// so new variants must be appended in name order alongside a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    AniDb,
    AniList,
    AnimeNewsNetwork,
    AnimePlanet,
    AniSearch,
    Annict,
    Imdb,
    Kaize,
    Kitsu,
    LiveChart,
    MyAnimeList,
    Nautiljon,
    Notify,
    OtakOtaku,
    Shikimori,
    Shoboi,
    SilverYasha,
    Simkl,
    TheMovieDb,
    Trakt,
}

impl Platform {
    /// The most authoritative catalog; its id is the preferred match key
    pub const PRIMARY: Platform = Platform::MyAnimeList;

    pub const ALL: [Platform; 20] = [
        Platform::AniDb,
        Platform::AniList,
        Platform::AnimeNewsNetwork,
        Platform::AnimePlanet,
        Platform::AniSearch,
        Platform::Annict,
        Platform::Imdb,
        Platform::Kaize,
        Platform::Kitsu,
        Platform::LiveChart,
        Platform::MyAnimeList,
        Platform::Nautiljon,
        Platform::Notify,
        Platform::OtakOtaku,
        Platform::Shikimori,
        Platform::Shoboi,
        Platform::SilverYasha,
        Platform::Simkl,
        Platform::TheMovieDb,
        Platform::Trakt,
    ];

    /// Column and JSON key name
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::AniDb => "anidb",
            Platform::AniList => "anilist",
            Platform::AnimeNewsNetwork => "animenewsnetwork",
            Platform::AnimePlanet => "animeplanet",
            Platform::AniSearch => "anisearch",
            Platform::Annict => "annict",
            Platform::Imdb => "imdb",
            Platform::Kaize => "kaize",
            Platform::Kitsu => "kitsu",
            Platform::LiveChart => "livechart",
            Platform::MyAnimeList => "myanimelist",
            Platform::Nautiljon => "nautiljon",
            Platform::Notify => "notify",
            Platform::OtakOtaku => "otakotaku",
            Platform::Shikimori => "shikimori",
            Platform::Shoboi => "shoboi",
            Platform::SilverYasha => "silveryasha",
            Platform::Simkl => "simkl",
            Platform::TheMovieDb => "themoviedb",
            Platform::Trakt => "trakt",
        }
    }

    pub fn id_kind(&self) -> IdKind {
        match self {
            Platform::AnimePlanet
            | Platform::Imdb
            | Platform::Kaize
            | Platform::Nautiljon
            | Platform::Notify => IdKind::Text,
            _ => IdKind::Numeric,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        if name == "syobocal" {
            return Ok(Platform::Shoboi);
        }
        Platform::ALL
            .iter()
            .copied()
            .find(|platform| platform.as_str() == name)
            .ok_or_else(|| format!("Unknown platform: {}", s))
    }
}
