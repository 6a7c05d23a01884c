/// Cross-reference record: one title mapped to at most one id per platform
use crate::modules::anime::domain::platform::{IdKind, Platform};
use crate::shared::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Internal id assigned by the store
pub type AnimeId = i32;

/// Identifier a platform uses for one title
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalId {
    Numeric(i64),
    Text(String),
}

impl ExternalId {
    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            ExternalId::Numeric(value) => Some(*value),
            ExternalId::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExternalId::Text(value) => Some(value),
            ExternalId::Numeric(_) => None,
        }
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalId::Numeric(value) => write!(f, "{}", value),
            ExternalId::Text(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub title: String,
    #[serde(default)]
    pub ids: BTreeMap<Platform, ExternalId>,
}

impl AnimeRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ids: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, platform: Platform, id: ExternalId) -> Self {
        self.ids.insert(platform, id);
        self
    }

    pub fn with_numeric(self, platform: Platform, id: i64) -> Self {
        self.with_id(platform, ExternalId::Numeric(id))
    }

    pub fn with_text(self, platform: Platform, id: impl Into<String>) -> Self {
        self.with_id(platform, ExternalId::Text(id.into()))
    }

    pub fn id(&self, platform: Platform) -> Option<&ExternalId> {
        self.ids.get(&platform)
    }

    pub fn numeric_id(&self, platform: Platform) -> Option<i64> {
        self.id(platform).and_then(ExternalId::as_numeric)
    }

    pub fn text_id(&self, platform: Platform) -> Option<String> {
        self.id(platform)
            .and_then(ExternalId::as_text)
            .map(str::to_string)
    }

    /// Preferred match key, when the record carries one
    pub fn primary_id(&self) -> Option<i64> {
        self.numeric_id(Platform::PRIMARY)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Anime record title must not be blank".to_string(),
            ));
        }

        for (platform, id) in &self.ids {
            let matches_kind = matches!(
                (platform.id_kind(), id),
                (IdKind::Numeric, ExternalId::Numeric(_)) | (IdKind::Text, ExternalId::Text(_))
            );
            if !matches_kind {
                return Err(AppError::ValidationError(format!(
                    "'{}' carries a {:?} id for {}, which expects {:?} ids",
                    self.title,
                    id,
                    platform,
                    platform.id_kind()
                )));
            }
        }

        Ok(())
    }

    /// SHA-256 hex digest over the title and every mapped id in platform order.
    /// Free-form fields are length-prefixed so no title or text id can mimic
    /// the framing of another record.
    ///
    /// Fails for records that do not validate; detection must abort rather than
    /// drop such a record.
    pub fn compute_hash(&self) -> AppResult<String> {
        self.validate()?;

        let mut hasher = Sha256::new();
        Self::hash_field(&mut hasher, self.title.as_bytes());
        for (platform, id) in &self.ids {
            hasher.update([0x1f]);
            hasher.update(platform.as_str().as_bytes());
            hasher.update([b'=']);
            match id {
                ExternalId::Numeric(value) => Self::hash_field(&mut hasher, value.to_string().as_bytes()),
                ExternalId::Text(value) => Self::hash_field(&mut hasher, value.as_bytes()),
            }
        }
        Ok(format!("{:x}", hasher.finalize()))
    }

    fn hash_field(hasher: &mut Sha256, bytes: &[u8]) {
        hasher.update((bytes.len() as u64).to_be_bytes());
        hasher.update(bytes);
    }

    /// Build a record from the flat collector shape:
    /// `{"title": "...", "myanimelist": 1, "imdb": "tt123", "kitsu": null}`.
    ///
    /// Null and empty values are absent ids, digit strings are accepted for
    /// numeric platforms, unknown keys are ignored.
    pub fn from_flat_json(value: &JsonValue) -> AppResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            AppError::ValidationError("Anime record must be a JSON object".to_string())
        })?;

        let title = object
            .get("title")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| AppError::ValidationError("Anime record has no title".to_string()))?;

        let mut record = AnimeRecord::new(title);
        for (key, raw) in object {
            let Ok(platform) = key.parse::<Platform>() else {
                continue;
            };
            if let Some(id) = Self::normalize_id(platform, raw)? {
                record.ids.insert(platform, id);
            }
        }

        record.validate()?;
        Ok(record)
    }

    fn normalize_id(platform: Platform, raw: &JsonValue) -> AppResult<Option<ExternalId>> {
        let invalid = || {
            AppError::ValidationError(format!("Invalid {} id: {}", platform, raw))
        };

        let id = match (platform.id_kind(), raw) {
            (_, JsonValue::Null) => None,
            (_, JsonValue::String(s)) if s.trim().is_empty() => None,
            (IdKind::Numeric, JsonValue::Number(n)) => {
                Some(ExternalId::Numeric(n.as_i64().ok_or_else(invalid)?))
            }
            (IdKind::Numeric, JsonValue::String(s)) => Some(ExternalId::Numeric(
                s.trim().parse::<i64>().map_err(|_| invalid())?,
            )),
            (IdKind::Text, JsonValue::String(s)) => Some(ExternalId::Text(s.trim().to_string())),
            (IdKind::Text, JsonValue::Number(n)) => Some(ExternalId::Text(n.to_string())),
            _ => return Err(invalid()),
        };
        Ok(id)
    }
}

/// A record paired with the content hash computed for it during detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedRecord {
    pub record: AnimeRecord,
    pub data_hash: String,
}

impl HashedRecord {
    pub fn new(record: AnimeRecord) -> AppResult<Self> {
        let data_hash = record.compute_hash()?;
        Ok(Self { record, data_hash })
    }
}
