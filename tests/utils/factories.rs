/// Test data factories using builder pattern
///
/// Provides convenient methods to create records with sensible defaults
use xref_lib::modules::anime::domain::{AnimeRecord, Platform};

pub struct RecordFactory {
    title: String,
    primary_id: Option<i64>,
    numeric: Vec<(Platform, i64)>,
    text: Vec<(Platform, String)>,
}

impl Default for RecordFactory {
    fn default() -> Self {
        Self {
            title: "Test Anime".to_string(),
            primary_id: None,
            numeric: Vec::new(),
            text: Vec::new(),
        }
    }
}

impl RecordFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn mal(mut self, id: i64) -> Self {
        self.primary_id = Some(id);
        self
    }

    pub fn numeric(mut self, platform: Platform, id: i64) -> Self {
        self.numeric.push((platform, id));
        self
    }

    pub fn text(mut self, platform: Platform, id: &str) -> Self {
        self.text.push((platform, id.to_string()));
        self
    }

    pub fn build(self) -> AnimeRecord {
        let mut record = AnimeRecord::new(self.title);
        if let Some(id) = self.primary_id {
            record = record.with_numeric(Platform::PRIMARY, id);
        }
        for (platform, id) in self.numeric {
            record = record.with_numeric(platform, id);
        }
        for (platform, id) in self.text {
            record = record.with_text(platform, id);
        }
        record
    }
}

/// `count` distinct records keyed by primary id starting at `first_mal`
pub fn catalog(count: usize, first_mal: i64) -> Vec<AnimeRecord> {
    (0..count)
        .map(|i| {
            let mal = first_mal + i as i64;
            RecordFactory::new()
                .title(&format!("Anime {}", mal))
                .mal(mal)
                .numeric(Platform::AniList, mal * 10)
                .build()
        })
        .collect()
}
