use crate::config::{StorageConfig, StoreConfig};
use crate::error::{ConfigError, Result as AppResult, StoreError};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;

pub const IMAGE_FILE_SUFFIX: &str = ".png";

/// A normalized past-exam question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// Exam session label, e.g. "60". Doubles as the image folder name.
    pub round: String,
    /// Ordinal within the round.
    pub number: u32,
    /// The five options in position order. Values ending in `.png` are
    /// image file references, everything else is literal answer text.
    pub options: [String; 5],
    /// 1-based index of the correct option.
    pub answer: u8,
}

/// Raw row shape as returned by the question table.
#[derive(Debug, Deserialize)]
struct QuestionRow {
    round: String,
    number: u32,
    option_1: String,
    option_2: String,
    option_3: String,
    option_4: String,
    option_5: String,
    answer: i64,
}

impl QuestionRow {
    fn normalize(self) -> Option<Question> {
        if !(1..=5).contains(&self.answer) {
            tracing::warn!(
                question.round = %self.round,
                question.number = self.number,
                question.answer = self.answer,
                "Dropping question row with out-of-range answer"
            );
            return None;
        }
        Some(Question {
            round: self.round,
            number: self.number,
            options: [
                self.option_1,
                self.option_2,
                self.option_3,
                self.option_4,
                self.option_5,
            ],
            answer: self.answer as u8,
        })
    }
}

fn normalize_rows(rows: Vec<QuestionRow>) -> Vec<Question> {
    rows.into_iter().filter_map(QuestionRow::normalize).collect()
}

/// Builds public URLs for objects in the image bucket.
///
/// The store exposes images at
/// `{base}/storage/v1/object/public/{bucket}/{round}/{file}`; no signing or
/// access control is involved.
#[derive(Debug, Clone)]
pub struct PublicImageUrls {
    base_url: String,
    bucket: String,
}

impl PublicImageUrls {
    pub fn new(base_url: String, bucket: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
        }
    }

    /// Resolves an option value to a public URL, or `None` when the value is
    /// not an image file reference.
    pub fn resolve(&self, round: &str, file_name: &str) -> Option<String> {
        if !file_name.ends_with(IMAGE_FILE_SUFFIX) {
            return None;
        }
        Some(format!(
            "{}/storage/v1/object/public/{}/{}/{}",
            self.base_url, self.bucket, round, file_name
        ))
    }

    /// URL of a question's primary image, stored as `q{number}.png`.
    pub fn question_image(&self, round: &str, number: u32) -> String {
        // Always an image reference, so resolve cannot return None.
        self.resolve(round, &format!("q{number}.png"))
            .unwrap_or_default()
    }
}

/// Read-only client for the hosted question table.
pub struct QuestionStore {
    http: reqwest::Client,
    store_config: StoreConfig,
    storage_config: StorageConfig,
}

impl QuestionStore {
    pub fn new(store_config: StoreConfig, storage_config: StorageConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&store_config.api_key)
            .map_err(|e| ConfigError::InvalidValue(format!("store.api_key: {e}")))?;
        headers.insert("apikey", api_key);
        let bearer = HeaderValue::from_str(&format!("Bearer {}", store_config.api_key))
            .map_err(|e| ConfigError::InvalidValue(format!("store.api_key: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            store_config,
            storage_config,
        })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.store_config.url.trim_end_matches('/'),
            self.store_config.question_table
        )
    }

    /// Fetches every row of the question table (the store offers no
    /// server-side ordering guarantee; callers re-derive order themselves).
    #[tracing::instrument(skip(self), fields(store.table = %self.store_config.question_table))]
    pub async fn fetch_all_questions(&self) -> Result<Vec<Question>, StoreError> {
        let url = self.table_url();
        tracing::debug!(http.url = %url, "Fetching question rows");

        let response = self
            .http
            .get(&url)
            .query(&[("select", "*")])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| StoreError::HttpFetch {
                url: url.clone(),
                source: e,
            })?;

        let rows: Vec<QuestionRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let questions = normalize_rows(rows);
        tracing::info!(questions.count = questions.len(), "Loaded question rows");
        Ok(questions)
    }

    pub fn image_urls(&self) -> PublicImageUrls {
        PublicImageUrls::new(
            self.store_config.url.clone(),
            self.storage_config.bucket.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_rows(content: &str) -> Vec<QuestionRow> {
        serde_json::from_str(content).unwrap()
    }

    #[test]
    fn test_normalize_rows() {
        let content = r#"[
  {
    "round": "60",
    "number": 1,
    "option_1": "갑",
    "option_2": "을",
    "option_3": "병",
    "option_4": "정",
    "option_5": "무",
    "answer": 3
  },
  {
    "round": "60",
    "number": 2,
    "option_1": "img1.png",
    "option_2": "img2.png",
    "option_3": "img3.png",
    "option_4": "img4.png",
    "option_5": "img5.png",
    "answer": 0
  }
]"#;

        let questions = normalize_rows(parse_rows(content));

        // The answer=0 row is dropped during normalization.
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].round, "60");
        assert_eq!(questions[0].number, 1);
        assert_eq!(questions[0].options[2], "병");
        assert_eq!(questions[0].answer, 3);
    }

    #[test]
    fn test_resolve_option_image_url() {
        let urls = PublicImageUrls::new(
            "https://example.supabase.co/".to_string(),
            "quiz-images".to_string(),
        );

        assert_eq!(
            urls.resolve("60", "img1.png").as_deref(),
            Some("https://example.supabase.co/storage/v1/object/public/quiz-images/60/img1.png")
        );
        assert_eq!(urls.resolve("60", "플레인 텍스트"), None);
        assert_eq!(urls.resolve("60", ""), None);
    }

    #[test]
    fn test_question_image_url() {
        let urls = PublicImageUrls::new(
            "https://example.supabase.co".to_string(),
            "quiz-images".to_string(),
        );

        assert_eq!(
            urls.question_image("61", 17),
            "https://example.supabase.co/storage/v1/object/public/quiz-images/61/q17.png"
        );
    }
}
