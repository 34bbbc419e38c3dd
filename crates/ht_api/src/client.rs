use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use ht_core::types::{
    ModeChange, ModelChange, ModelReadiness, NewsItem, RefreshOutcome, SummaryMode, ALL_CATEGORIES,
};
use ht_core::{Error, NewsBackend, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the news backend.
///
/// One shared `reqwest::Client`, one base URL; every method maps to exactly
/// one endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

#[derive(Serialize)]
struct ModelRequest<'a> {
    model: &'a str,
}

#[derive(Serialize)]
struct ModeRequest<'a> {
    mode: &'a str,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(Error::from)
    }

    /// URL for a feed request. The `tum` sentinel maps to the unscoped
    /// endpoint; the summary mode always rides along as `ozet_modu`.
    fn news_url(&self, category: Option<&str>, mode: SummaryMode) -> Result<Url> {
        let path = match category.filter(|key| *key != ALL_CATEGORIES) {
            Some(key) => format!("/api/haberler/{key}"),
            None => "/api/haberler".to_string(),
        };
        let mut url = self.endpoint(&path)?;
        url.query_pairs_mut()
            .append_pair("ozet_modu", mode.as_param());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "request rejected");
            return Err(Error::Status(status));
        }
        Ok(response.json().await?)
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(%url, "POST");
        let response = self.http.post(url.clone()).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "request rejected");
            return Err(Error::Status(status));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl NewsBackend for ApiClient {
    async fn categories(&self) -> Result<Vec<String>> {
        self.get_json(self.endpoint("/api/kategoriler")?).await
    }

    async fn news(&self, category: Option<&str>, mode: SummaryMode) -> Result<Vec<NewsItem>> {
        self.get_json(self.news_url(category, mode)?).await
    }

    async fn models(&self) -> Result<BTreeMap<String, String>> {
        self.get_json(self.endpoint("/api/models")?).await
    }

    async fn select_model(&self, key: &str) -> Result<ModelChange> {
        self.post_json(self.endpoint("/api/model")?, &ModelRequest { model: key })
            .await
    }

    async fn model_status(&self) -> Result<ModelReadiness> {
        self.get_json(self.endpoint("/api/model/durum")?).await
    }

    async fn select_summary_mode(&self, mode: SummaryMode) -> Result<ModeChange> {
        self.post_json(
            self.endpoint("/api/change_summary_mode")?,
            &ModeRequest {
                mode: mode.as_param(),
            },
        )
        .await
    }

    async fn refresh(&self, category: &str) -> Result<RefreshOutcome> {
        self.get_json(self.endpoint(&format!("/api/yenile/{category}"))?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://127.0.0.1:5000").unwrap()
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(ApiClient::new("127.0.0.1:5000").is_err());
    }

    #[test]
    fn news_url_without_category() {
        let url = client().news_url(None, SummaryMode::Normal).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5000/api/haberler?ozet_modu=normal"
        );
    }

    #[test]
    fn news_url_with_category_and_mode() {
        let url = client()
            .news_url(Some("ekonomi"), SummaryMode::Kisa)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5000/api/haberler/ekonomi?ozet_modu=kisa"
        );
    }

    #[test]
    fn news_url_treats_tum_as_unscoped() {
        let url = client()
            .news_url(Some(ALL_CATEGORIES), SummaryMode::Normal)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5000/api/haberler?ozet_modu=normal"
        );
    }

    #[test]
    fn base_url_may_carry_a_trailing_slash() {
        let client = ApiClient::new("http://127.0.0.1:5000/").unwrap();
        let url = client.endpoint("/api/kategoriler").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/kategoriler");
    }

    #[test]
    fn model_request_body_shape() {
        let body = serde_json::to_value(ModelRequest { model: "bart" }).unwrap();
        assert_eq!(body, serde_json::json!({"model": "bart"}));
    }

    #[test]
    fn mode_request_body_shape() {
        let body = serde_json::to_value(ModeRequest {
            mode: SummaryMode::Kisa.as_param(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"mode": "kisa"}));
    }

    #[test]
    fn model_map_keeps_stable_key_order() {
        let models: BTreeMap<String, String> = serde_json::from_str(
            r#"{"transformers": "BART (yerel)", "basit": "Basit özetleyici", "api": "API tabanlı model"}"#,
        )
        .unwrap();
        let keys: Vec<&str> = models.keys().map(String::as_str).collect();
        assert_eq!(keys, ["api", "basit", "transformers"]);
    }

    #[test]
    fn feed_fixture_decodes() {
        let feed: Vec<NewsItem> = serde_json::from_str(
            r#"[
                {"kategori": "teknoloji", "baslik": "Yeni işlemci tanıtıldı",
                 "ozet": "Üretici yeni nesil işlemcisini duyurdu.",
                 "kaynak": "Chip", "url": "https://example.com/islemci",
                 "duygu": "positive", "tarih": "2024-05-01T09:00:00"},
                {"kategori": "gundem", "baslik": "Köprü trafiğe kapandı",
                 "ozet": "Bakım çalışması sabaha kadar sürecek.",
                 "kaynak": "Hürriyet", "url": "https://example.com/kopru"}
            ]"#,
        )
        .unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].sentiment, Some(ht_core::Sentiment::Positive));
        assert!(feed[1].sentiment.is_none());
    }
}
