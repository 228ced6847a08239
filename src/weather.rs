use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

// A current-weather reading as returned by the lookup endpoint. Only the
// fields the chatbot consumes are modeled; anything else in the payload is
// ignored.
#[derive(Deserialize, Debug, Clone)]
pub struct WeatherSnapshot {
    /// Application-level status. The upstream API sends a number on success
    /// and a string on error, so both forms must decode.
    #[serde(default = "ok_status", deserialize_with = "status_code")]
    pub cod: u16,
    #[serde(default)]
    pub name: String,
    pub main: Option<MainReadings>,
    #[serde(default)]
    pub weather: Vec<ConditionEntry>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MainReadings {
    pub temp: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ConditionEntry {
    pub main: String,
    pub description: String,
}

impl WeatherSnapshot {
    pub fn is_success(&self) -> bool {
        self.cod == 200
    }

    pub fn condition(&self) -> Option<&ConditionEntry> {
        self.weather.first()
    }
}

fn ok_status() -> u16 {
    200
}

fn status_code<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Number(u16),
        Text(String),
    }
    match Code::deserialize(deserializer)? {
        Code::Number(n) => Ok(n),
        Code::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Boundary to the weather provider, kept as a trait so the chatbot can be
/// exercised against a deterministic stub.
#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn fetch(&self, city: &str) -> Result<WeatherSnapshot>;
}

pub struct WeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl WeatherLookup for WeatherClient {
    async fn fetch(&self, city: &str) -> Result<WeatherSnapshot> {
        log::info!("Fetching weather for '{}'", city);
        let snapshot = self
            .http
            .get(&self.base_url)
            .query(&[("q", city), ("appid", &self.api_key), ("units", "metric")])
            .send()
            .await?
            .json::<WeatherSnapshot>()
            .await?;
        Ok(snapshot)
    }
}
