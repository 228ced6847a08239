use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

mod advisory;
mod conversation;
mod weather;

use conversation::{ConversationSession, Intent};
use weather::{WeatherClient, WeatherLookup, WeatherSnapshot};

// --- Data Structures ---
#[derive(Deserialize)]
struct AskRequest {
    user_input: String,
    /// Weather the caller already holds for this session, if any.
    #[serde(default)]
    weather: Option<WeatherSnapshot>,
}
#[derive(Serialize)]
struct AskResponse {
    response: String,
}

// --- Canned Replies ---
const GREETING_REPLY: &str = "Hello! 👋 How are you today?";
const THANKS_REPLY: &str = "You're very welcome! 😊 Stay safe!";
const HELP_REPLY: &str = "I can tell you the weather 🌦️ or give outfit suggestions! 👕";
const CHECK_WEATHER_REPLY: &str = "Please check the weather first or ask me about a city 🌍";
const LOOKUP_ERROR_REPLY: &str = "⚠️ Error fetching weather data.";

// --- Chatbot Core ---
pub struct ChatBot {
    client: Arc<dyn WeatherLookup>,
    default_city: String,
}

impl ChatBot {
    pub fn new(client: Arc<dyn WeatherLookup>, default_city: String) -> Self {
        Self {
            client,
            default_city,
        }
    }

    /// Produces one reply for one utterance. At most one outbound lookup is
    /// made per call, and every lookup failure is converted into a
    /// user-facing reply rather than an error.
    pub async fn respond(&self, input: &str, cached: Option<&WeatherSnapshot>) -> String {
        match conversation::recognize(input.trim()) {
            Intent::Greeting => GREETING_REPLY.to_string(),
            Intent::Thanks => THANKS_REPLY.to_string(),
            Intent::Help => HELP_REPLY.to_string(),
            Intent::Recommend => self.recommend(cached).await,
            Intent::CityQuery(city) => self.city_weather(&city).await,
            Intent::Fallback => format!(
                "I'm still learning 🤖. Try 'weather in {}' or 'recommend something'.",
                self.default_city
            ),
        }
    }

    async fn recommend(&self, cached: Option<&WeatherSnapshot>) -> String {
        let fetched;
        let snapshot = match cached {
            Some(snap) if !snap.weather.is_empty() => snap,
            _ => {
                log::info!("No cached weather, fetching default city '{}'", self.default_city);
                match self.client.fetch(&self.default_city).await {
                    Ok(snap) => {
                        fetched = snap;
                        &fetched
                    }
                    Err(err) => {
                        log::error!("Default weather lookup failed: {err:#}");
                        return LOOKUP_ERROR_REPLY.to_string();
                    }
                }
            }
        };

        match snapshot.condition() {
            Some(entry) => {
                advisory::advise(&entry.main.to_lowercase(), &entry.description.to_lowercase())
            }
            None => CHECK_WEATHER_REPLY.to_string(),
        }
    }

    async fn city_weather(&self, city: &str) -> String {
        match self.client.fetch(city).await {
            Ok(snap) if snap.is_success() => match (snap.main.as_ref(), snap.condition()) {
                (Some(readings), Some(entry)) => format!(
                    "🌤️ Weather in {}: {}°C, {}",
                    snap.name, readings.temp, entry.main
                ),
                _ => Self::not_found(city),
            },
            Ok(_) => Self::not_found(city),
            Err(err) => {
                log::error!("Weather lookup for '{city}' failed: {err:#}");
                LOOKUP_ERROR_REPLY.to_string()
            }
        }
    }

    fn not_found(city: &str) -> String {
        format!("❌ I couldn't find weather for \"{city}\". Try another city.")
    }
}

// --- Web Server Endpoints ---
struct AppState {
    bot: ChatBot,
    session: Mutex<ConversationSession>,
}

#[post("/ask")]
async fn ask_endpoint(req: web::Json<AskRequest>, data: web::Data<AppState>) -> impl Responder {
    let reply = data.bot.respond(&req.user_input, req.weather.as_ref()).await;
    data.session
        .lock()
        .unwrap()
        .push_exchange(req.user_input.trim(), &reply);
    HttpResponse::Ok().json(AskResponse { response: reply })
}

#[get("/history")]
async fn history_endpoint(data: web::Data<AppState>) -> impl Responder {
    let session = data.session.lock().unwrap();
    HttpResponse::Ok().json(session.messages())
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("index.html"))
}

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = config::Config::builder()
        .add_source(config::File::with_name("Config"))
        .build()?;

    let weather_conf = settings.get_table("weather")?;
    let api_key = weather_conf["api_key"].clone().into_string()?;
    let base_url = weather_conf["base_url"].clone().into_string()?;
    let default_city = weather_conf["default_city"].clone().into_string()?;
    let timeout_secs = weather_conf["timeout_secs"].clone().into_int()? as u64;

    if api_key.is_empty() {
        log::warn!("weather.api_key is empty; city lookups will fail");
    }

    let client = WeatherClient::new(base_url, api_key, timeout_secs)?;
    let bot = ChatBot::new(Arc::new(client), default_city);
    let data = web::Data::new(AppState {
        bot,
        session: Mutex::new(ConversationSession::new()),
    });

    let server_conf = settings.get_table("server")?;
    let host = server_conf["host"].clone().into_string()?;
    let port = server_conf["port"].clone().into_int()? as u16;

    log::info!("Starting weather chatbot at http://{}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .service(index)
            .service(ask_endpoint)
            .service(history_endpoint)
    })
    .bind((host, port))?
    .run()
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use weather::{ConditionEntry, MainReadings};

    struct StubLookup {
        reply: Result<WeatherSnapshot, String>,
        last_city: Mutex<Option<String>>,
    }

    impl StubLookup {
        fn new(reply: Result<WeatherSnapshot, String>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                last_city: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl WeatherLookup for StubLookup {
        async fn fetch(&self, city: &str) -> Result<WeatherSnapshot> {
            *self.last_city.lock().unwrap() = Some(city.to_string());
            match &self.reply {
                Ok(snap) => Ok(snap.clone()),
                Err(msg) => Err(anyhow::anyhow!("{msg}")),
            }
        }
    }

    fn snapshot(cod: u16, name: &str, temp: f64, main: &str, description: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            cod,
            name: name.to_string(),
            main: Some(MainReadings { temp }),
            weather: vec![ConditionEntry {
                main: main.to_string(),
                description: description.to_string(),
            }],
        }
    }

    fn bot(stub: Arc<StubLookup>) -> ChatBot {
        ChatBot::new(stub, "Hyderabad".to_string())
    }

    #[tokio::test]
    async fn greeting_wins_regardless_of_other_content() {
        let bot = bot(StubLookup::new(Err("unused".into())));
        assert_eq!(bot.respond("  Hey, recommend something  ", None).await, GREETING_REPLY);
        assert_eq!(bot.respond("HELLO weather in Pune", None).await, GREETING_REPLY);
    }

    #[tokio::test]
    async fn recommend_uses_cached_snapshot() {
        let bot = bot(StubLookup::new(Err("network down".into())));
        let cached = snapshot(200, "Hyderabad", 25.0, "Rain", "light rain");
        let reply = bot.respond("recommend something", Some(&cached)).await;
        assert_eq!(reply, advisory::advise("rain", "light rain"));
    }

    #[tokio::test]
    async fn recommend_fetches_default_city_when_cache_missing() {
        let stub = StubLookup::new(Ok(snapshot(200, "Hyderabad", 32.0, "Clear", "clear sky")));
        let bot = bot(stub.clone());
        let reply = bot.respond("suggest an outfit", None).await;
        assert!(reply.contains("Clear skies"));
        assert_eq!(stub.last_city.lock().unwrap().as_deref(), Some("Hyderabad"));
    }

    #[tokio::test]
    async fn recommend_without_condition_data_prompts_for_weather() {
        let empty = WeatherSnapshot {
            cod: 200,
            name: String::new(),
            main: None,
            weather: Vec::new(),
        };
        let bot = bot(StubLookup::new(Ok(empty)));
        let reply = bot.respond("recommend something", None).await;
        assert_eq!(reply, CHECK_WEATHER_REPLY);
    }

    #[tokio::test]
    async fn recommend_recovers_from_lookup_error() {
        let bot = bot(StubLookup::new(Err("connection refused".into())));
        let reply = bot.respond("recommend something", None).await;
        assert_eq!(reply, LOOKUP_ERROR_REPLY);
    }

    #[tokio::test]
    async fn city_query_formats_successful_lookup() {
        let stub = StubLookup::new(Ok(snapshot(200, "Hyderabad", 31.5, "Clouds", "scattered clouds")));
        let bot = bot(stub.clone());
        let reply = bot.respond("weather in hyderabad", None).await;
        assert_eq!(reply, "🌤️ Weather in Hyderabad: 31.5°C, Clouds");
        assert_eq!(stub.last_city.lock().unwrap().as_deref(), Some("hyderabad"));
    }

    #[tokio::test]
    async fn city_query_reports_unknown_city() {
        let not_found = WeatherSnapshot {
            cod: 404,
            name: String::new(),
            main: None,
            weather: Vec::new(),
        };
        let bot = bot(StubLookup::new(Ok(not_found)));
        let reply = bot.respond("weather in Nowhereistan", None).await;
        assert!(reply.contains("Nowhereistan"));
        assert!(reply.contains("couldn't find"));
    }

    #[tokio::test]
    async fn city_query_recovers_from_transport_error() {
        let bot = bot(StubLookup::new(Err("timed out".into())));
        let reply = bot.respond("weather in Hyderabad", None).await;
        assert_eq!(reply, LOOKUP_ERROR_REPLY);
    }

    #[tokio::test]
    async fn fallback_hint_names_configured_city() {
        let bot = bot(StubLookup::new(Err("unused".into())));
        let reply = bot.respond("how are you", None).await;
        assert!(reply.contains("still learning"));
        assert!(reply.contains("weather in Hyderabad"));
    }

    #[tokio::test]
    async fn respond_is_idempotent_with_deterministic_lookup() {
        let bot = bot(StubLookup::new(Ok(snapshot(200, "Pune", 20.0, "Mist", "mist"))));
        let first = bot.respond("weather in Pune", None).await;
        let second = bot.respond("weather in Pune", None).await;
        assert_eq!(first, second);
    }
}
