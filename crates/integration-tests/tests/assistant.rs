//! Integration tests for the AgriBot assistant and weather lookups.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]

use nongsan_client::chatbot::{ChatbotError, MISSING_API_KEY};
use nongsan_client::weather::WeatherError;
use nongsan_core::dto::{ChatMessage, Coord, Sender, WeatherIcon};
use nongsan_integration_tests::TestContext;
use secrecy::SecretString;
use serde_json::json;

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_chat_sends_conversation_after_greeting() {
    let ctx = TestContext::new().await;
    let history = vec![
        ChatMessage::welcome(1),
        ChatMessage::new(Sender::User, "Lúa bị vàng lá", 2),
        ChatMessage::new(Sender::Bot, "Có thể thiếu đạm.", 3),
    ];

    let answer = ctx.app.chatbot.send("Bón bao nhiêu?", &history).await.unwrap();
    assert_eq!(answer, "Đã nhận 3 lượt");

    let requests = ctx.backend.state().chat_requests.clone();
    assert_eq!(requests.len(), 1);
    let contents = &requests[0]["contents"];
    assert_eq!(contents[0]["role"], "user");
    assert_eq!(contents[0]["parts"][0]["text"], "Lúa bị vàng lá");
    assert_eq!(contents[1]["role"], "model");
    assert_eq!(
        contents[2],
        json!({ "role": "user", "parts": [{ "text": "Bón bao nhiêu?" }] })
    );

    let calls = ctx
        .backend
        .requests_to("/v1beta/models/gemini-2.5-flash:generateContent");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "POST");
}

#[tokio::test]
async fn test_chat_rejected_key_shows_gemini_message() {
    let ctx = TestContext::with_config(|config| {
        config.gemini_api_key = Some(SecretString::from("wrong-key"));
    })
    .await;

    let err = ctx.app.chatbot.send("Xin chào", &[]).await.unwrap_err();
    assert!(matches!(err, ChatbotError::Api { status: 400, .. }));
    assert_eq!(
        ctx.app.chatbot.reply("Xin chào", &[]).await,
        "API key not valid. Please pass a valid API key."
    );
    assert!(ctx.backend.state().chat_requests.is_empty());
}

#[tokio::test]
async fn test_chat_without_key_never_calls_out() {
    let ctx = TestContext::with_config(|config| config.gemini_api_key = None).await;

    assert_eq!(ctx.app.chatbot.reply("Xin chào", &[]).await, MISSING_API_KEY);
    assert!(ctx.backend.state().requests.is_empty());
}

// =============================================================================
// Weather
// =============================================================================

#[tokio::test]
async fn test_current_weather_in_city_geocodes_first() {
    let ctx = TestContext::new().await;

    let (location, weather) = ctx.app.weather.current_in_city(" Huế ").await.unwrap();
    assert_eq!(location.vietnamese_name(), "Huế");
    assert_eq!(location.state.as_deref(), Some("Thừa Thiên Huế"));
    assert_eq!(weather.name, "Huế");
    assert_eq!(weather.main.humidity, 83.0);
    let condition = weather.condition().unwrap();
    assert_eq!(WeatherIcon::from_code(&condition.icon), WeatherIcon::CloudRain);

    let paths: Vec<String> = ctx
        .backend
        .state()
        .requests
        .iter()
        .map(|r| r.path.clone())
        .collect();
    assert_eq!(paths, ["/geo/1.0/direct", "/data/2.5/weather"]);
}

#[tokio::test]
async fn test_current_weather_at_coordinate() {
    let ctx = TestContext::new().await;
    let weather = ctx
        .app
        .weather
        .current(Coord {
            lat: 16.4637,
            lon: 107.5909,
        })
        .await
        .unwrap();
    assert_eq!(weather.coord.lat, 16.4637);
    assert_eq!(weather.cod, 200);
}

#[tokio::test]
async fn test_unknown_city_is_not_found() {
    let ctx = TestContext::new().await;

    let err = ctx.app.weather.find_city("Atlantis").await.unwrap_err();
    assert!(matches!(err, WeatherError::CityNotFound));

    let err = ctx.app.weather.forecast("Atlantis").await.unwrap_err();
    assert!(matches!(err, WeatherError::Api { status: 404, .. }));
    assert_eq!(err.to_string(), "city not found");
}

#[tokio::test]
async fn test_forecast_lists_slots() {
    let ctx = TestContext::new().await;

    let forecast = ctx.app.weather.forecast("Huế").await.unwrap();
    assert_eq!(forecast.city.name, "Huế");
    assert_eq!(forecast.list.len(), 3);
    assert_eq!(forecast.list[1].pop, Some(0.6));
}

#[tokio::test]
async fn test_rejected_weather_key_is_reported() {
    let ctx = TestContext::with_config(|config| {
        config.openweather_api_key = Some(SecretString::from("wrong-key"));
    })
    .await;

    let err = ctx.app.weather.find_city("Huế").await.unwrap_err();
    assert!(matches!(err, WeatherError::Api { status: 401, .. }));
    assert_eq!(err.to_string(), "Invalid API key.");
}
