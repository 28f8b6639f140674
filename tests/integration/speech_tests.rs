//! Speech synthesis through the HTTP surface

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use crate::common::assertions::{file_count, wait_until_empty};
    use crate::common::{TestEnv, assert_error};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use mini_ai_gateway::server::server::create_app;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_speech_streams_audio_and_cleans_up() {
        let env = TestEnv::with_tools();
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::post()
            .uri("/v1/audio/speech")
            .set_json(json!({ "input": "hello world", "voice": "echo" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("content-type").unwrap(), "audio/mpeg");
        assert_eq!(
            resp.headers().get("content-disposition").unwrap(),
            "attachment; filename=\"speech.mp3\""
        );

        let body = test::read_body(resp).await;
        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with("voice:Ting-Ting\n"), "got {:?}", text);
        assert!(text.contains("hello world"));

        assert!(
            wait_until_empty(&env.speech_dir(), 2_000).await,
            "speech artifacts should be removed after transmission"
        );
    }

    #[actix_web::test]
    async fn test_native_format_skips_transcoding() {
        // ffmpeg failing proves aiff never reaches the transcoder
        let env = TestEnv::with_tools().failing("ffmpeg");
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::post()
            .uri("/v1/audio/speech")
            .set_json(json!({ "input": "plain", "response_format": "aiff" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("content-type").unwrap(), "audio/aiff");
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).starts_with("voice:Yue\n"));
    }

    #[actix_web::test]
    async fn test_unknown_voice_uses_default() {
        let mut env = TestEnv::with_tools();
        env.config.speech.default_voice = "Tingting".to_string();
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::post()
            .uri("/v1/audio/speech")
            .set_json(json!({ "input": "hi", "voice": "robot", "response_format": "wav" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("content-type").unwrap(), "audio/wav");
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).starts_with("voice:Tingting\n"));
    }

    #[actix_web::test]
    async fn test_markup_is_stripped_before_synthesis() {
        let env = TestEnv::with_tools();
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::post()
            .uri("/v1/audio/speech")
            .set_json(json!({ "input": "**bold** and `code`", "response_format": "aiff" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let text = String::from_utf8_lossy(&body);
        assert!(!text.contains('*'), "got {:?}", text);
        assert!(!text.contains('`'), "got {:?}", text);
        assert!(text.contains("bold"));
    }

    #[actix_web::test]
    async fn test_validation_errors() {
        let env = TestEnv::with_tools();
        let app = test::init_service(create_app(env.state())).await;

        let cases = [
            (json!({}), "missing_required_parameter"),
            (json!({ "input": "   " }), "missing_required_parameter"),
            (json!({ "input": "x".repeat(4097) }), "input_too_long"),
            (json!({ "input": "hi", "response_format": "ogg" }), "unsupported_format"),
            (json!({ "input": "hi", "speed": 5.0 }), "invalid_speed"),
            (json!({ "input": "***" }), "invalid_input"),
        ];

        for (payload, code) in cases {
            let req = test::TestRequest::post()
                .uri("/v1/audio/speech")
                .set_json(&payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            let status = resp.status();
            let body: Value = test::read_body_json(resp).await;
            assert_error(status, &body, 400, "invalid_request_error", code);
        }

        assert_eq!(file_count(&env.speech_dir()), 0);
    }

    #[actix_web::test]
    async fn test_tool_failure_is_synthesis_error() {
        let env = TestEnv::with_tools().failing("say");
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::post()
            .uri("/v1/audio/speech")
            .set_json(json!({ "input": "hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;

        assert_error(status, &body, 500, "synthesis_error", "tts_error");
        assert!(
            body["error"]["message"]
                .as_str()
                .unwrap()
                .contains("model weights missing")
        );
        assert_eq!(file_count(&env.speech_dir()), 0);
    }

    #[actix_web::test]
    async fn test_clone_model_when_disabled_is_config_error() {
        let env = TestEnv::with_tools();
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::post()
            .uri("/v1/audio/speech")
            .set_json(json!({ "model": "spark:clone", "input": "hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;

        assert_error(status, &body, 500, "server_error", "configuration_error");
    }

    #[actix_web::test]
    async fn test_models_lists_speech_and_system_voices() {
        let env = TestEnv::with_tools();
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::get().uri("/v1/models").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["object"], "list");
        let ids: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|m| m["id"].as_str())
            .collect();
        assert!(ids.contains(&"tts-1"));
        assert!(ids.contains(&"whisper-1"));
        assert_eq!(body["voices"]["openai"].as_array().unwrap().len(), 6);

        let system = body["voices"]["system"].as_array().unwrap();
        assert_eq!(system.len(), 2);
        assert_eq!(system[0]["name"], "Alex");
        assert_eq!(system[1]["language"], "zh_CN");
    }
}
