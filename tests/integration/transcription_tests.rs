//! Transcription and translation through the HTTP surface

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use crate::common::assertions::file_count;
    use crate::common::{MultipartBody, TestEnv, assert_error};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use mini_ai_gateway::server::server::create_app;
    use serde_json::Value;

    const AUDIO: &[u8] = b"RIFF\x24\x00\x00\x00WAVEfmt fake audio payload";

    fn upload_request(uri: &str, form: MultipartBody) -> test::TestRequest {
        let (content_type, body) = form.finish();
        test::TestRequest::post()
            .uri(uri)
            .insert_header(("content-type", content_type))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn test_json_transcription_defaults_to_segments() {
        let env = TestEnv::with_tools();
        let app = test::init_service(create_app(env.state())).await;

        let form = MultipartBody::new()
            .file("file", "clip.wav", AUDIO)
            .text("model", "whisper-1");
        let resp = test::call_service(&app, upload_request("/v1/audio/transcriptions", form).to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["text"], "hello world");
        assert_eq!(body["segments"][0]["end"], 1.5);
        assert!(body.get("words").is_none());

        assert_eq!(file_count(&env.upload_dir()), 0, "upload must be removed");
        assert_eq!(file_count(&env.output_dir()), 0, "tool output must be removed");

        let args = env.whisper_args();
        assert!(args.contains("--language zh"), "got {}", args);
        assert!(!args.contains("--task"), "got {}", args);
    }

    #[actix_web::test]
    async fn test_word_granularity_and_language() {
        let env = TestEnv::with_tools();
        let app = test::init_service(create_app(env.state())).await;

        let form = MultipartBody::new()
            .file("file", "clip.m4a", AUDIO)
            .text("language", "en")
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word");
        let resp = test::call_service(&app, upload_request("/v1/audio/transcriptions", form).to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["task"], "transcribe");
        assert_eq!(body["language"], "en");
        assert_eq!(body["duration"], 1.5);
        assert_eq!(body["words"][1]["word"], "world");
        assert!(body.get("segments").is_none());

        let args = env.whisper_args();
        assert!(args.contains("--language en"), "got {}", args);
        assert!(args.contains("--word-timestamps True"), "got {}", args);
    }

    #[actix_web::test]
    async fn test_text_srt_and_vtt_formats() {
        let env = TestEnv::with_tools();
        let app = test::init_service(create_app(env.state())).await;

        let expectations = [
            ("text", "text/plain", "hello world"),
            ("srt", "text/plain", "1\n00:00:00,000 --> 00:00:01,500\nhello world\n"),
            ("vtt", "text/vtt", "WEBVTT\n\n00:00:00.000 --> 00:00:01.500\nhello world\n"),
        ];

        for (format, content_type, expected) in expectations {
            let form = MultipartBody::new()
                .file("file", "clip.wav", AUDIO)
                .text("response_format", format);
            let resp = test::call_service(&app, upload_request("/v1/audio/transcriptions", form).to_request()).await;

            assert_eq!(resp.status(), StatusCode::OK, "format {}", format);
            let header = resp.headers().get("content-type").unwrap().to_str().unwrap().to_string();
            assert!(header.starts_with(content_type), "format {}: {}", format, header);
            let body = test::read_body(resp).await;
            assert_eq!(String::from_utf8_lossy(&body), expected);
        }
    }

    #[actix_web::test]
    async fn test_translation_ignores_language() {
        let env = TestEnv::with_tools();
        let app = test::init_service(create_app(env.state())).await;

        let form = MultipartBody::new()
            .file("file", "clip.wav", AUDIO)
            .text("language", "fr")
            .text("prompt", "greetings");
        let resp = test::call_service(&app, upload_request("/v1/audio/translations", form).to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["text"], "hello world");

        let args = env.whisper_args();
        assert!(args.contains("--task translate"), "got {}", args);
        assert!(!args.contains("--language"), "got {}", args);
        assert!(args.contains("--initial-prompt greetings"), "got {}", args);
    }

    #[actix_web::test]
    async fn test_missing_file_is_rejected() {
        let env = TestEnv::with_tools();
        let app = test::init_service(create_app(env.state())).await;

        let form = MultipartBody::new().text("model", "whisper-1");
        let resp = test::call_service(&app, upload_request("/v1/audio/transcriptions", form).to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;

        assert_error(status, &body, 400, "invalid_request_error", "missing_required_parameter");
    }

    #[actix_web::test]
    async fn test_oversized_upload_is_rejected_and_removed() {
        let mut env = TestEnv::with_tools();
        env.config.transcription.max_upload_bytes = 16;
        let app = test::init_service(create_app(env.state())).await;

        let form = MultipartBody::new().file("file", "clip.wav", &[0u8; 64]);
        let resp = test::call_service(&app, upload_request("/v1/audio/transcriptions", form).to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;

        assert_error(status, &body, 400, "invalid_request_error", "file_too_large");
        assert_eq!(file_count(&env.upload_dir()), 0);
    }

    #[actix_web::test]
    async fn test_bad_response_format_is_rejected() {
        let env = TestEnv::with_tools();
        let app = test::init_service(create_app(env.state())).await;

        let form = MultipartBody::new()
            .file("file", "clip.wav", AUDIO)
            .text("response_format", "xml");
        let resp = test::call_service(&app, upload_request("/v1/audio/transcriptions", form).to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request_error");
        assert_eq!(file_count(&env.upload_dir()), 0);
    }

    #[actix_web::test]
    async fn test_tool_failure_maps_per_task() {
        let env = TestEnv::with_tools().failing("mlx_whisper");
        let app = test::init_service(create_app(env.state())).await;

        let cases = [
            ("/v1/audio/transcriptions", "recognition_error", "stt_error"),
            ("/v1/audio/translations", "translation_error", "translation_error"),
        ];
        for (uri, error_type, code) in cases {
            let form = MultipartBody::new().file("file", "clip.wav", AUDIO);
            let resp = test::call_service(&app, upload_request(uri, form).to_request()).await;
            let status = resp.status();
            let body: Value = test::read_body_json(resp).await;
            assert_error(status, &body, 500, error_type, code);
        }

        assert_eq!(file_count(&env.upload_dir()), 0);
        assert_eq!(file_count(&env.output_dir()), 0);
    }
}
