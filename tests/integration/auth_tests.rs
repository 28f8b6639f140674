//! Authentication across local and forwarded routes

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use crate::common::fixtures::TEST_API_KEY;
    use crate::common::{TestEnv, assert_error};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use mini_ai_gateway::server::server::create_app;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[actix_web::test]
    async fn test_wrong_key_is_rejected_before_any_tool_runs() {
        let env = TestEnv::with_tools().protected();
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::post()
            .uri("/v1/audio/speech")
            .insert_header(("authorization", "Bearer wrong"))
            .set_json(json!({ "input": "hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;

        assert_error(status, &body, 401, "authentication_error", "invalid_api_key");
        assert_eq!(
            crate::common::assertions::file_count(&env.speech_dir()),
            0,
            "no artifact may be produced for a rejected request"
        );
    }

    #[actix_web::test]
    async fn test_bearer_and_raw_keys_are_accepted() {
        let env = TestEnv::with_tools().protected();
        let app = test::init_service(create_app(env.state())).await;

        for header in [format!("Bearer {}", TEST_API_KEY), TEST_API_KEY.to_string()] {
            let req = test::TestRequest::get()
                .uri("/v1/models")
                .insert_header(("authorization", header))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
    }

    #[actix_web::test]
    async fn test_forwarded_paths_require_the_key() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "x" })))
            .expect(0)
            .mount(&upstream)
            .await;

        let mut env = TestEnv::new().protected();
        env.config.upstream.base_url = upstream.uri();
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::post()
            .uri("/v1/chat/completions")
            .set_json(json!({ "model": "m", "messages": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;

        assert_error(status, &body, 401, "authentication_error", "missing_api_key");
    }

    #[actix_web::test]
    async fn test_health_and_index_stay_public() {
        let env = TestEnv::new().protected();
        let app = test::init_service(create_app(env.state())).await;

        for uri in ["/", "/health"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "{} should be public", uri);
        }
    }

    #[actix_web::test]
    async fn test_auth_disabled_accepts_anything() {
        let env = TestEnv::new();
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::get()
            .uri("/v1/models")
            .insert_header(("authorization", "Bearer whatever"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
