//! Forwarding of unhandled `/v1` traffic to the upstream completion service

#[cfg(test)]
mod tests {
    use crate::common::{TestEnv, assert_error};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use mini_ai_gateway::server::server::create_app;
    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn env_for(upstream: &MockServer) -> TestEnv {
        let mut env = TestEnv::new();
        env.config.upstream.base_url = upstream.uri();
        env
    }

    #[actix_web::test]
    async fn test_chat_completion_is_relayed_verbatim() {
        let upstream = MockServer::start().await;
        let payload = json!({ "model": "qwen", "messages": [{ "role": "user", "content": "hi" }] });
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_json(&payload))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-upstream", "lmstudio")
                    .set_body_json(json!({ "id": "chatcmpl-1", "choices": [] })),
            )
            .expect(1)
            .mount(&upstream)
            .await;

        let env = env_for(&upstream);
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::post()
            .uri("/v1/chat/completions")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("x-upstream").unwrap(), "lmstudio");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], "chatcmpl-1");
    }

    #[actix_web::test]
    async fn test_configured_key_replaces_caller_key() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/embeddings/status"))
            .and(query_param("verbose", "1"))
            .and(header("authorization", "Bearer upstream-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&upstream)
            .await;

        let mut env = env_for(&upstream).protected();
        env.config.upstream.api_key = Some("upstream-key".to_string());
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::get()
            .uri("/v1/embeddings/status?verbose=1")
            .insert_header((
                "authorization",
                format!("Bearer {}", crate::common::fixtures::TEST_API_KEY),
            ))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "ok");
    }

    #[actix_web::test]
    async fn test_upstream_errors_pass_through() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({ "error": "bad prompt" })),
            )
            .mount(&upstream)
            .await;

        let env = env_for(&upstream);
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::post()
            .uri("/v1/completions")
            .set_json(json!({ "prompt": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "bad prompt");
    }

    #[actix_web::test]
    async fn test_other_methods_on_capability_paths_are_forwarded() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/audio/speech"))
            .respond_with(ResponseTemplate::new(405))
            .expect(1)
            .mount(&upstream)
            .await;

        let env = env_for(&upstream);
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::get().uri("/v1/audio/speech").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[actix_web::test]
    async fn test_unreachable_upstream_is_proxy_error() {
        // Bind then release a port so nothing is listening on it
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut env = TestEnv::new();
        env.config.upstream.base_url = format!("http://127.0.0.1:{}", port);
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::post()
            .uri("/v1/chat/completions")
            .set_json(json!({ "model": "m" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;

        assert_error(status, &body, 500, "proxy_error", "upstream_unavailable");
    }

    #[actix_web::test]
    async fn test_oversized_forward_body_is_rejected() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&upstream)
            .await;

        let mut env = env_for(&upstream);
        env.config.server.max_body_size = 32;
        let app = test::init_service(create_app(env.state())).await;

        let req = test::TestRequest::post()
            .uri("/v1/chat/completions")
            .insert_header(("content-type", "application/json"))
            .set_payload(vec![b'a'; 128])
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;

        assert_error(status, &body, 400, "invalid_request_error", "payload_too_large");
    }
}
