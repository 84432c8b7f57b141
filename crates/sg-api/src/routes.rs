//! Route definitions
//!
//! Defines all HTTP API endpoints.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::handlers::{agent_card, health, jsonrpc};
use crate::middleware::auth::{BearerAuth, bearer_auth};
use crate::server::AppState;

/// Create the API router
///
/// Only `/jsonrpc` sits behind the bearer check.
pub fn routes(auth: BearerAuth) -> Router<AppState> {
    let protected = Router::new()
        .route("/jsonrpc", post(jsonrpc))
        .route_layer(middleware::from_fn_with_state(auth, bearer_auth));

    Router::new()
        // Health check
        .route("/health", get(health))
        // Agent card
        .route("/.well-known/agent.json", get(agent_card))
        .merge(protected)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value as JsonValue, json};
    use tower::ServiceExt;

    use sg_core::{
        ApiConfig, ClassifiedError, Error, Result, SchemaBuilder, SessionContexts, Tool,
        ToolContext, ToolManager, ToolResult,
    };

    use crate::server::{AppState, build_router};

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the text back"
        }

        fn input_schema(&self) -> JsonValue {
            SchemaBuilder::object_schema_with_descriptions(vec![(
                "text",
                "string",
                "Text to echo",
                true,
            )])
        }

        async fn execute(&self, input: JsonValue, ctx: &ToolContext) -> Result<ToolResult> {
            let text = input["text"]
                .as_str()
                .ok_or_else(|| Error::InvalidInput("text is required".into()))?;
            ctx.log.lock().await.record_chart(text.len() as i64, None);
            Ok(ToolResult::success(text))
        }
    }

    struct LockedOutTool;

    #[async_trait]
    impl Tool for LockedOutTool {
        fn name(&self) -> &str {
            "locked_out"
        }

        fn description(&self) -> &str {
            "Always fails authentication"
        }

        fn input_schema(&self) -> JsonValue {
            SchemaBuilder::object_schema_with_descriptions(vec![])
        }

        async fn execute(&self, _input: JsonValue, _ctx: &ToolContext) -> Result<ToolResult> {
            Err(ClassifiedError::authentication(
                "Authentication failed while searching Statista: 401",
            )
            .into())
        }
    }

    fn app(token: Option<&str>) -> axum::Router {
        app_with_contexts(token, Arc::new(SessionContexts::new()))
    }

    fn app_with_contexts(token: Option<&str>, contexts: Arc<SessionContexts>) -> axum::Router {
        let mut tools = ToolManager::new();
        tools.register(Arc::new(EchoTool));
        tools.register(Arc::new(LockedOutTool));

        let config = ApiConfig {
            bearer_token: token.map(String::from),
            public_url: Some("https://agent.example.com".into()),
            ..Default::default()
        };
        build_router(AppState::new(tools, contexts, &config), &config)
    }

    fn rpc(body: JsonValue, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/jsonrpc")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> JsonValue {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(None)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_agent_card_is_public() {
        let response = app(Some("secret"))
            .oneshot(Request::get("/.well-known/agent.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let card = body_json(response).await;
        assert_eq!(card["name"], "statista_agent");
        assert_eq!(card["url"], "https://agent.example.com");
        assert_eq!(card["securitySchemes"]["bearer"]["scheme"], "bearer");
        assert_eq!(card["security"], json!([{ "bearer": [] }]));
        assert_eq!(card["skills"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let response = app(Some("secret"))
            .oneshot(rpc(json!({"jsonrpc": "2.0", "method": "tools/list", "id": 1}), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
        let body = body_json(response).await;
        assert_eq!(body["error"], "unauthorized");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_wrong_token_is_rejected() {
        let response = app(Some("secret"))
            .oneshot(rpc(json!({"jsonrpc": "2.0", "method": "tools/list", "id": 1}), Some("wrong")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = app(Some("secret"))
            .oneshot(rpc(
                json!({"jsonrpc": "2.0", "method": "tools/list", "id": 7}),
                Some("secret"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["id"], 7);
        assert_eq!(body["result"]["tools"][0]["name"], "echo");
        assert_eq!(body["result"]["tools"][0]["inputSchema"]["required"], json!(["text"]));
    }

    #[tokio::test]
    async fn test_tools_call_and_context() {
        let app = app(None);
        let call = json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {"name": "echo", "arguments": {"text": "hello"}, "session_id": "s1"},
            "id": 1
        });
        let body = body_json(app.clone().oneshot(rpc(call, None)).await.unwrap()).await;
        assert_eq!(body["result"]["content"][0]["text"], "hello");
        assert_eq!(body["result"]["session_id"], "s1");
        assert_eq!(body["result"]["isEmpty"], false);

        let get = json!({
            "jsonrpc": "2.0",
            "method": "context/get",
            "params": {"session_id": "s1"},
            "id": 2
        });
        let body = body_json(app.oneshot(rpc(get, None)).await.unwrap()).await;
        assert_eq!(body["result"]["statista_charts"][0]["statistic_id"], 5);
    }

    #[tokio::test]
    async fn test_generated_session_id() {
        let call = json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {"name": "echo", "arguments": {"text": "x"}},
            "id": 1
        });
        let body = body_json(app(None).oneshot(rpc(call, None)).await.unwrap()).await;
        assert!(!body["result"]["session_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_calls_create_no_sessions() {
        let contexts = Arc::new(SessionContexts::new());
        let app = app_with_contexts(None, Arc::clone(&contexts));

        for id in 0..50 {
            let bad_input = json!({
                "jsonrpc": "2.0",
                "method": "tools/call",
                "params": {"name": "echo"},
                "id": id
            });
            let body = body_json(app.clone().oneshot(rpc(bad_input, None)).await.unwrap()).await;
            assert_eq!(body["error"]["code"], -32602);

            let failing = json!({
                "jsonrpc": "2.0",
                "method": "tools/call",
                "params": {"name": "locked_out"},
                "id": id
            });
            let body = body_json(app.clone().oneshot(rpc(failing, None)).await.unwrap()).await;
            assert_eq!(body["error"]["code"], -32401);
        }
        assert_eq!(contexts.len().await, 0);

        let ok = json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {"name": "echo", "arguments": {"text": "hi"}},
            "id": 99
        });
        let body = body_json(app.oneshot(rpc(ok, None)).await.unwrap()).await;
        let session_id = body["result"]["session_id"].as_str().unwrap().to_string();
        assert_eq!(contexts.len().await, 1);
        assert_eq!(contexts.snapshot(&session_id).await.unwrap().charts()[0].statistic_id, 2);
    }

    #[tokio::test]
    async fn test_domain_failure_becomes_envelope() {
        let call = json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {"name": "locked_out"},
            "id": "abc"
        });
        let body = body_json(app(None).oneshot(rpc(call, None)).await.unwrap()).await;

        assert_eq!(body["id"], "abc");
        assert_eq!(body["error"]["code"], -32401);
        assert_eq!(body["error"]["message"], "Authentication failed");
        assert_eq!(body["error"]["data"]["auth_scheme"], "API-Key");
        assert!(body["error"]["data"]["hint"].is_string());
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let app = app(None);

        let unknown_method = json!({"jsonrpc": "2.0", "method": "agent.executeTask", "id": 1});
        let body = body_json(app.clone().oneshot(rpc(unknown_method, None)).await.unwrap()).await;
        assert_eq!(body["error"]["code"], -32601);

        let unknown_tool = json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {"name": "nope"},
            "id": 2
        });
        let body = body_json(app.clone().oneshot(rpc(unknown_tool, None)).await.unwrap()).await;
        assert_eq!(body["error"]["code"], -32602);

        let bad_args = json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {"name": "echo"},
            "id": 3
        });
        let body = body_json(app.clone().oneshot(rpc(bad_args, None)).await.unwrap()).await;
        assert_eq!(body["error"]["code"], -32602);

        let no_method = json!({"jsonrpc": "2.0", "id": 4});
        let body = body_json(app.clone().oneshot(rpc(no_method, None)).await.unwrap()).await;
        assert_eq!(body["error"]["code"], -32600);
        assert_eq!(body["id"], 4);

        let wrong_version = json!({"jsonrpc": "1.0", "method": "tools/list", "id": 5});
        let body = body_json(app.clone().oneshot(rpc(wrong_version, None)).await.unwrap()).await;
        assert_eq!(body["error"]["code"], -32600);

        let request = Request::builder()
            .method("POST")
            .uri("/jsonrpc")
            .body(Body::from("{not json"))
            .unwrap();
        let body = body_json(app.oneshot(request).await.unwrap()).await;
        assert_eq!(body["error"]["code"], -32700);
        assert!(body["id"].is_null());
    }
}
