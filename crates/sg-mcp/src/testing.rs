//! Test doubles for the invoker seam

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use sg_core::{StatistaConfig, ToolDescriptor};

use crate::invoker::{InvokerFactory, RemoteToolInvoker};

/// Replays queued replies and records calls
#[derive(Default)]
pub struct MockInvoker {
    replies: Mutex<VecDeque<anyhow::Result<Vec<String>>>>,
    calls: Mutex<Vec<(String, JsonValue)>>,
    tools: Vec<ToolDescriptor>,
}

impl MockInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, fragments: &[&str]) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(fragments.iter().map(|f| f.to_string()).collect()));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies.lock().unwrap().push_back(Err(anyhow::anyhow!(message.to_string())));
        self
    }

    pub fn with_tools(mut self, tools: &[(&str, &str)]) -> Self {
        self.tools = tools
            .iter()
            .map(|(name, description)| ToolDescriptor {
                name: name.to_string(),
                description: description.to_string(),
            })
            .collect();
        self
    }

    pub fn calls(&self) -> Vec<(String, JsonValue)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteToolInvoker for MockInvoker {
    async fn invoke(&self, tool_name: &str, args: JsonValue) -> anyhow::Result<Vec<String>> {
        self.calls.lock().unwrap().push((tool_name.to_string(), args));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("no reply queued")))
    }

    async fn list_tools(&self) -> anyhow::Result<Vec<ToolDescriptor>> {
        Ok(self.tools.clone())
    }
}

/// Hands out one shared [`MockInvoker`] and counts constructions
pub struct MockFactory {
    invoker: Option<Arc<MockInvoker>>,
    failure: Option<String>,
    delay: Duration,
    created: AtomicUsize,
}

impl MockFactory {
    pub fn new(invoker: MockInvoker) -> Self {
        Self::from_shared(Arc::new(invoker))
    }

    pub fn from_shared(invoker: Arc<MockInvoker>) -> Self {
        Self {
            invoker: Some(invoker),
            failure: None,
            delay: Duration::ZERO,
            created: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            invoker: None,
            failure: Some(message.to_string()),
            delay: Duration::ZERO,
            created: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InvokerFactory for MockFactory {
    async fn create(
        &self,
        _config: &StatistaConfig,
        _api_key: &str,
    ) -> anyhow::Result<Arc<dyn RemoteToolInvoker>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(message) = &self.failure {
            anyhow::bail!("{}", message);
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        let invoker = self.invoker.clone().ok_or_else(|| anyhow::anyhow!("no invoker"))?;
        // A fresh Arc per construction so resets are observable
        Ok(Arc::new(SharedMock(invoker)))
    }
}

/// Delegates to a shared mock so each construction yields a distinct handle
struct SharedMock(Arc<MockInvoker>);

#[async_trait]
impl RemoteToolInvoker for SharedMock {
    async fn invoke(&self, tool_name: &str, args: JsonValue) -> anyhow::Result<Vec<String>> {
        self.0.invoke(tool_name, args).await
    }

    async fn list_tools(&self) -> anyhow::Result<Vec<ToolDescriptor>> {
        self.0.list_tools().await
    }
}
