//! 統合テスト共通のテキスト生成フェイク

#![allow(dead_code)]

use async_trait::async_trait;
use dpdp_consent::llm::{LlmError, LlmRequest, LlmResponse, LlmResult, TextGenerator};
use dpdp_consent::{Catalog, ConsentSession};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const FIDUCIARY: &str = "DataSeva Platform Pvt. Ltd.";

pub fn new_session() -> ConsentSession {
    ConsentSession::new(Arc::new(Catalog::dpdp_default()), FIDUCIARY)
}

/// 事前に用意した結果を順に返すフェイク
#[derive(Default)]
pub struct ScriptedGenerator {
    outcomes: Mutex<VecDeque<LlmResult<LlmResponse>>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(texts: &[&str]) -> Self {
        let generator = Self::new();
        for text in texts {
            generator.push_ok(text);
        }
        generator
    }

    pub fn push_ok(&self, text: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(LlmResponse::text(text, "fake-model")));
    }

    pub fn push_err(&self, err: LlmError) {
        self.outcomes.lock().unwrap().push_back(Err(err));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::ServerError("no scripted outcome".to_string())))
    }

    fn name(&self) -> String {
        "Scripted".to_string()
    }
}

/// `release` が呼ばれるまで応答を保留するフェイク
pub struct GatedGenerator {
    started: Notify,
    gate: Notify,
    calls: AtomicUsize,
    text: String,
}

impl GatedGenerator {
    pub fn new(text: &str) -> Self {
        Self {
            started: Notify::new(),
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
            text: text.to_string(),
        }
    }

    /// 呼び出しが始まるまで待機
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for GatedGenerator {
    async fn generate(&self, _request: &LlmRequest) -> LlmResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.gate.notified().await;
        Ok(LlmResponse::text(self.text.clone(), "fake-model"))
    }

    fn name(&self) -> String {
        "Gated".to_string()
    }
}
