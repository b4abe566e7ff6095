use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::llm::TextGenerator;
use crate::session::types::SessionId;
use crate::workflow::ConsentSession;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// 共有されるセッションハンドル
pub type SessionHandle = Arc<Mutex<ConsentSession>>;

/// セッションマネージャー
///
/// 各セッションは個別の `Mutex` の内側にあり、セッション間で可変状態は共有しません。
/// コラボレーター呼び出しの間はロックを解放し、結果の適用時に再取得します。
#[derive(Debug)]
pub struct SessionManager {
    catalog: Arc<Catalog>,
    fiduciary_name: String,
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl SessionManager {
    pub fn new(catalog: Arc<Catalog>, fiduciary_name: impl Into<String>) -> Self {
        Self {
            catalog,
            fiduciary_name: fiduciary_name.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub async fn create_session(&self) -> SessionId {
        let id = SessionId::new();
        let session = ConsentSession::new(Arc::clone(&self.catalog), self.fiduciary_name.clone());

        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(session)));

        tracing::info!(session_id = %id, "Consent session created");
        id
    }

    pub async fn session(&self, id: &SessionId) -> Result<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }

    pub async fn remove_session(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Consent session removed");
        }
        removed
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// セッションの通知文を生成
    pub async fn generate_notice(
        &self,
        id: &SessionId,
        generator: &dyn TextGenerator,
    ) -> Result<()> {
        let handle = self.session(id).await?;
        let command = handle.lock().await.begin_generate()?;

        let outcome = generator.generate(&command.request).await;

        let result = handle
            .lock()
            .await
            .complete_generate(&command.ticket, outcome);
        result
    }

    /// セッションの通知文をアクティブ言語へ翻訳
    pub async fn translate_notice(
        &self,
        id: &SessionId,
        generator: &dyn TextGenerator,
    ) -> Result<()> {
        let handle = self.session(id).await?;
        let command = handle.lock().await.begin_translate()?;

        let outcome = generator.generate(&command.request).await;

        let result = handle
            .lock()
            .await
            .complete_translate(&command.ticket, outcome);
        result
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Arc::new(Catalog::dpdp_default()), crate::config::DEFAULT_FIDUCIARY)
    }
}
