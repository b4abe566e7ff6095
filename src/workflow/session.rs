//! 同意セッション
//!
//! 1人のデータ主体による1回のウィザード操作を表します。ペルソナ・言語・通知文、
//! 同意状態、監査ログ、レシート、ステップ、認証情報フラグをすべてこの値が所有し、
//! 他のセッションとは何も共有しません（カタログのみ `Arc` で読み取り共有）。

use crate::catalog::{Catalog, Language, Persona};
use crate::compliance::checklist::{self, ChecklistInput, ChecklistItem};
use crate::compliance::{
    AuditEntry, AuditKind, AuditLog, ConsentRecord, ConsentState, Receipt, ReceiptIssuer,
    ReceiptRequest,
};
use crate::error::{Error, Result};
use crate::llm::{LlmResponse, LlmResult, TextGenerator};
use crate::workflow::notice::{
    CredentialState, NoticeCommand, NoticeWorkflow, RequestKind, RequestStatus, RequestTicket,
    Translation,
};
use crate::workflow::step::{Step, StepEvent, StepGuard, StepMachine};
use serde::Serialize;
use std::sync::Arc;

/// セッション全体のシリアライズ可能なビュー
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub step: Step,
    pub persona_id: Option<String>,
    pub language_code: String,
    pub notice: Option<String>,
    pub translation: Option<Translation>,
    pub generate_status: RequestStatus,
    pub translate_status: RequestStatus,
    pub credential: CredentialState,
    pub consents: ConsentRecord,
    pub receipt: Option<Receipt>,
    pub checklist: Vec<ChecklistItem>,
    pub audit_log: Vec<AuditEntry>,
}

/// 同意セッション
#[derive(Debug, Clone)]
pub struct ConsentSession {
    catalog: Arc<Catalog>,
    persona_id: Option<String>,
    language_code: String,
    notice: NoticeWorkflow,
    consent: ConsentState,
    audit: AuditLog,
    issuer: ReceiptIssuer,
    receipt: Option<Receipt>,
    steps: StepMachine,
    credential: CredentialState,
}

impl ConsentSession {
    /// 新しいセッションを作成
    pub fn new(catalog: Arc<Catalog>, fiduciary_name: impl Into<String>) -> Self {
        let language_code = catalog.languages().default_code().to_string();
        Self {
            consent: ConsentState::new(Arc::clone(&catalog)),
            catalog,
            persona_id: None,
            language_code,
            notice: NoticeWorkflow::new(),
            audit: AuditLog::new(),
            issuer: ReceiptIssuer::new(fiduciary_name),
            receipt: None,
            steps: StepMachine::new(),
            credential: CredentialState::Valid,
        }
    }

    /// 認証情報フラグを指定して作成
    pub fn with_credential(mut self, credential: CredentialState) -> Self {
        self.credential = credential;
        self
    }

    // ---- アクセサー ----

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn step(&self) -> Step {
        self.steps.current()
    }

    pub fn persona(&self) -> Option<&Persona> {
        self.persona_id
            .as_deref()
            .and_then(|id| self.catalog.personas().get(id))
    }

    pub fn language(&self) -> Option<&Language> {
        self.catalog.languages().get(&self.language_code)
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.notice()
    }

    /// アクティブ言語の翻訳（タグが一致する場合のみ）
    pub fn translation(&self) -> Option<&Translation> {
        self.notice
            .translation()
            .filter(|t| t.language_code == self.language_code)
    }

    pub fn status(&self, kind: RequestKind) -> &RequestStatus {
        self.notice.status(kind)
    }

    pub fn consent(&self) -> &ConsentState {
        &self.consent
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        self.receipt.as_ref()
    }

    pub fn credential(&self) -> CredentialState {
        self.credential
    }

    pub fn fiduciary_name(&self) -> &str {
        self.issuer.fiduciary_name()
    }

    pub fn is_submitted(&self) -> bool {
        self.receipt.is_some()
    }

    pub fn is_revoked(&self) -> bool {
        self.receipt.as_ref().is_some_and(Receipt::is_revoked)
    }

    fn guard(&self) -> StepGuard {
        StepGuard {
            persona_selected: self.persona_id.is_some(),
            notice_present: self.notice.notice().is_some(),
            request_pending: self.notice.is_pending(RequestKind::Generate)
                || self.notice.is_pending(RequestKind::Translate),
        }
    }

    fn require_step(&self, step: Step, action: &str) -> Result<()> {
        if self.step() != step {
            return Err(Error::Precondition(format!(
                "Cannot {} during step {}",
                action,
                self.step()
            )));
        }
        Ok(())
    }

    // ---- ステップ1: ペルソナと通知 ----

    /// ペルソナを選択
    ///
    /// 別のペルソナに切り替えると、そのペルソナ向けでない通知文と翻訳は破棄されます。
    pub fn select_persona(&mut self, persona_id: &str) -> Result<()> {
        self.require_step(Step::PersonaAndNotice, "select a persona")?;
        if self.catalog.personas().get(persona_id).is_none() {
            return Err(Error::InvalidInput(format!("Unknown persona: {}", persona_id)));
        }
        if self.notice.is_pending(RequestKind::Generate) {
            return Err(Error::Precondition(
                "Cannot change persona while a notice is being generated".to_string(),
            ));
        }

        if self.persona_id.as_deref() != Some(persona_id) {
            if self.persona_id.is_some() && self.notice.notice().is_some() {
                self.notice.reset();
            }
            tracing::debug!(persona = %persona_id, "Persona selected");
            self.persona_id = Some(persona_id.to_string());
        }
        Ok(())
    }

    /// 表示言語を選択
    ///
    /// 言語が変わると保存済みの翻訳は破棄され、表示は原文に戻ります。
    pub fn select_language(&mut self, code: &str) -> Result<()> {
        if self.catalog.languages().get(code).is_none() {
            return Err(Error::InvalidInput(format!("Unknown language: {}", code)));
        }
        if self.language_code != code {
            if self.notice.clear_translation() {
                tracing::debug!(from = %self.language_code, to = %code, "Translation dropped on language change");
            }
            self.language_code = code.to_string();
        }
        Ok(())
    }

    /// 原文表示に戻す
    pub fn show_source_notice(&mut self) -> bool {
        self.notice.clear_translation()
    }

    /// 通知文生成を開始
    pub fn begin_generate(&mut self) -> Result<NoticeCommand> {
        self.require_step(Step::PersonaAndNotice, "generate a notice")?;
        let persona = self
            .persona_id
            .as_deref()
            .and_then(|id| self.catalog.personas().get(id));
        self.notice.begin_generate(
            persona,
            self.issuer.fiduciary_name(),
            self.catalog.purposes(),
            self.credential,
        )
    }

    /// 通知文生成の結果を適用
    ///
    /// ステップ1以外で届いた結果は破棄されます。
    pub fn complete_generate(
        &mut self,
        ticket: &RequestTicket,
        outcome: LlmResult<LlmResponse>,
    ) -> Result<()> {
        if self.step() != Step::PersonaAndNotice {
            return Err(self.notice.discard(ticket));
        }
        self.notice
            .complete_generate(ticket, outcome, &mut self.credential, &mut self.audit)
    }

    /// 翻訳を開始（アクティブ言語へ）
    pub fn begin_translate(&mut self) -> Result<NoticeCommand> {
        self.require_step(Step::PersonaAndNotice, "translate the notice")?;
        let languages = self.catalog.languages();
        let language = languages.get(&self.language_code).ok_or_else(|| {
            Error::InvalidInput(format!("Unknown language: {}", self.language_code))
        })?;
        self.notice.begin_translate(
            language,
            languages.is_default(&self.language_code),
            self.credential,
        )
    }

    /// 翻訳の結果を適用
    pub fn complete_translate(
        &mut self,
        ticket: &RequestTicket,
        outcome: LlmResult<LlmResponse>,
    ) -> Result<()> {
        if self.step() != Step::PersonaAndNotice {
            return Err(self.notice.discard(ticket));
        }
        self.notice
            .complete_translate(ticket, outcome, &mut self.credential, &mut self.audit)
    }

    /// 通知文を生成（開始・呼び出し・適用を一括実行）
    pub async fn generate_notice(&mut self, generator: &dyn TextGenerator) -> Result<()> {
        let command = self.begin_generate()?;
        let outcome = generator.generate(&command.request).await;
        self.complete_generate(&command.ticket, outcome)
    }

    /// 通知文を翻訳（開始・呼び出し・適用を一括実行）
    pub async fn translate_notice(&mut self, generator: &dyn TextGenerator) -> Result<()> {
        let command = self.begin_translate()?;
        let outcome = generator.generate(&command.request).await;
        self.complete_translate(&command.ticket, outcome)
    }

    /// 表示中の通知文（翻訳があれば翻訳、なければ原文）
    pub fn displayed_notice(&self) -> Option<&str> {
        self.translation()
            .map(|t| t.text.as_str())
            .or_else(|| self.notice.notice())
    }

    // ---- ステップ遷移 ----

    /// 同意ステップへ進む
    ///
    /// ペルソナ未選択、通知文なし、またはコラボレーター呼び出し中の場合は何もしません。
    pub fn proceed_to_consent(&mut self) -> bool {
        let guard = self.guard();
        self.steps.apply(StepEvent::Proceed, guard)
    }

    /// 通知ステップへ戻る
    pub fn back_to_notice(&mut self) -> bool {
        let guard = self.guard();
        self.steps.apply(StepEvent::Back, guard)
    }

    // ---- ステップ2: 同意 ----

    /// 任意目的の同意を切り替え
    ///
    /// 必須目的・未知の目的・同意ステップ外・撤回後はいずれも何もせず `None` を返します。
    pub fn toggle_consent(&mut self, purpose_id: &str) -> Option<bool> {
        if self.step() != Step::Consent || self.is_revoked() {
            tracing::debug!(purpose = %purpose_id, step = %self.step(), "Toggle ignored");
            return None;
        }

        let granted = self.consent.toggle(purpose_id)?;
        let label = self
            .catalog
            .purposes()
            .get(purpose_id)
            .map(|p| p.label.as_str())
            .unwrap_or(purpose_id);
        let verb = if granted { "granted" } else { "declined" };
        self.audit
            .append(AuditKind::Consent, format!("Consent {} for purpose: {}", verb, label));
        tracing::debug!(purpose = %purpose_id, granted, "Consent toggled");
        Some(granted)
    }

    /// 同意を送信してレシートを発行
    pub fn submit_consent(&mut self) -> Result<&Receipt> {
        let guard = self.guard();
        if self.step() != Step::Consent || self.step().next(StepEvent::Submit, guard).is_none() {
            return Err(Error::Precondition(
                "Consent can only be submitted from the consent step after a notice is shown"
                    .to_string(),
            ));
        }
        let persona_id = self
            .persona_id
            .clone()
            .ok_or_else(|| Error::Precondition("No persona selected".to_string()))?;

        let translated = self.translation().is_some();
        let notice_text = self.displayed_notice().unwrap_or_default().to_string();
        let receipt = self.issuer.issue(
            ReceiptRequest {
                persona_id: &persona_id,
                language_code: &self.language_code,
                notice_text: &notice_text,
                translated,
            },
            &self.consent,
        );

        let granted = self
            .consent
            .granted_purposes()
            .iter()
            .map(|p| p.label.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        self.audit.append(
            AuditKind::Consent,
            format!("Consent submitted (ID: {}) - Granted: {}", receipt.id(), granted),
        );
        self.steps.apply(StepEvent::Submit, guard);

        tracing::info!(receipt_id = %receipt.id(), persona = %persona_id, "Consent submitted");
        Ok(&*self.receipt.insert(receipt))
    }

    // ---- ステップ3: レシート ----

    /// 任意目的の同意を撤回
    ///
    /// 2回目以降の呼び出しは何もせず `Ok(false)` を返します。
    pub fn revoke_consent(&mut self) -> Result<bool> {
        let receipt = self
            .receipt
            .as_mut()
            .ok_or_else(|| Error::Precondition("No receipt to revoke".to_string()))?;
        if !receipt.mark_revoked() {
            tracing::debug!(receipt_id = %receipt.id(), "Consent already revoked");
            return Ok(false);
        }

        let changed = self.consent.revoke_optional();
        let message = format!(
            "Consent revoked for non-essential purposes (Receipt: {})",
            receipt.id()
        );
        tracing::info!(receipt_id = %receipt.id(), changed, "Consent revoked");
        self.audit.append(AuditKind::Revoke, message);
        Ok(true)
    }

    /// 新しい同意フローを開始
    ///
    /// ペルソナ・通知文・翻訳・同意状態・レシートを消去します。監査ログと言語は残ります。
    pub fn reset(&mut self) {
        let guard = self.guard();
        match self.step() {
            Step::Receipt => {
                self.steps.apply(StepEvent::Reset, guard);
            }
            Step::Consent => {
                self.steps.apply(StepEvent::Back, guard);
            }
            Step::PersonaAndNotice => {}
        }

        self.persona_id = None;
        self.notice.reset();
        self.consent.reset();
        self.receipt = None;
        tracing::info!(audit_entries = self.audit.len(), "Consent flow reset");
    }

    /// 認証情報の再設定後にフラグを有効へ戻す
    pub fn reconfigure_credentials(&mut self) {
        if !self.credential.is_valid() {
            tracing::info!("Collaborator credential reconfigured");
        }
        self.credential = CredentialState::Valid;
    }

    // ---- 派生ビュー ----

    /// DPDP §5/§6 チェックリスト（毎回現在の状態から計算）
    pub fn checklist(&self) -> Vec<ChecklistItem> {
        let translation_needed = !self.catalog.languages().is_default(&self.language_code);
        checklist::evaluate(&ChecklistInput {
            notice_present: self.notice.notice().is_some(),
            translation_needed,
            translation_present: self.translation().is_some(),
            step: self.step(),
            granted_count: self.consent.granted_count(),
            required_count: self.catalog.purposes().required().count(),
            submitted: self.is_submitted(),
            revoked: self.is_revoked(),
        })
    }

    /// エクスポート用のスナップショット
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            step: self.step(),
            persona_id: self.persona_id.clone(),
            language_code: self.language_code.clone(),
            notice: self.notice.notice().map(str::to_string),
            translation: self.translation().cloned(),
            generate_status: self.notice.status(RequestKind::Generate).clone(),
            translate_status: self.notice.status(RequestKind::Translate).clone(),
            credential: self.credential,
            consents: self.consent.snapshot(),
            receipt: self.receipt.clone(),
            checklist: self.checklist(),
            audit_log: self.audit.entries().to_vec(),
        }
    }
}
