//! 通知文の生成・翻訳ワークフロー
//!
//! リクエスト種別ごとに [`RequestStatus`] を持ちます。呼び出しはコラボレーター境界で
//! 分割され、`begin_*` が前提条件を確認して `Pending` にし、発行すべきリクエストを
//! [`NoticeCommand`] として返します。`complete_*` が結果を一度に適用します。
//! その間、保存済みの通知文と翻訳は変化しません。
//!
//! `Pending` はリセット後も対応する完了が届くまで解除されないため、
//! 同じ種別の呼び出しが同時に2つ発行されることはありません。

use crate::catalog::{Language, Persona, PurposeRegistry};
use crate::compliance::{AuditKind, AuditLog};
use crate::error::{Error, ErrorClass, Result};
use crate::llm::{LlmRequest, LlmResponse, LlmResult};
use crate::workflow::prompt::{build_notice_request, build_translation_request};
use serde::{Deserialize, Serialize};
use std::fmt;

/// コラボレーター呼び出しの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    Generate,
    Translate,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Generate => write!(f, "generate"),
            RequestKind::Translate => write!(f, "translate"),
        }
    }
}

/// リクエストに記録される失敗内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFailure {
    pub class: ErrorClass,
    pub message: String,
}

impl RequestFailure {
    pub fn new(class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }

    pub fn to_error(&self) -> Error {
        Error::from_class(self.class, self.message.clone())
    }
}

/// リクエスト種別ごとの状態
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "value")]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Resolved(String),
    Failed(RequestFailure),
}

impl RequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestStatus::Pending)
    }

    pub fn failure(&self) -> Option<&RequestFailure> {
        match self {
            RequestStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// コラボレーター認証情報の有効性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CredentialState {
    #[default]
    Valid,
    /// コラボレーターに拒否された（再設定まで無効）
    Invalid,
}

impl CredentialState {
    pub fn is_valid(&self) -> bool {
        matches!(self, CredentialState::Valid)
    }

    fn ensure_valid(&self) -> Result<()> {
        match self {
            CredentialState::Valid => Ok(()),
            CredentialState::Invalid => Err(Error::Credential(
                "Collaborator credential was rejected; reconfigure credentials first".to_string(),
            )),
        }
    }
}

/// `begin_*` と `complete_*` を対応付けるチケット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTicket {
    kind: RequestKind,
    epoch: u64,
    notice_revision: u64,
    subject_id: String,
    subject_label: String,
}

/// 副作用の記述子（発行すべきリクエスト）
#[derive(Debug, Clone)]
pub struct NoticeCommand {
    pub ticket: RequestTicket,
    pub request: LlmRequest,
}

/// 言語タグ付きの翻訳
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub language_code: String,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct NoticeWorkflow {
    notice: Option<String>,
    translation: Option<Translation>,
    generate: RequestStatus,
    translate: RequestStatus,
    epoch: u64,
    notice_revision: u64,
}

impl NoticeWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn translation(&self) -> Option<&Translation> {
        self.translation.as_ref()
    }

    pub fn status(&self, kind: RequestKind) -> &RequestStatus {
        match kind {
            RequestKind::Generate => &self.generate,
            RequestKind::Translate => &self.translate,
        }
    }

    pub fn is_pending(&self, kind: RequestKind) -> bool {
        self.status(kind).is_pending()
    }

    fn status_mut(&mut self, kind: RequestKind) -> &mut RequestStatus {
        match kind {
            RequestKind::Generate => &mut self.generate,
            RequestKind::Translate => &mut self.translate,
        }
    }

    fn ensure_not_pending(&self, kind: RequestKind) -> Result<()> {
        if self.is_pending(kind) {
            return Err(Error::Precondition(format!(
                "A {} request is already in flight",
                kind
            )));
        }
        Ok(())
    }

    fn ticket(&self, kind: RequestKind, subject_id: &str, subject_label: &str) -> RequestTicket {
        RequestTicket {
            kind,
            epoch: self.epoch,
            notice_revision: self.notice_revision,
            subject_id: subject_id.to_string(),
            subject_label: subject_label.to_string(),
        }
    }

    /// `persona` 向けの通知文生成を開始
    pub fn begin_generate(
        &mut self,
        persona: Option<&Persona>,
        fiduciary_name: &str,
        purposes: &PurposeRegistry,
        credential: CredentialState,
    ) -> Result<NoticeCommand> {
        self.ensure_not_pending(RequestKind::Generate)?;
        let persona = persona.ok_or_else(|| {
            Error::Precondition("Select a persona before generating a notice".to_string())
        })?;
        credential.ensure_valid()?;

        let ticket = self.ticket(RequestKind::Generate, &persona.id, &persona.label);
        let request = build_notice_request(fiduciary_name, persona, purposes);
        self.generate = RequestStatus::Pending;

        tracing::debug!(persona = %persona.id, epoch = self.epoch, "Notice generation started");
        Ok(NoticeCommand { ticket, request })
    }

    /// 現在の通知文の `language` への翻訳を開始
    pub fn begin_translate(
        &mut self,
        language: &Language,
        is_default_language: bool,
        credential: CredentialState,
    ) -> Result<NoticeCommand> {
        let notice = self.notice.as_deref().ok_or_else(|| {
            Error::Precondition("Generate a notice before translating it".to_string())
        })?;
        if is_default_language {
            return Err(Error::Precondition(format!(
                "{} is the source language; select another language to translate",
                language.label
            )));
        }
        self.ensure_not_pending(RequestKind::Translate)?;
        credential.ensure_valid()?;

        let request = build_translation_request(language, notice);
        let ticket = self.ticket(RequestKind::Translate, &language.code, &language.label);
        self.translate = RequestStatus::Pending;

        tracing::debug!(language = %language.code, epoch = self.epoch, "Notice translation started");
        Ok(NoticeCommand { ticket, request })
    }

    /// 生成結果を適用
    pub fn complete_generate(
        &mut self,
        ticket: &RequestTicket,
        outcome: LlmResult<LlmResponse>,
        credential: &mut CredentialState,
        audit: &mut AuditLog,
    ) -> Result<()> {
        self.check_ticket(ticket, RequestKind::Generate)?;

        let text = self.accept_outcome(ticket, outcome, credential)?;
        self.notice = Some(text.clone());
        self.translation = None;
        self.notice_revision += 1;
        self.generate = RequestStatus::Resolved(text);

        audit.append(
            AuditKind::Consent,
            format!("Notice generated for persona: {}", ticket.subject_label),
        );
        tracing::info!(persona = %ticket.subject_id, "Notice generated");
        Ok(())
    }

    /// 翻訳結果を適用
    pub fn complete_translate(
        &mut self,
        ticket: &RequestTicket,
        outcome: LlmResult<LlmResponse>,
        credential: &mut CredentialState,
        audit: &mut AuditLog,
    ) -> Result<()> {
        self.check_ticket(ticket, RequestKind::Translate)?;

        if ticket.notice_revision != self.notice_revision {
            // 翻訳中に原文が再生成された
            self.translate = RequestStatus::Idle;
            return Err(Error::Precondition(
                "Notice changed while translating; translate again".to_string(),
            ));
        }

        let text = self.accept_outcome(ticket, outcome, credential)?;
        self.translation = Some(Translation {
            language_code: ticket.subject_id.clone(),
            text: text.clone(),
        });
        self.translate = RequestStatus::Resolved(text);

        audit.append(
            AuditKind::Consent,
            format!("Notice translated to {} successfully", ticket.subject_label),
        );
        tracing::info!(language = %ticket.subject_id, "Notice translated");
        Ok(())
    }

    fn check_ticket(&mut self, ticket: &RequestTicket, kind: RequestKind) -> Result<()> {
        if ticket.kind != kind {
            return Err(Error::InvalidInput(format!(
                "Ticket for {} cannot complete {}",
                ticket.kind, kind
            )));
        }
        if !self.is_pending(kind) {
            return Err(stale_completion(kind));
        }
        if ticket.epoch != self.epoch {
            // リセット前の呼び出しが戻ったので、この種別は再び発行可能
            *self.status_mut(kind) = RequestStatus::Idle;
            tracing::debug!(%kind, ticket_epoch = ticket.epoch, epoch = self.epoch, "Discarding completion from before reset");
            return Err(stale_completion(kind));
        }
        Ok(())
    }

    /// 現在のフローの外で届いた完了を破棄し、種別を `Idle` に戻す
    pub fn discard(&mut self, ticket: &RequestTicket) -> Error {
        if ticket.epoch == self.epoch && self.is_pending(ticket.kind) {
            *self.status_mut(ticket.kind) = RequestStatus::Idle;
        }
        tracing::debug!(kind = %ticket.kind, "Discarding completion outside the notice step");
        stale_completion(ticket.kind)
    }

    /// コラボレーターの結果を受理テキストまたは失敗記録に変換
    fn accept_outcome(
        &mut self,
        ticket: &RequestTicket,
        outcome: LlmResult<LlmResponse>,
        credential: &mut CredentialState,
    ) -> Result<String> {
        let failure = match outcome {
            Ok(response) if response.content.trim().is_empty() => RequestFailure::new(
                ErrorClass::Validation,
                format!("Empty {} result received", ticket.kind),
            ),
            Ok(response) => return Ok(response.content),
            Err(err) => {
                if err.invalidates_credential() {
                    *credential = CredentialState::Invalid;
                    tracing::warn!("Collaborator rejected the credential; further calls disabled");
                }
                RequestFailure::new(err.class(), err.to_string())
            }
        };

        tracing::warn!(kind = %ticket.kind, class = %failure.class, error = %failure.message, "Collaborator call failed");
        let error = failure.to_error();
        *self.status_mut(ticket.kind) = RequestStatus::Failed(failure);
        Err(error)
    }

    /// 保存済みの翻訳を破棄（表示は原文に戻る）
    pub fn clear_translation(&mut self) -> bool {
        self.translation.take().is_some()
    }

    /// 通知文・翻訳・状態を消去
    ///
    /// 発行済みのチケットは無効になります。`Pending` の種別は対応する完了が届くまで
    /// `Pending` のままです。
    pub fn reset(&mut self) {
        self.notice = None;
        self.translation = None;
        for kind in [RequestKind::Generate, RequestKind::Translate] {
            if !self.is_pending(kind) {
                *self.status_mut(kind) = RequestStatus::Idle;
            }
        }
        self.epoch += 1;
    }
}

fn stale_completion(kind: RequestKind) -> Error {
    Error::Precondition(format!("Stale {} completion discarded", kind))
}
