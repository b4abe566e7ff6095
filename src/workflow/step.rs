//! ウィザードのステップ状態機械
//!
//! 遷移は純粋関数です。[`Step::next`] は遷移先を返し、現在のステップで
//! 許可されないイベントには `None` を返します。不正なイベントはエラーではなく無視されます。

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    PersonaAndNotice,
    Consent,
    Receipt,
}

impl Step {
    /// ステップ表示用の番号（1始まり）
    pub fn number(&self) -> u8 {
        match self {
            Step::PersonaAndNotice => 1,
            Step::Consent => 2,
            Step::Receipt => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Step::PersonaAndNotice => "Persona & Notice",
            Step::Consent => "Consent",
            Step::Receipt => "Receipt",
        }
    }

    pub fn next(self, event: StepEvent, guard: StepGuard) -> Option<Step> {
        match (self, event) {
            (Step::PersonaAndNotice, StepEvent::Proceed) if guard.ready() => Some(Step::Consent),
            (Step::Consent, StepEvent::Back) => Some(Step::PersonaAndNotice),
            (Step::Consent, StepEvent::Submit) if guard.ready() => Some(Step::Receipt),
            (Step::Receipt, StepEvent::Reset) => Some(Step::PersonaAndNotice),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepEvent {
    Proceed,
    Back,
    Submit,
    Reset,
}

/// 遷移判定に使うセッションの状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepGuard {
    pub persona_selected: bool,
    pub notice_present: bool,
    /// 生成または翻訳がコラボレーター呼び出し中
    pub request_pending: bool,
}

impl StepGuard {
    fn ready(&self) -> bool {
        self.persona_selected && self.notice_present && !self.request_pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMachine {
    current: Step,
}

impl StepMachine {
    pub fn new() -> Self {
        Self {
            current: Step::PersonaAndNotice,
        }
    }

    pub fn current(&self) -> Step {
        self.current
    }

    /// `event` を適用し、ステップが変わったかを返す
    pub fn apply(&mut self, event: StepEvent, guard: StepGuard) -> bool {
        match self.current.next(event, guard) {
            Some(step) => {
                tracing::debug!(from = %self.current, to = %step, ?event, "Step transition");
                self.current = step;
                true
            }
            None => {
                tracing::debug!(step = %self.current, ?event, "Ignored illegal step transition");
                false
            }
        }
    }
}

impl Default for StepMachine {
    fn default() -> Self {
        Self::new()
    }
}
