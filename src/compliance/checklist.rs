//! Compliance Checklist
//!
//! 現在のセッション状態から毎回再計算される派生ビュー（キャッシュしない・状態を変更しない）

use crate::workflow::Step;
use serde::{Deserialize, Serialize};

/// チェックリストの入力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistInput {
    /// 通知文が存在するか
    pub notice_present: bool,
    /// デフォルト以外の言語が選択されているか
    pub translation_needed: bool,
    /// 翻訳済み通知が存在するか
    pub translation_present: bool,
    /// 現在のステップ
    pub step: Step,
    /// 同意済み目的数
    pub granted_count: usize,
    /// 必須目的数
    pub required_count: usize,
    /// 同意送信済みか
    pub submitted: bool,
    /// 撤回済みか
    pub revoked: bool,
}

/// チェック項目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistItem {
    pub label: String,
    pub ok: bool,
}

impl ChecklistItem {
    fn new(ok: bool, label: &str) -> Self {
        Self {
            label: label.to_string(),
            ok,
        }
    }
}

/// DPDP §5/§6 の充足状況を評価
pub fn evaluate(input: &ChecklistInput) -> Vec<ChecklistItem> {
    let mut items = vec![
        ChecklistItem::new(true, "§5(1) - Notice before/at time of data collection"),
        ChecklistItem::new(
            input.notice_present,
            "§5(2) - Itemized notice with clear language",
        ),
        ChecklistItem::new(
            !input.translation_needed || input.translation_present,
            "§5(3) - Notice available in English / Scheduled Language",
        ),
        ChecklistItem::new(
            input.step >= Step::Consent,
            "§6(1) - Free, specific, informed & unambiguous consent",
        ),
        ChecklistItem::new(
            input.granted_count >= input.required_count,
            "§6(2) - Granular consent per processing purpose",
        ),
        ChecklistItem::new(
            input.submitted,
            "§6(4) - Consent record maintained with timestamp",
        ),
        ChecklistItem::new(
            input.submitted,
            "§6(5) - Right to withdraw consent mechanism available",
        ),
    ];

    if input.revoked {
        items.push(ChecklistItem::new(
            true,
            "§6(6) - Withdrawal recorded; optional processing ceased",
        ));
    }

    items
}
