//! Consent State
//!
//! セッション単位の同意状態。必須目的は常に `true` であり、利用者が切り替えることはできません。

use crate::catalog::{Catalog, Purpose};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 目的ごとの同意フラグ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurposeGrant {
    pub purpose_id: String,
    pub granted: bool,
}

/// 同意状態のスナップショット（カタログ順）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsentRecord {
    pub grants: Vec<PurposeGrant>,
}

impl ConsentRecord {
    /// 目的IDの同意状態を取得
    pub fn is_granted(&self, purpose_id: &str) -> Option<bool> {
        self.grants
            .iter()
            .find(|g| g.purpose_id == purpose_id)
            .map(|g| g.granted)
    }
}

/// 同意状態
#[derive(Debug, Clone)]
pub struct ConsentState {
    catalog: Arc<Catalog>,
    /// カタログ順に並んだ同意フラグ
    grants: Vec<bool>,
}

impl ConsentState {
    /// 必須目的を `true`、任意目的を `false` で初期化
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let grants = catalog.purposes().iter().map(|p| p.required).collect();
        Self { catalog, grants }
    }

    fn position(&self, purpose_id: &str) -> Option<usize> {
        self.catalog
            .purposes()
            .iter()
            .position(|p| p.id == purpose_id)
    }

    /// 任意目的の同意を反転する。必須目的・未知のIDは何もしない。
    ///
    /// 状態が変化した場合は新しい値を返します。
    pub fn toggle(&mut self, purpose_id: &str) -> Option<bool> {
        let index = self.position(purpose_id)?;
        if self.catalog.purposes().as_slice()[index].required {
            tracing::debug!(purpose = purpose_id, "Toggle ignored for required purpose");
            return None;
        }

        self.grants[index] = !self.grants[index];
        Some(self.grants[index])
    }

    /// 全ての任意目的を撤回（以前の値に関わらず `false`）
    ///
    /// 撤回された（`true` から `false` になった）目的の数を返します。
    pub fn revoke_optional(&mut self) -> usize {
        let mut changed = 0;
        for (purpose, granted) in self.catalog.purposes().iter().zip(self.grants.iter_mut()) {
            if !purpose.required {
                if *granted {
                    changed += 1;
                }
                *granted = false;
            }
        }
        changed
    }

    /// 初期状態に戻す
    pub fn reset(&mut self) {
        for (purpose, granted) in self.catalog.purposes().iter().zip(self.grants.iter_mut()) {
            *granted = purpose.required;
        }
    }

    pub fn is_granted(&self, purpose_id: &str) -> Option<bool> {
        self.position(purpose_id).map(|i| self.grants[i])
    }

    /// 同意済みの目的（カタログ順）
    pub fn granted_purposes(&self) -> Vec<&Purpose> {
        self.filter_by(true)
    }

    /// 拒否された目的（カタログ順）
    pub fn declined_purposes(&self) -> Vec<&Purpose> {
        self.filter_by(false)
    }

    fn filter_by(&self, state: bool) -> Vec<&Purpose> {
        self.catalog
            .purposes()
            .iter()
            .zip(self.grants.iter())
            .filter(|(_, granted)| **granted == state)
            .map(|(purpose, _)| purpose)
            .collect()
    }

    pub fn granted_count(&self) -> usize {
        self.grants.iter().filter(|g| **g).count()
    }

    /// 同意済みの任意目的数
    pub fn optional_granted_count(&self) -> usize {
        self.catalog
            .purposes()
            .iter()
            .zip(self.grants.iter())
            .filter(|(p, granted)| !p.required && **granted)
            .count()
    }

    pub fn snapshot(&self) -> ConsentRecord {
        ConsentRecord {
            grants: self
                .catalog
                .purposes()
                .iter()
                .zip(self.grants.iter())
                .map(|(p, granted)| PurposeGrant {
                    purpose_id: p.id.clone(),
                    granted: *granted,
                })
                .collect(),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }
}
