//! Processing Purposes
//!
//! DPDP法 §5 に基づく処理目的カタログ

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 法的根拠
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LawfulBasis {
    /// 同意（DPDP §6）
    Consent,
    /// 契約履行
    Contract,
}

impl fmt::Display for LawfulBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LawfulBasis::Consent => write!(f, "Consent"),
            LawfulBasis::Contract => write!(f, "Contract"),
        }
    }
}

/// 処理目的
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Purpose {
    /// 目的ID
    pub id: String,
    /// 表示名
    pub label: String,
    /// 必須目的かどうか（必須目的は撤回不可）
    pub required: bool,
    /// 法的根拠
    pub lawful_basis: LawfulBasis,
    /// 条文参照（例: §5(a)）
    pub legal_section: String,
}

impl Purpose {
    /// 新しい処理目的を作成
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        required: bool,
        lawful_basis: LawfulBasis,
        legal_section: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            required,
            lawful_basis,
            legal_section: legal_section.into(),
        }
    }
}

/// 処理目的レジストリ（カタログ順を保持）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurposeRegistry {
    purposes: Vec<Purpose>,
}

impl PurposeRegistry {
    /// 目的リストからレジストリを作成
    pub fn new(purposes: Vec<Purpose>) -> Result<Self> {
        if purposes.is_empty() {
            return Err(Error::Config(
                "Purpose catalog must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for purpose in &purposes {
            if purpose.id.trim().is_empty() {
                return Err(Error::Config("Purpose id must not be empty".to_string()));
            }
            if !seen.insert(purpose.id.as_str()) {
                return Err(Error::Config(format!(
                    "Duplicate purpose id: {}",
                    purpose.id
                )));
            }
        }

        Ok(Self { purposes })
    }

    /// DPDP法 §5 の標準カタログ
    pub fn dpdp_default() -> Self {
        use LawfulBasis::*;

        Self {
            purposes: vec![
                Purpose::new("account", "Account Creation & Management", true, Consent, "§5(a)"),
                Purpose::new("service", "Service Delivery", true, Contract, "§5(b)"),
                Purpose::new("analytics", "Usage Analytics & Improvement", false, Consent, "§5(c)"),
                Purpose::new("marketing", "Personalized Marketing", false, Consent, "§5(d)"),
                Purpose::new("thirdparty", "Third-Party Data Sharing", false, Consent, "§5(e)"),
                Purpose::new("profiling", "Behavioral Profiling", false, Consent, "§5(f)"),
            ],
        }
    }

    /// カタログ順に走査
    pub fn iter(&self) -> impl Iterator<Item = &Purpose> {
        self.purposes.iter()
    }

    /// IDで目的を取得
    pub fn get(&self, id: &str) -> Option<&Purpose> {
        self.purposes.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// 必須目的
    pub fn required(&self) -> impl Iterator<Item = &Purpose> {
        self.purposes.iter().filter(|p| p.required)
    }

    /// 任意目的
    pub fn optional(&self) -> impl Iterator<Item = &Purpose> {
        self.purposes.iter().filter(|p| !p.required)
    }

    pub fn len(&self) -> usize {
        self.purposes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.purposes.is_empty()
    }

    pub fn as_slice(&self) -> &[Purpose] {
        &self.purposes
    }
}
