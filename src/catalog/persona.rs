//! User Personas
//!
//! 通知文の読みやすさを決めるペルソナカタログ

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 読解レベル
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReadingLevel {
    Simple,
    Moderate,
    Advanced,
}

impl ReadingLevel {
    /// 通知生成プロンプトに埋め込む文体指示
    pub fn directive(&self) -> &'static str {
        match self {
            ReadingLevel::Simple => "very simple, easy-to-understand language avoiding jargon",
            ReadingLevel::Moderate => "clear, plain language",
            ReadingLevel::Advanced => "professional, precise language",
        }
    }
}

impl fmt::Display for ReadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingLevel::Simple => write!(f, "Simple"),
            ReadingLevel::Moderate => write!(f, "Moderate"),
            ReadingLevel::Advanced => write!(f, "Advanced"),
        }
    }
}

/// ユーザーペルソナ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Persona {
    pub id: String,
    pub label: String,
    pub description: String,
    pub reading_level: ReadingLevel,
}

impl Persona {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        reading_level: ReadingLevel,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            reading_level,
        }
    }
}

/// ペルソナレジストリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
}

impl PersonaRegistry {
    /// ペルソナリストからレジストリを作成
    pub fn new(personas: Vec<Persona>) -> Result<Self> {
        let mut seen = HashSet::new();
        for persona in &personas {
            if !seen.insert(persona.id.as_str()) {
                return Err(Error::Config(format!(
                    "Duplicate persona id: {}",
                    persona.id
                )));
            }
        }
        Ok(Self { personas })
    }

    /// 標準ペルソナ
    pub fn dpdp_default() -> Self {
        use ReadingLevel::*;

        Self {
            personas: vec![
                Persona::new(
                    "rural_farmer",
                    "Rural Farmer",
                    "Limited digital literacy, primary language may not be English",
                    Simple,
                ),
                Persona::new(
                    "urban_professional",
                    "Urban Professional",
                    "High digital literacy, comfortable with complex language",
                    Advanced,
                ),
                Persona::new(
                    "senior_citizen",
                    "Senior Citizen (60+)",
                    "May need simplified language and larger font",
                    Simple,
                ),
                Persona::new(
                    "student",
                    "Student (18-25)",
                    "Moderate digital literacy, tech-savvy",
                    Moderate,
                ),
                Persona::new(
                    "small_business",
                    "Small Business Owner",
                    "Needs to understand business implications",
                    Moderate,
                ),
                Persona::new(
                    "healthcare_patient",
                    "Healthcare Patient",
                    "Sensitive data context, needs clear medical data notice",
                    Simple,
                ),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}
