//! カタログ・設定ファイル読み込みの統合テスト

mod common;

use common::ScriptedGenerator;
use dpdp_consent::catalog::{LawfulBasis, ReadingLevel};
use dpdp_consent::{AppConfig, Catalog, ConsentSession, Error};
use std::io::Write;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};

const CLINIC_CATALOG: &str = r#"
default_language = "en"

[[purposes]]
id = "registration"
label = "Patient Registration"
required = true
lawful_basis = "Consent"
legal_section = "§5(a)"

[[purposes]]
id = "reminders"
label = "Appointment Reminders"
required = false
lawful_basis = "Consent"
legal_section = "§5(c)"

[[purposes]]
id = "research"
label = "Anonymised Research"
required = false
lawful_basis = "Consent"
legal_section = "§5(d)"

[[personas]]
id = "patient"
label = "Clinic Patient"
description = "Visits the clinic for routine care"
reading_level = "Simple"

[[languages]]
code = "en"
label = "English"
native = "English"

[[languages]]
code = "ta"
label = "Tamil"
native = "தமிழ்"
"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_catalog_file() {
    let file = write_temp(CLINIC_CATALOG);
    let catalog = Catalog::load(file.path()).unwrap();

    assert_eq!(catalog.purposes().len(), 3);
    assert_eq!(catalog.purposes().required().count(), 1);
    assert_eq!(
        catalog.purposes().get("registration").unwrap().lawful_basis,
        LawfulBasis::Consent
    );
    assert_eq!(
        catalog.personas().get("patient").unwrap().reading_level,
        ReadingLevel::Simple
    );
    assert!(catalog.languages().is_default("en"));
    assert_eq!(catalog.languages().len(), 2);
}

#[test]
fn test_catalog_rejects_duplicates_and_missing_default() {
    let duplicated = CLINIC_CATALOG.replace("id = \"research\"", "id = \"reminders\"");
    assert!(Catalog::from_toml_str(&duplicated).is_err());

    let no_default = CLINIC_CATALOG.replace("default_language = \"en\"", "default_language = \"hi\"");
    assert!(Catalog::from_toml_str(&no_default).is_err());

    assert!(matches!(
        Catalog::from_toml_str("purposes = ["),
        Err(Error::Toml(_))
    ));
}

#[tokio::test]
async fn test_custom_catalog_flow() {
    let file = write_temp(CLINIC_CATALOG);
    let catalog = Arc::new(Catalog::load(file.path()).unwrap());
    let generator = ScriptedGenerator::replying(&["CLINIC NOTICE"]);

    let mut session = ConsentSession::new(catalog, "Example Clinic LLP");
    session.select_persona("patient").unwrap();
    session.generate_notice(&generator).await.unwrap();
    assert!(session.proceed_to_consent());
    session.toggle_consent("research");
    let receipt = session.submit_consent().unwrap();

    assert_eq!(receipt.granted_purposes(), ["registration", "research"]);
    assert_eq!(receipt.declined_purposes(), ["reminders"]);

    let prompt = generator.requests()[0].user_prompt().unwrap().to_string();
    assert!(prompt.contains("- Patient Registration (§5(a))"));
    assert!(prompt.contains("Data Fiduciary: Example Clinic LLP"));
}

#[test]
fn test_config_with_catalog_path() {
    let dir = TempDir::new().unwrap();
    let catalog_path = dir.path().join("catalog.toml");
    std::fs::write(&catalog_path, CLINIC_CATALOG).unwrap();

    let config_path = dir.path().join("dpdp-consent.toml");
    std::fs::write(
        &config_path,
        format!(
            "catalog_path = {:?}\n\n[fiduciary]\nname = \"Example Clinic LLP\"\ndefault_language = \"ta\"\n",
            catalog_path.display().to_string()
        ),
    )
    .unwrap();

    let config = AppConfig::load_from(Some(&config_path)).unwrap();
    assert_eq!(config.fiduciary.name, "Example Clinic LLP");
    assert_eq!(config.fiduciary.default_language, "ta");

    let catalog = config.build_catalog().unwrap();
    assert_eq!(catalog.personas().len(), 1);
}

#[test]
fn test_config_default_language_must_exist_in_catalog() {
    let dir = TempDir::new().unwrap();
    let catalog_path = dir.path().join("catalog.toml");
    std::fs::write(&catalog_path, CLINIC_CATALOG).unwrap();

    let mut config = AppConfig::default();
    config.catalog_path = Some(catalog_path);
    config.fiduciary.default_language = "hi".to_string();

    assert!(matches!(config.build_catalog(), Err(Error::Config(_))));
}
