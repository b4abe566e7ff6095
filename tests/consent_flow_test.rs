//! 同意フロー全体の統合テスト

mod common;

use common::{new_session, ScriptedGenerator};
use dpdp_consent::compliance::{AuditKind, ReceiptStatus};
use dpdp_consent::llm::LlmError;
use dpdp_consent::workflow::{CredentialState, RequestKind, RequestStatus};
use dpdp_consent::{ConsentSession, ErrorClass, Step};
use tokio_test::{assert_err, assert_ok};

const REQUIRED: [&str; 2] = ["account", "service"];

async fn ready_for_consent(generator: &ScriptedGenerator) -> ConsentSession {
    let mut session = new_session();
    session.select_persona("urban_professional").unwrap();
    session.generate_notice(generator).await.unwrap();
    assert!(session.proceed_to_consent());
    session
}

fn assert_required_granted(session: &ConsentSession) {
    for id in REQUIRED {
        assert_eq!(session.consent().is_granted(id), Some(true), "{} must stay granted", id);
    }
}

#[tokio::test]
async fn test_scenario_a_granted_in_catalog_order() {
    let generator = ScriptedGenerator::replying(&["NOTICE"]);
    let mut session = ready_for_consent(&generator).await;

    session.toggle_consent("analytics");
    let receipt = session.submit_consent().unwrap();

    assert_eq!(receipt.granted_purposes(), ["account", "service", "analytics"]);
    assert_eq!(receipt.status(), ReceiptStatus::Active);
    assert_eq!(receipt.fiduciary_name(), "DataSeva Platform Pvt. Ltd.");
}

#[tokio::test]
async fn test_scenario_b_declined_in_catalog_order() {
    let generator = ScriptedGenerator::replying(&["NOTICE"]);
    let mut session = ready_for_consent(&generator).await;

    // toggled in reverse catalog order, reported in catalog order
    session.toggle_consent("profiling");
    session.toggle_consent("marketing");
    session.toggle_consent("marketing");
    session.toggle_consent("profiling");
    let receipt = session.submit_consent().unwrap();

    assert_eq!(
        receipt.declined_purposes(),
        ["analytics", "marketing", "thirdparty", "profiling"]
    );
    assert_eq!(receipt.granted_purposes(), REQUIRED);
}

#[tokio::test]
async fn test_scenario_c_revoke() {
    let generator = ScriptedGenerator::replying(&["NOTICE"]);
    let mut session = ready_for_consent(&generator).await;
    session.toggle_consent("analytics");
    let receipt_id = session.submit_consent().unwrap().id().to_string();
    let revokes_before = session.audit_log().count(AuditKind::Revoke);

    assert!(assert_ok!(session.revoke_consent()));

    assert_eq!(session.consent().is_granted("analytics"), Some(false));
    assert_required_granted(&session);
    assert_eq!(session.receipt().unwrap().status(), ReceiptStatus::Revoked);
    assert_eq!(session.audit_log().count(AuditKind::Revoke), revokes_before + 1);
    assert_eq!(
        session.audit_log().last().unwrap().message,
        format!("Consent revoked for non-essential purposes (Receipt: {})", receipt_id)
    );
}

#[tokio::test]
async fn test_scenario_e_translate_before_generate() {
    let generator = ScriptedGenerator::replying(&["NOTICE"]);
    let mut session = new_session();
    session.select_persona("student").unwrap();
    session.select_language("hi").unwrap();

    let err = assert_err!(session.translate_notice(&generator).await);

    assert_eq!(err.class(), Some(ErrorClass::Precondition));
    assert_eq!(generator.calls(), 0);
    assert_eq!(session.status(RequestKind::Translate), &RequestStatus::Idle);
}

#[tokio::test]
async fn test_audit_ordering_generate_submit_revoke() {
    let generator = ScriptedGenerator::replying(&["NOTICE"]);
    let mut session = ready_for_consent(&generator).await;
    session.submit_consent().unwrap();
    session.revoke_consent().unwrap();

    let kinds: Vec<AuditKind> = session.audit_log().entries().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, [AuditKind::Consent, AuditKind::Consent, AuditKind::Revoke]);

    let messages: Vec<&str> = session
        .audit_log()
        .entries()
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert!(messages[0].starts_with("Notice generated for persona: Urban Professional"));
    assert!(messages[1].starts_with("Consent submitted (ID: DPDP-"));
    assert!(messages[1].ends_with("Granted: Account Creation & Management, Service Delivery"));
    assert!(messages[2].starts_with("Consent revoked"));

    // K-th most recent entry is the (N-K+1)-th operation
    let recent: Vec<&str> = session
        .audit_log()
        .recent_first()
        .map(|e| e.message.as_str())
        .collect();
    let mut chronological = messages.clone();
    chronological.reverse();
    assert_eq!(recent, chronological);
}

#[tokio::test]
async fn test_second_revoke_is_noop() {
    let generator = ScriptedGenerator::replying(&["NOTICE"]);
    let mut session = ready_for_consent(&generator).await;
    session.toggle_consent("marketing");
    session.submit_consent().unwrap();
    session.revoke_consent().unwrap();

    let before = session.snapshot();
    assert!(!assert_ok!(session.revoke_consent()));
    let after = session.snapshot();

    assert_eq!(before.audit_log, after.audit_log);
    assert_eq!(before.consents, after.consents);
    assert_eq!(before.receipt, after.receipt);
}

#[tokio::test]
async fn test_receipt_snapshot_isolation() {
    let generator = ScriptedGenerator::replying(&["NOTICE"]);
    let mut session = ready_for_consent(&generator).await;
    session.toggle_consent("analytics");
    session.toggle_consent("thirdparty");
    let issued = session.submit_consent().unwrap().clone();

    session.revoke_consent().unwrap();

    let current = session.receipt().unwrap();
    assert_eq!(current.granted_purposes(), issued.granted_purposes());
    assert_eq!(current.declined_purposes(), issued.declined_purposes());
    assert_eq!(current.id(), issued.id());
    assert_eq!(current.timestamp(), issued.timestamp());
    assert!(current.revoked_at().is_some());
    assert!(issued.revoked_at().is_none());
}

#[tokio::test]
async fn test_required_purposes_never_toggle() {
    let generator = ScriptedGenerator::replying(&["NOTICE"]);
    let mut session = ready_for_consent(&generator).await;

    for id in ["account", "service", "account", "analytics", "service"] {
        session.toggle_consent(id);
        assert_required_granted(&session);
    }
    session.submit_consent().unwrap();
    session.revoke_consent().unwrap();
    assert_required_granted(&session);
}

#[tokio::test]
async fn test_translated_receipt() {
    let generator = ScriptedGenerator::replying(&["NOTICE", "सूचना"]);
    let mut session = new_session();
    session.select_persona("senior_citizen").unwrap();
    session.select_language("hi").unwrap();
    session.generate_notice(&generator).await.unwrap();
    session.translate_notice(&generator).await.unwrap();
    assert!(session.proceed_to_consent());

    let receipt = session.submit_consent().unwrap();
    assert_eq!(receipt.language_code(), "hi");
    assert!(receipt.translated());
    assert_eq!(
        receipt.notice_digest(),
        dpdp_consent::compliance::receipt::notice_digest("सूचना")
    );

    let requests = generator.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].user_prompt().unwrap().contains("into Hindi (हिन्दी)"));
    assert!(requests[1].user_prompt().unwrap().contains("NOTICE"));
}

#[tokio::test]
async fn test_failures_leave_state_untouched() {
    let generator = ScriptedGenerator::replying(&["NOTICE"]);
    generator.push_err(LlmError::RateLimited("slow down".into()));
    generator.push_err(LlmError::Malformed("no choices".into()));

    let mut session = new_session();
    session.select_persona("small_business").unwrap();
    session.generate_notice(&generator).await.unwrap();
    let audit_len = session.audit_log().len();

    let err = session.generate_notice(&generator).await.unwrap_err();
    assert_eq!(err.class(), Some(ErrorClass::Transient));
    assert!(err.is_retryable());
    assert_eq!(session.notice(), Some("NOTICE"));

    session.select_language("mr").unwrap();
    let err = session.translate_notice(&generator).await.unwrap_err();
    assert_eq!(err.class(), Some(ErrorClass::Validation));
    assert!(session.translation().is_none());
    assert_eq!(session.displayed_notice(), Some("NOTICE"));

    assert_eq!(session.audit_log().len(), audit_len);
    assert_eq!(session.credential(), CredentialState::Valid);
}

#[tokio::test]
async fn test_unauthorized_blocks_both_kinds() {
    let generator = ScriptedGenerator::replying(&["NOTICE"]);
    generator.push_err(LlmError::Unauthorized("Invalid API Key".into()));

    let mut session = new_session();
    session.select_persona("student").unwrap();
    session.generate_notice(&generator).await.unwrap();
    let err = session.generate_notice(&generator).await.unwrap_err();
    assert_eq!(err.class(), Some(ErrorClass::Credential));

    session.select_language("gu").unwrap();
    let err = session.translate_notice(&generator).await.unwrap_err();
    assert_eq!(err.class(), Some(ErrorClass::Credential));
    assert_eq!(generator.calls(), 2);

    session.reconfigure_credentials();
    generator.push_ok("ગુજરાતી સૂચના");
    session.translate_notice(&generator).await.unwrap();
    assert_eq!(session.displayed_notice(), Some("ગુજરાતી સૂચના"));
}

#[tokio::test]
async fn test_full_reset_then_new_flow() {
    let generator = ScriptedGenerator::replying(&["NOTICE", "NOTICE 2"]);
    let mut session = ready_for_consent(&generator).await;
    session.toggle_consent("analytics");
    let first = session.submit_consent().unwrap().id().to_string();
    session.revoke_consent().unwrap();

    session.reset();
    assert_eq!(session.step(), Step::PersonaAndNotice);
    assert!(!session.proceed_to_consent());

    session.select_persona("healthcare_patient").unwrap();
    session.generate_notice(&generator).await.unwrap();
    assert!(session.proceed_to_consent());
    let second = session.submit_consent().unwrap();

    assert_ne!(second.id(), first);
    assert_eq!(second.status(), ReceiptStatus::Active);
    assert_eq!(second.granted_purposes(), REQUIRED);
    assert_eq!(session.audit_log().len(), 6);
}

#[tokio::test]
async fn test_audit_export_is_chronological() {
    let generator = ScriptedGenerator::replying(&["NOTICE"]);
    let mut session = ready_for_consent(&generator).await;
    session.submit_consent().unwrap();
    session.revoke_consent().unwrap();

    let exported: Vec<serde_json::Value> =
        serde_json::from_str(&session.audit_log().export_json().unwrap()).unwrap();
    assert_eq!(exported.len(), 3);
    assert_eq!(exported[2]["kind"], "Revoke");

    let jsonl = session.audit_log().export_jsonl().unwrap();
    let lines: Vec<&str> = jsonl.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("Notice generated"));
}
