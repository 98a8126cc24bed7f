//! Comprehensive tests for domain_org

use core_kernel::{organization_key, ErrorCode, LedgerStore};
use domain_credit::{AuditLog, LogType, CREATE_CREDIT_TITLE};
use domain_org::{OrgError, Organization, UpdatePrecondition, ORGANIZATION_DOC_TYPE};
use test_utils::{
    assert_balance, assert_log_entry, IdentityFixtures, KeyFixtures, LedgerHarness, OrgFixtures,
};

async fn register(harness: &LedgerHarness, id: &str, initial_credit: &str) -> Organization {
    let (ctx, tx) = harness.begin_admin();
    let org = harness
        .registry()
        .create(&ctx, &tx, &OrgFixtures::new_org(id, initial_credit))
        .await
        .unwrap();
    tx.commit().await.unwrap();
    org
}

async fn bind(harness: &LedgerHarness, id: &str, pem: &str) -> Result<Organization, OrgError> {
    let (ctx, tx) = harness.begin_admin();
    let org = harness
        .registry()
        .bind_public_key(&ctx, &tx, id, "ecdsa:P-384", pem)
        .await?;
    tx.commit().await.unwrap();
    Ok(org)
}

// ============================================================================
// Registration Tests
// ============================================================================

mod create_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_registers_org_and_account() {
        let harness = LedgerHarness::new();
        let (ctx, tx) = harness.begin_admin();

        let org = harness
            .registry()
            .create(&ctx, &tx, &OrgFixtures::new_org("ORG1", "100"))
            .await
            .unwrap();
        assert_eq!(org.doc_type, ORGANIZATION_DOC_TYPE);
        assert_eq!(org.org_credit_id, "ORG1");
        assert_eq!(org.create_tx_timestamp, ctx.tx_timestamp_secs());
        assert_eq!(org.update_tx_timestamp, 0);
        assert!(org.email.is_empty());
        assert!(!org.has_public_key());

        let credit = harness
            .credit_ledger()
            .read(&ctx, &tx, "ORG1", "ORG1")
            .await
            .unwrap();
        assert_eq!(credit.title, "Main");
        assert_balance(&credit, "100");

        let entry = AuditLog::read(&tx, ctx.tx_id()).await.unwrap().unwrap();
        assert_eq!(entry.title, CREATE_CREDIT_TITLE);
        assert_log_entry(&entry, LogType::Mint, "100", "100");

        let receipt = tx.commit().await.unwrap();
        assert_eq!(receipt.writes, 3);
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG1", "10").await;

        let (ctx, tx) = harness.begin_admin();
        let err = harness
            .registry()
            .create(&ctx, &tx, &OrgFixtures::new_org("ORG1", "99"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::AlreadyExists(ref id) if id == "ORG1"));
        assert_eq!(tx.pending_writes().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_opening_balance_writes_nothing() {
        let harness = LedgerHarness::new();
        let (ctx, tx) = harness.begin_admin();

        let err = harness
            .registry()
            .create(&ctx, &tx, &OrgFixtures::new_org("ORG1", "-1"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidAmount);
        assert_eq!(tx.pending_writes().await, 0);
        assert!(!harness.registry().exists(&tx, "ORG1").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_requires_super_admin() {
        let harness = LedgerHarness::new();
        let (ctx, tx) = harness.begin(IdentityFixtures::org_admin("ORG1"));

        let err = harness
            .registry()
            .create(&ctx, &tx, &OrgFixtures::new_org("ORG1", "1"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_existing_account_blocks_registration() {
        let harness = LedgerHarness::new();
        let (ctx, tx) = harness.begin_admin();
        harness
            .credit_ledger()
            .create(&ctx, &tx, "ORG1", "Orphan", "5")
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let (ctx, tx) = harness.begin_admin();
        let err = harness
            .registry()
            .create(&ctx, &tx, &OrgFixtures::new_org("ORG1", "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::Credit(_)));
        assert_eq!(err.code(), ErrorCode::AlreadyExists);
    }
}

// ============================================================================
// Read Tests
// ============================================================================

mod read_tests {
    use super::*;

    #[tokio::test]
    async fn test_exists_and_read() {
        let harness = LedgerHarness::new();
        let created = register(&harness, "ORG1", "1").await;

        let (_, tx) = harness.begin(IdentityFixtures::anonymous());
        let registry = harness.registry();
        assert!(registry.exists(&tx, "ORG1").await.unwrap());
        assert!(!registry.exists(&tx, "ORG2").await.unwrap());
        assert_eq!(registry.read(&tx, "ORG1").await.unwrap(), created);

        let err = registry.read(&tx, "ORG2").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_malformed_record_reads_as_missing() {
        let harness = LedgerHarness::new();
        let (_, tx) = harness.begin_admin();
        tx.put_state(&organization_key("ORG1").unwrap(), b"{\"docType\":\"Organization\"}".to_vec())
            .await
            .unwrap();

        let err = harness.registry().read(&tx, "ORG1").await.unwrap_err();
        assert!(matches!(err, OrgError::NotFound(ref id) if id == "ORG1"));
    }

    #[tokio::test]
    async fn test_read_caller_org() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG1", "1").await;
        let registry = harness.registry();

        let (ctx, tx) = harness.begin(IdentityFixtures::org_member("ORG1"));
        assert_eq!(registry.read_caller(&ctx, &tx).await.unwrap().id, "ORG1");

        let (ctx, tx) = harness.begin(IdentityFixtures::org_member("ORG9"));
        let err = registry.read_caller(&ctx, &tx).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);

        let (ctx, tx) = harness.begin(IdentityFixtures::anonymous());
        let err = registry.read_caller(&ctx, &tx).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingAttribute);
    }

    #[tokio::test]
    async fn test_list_oldest_first() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG2", "1").await;
        register(&harness, "ORG1", "1").await;
        register(&harness, "ORG3", "1").await;

        let (_, tx) = harness.begin(IdentityFixtures::anonymous());
        let ids: Vec<String> = harness
            .registry()
            .list(&tx)
            .await
            .unwrap()
            .into_iter()
            .map(|org| org.id)
            .collect();
        assert_eq!(ids, vec!["ORG2", "ORG1", "ORG3"]);
    }

    #[tokio::test]
    async fn test_list_empty_ledger() {
        let harness = LedgerHarness::new();
        let (_, tx) = harness.begin_admin();
        assert!(harness.registry().list(&tx).await.unwrap().is_empty());
    }
}

// ============================================================================
// Update Tests
// ============================================================================

mod update_tests {
    use super::*;

    #[tokio::test]
    async fn test_update_replaces_mutable_fields() {
        let harness = LedgerHarness::new();
        let created = register(&harness, "ORG1", "1").await;

        let (ctx, tx) = harness.begin_admin();
        let updated = harness
            .registry()
            .update(&ctx, &tx, &OrgFixtures::update("ORG1"))
            .await
            .unwrap();

        assert_eq!(updated.name, "ORG1 Institute");
        assert_eq!(updated.email, "registrar@org1.edu.mn");
        assert_eq!(updated.institution_id, "INST-ORG1-2");
        assert!(updated.logo_url.is_empty());
        assert!(!updated.is_active);
        assert_eq!(updated.update_tx_timestamp, ctx.tx_timestamp_secs());
        assert_eq!(updated.create_tx_timestamp, created.create_tx_timestamp);
        assert_eq!(updated.org_credit_id, created.org_credit_id);
        tx.commit().await.unwrap();

        let (_, tx) = harness.begin_admin();
        assert_eq!(harness.registry().read(&tx, "ORG1").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_of_missing_org() {
        let harness = LedgerHarness::new();
        for precondition in [
            UpdatePrecondition::RequireExisting,
            UpdatePrecondition::RejectExisting,
        ] {
            let (ctx, tx) = harness.begin_admin();
            let err = harness
                .registry_with(precondition)
                .update(&ctx, &tx, &OrgFixtures::update("ORG1"))
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::NotFound, "{}", precondition);
        }
    }

    #[tokio::test]
    async fn test_legacy_precondition_refuses_existing() {
        let harness = LedgerHarness::new();
        let created = register(&harness, "ORG1", "1").await;

        let (ctx, tx) = harness.begin_admin();
        let registry = harness.registry_with(UpdatePrecondition::RejectExisting);
        let err = registry
            .update(&ctx, &tx, &OrgFixtures::update("ORG1"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyExists);
        assert_eq!(registry.read(&tx, "ORG1").await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_update_validation() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG1", "1").await;
        let registry = harness.registry();

        let mut blank_name = OrgFixtures::update("ORG1");
        blank_name.name.clear();
        let mut bad_email = OrgFixtures::update("ORG1");
        bad_email.email = Some("registrar-at-org1".to_string());

        for update in [blank_name, bad_email] {
            let (ctx, tx) = harness.begin_admin();
            let err = registry.update(&ctx, &tx, &update).await.unwrap_err();
            assert!(matches!(err, OrgError::Validation(_)));
            assert_eq!(err.code(), ErrorCode::Validation);
            assert_eq!(tx.pending_writes().await, 0);
        }
    }

    #[tokio::test]
    async fn test_update_without_email_clears_it() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG1", "1").await;

        let (ctx, tx) = harness.begin_admin();
        let mut update = OrgFixtures::update("ORG1");
        update.email = None;
        let updated = harness.registry().update(&ctx, &tx, &update).await.unwrap();
        assert!(updated.email.is_empty());
    }

    #[tokio::test]
    async fn test_update_requires_super_admin() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG1", "1").await;

        let (ctx, tx) = harness.begin(IdentityFixtures::org_admin("ORG1"));
        let err = harness
            .registry()
            .update(&ctx, &tx, &OrgFixtures::update("ORG1"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PermissionDenied);
    }
}

// ============================================================================
// Public Key Tests
// ============================================================================

mod public_key_tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_sets_key_and_update_time() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG1", "1").await;

        let org = bind(&harness, "ORG1", KeyFixtures::P384_A).await.unwrap();
        assert!(org.has_public_key());
        assert_eq!(org.pub_key_type, "ecdsa:P-384");
        assert_eq!(org.pub_key_pem, KeyFixtures::P384_A);
        assert!(org.update_tx_timestamp > org.create_tx_timestamp);
    }

    #[tokio::test]
    async fn test_bind_rejects_other_key_types() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG1", "1").await;

        for key_type in ["rsa:2048", "ecdsa:P-256", "ECDSA:P-384", ""] {
            let (ctx, tx) = harness.begin_admin();
            let err = harness
                .registry()
                .bind_public_key(&ctx, &tx, "ORG1", key_type, KeyFixtures::P384_A)
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::UnsupportedKeyType, "{:?}", key_type);
        }
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_pem() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG1", "1").await;

        for pem in [KeyFixtures::P256, "not a key", ""] {
            let err = bind(&harness, "ORG1", pem).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidKey);
        }
    }

    #[tokio::test]
    async fn test_key_checks_precede_existence() {
        let harness = LedgerHarness::new();

        let err = bind(&harness, "ORG1", KeyFixtures::P256).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidKey);

        let err = bind(&harness, "ORG1", KeyFixtures::P384_A).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_key_binds_once() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG1", "1").await;
        bind(&harness, "ORG1", KeyFixtures::P384_A).await.unwrap();

        let err = bind(&harness, "ORG1", KeyFixtures::P384_B).await.unwrap_err();
        assert!(matches!(err, OrgError::AlreadyBound(ref id) if id == "ORG1"));

        let (_, tx) = harness.begin_admin();
        let org = harness.registry().read(&tx, "ORG1").await.unwrap();
        assert_eq!(org.pub_key_pem, KeyFixtures::P384_A);
    }

    #[tokio::test]
    async fn test_key_unique_across_orgs() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG1", "1").await;
        register(&harness, "ORG2", "1").await;
        bind(&harness, "ORG1", KeyFixtures::P384_A).await.unwrap();

        let err = bind(&harness, "ORG2", KeyFixtures::P384_A).await.unwrap_err();
        assert!(matches!(err, OrgError::KeyTaken));

        bind(&harness, "ORG2", KeyFixtures::P384_B).await.unwrap();
    }

    #[tokio::test]
    async fn test_key_unique_across_spellings() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG1", "1").await;
        register(&harness, "ORG2", "1").await;
        register(&harness, "ORG3", "1").await;
        bind(&harness, "ORG1", KeyFixtures::P384_A).await.unwrap();

        let trailing = format!("{}\n", KeyFixtures::P384_A);
        let err = bind(&harness, "ORG2", &trailing).await.unwrap_err();
        assert!(matches!(err, OrgError::KeyTaken));

        let padded = format!("  \n{}  ", KeyFixtures::P384_A.trim_end());
        let err = bind(&harness, "ORG3", &padded).await.unwrap_err();
        assert!(matches!(err, OrgError::KeyTaken));

        let (_, tx) = harness.begin_admin();
        assert!(!harness.registry().read(&tx, "ORG2").await.unwrap().has_public_key());
    }

    #[tokio::test]
    async fn test_bound_key_is_stored_canonically() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG1", "1").await;

        let padded = format!("\n{}\n\n", KeyFixtures::P384_B);
        let org = bind(&harness, "ORG1", &padded).await.unwrap();
        assert_eq!(org.pub_key_pem, KeyFixtures::P384_B);
    }

    #[tokio::test]
    async fn test_bind_requires_super_admin() {
        let harness = LedgerHarness::new();
        register(&harness, "ORG1", "1").await;

        let (ctx, tx) = harness.begin(IdentityFixtures::org_admin("ORG1"));
        let err = harness
            .registry()
            .bind_public_key(&ctx, &tx, "ORG1", "ecdsa:P-384", KeyFixtures::P384_A)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PermissionDenied);
    }
}
