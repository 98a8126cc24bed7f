//! Invocation tests for interface_api
//!
//! Drive the ledger end to end through the gateway: decoding, dispatch,
//! commit on success and discard on failure.

use chrono::{DateTime, Duration, Utc};
use core_kernel::{CallerIdentity, ErrorCode};
use domain_org::{OrganizationRegistry, UpdatePrecondition};
use infra_store::MemoryLedger;
use interface_api::{Contract, ContractError, Gateway, Invocation, Request, Response};
use test_utils::{IdentityFixtures, KeyFixtures, TemporalFixtures};

struct Fixture {
    gateway: Gateway,
    clock: std::cell::Cell<i64>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_registry(OrganizationRegistry::default())
    }

    fn with_registry(registry: OrganizationRegistry) -> Self {
        Self {
            gateway: Gateway::new(MemoryLedger::new(), Contract::new(registry)),
            clock: std::cell::Cell::new(0),
        }
    }

    fn tick(&self) -> DateTime<Utc> {
        self.clock.set(self.clock.get() + 1);
        TemporalFixtures::genesis() + Duration::seconds(self.clock.get())
    }

    async fn call(
        &self,
        identity: CallerIdentity,
        function: &str,
        args: &[&str],
    ) -> Result<Invocation, ContractError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let request = Request::decode(function, &args)?;
        self.gateway.submit(identity, self.tick(), request).await
    }

    async fn admin(&self, function: &str, args: &[&str]) -> Result<Invocation, ContractError> {
        self.call(IdentityFixtures::super_admin(), function, args).await
    }

    async fn create_org(&self, id: &str, initial_credit: &str) {
        self.admin(
            "CreateOrg",
            &[id, "Uni", "desc", "INST", "Ministry", "", initial_credit, "Main", "true"],
        )
        .await
        .unwrap();
    }
}

fn payload(invocation: Invocation) -> serde_json::Value {
    serde_json::to_value(invocation.payload).unwrap()
}

// ============================================================================
// Dispatch Tests
// ============================================================================

mod dispatch_tests {
    use super::*;

    #[tokio::test]
    async fn test_init_ledger_is_a_no_op() {
        let fixture = Fixture::new();
        let invocation = fixture.admin("InitLedger", &[]).await.unwrap();
        assert!(matches!(invocation.payload, Response::Empty));
        assert_eq!(payload(invocation), serde_json::Value::Null);
        assert!(fixture.gateway.ledger().is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_function_fails() {
        let fixture = Fixture::new();
        let err = fixture
            .gateway
            .invoke(IdentityFixtures::super_admin(), "DeleteOrg", &["ORG1".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownFunction);
    }

    #[tokio::test]
    async fn test_invoke_assigns_unique_tx_ids() {
        let fixture = Fixture::new();
        let first = fixture
            .gateway
            .invoke(IdentityFixtures::super_admin(), "ListOrgs", &[])
            .await
            .unwrap();
        let second = fixture
            .gateway
            .invoke(IdentityFixtures::super_admin(), "ListOrgs", &[])
            .await
            .unwrap();
        assert_ne!(first.tx_id, second.tx_id);
        assert!(fixture.gateway.ledger().is_committed(&first.tx_id).await);
    }

    #[tokio::test]
    async fn test_create_org_commits_org_account_and_entry() {
        let fixture = Fixture::new();
        fixture.create_org("ORG1", "100").await;
        assert_eq!(fixture.gateway.ledger().len().await, 3);

        let org = payload(fixture.admin("ReadOrg", &["ORG1"]).await.unwrap());
        assert_eq!(org["id"], "ORG1");
        assert_eq!(org["orgCreditId"], "ORG1");
        assert_eq!(org["docType"], "Organization");

        let exists = payload(fixture.admin("OrgExists", &["ORG1"]).await.unwrap());
        assert_eq!(exists, serde_json::Value::Bool(true));

        let exists = payload(fixture.admin("CreditExists", &["ORG1", "ORG1"]).await.unwrap());
        assert_eq!(exists, serde_json::Value::Bool(true));
    }

    #[tokio::test]
    async fn test_failed_invocation_keeps_no_writes() {
        let fixture = Fixture::new();
        let err = fixture
            .admin(
                "CreateOrg",
                &["ORG1", "Uni", "desc", "INST", "Ministry", "", "-5", "Main", "true"],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidAmount);
        assert!(fixture.gateway.ledger().is_empty().await);
        assert_eq!(fixture.gateway.ledger().height().await, 0);
    }

    #[tokio::test]
    async fn test_read_my_org() {
        let fixture = Fixture::new();
        fixture.create_org("ORG1", "1").await;

        let org = payload(
            fixture
                .call(IdentityFixtures::org_member("ORG1"), "ReadMyOrg", &[])
                .await
                .unwrap(),
        );
        assert_eq!(org["id"], "ORG1");

        let err = fixture
            .call(IdentityFixtures::anonymous(), "ReadMyOrg", &[])
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingAttribute);
    }

    #[tokio::test]
    async fn test_list_orgs() {
        let fixture = Fixture::new();
        fixture.create_org("ORG2", "1").await;
        fixture.create_org("ORG1", "1").await;

        let orgs = payload(
            fixture
                .call(IdentityFixtures::anonymous(), "ListOrgs", &[])
                .await
                .unwrap(),
        );
        let ids: Vec<&str> = orgs
            .as_array()
            .unwrap()
            .iter()
            .map(|org| org["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["ORG2", "ORG1"]);
    }
}

// ============================================================================
// Credit Flow Tests
// ============================================================================

mod credit_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_mint_spend_overdraw_and_list() {
        let fixture = Fixture::new();
        fixture.create_org("ORG1", "100").await;
        let org_admin = IdentityFixtures::org_admin("ORG1");

        let credit = payload(
            fixture
                .admin("MintCredit", &["ORG1", "ORG1", "50", "Top up"])
                .await
                .unwrap(),
        );
        assert_eq!(credit["amount"], "150");

        let credit = payload(
            fixture
                .call(org_admin.clone(), "SpendCredit", &["ORG1", "ORG1", "30", "Diploma"])
                .await
                .unwrap(),
        );
        assert_eq!(credit["amount"], "120");

        let err = fixture
            .call(org_admin.clone(), "SpendCredit", &["ORG1", "ORG1", "200", "Diploma"])
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InsufficientBalance);

        let credit = payload(
            fixture
                .call(org_admin.clone(), "ReadCredit", &["ORG1", "ORG1"])
                .await
                .unwrap(),
        );
        assert_eq!(credit["amount"], "120");

        let log = payload(
            fixture
                .call(org_admin, "ListCreditLog", &["ORG1", "ORG1"])
                .await
                .unwrap(),
        );
        let entries = log.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["type"], "spend");
        assert_eq!(entries[0]["debit"], "30");
        assert_eq!(entries[0]["credit"], "0");
        assert_eq!(entries[1]["type"], "mint");
        assert_eq!(entries[1]["amount"], "150");
        assert_eq!(entries[2]["title"], "Create Credit");
    }

    #[tokio::test]
    async fn test_log_pages_resume_from_bookmark() {
        let fixture = Fixture::new();
        fixture.create_org("ORG1", "1").await;
        fixture
            .admin("BurnCredit", &["ORG1", "ORG1", "0.5", "Expire"])
            .await
            .unwrap();

        let first = payload(
            fixture
                .admin("ListCreditLogPage", &["ORG1", "ORG1", "1", ""])
                .await
                .unwrap(),
        );
        assert_eq!(first["entries"].as_array().unwrap().len(), 1);
        assert_eq!(first["entries"][0]["type"], "burn");
        let bookmark = first["bookmark"].as_str().unwrap().to_string();
        assert!(!bookmark.is_empty());

        let second = payload(
            fixture
                .admin("ListCreditLogPage", &["ORG1", "ORG1", "1", bookmark.as_str()])
                .await
                .unwrap(),
        );
        assert_eq!(second["entries"][0]["type"], "mint");
        assert_eq!(second["bookmark"], "");
    }

    #[tokio::test]
    async fn test_invoke_lists_log_newest_first() {
        for _ in 0..10 {
            let gateway = Gateway::new(MemoryLedger::new(), Contract::default());
            let admin = IdentityFixtures::super_admin();
            let org_admin = IdentityFixtures::org_admin("ORG1");
            let args = |values: &[&str]| -> Vec<String> {
                values.iter().map(|v| v.to_string()).collect()
            };

            gateway
                .invoke(
                    admin.clone(),
                    "CreateOrg",
                    &args(&["ORG1", "Uni", "desc", "INST", "Ministry", "", "100", "Main", "true"]),
                )
                .await
                .unwrap();
            gateway
                .invoke(admin, "MintCredit", &args(&["ORG1", "ORG1", "50", "Top up"]))
                .await
                .unwrap();
            gateway
                .invoke(
                    org_admin.clone(),
                    "SpendCredit",
                    &args(&["ORG1", "ORG1", "30", "Diploma"]),
                )
                .await
                .unwrap();

            let log = payload(
                gateway
                    .invoke(org_admin, "ListCreditLog", &args(&["ORG1", "ORG1"]))
                    .await
                    .unwrap(),
            );
            let balances: Vec<&str> = log
                .as_array()
                .unwrap()
                .iter()
                .map(|entry| entry["amount"].as_str().unwrap())
                .collect();
            assert_eq!(balances, vec!["120", "150", "100"]);

            let stamps: Vec<i64> = log
                .as_array()
                .unwrap()
                .iter()
                .map(|entry| entry["txTimestamp"].as_i64().unwrap())
                .collect();
            assert!(stamps.windows(2).all(|pair| pair[0] > pair[1]));
        }
    }

    #[tokio::test]
    async fn test_same_requested_time_still_orders_log() {
        let fixture = Fixture::new();
        let at = TemporalFixtures::genesis();
        let submit = |function: &str, values: &[&str]| {
            let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            let request = Request::decode(function, &values).unwrap();
            fixture
                .gateway
                .submit(IdentityFixtures::super_admin(), at, request)
        };

        submit(
            "CreateOrg",
            &["ORG1", "Uni", "desc", "INST", "Ministry", "", "10", "Main", "true"],
        )
        .await
        .unwrap();
        submit("MintCredit", &["ORG1", "ORG1", "5", "a"]).await.unwrap();
        submit("BurnCredit", &["ORG1", "ORG1", "3", "b"]).await.unwrap();

        let log = payload(submit("ListCreditLog", &["ORG1", "ORG1"]).await.unwrap());
        let balances: Vec<&str> = log
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["amount"].as_str().unwrap())
            .collect();
        assert_eq!(balances, vec!["12", "15", "10"]);
        assert_eq!(log[2]["txTimestamp"], at.timestamp());
        assert_eq!(log[0]["txTimestamp"], at.timestamp() + 2);
    }

    #[tokio::test]
    async fn test_create_credit_standalone() {
        let fixture = Fixture::new();
        let credit = payload(
            fixture
                .admin("CreateCredit", &["ORG7", "Grant", "12.50"])
                .await
                .unwrap(),
        );
        assert_eq!(credit["id"], "ORG7");
        assert_eq!(credit["title"], "Grant");
        assert_eq!(credit["amount"], "12.5");

        let err = fixture
            .admin("CreateCredit", &["ORG7", "Grant", "1"])
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyExists);
    }

    #[tokio::test]
    async fn test_permission_denied_for_member_mint() {
        let fixture = Fixture::new();
        fixture.create_org("ORG1", "1").await;
        let err = fixture
            .call(
                IdentityFixtures::org_admin("ORG1"),
                "MintCredit",
                &["ORG1", "ORG1", "1", "x"],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PermissionDenied);
    }
}

// ============================================================================
// Organization Maintenance Tests
// ============================================================================

mod maintenance_tests {
    use super::*;

    #[tokio::test]
    async fn test_update_then_bind_key() {
        let fixture = Fixture::new();
        fixture.create_org("ORG1", "1").await;

        let org = payload(
            fixture
                .admin(
                    "UpdateOrg",
                    &["ORG1", "Renamed", "d", "office@org1.mn", "I2", "Inst2", "logo", "false"],
                )
                .await
                .unwrap(),
        );
        assert_eq!(org["name"], "Renamed");
        assert_eq!(org["email"], "office@org1.mn");
        assert_eq!(org["isActive"], false);

        let org = payload(
            fixture
                .admin("SetOrgPublicKey", &["ORG1", "ecdsa:P-384", KeyFixtures::P384_A])
                .await
                .unwrap(),
        );
        assert_eq!(org["pubKeyType"], "ecdsa:P-384");

        let err = fixture
            .admin("SetOrgPublicKey", &["ORG1", "ecdsa:P-384", KeyFixtures::P384_B])
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyBound);
    }

    #[tokio::test]
    async fn test_legacy_update_precondition() {
        let registry = OrganizationRegistry::default()
            .with_update_precondition(UpdatePrecondition::RejectExisting);
        let fixture = Fixture::with_registry(registry);
        fixture.create_org("ORG1", "1").await;

        let err = fixture
            .admin(
                "UpdateOrg",
                &["ORG1", "Renamed", "d", "", "I2", "Inst2", "logo", "true"],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyExists);
    }
}
