//! Pre-built Test Fixtures
//!
//! Provides ready-to-use identities, timestamps, public keys and
//! organization arguments. The identities match `AccessPolicy::default()`.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::CallerIdentity;
use domain_org::{NewOrganization, OrganizationUpdate};

/// Issuing authority of super-admins under the default policy
pub const ADMIN_MSP: &str = "LedgerAdminMSP";
/// Issuing authority of organization members
pub const MEMBER_MSP: &str = "Org1MSP";

/// Fixture for caller identities
pub struct IdentityFixtures;

impl IdentityFixtures {
    /// Platform super-admin
    pub fn super_admin() -> CallerIdentity {
        CallerIdentity::new(ADMIN_MSP).with_attribute("admin", "true")
    }

    /// Admin claim issued by the wrong authority
    pub fn foreign_admin() -> CallerIdentity {
        CallerIdentity::new(MEMBER_MSP).with_attribute("admin", "true")
    }

    /// Admin of one organization
    pub fn org_admin(org_id: &str) -> CallerIdentity {
        CallerIdentity::new(MEMBER_MSP)
            .with_attribute("org.id", org_id)
            .with_attribute("org.role", "admin")
    }

    /// Non-admin member of one organization
    pub fn org_member(org_id: &str) -> CallerIdentity {
        CallerIdentity::new(MEMBER_MSP)
            .with_attribute("org.id", org_id)
            .with_attribute("org.role", "viewer")
    }

    /// Identity with no attributes at all
    pub fn anonymous() -> CallerIdentity {
        CallerIdentity::new(MEMBER_MSP)
    }
}

/// Fixture for ledger time
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Time of the first transaction in a test ledger
    pub fn genesis() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }
}

/// Fixture for public keys
pub struct KeyFixtures;

impl KeyFixtures {
    pub const P384_A: &'static str = "-----BEGIN PUBLIC KEY-----
MHYwEAYHKoZIzj0CAQYFK4EEACIDYgAE/SfBOey7zQ7S9Vuwutc//B43P7Htu5ev
9SemiLACOKsvt52c1Rav4aIrnmk74OP6hUiJGejMrkV4434ZlkoYKM1NuH6xxCWf
CgIgSnITB7afyRveAmpuI2x/ICw7dr5K
-----END PUBLIC KEY-----
";

    pub const P384_B: &'static str = "-----BEGIN PUBLIC KEY-----
MHYwEAYHKoZIzj0CAQYFK4EEACIDYgAE6L8Xt/6SnbWpcDiioEgd4MZYesyBdXhm
z5zXUAymClCAYn7987Ou3m+VsQa9NTx04WcO17UXO4f0Ig45FyG7jJNKfgQzy05W
nWc8b6Uy6WLCwS+RMU9JCXQB3XwHF+ly
-----END PUBLIC KEY-----
";

    /// A valid key on the wrong curve
    pub const P256: &'static str = "-----BEGIN PUBLIC KEY-----
MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE6EpgYOMkHNNpobHcxf9DNY30OKdU
f9CRG40mHCf8s4b6gwlsLugNnoXzHNQ2DqRWwFvDw7qjhaxP6VDTSRffFQ==
-----END PUBLIC KEY-----
";
}

/// Fixture for organization arguments
pub struct OrgFixtures;

impl OrgFixtures {
    /// Registration arguments with the given opening balance
    pub fn new_org(id: &str, initial_credit: &str) -> NewOrganization {
        NewOrganization {
            id: id.to_string(),
            name: format!("{} University", id),
            desc: "Degree-issuing institution".to_string(),
            institution_id: format!("INST-{}", id),
            institution_name: "Ministry of Education".to_string(),
            logo_url: format!("https://cdn.example.org/{}.png", id.to_lowercase()),
            initial_credit: initial_credit.to_string(),
            credit_title: "Main".to_string(),
            is_active: true,
        }
    }

    /// A valid update of every mutable field
    pub fn update(id: &str) -> OrganizationUpdate {
        OrganizationUpdate {
            id: id.to_string(),
            name: format!("{} Institute", id),
            desc: "Renamed institution".to_string(),
            email: Some(format!("registrar@{}.edu.mn", id.to_lowercase())),
            institution_id: format!("INST-{}-2", id),
            institution_name: "Ministry of Science".to_string(),
            logo_url: String::new(),
            is_active: false,
        }
    }
}
