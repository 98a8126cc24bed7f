//! Organization Domain - Organization registry
//!
//! This crate manages the organizations that hold credit on the ledger.
//!
//! # Lifecycle
//!
//! - **Registration** (super-admin): stores the organization and opens its
//!   credit account in the same transaction
//! - **Update** (super-admin): replaces descriptive fields and the active flag
//! - **Key binding** (super-admin): binds one ECDSA P-384 public key, once
//! - Organizations are never deleted
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_org::{NewOrganization, OrganizationRegistry};
//!
//! let registry = OrganizationRegistry::new(policy);
//! let org = registry.create(&ctx, &tx, &new_org).await?;
//! registry.bind_public_key(&ctx, &tx, &org.id, "ecdsa:P-384", pem).await?;
//! ```

pub mod error;
pub mod organization;
pub mod public_key;
pub mod registry;

pub use error::OrgError;
pub use organization::{NewOrganization, Organization, OrganizationUpdate, ORGANIZATION_DOC_TYPE};
pub use public_key::SUPPORTED_KEY_TYPE;
pub use registry::{OrganizationRegistry, UpdatePrecondition};
