//! Persistence layer for dealership data
//!
//! The [`Store`] trait is the contract every handler talks through. The
//! production backend is PostgreSQL ([`PgStore`]); [`MemoryStore`] backs tests
//! and `serve --memory`. The store never hands out password hashes except via
//! the full [`Account`] record consumed by the credential verifier and the
//! account-management handlers.

pub mod memory;
mod models;
pub mod postgres;

pub use memory::MemoryStore;
pub use models::*;
pub use postgres::PgStore;

use crate::auth::models::{Account, AccountChanges, AccountInfo, NewAccount};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Store: Send + Sync {
    // Accounts

    /// Look up an account by (already lowercased) email
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn get_account(&self, id: &str) -> Result<Option<Account>>;
    async fn list_accounts(&self) -> Result<Vec<AccountInfo>>;
    /// Fails with `EmailInUse` if the email is already registered
    async fn create_account(&self, new: NewAccount) -> Result<Account>;
    /// Applies only the fields set in `changes`; absent fields keep their value
    async fn update_account(&self, id: &str, changes: AccountChanges) -> Result<Account>;
    async fn delete_account(&self, id: &str) -> Result<()>;

    // Cars

    async fn list_cars(&self) -> Result<Vec<Car>>;
    async fn get_car(&self, id: i64) -> Result<Option<Car>>;
    async fn create_car(&self, fields: CarFields, photos: Vec<String>) -> Result<Car>;
    /// Replaces the listing fields and the full photo set
    async fn update_car(&self, id: i64, fields: CarFields, photos: Vec<String>) -> Result<Car>;
    async fn delete_car(&self, id: i64) -> Result<()>;

    // Customers

    async fn list_customers(&self) -> Result<Vec<Customer>>;
    async fn get_customer(&self, id: i64) -> Result<Option<Customer>>;
    async fn create_customer(&self, fields: CustomerFields) -> Result<Customer>;
    async fn update_customer(&self, id: i64, fields: CustomerFields) -> Result<Customer>;
    async fn delete_customer(&self, id: i64) -> Result<()>;

    // Financing partners

    async fn list_partners(&self) -> Result<Vec<FinancingPartner>>;
    async fn get_partner(&self, id: &str) -> Result<Option<FinancingPartner>>;
    async fn create_partner(&self, partner: FinancingPartner) -> Result<FinancingPartner>;
    async fn update_partner(&self, id: &str, changes: PartnerChanges) -> Result<FinancingPartner>;
    async fn delete_partner(&self, id: &str) -> Result<()>;

    // Financing proposals

    async fn list_proposals(&self) -> Result<Vec<FinancingProposal>>;
    async fn get_proposal(&self, id: i64) -> Result<Option<FinancingProposal>>;
    async fn create_proposal(&self, fields: ProposalFields) -> Result<FinancingProposal>;
    async fn update_proposal(
        &self,
        id: i64,
        fields: ProposalFields,
        status: ProposalStatus,
    ) -> Result<FinancingProposal>;
    async fn delete_proposal(&self, id: i64) -> Result<()>;
}
