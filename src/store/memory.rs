//! In-memory store backing tests and `serve --memory`

use super::models::*;
use super::Store;
use crate::auth::models::{Account, AccountChanges, AccountInfo, NewAccount};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    cars: HashMap<i64, Car>,
    customers: HashMap<i64, Customer>,
    partners: HashMap<String, FinancingPartner>,
    proposals: HashMap<i64, FinancingProposal>,
    next_car_id: i64,
    next_customer_id: i64,
    next_proposal_id: i64,
}

/// In-memory dealership store
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn get_account(&self, id: &str) -> Result<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.get(id).cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfo>> {
        let inner = self.inner.read().await;
        let mut accounts: Vec<AccountInfo> = inner.accounts.values().map(Account::info).collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(accounts)
    }

    async fn create_account(&self, new: NewAccount) -> Result<Account> {
        let mut inner = self.inner.write().await;
        if inner.accounts.values().any(|a| a.email == new.email) {
            return Err(Error::EmailInUse(new.email));
        }
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            active: new.active,
            created_at: now,
            updated_at: now,
        };
        inner.accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn update_account(&self, id: &str, changes: AccountChanges) -> Result<Account> {
        let mut inner = self.inner.write().await;
        if let Some(email) = &changes.email {
            if inner
                .accounts
                .values()
                .any(|a| a.email == *email && a.id != id)
            {
                return Err(Error::EmailInUse(email.clone()));
            }
        }
        let account = inner
            .accounts
            .get_mut(id)
            .ok_or_else(|| Error::NotFound("Account".to_string()))?;
        if let Some(name) = changes.name {
            account.name = name;
        }
        if let Some(email) = changes.email {
            account.email = email;
        }
        if let Some(hash) = changes.password_hash {
            account.password_hash = hash;
        }
        if let Some(role) = changes.role {
            account.role = role;
        }
        if let Some(active) = changes.active {
            account.active = active;
        }
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn delete_account(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .accounts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound("Account".to_string()))
    }

    async fn list_cars(&self) -> Result<Vec<Car>> {
        let inner = self.inner.read().await;
        let mut cars: Vec<Car> = inner.cars.values().cloned().collect();
        cars.sort_by_key(|c| c.id);
        Ok(cars)
    }

    async fn get_car(&self, id: i64) -> Result<Option<Car>> {
        let inner = self.inner.read().await;
        Ok(inner.cars.get(&id).cloned())
    }

    async fn create_car(&self, fields: CarFields, photos: Vec<String>) -> Result<Car> {
        let mut inner = self.inner.write().await;
        inner.next_car_id += 1;
        let car = Car {
            id: inner.next_car_id,
            model: fields.model,
            manufacturer: fields.manufacturer,
            year: fields.year,
            price: fields.price,
            color: fields.color,
            license_plate: fields.license_plate,
            doors: fields.doors,
            transmission: fields.transmission,
            category: fields.category,
            photos,
        };
        inner.cars.insert(car.id, car.clone());
        Ok(car)
    }

    async fn update_car(&self, id: i64, fields: CarFields, photos: Vec<String>) -> Result<Car> {
        let mut inner = self.inner.write().await;
        let car = inner
            .cars
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Car".to_string()))?;
        car.model = fields.model;
        car.manufacturer = fields.manufacturer;
        car.year = fields.year;
        car.price = fields.price;
        car.color = fields.color;
        car.license_plate = fields.license_plate;
        car.doors = fields.doors;
        car.transmission = fields.transmission;
        car.category = fields.category;
        car.photos = photos;
        Ok(car.clone())
    }

    async fn delete_car(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .cars
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound("Car".to_string()))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        let inner = self.inner.read().await;
        let mut customers: Vec<Customer> = inner.customers.values().cloned().collect();
        customers.sort_by_key(|c| c.id);
        Ok(customers)
    }

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        let inner = self.inner.read().await;
        Ok(inner.customers.get(&id).cloned())
    }

    async fn create_customer(&self, fields: CustomerFields) -> Result<Customer> {
        let mut inner = self.inner.write().await;
        inner.next_customer_id += 1;
        let customer = Customer {
            id: inner.next_customer_id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            date_of_birth: fields.date_of_birth,
            phone: fields.phone,
            email: fields.email,
            address: fields.address,
            document: fields.document,
        };
        inner.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update_customer(&self, id: i64, fields: CustomerFields) -> Result<Customer> {
        let mut inner = self.inner.write().await;
        let customer = inner
            .customers
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Customer".to_string()))?;
        customer.first_name = fields.first_name;
        customer.last_name = fields.last_name;
        customer.date_of_birth = fields.date_of_birth;
        customer.phone = fields.phone;
        customer.email = fields.email;
        customer.address = fields.address;
        customer.document = fields.document;
        Ok(customer.clone())
    }

    async fn delete_customer(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .customers
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound("Customer".to_string()))
    }

    async fn list_partners(&self) -> Result<Vec<FinancingPartner>> {
        let inner = self.inner.read().await;
        let mut partners: Vec<FinancingPartner> = inner.partners.values().cloned().collect();
        partners.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(partners)
    }

    async fn get_partner(&self, id: &str) -> Result<Option<FinancingPartner>> {
        let inner = self.inner.read().await;
        Ok(inner.partners.get(id).cloned())
    }

    async fn create_partner(&self, partner: FinancingPartner) -> Result<FinancingPartner> {
        let mut inner = self.inner.write().await;
        inner.partners.insert(partner.id.clone(), partner.clone());
        Ok(partner)
    }

    async fn update_partner(&self, id: &str, changes: PartnerChanges) -> Result<FinancingPartner> {
        let mut inner = self.inner.write().await;
        let partner = inner
            .partners
            .get_mut(id)
            .ok_or_else(|| Error::NotFound("Financing partner".to_string()))?;
        partner.name = changes.name;
        partner.description = changes.description;
        partner.additional_info = changes.additional_info;
        if let Some(logo) = changes.logo {
            partner.logo = logo;
        }
        Ok(partner.clone())
    }

    async fn delete_partner(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .partners
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound("Financing partner".to_string()))
    }

    async fn list_proposals(&self) -> Result<Vec<FinancingProposal>> {
        let inner = self.inner.read().await;
        let mut proposals: Vec<FinancingProposal> = inner.proposals.values().cloned().collect();
        proposals.sort_by_key(|p| p.id);
        Ok(proposals)
    }

    async fn get_proposal(&self, id: i64) -> Result<Option<FinancingProposal>> {
        let inner = self.inner.read().await;
        Ok(inner.proposals.get(&id).cloned())
    }

    async fn create_proposal(&self, fields: ProposalFields) -> Result<FinancingProposal> {
        let mut inner = self.inner.write().await;
        inner.next_proposal_id += 1;
        let proposal = FinancingProposal {
            id: inner.next_proposal_id,
            customer_name: fields.customer_name,
            customer_surname: fields.customer_surname,
            date_of_birth: fields.date_of_birth,
            document: fields.document,
            is_married: fields.is_married,
            address: fields.address,
            proposal_value: fields.proposal_value,
            status: ProposalStatus::Pending,
            documents: fields.documents,
            proposal_date: Utc::now(),
        };
        inner.proposals.insert(proposal.id, proposal.clone());
        Ok(proposal)
    }

    async fn update_proposal(
        &self,
        id: i64,
        fields: ProposalFields,
        status: ProposalStatus,
    ) -> Result<FinancingProposal> {
        let mut inner = self.inner.write().await;
        let proposal = inner
            .proposals
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Financing proposal".to_string()))?;
        proposal.customer_name = fields.customer_name;
        proposal.customer_surname = fields.customer_surname;
        proposal.date_of_birth = fields.date_of_birth;
        proposal.document = fields.document;
        proposal.is_married = fields.is_married;
        proposal.address = fields.address;
        proposal.proposal_value = fields.proposal_value;
        proposal.documents = fields.documents;
        proposal.status = status;
        Ok(proposal.clone())
    }

    async fn delete_proposal(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .proposals
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound("Financing proposal".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_account() {
        let store = MemoryStore::new();
        let created = store
            .create_account(new_account("alice@example.com"))
            .await
            .unwrap();

        let found = store
            .find_account_by_email("alice@example.com")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, created.id);
        assert!(store
            .find_account_by_email("bob@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store
            .create_account(new_account("alice@example.com"))
            .await
            .unwrap();
        let err = store
            .create_account(new_account("alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmailInUse(_)));

        // the failed create must not have mutated the store
        assert_eq!(store.list_accounts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_without_password_keeps_hash() {
        let store = MemoryStore::new();
        let account = store
            .create_account(new_account("alice@example.com"))
            .await
            .unwrap();

        let updated = store
            .update_account(
                &account.id,
                AccountChanges {
                    name: Some("Alice".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Alice");
        assert_eq!(updated.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_car_crud() {
        let store = MemoryStore::new();
        let fields = CarFields {
            model: "Civic".to_string(),
            manufacturer: "Honda".to_string(),
            year: 2020,
            price: 110_000.0,
            color: "Black".to_string(),
            license_plate: "XYZ9A87".to_string(),
            doors: 4,
            transmission: "manual".to_string(),
            category: "sedan".to_string(),
        };
        let car = store
            .create_car(fields.clone(), vec!["/uploads/1-a.jpg".to_string()])
            .await
            .unwrap();
        assert_eq!(car.id, 1);

        let updated = store
            .update_car(car.id, fields, vec!["/uploads/2-b.jpg".to_string()])
            .await
            .unwrap();
        // photos are replaced wholesale on update
        assert_eq!(updated.photos, vec!["/uploads/2-b.jpg".to_string()]);

        store.delete_car(car.id).await.unwrap();
        assert!(store.get_car(car.id).await.unwrap().is_none());
    }
}
