//! PostgreSQL-backed dealership store

use super::models::*;
use super::Store;
use crate::auth::models::{Account, AccountChanges, AccountInfo, NewAccount, Role};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, Row};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL,
    active        BOOLEAN NOT NULL DEFAULT TRUE,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS cars (
    id            BIGSERIAL PRIMARY KEY,
    model         TEXT NOT NULL,
    manufacturer  TEXT NOT NULL,
    year          INTEGER NOT NULL,
    price         DOUBLE PRECISION NOT NULL,
    color         TEXT NOT NULL,
    license_plate TEXT NOT NULL,
    doors         INTEGER NOT NULL,
    transmission  TEXT NOT NULL,
    category      TEXT NOT NULL,
    photos        TEXT[] NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS customers (
    id            BIGSERIAL PRIMARY KEY,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    date_of_birth DATE NOT NULL,
    phone         TEXT NOT NULL,
    email         TEXT NOT NULL,
    address       TEXT NOT NULL,
    document      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS financing_partners (
    id              TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    logo            TEXT NOT NULL,
    description     TEXT NOT NULL,
    additional_info TEXT
);

CREATE TABLE IF NOT EXISTS financing_proposals (
    id               BIGSERIAL PRIMARY KEY,
    customer_name    TEXT NOT NULL,
    customer_surname TEXT NOT NULL,
    date_of_birth    DATE NOT NULL,
    document         TEXT NOT NULL,
    is_married       BOOLEAN NOT NULL DEFAULT FALSE,
    address          TEXT NOT NULL,
    proposal_value   DOUBLE PRECISION NOT NULL,
    status           TEXT NOT NULL DEFAULT 'pending',
    documents        TEXT[] NOT NULL DEFAULT '{}',
    proposal_date    TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

/// PostgreSQL dealership store
#[derive(Clone)]
pub struct PgStore {
    client: Arc<Client>,
}

impl PgStore {
    /// Connect to PostgreSQL and ensure the schema exists
    pub async fn connect(url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(url, tokio_postgres::NoTls).await?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        client.batch_execute(SCHEMA).await?;
        tracing::info!("Connected to PostgreSQL and verified schema");

        Ok(Self {
            client: Arc::new(client),
        })
    }

    fn account_from_row(row: &Row) -> Account {
        let role: String = row.get("role");
        Account {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            role: Role::parse(&role),
            active: row.get("active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn car_from_row(row: &Row) -> Car {
        Car {
            id: row.get("id"),
            model: row.get("model"),
            manufacturer: row.get("manufacturer"),
            year: row.get("year"),
            price: row.get("price"),
            color: row.get("color"),
            license_plate: row.get("license_plate"),
            doors: row.get("doors"),
            transmission: row.get("transmission"),
            category: row.get("category"),
            photos: row.get("photos"),
        }
    }

    fn customer_from_row(row: &Row) -> Customer {
        Customer {
            id: row.get("id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            date_of_birth: row.get("date_of_birth"),
            phone: row.get("phone"),
            email: row.get("email"),
            address: row.get("address"),
            document: row.get("document"),
        }
    }

    fn partner_from_row(row: &Row) -> FinancingPartner {
        FinancingPartner {
            id: row.get("id"),
            name: row.get("name"),
            logo: row.get("logo"),
            description: row.get("description"),
            additional_info: row.get("additional_info"),
        }
    }

    fn proposal_from_row(row: &Row) -> FinancingProposal {
        let status: String = row.get("status");
        FinancingProposal {
            id: row.get("id"),
            customer_name: row.get("customer_name"),
            customer_surname: row.get("customer_surname"),
            date_of_birth: row.get("date_of_birth"),
            document: row.get("document"),
            is_married: row.get("is_married"),
            address: row.get("address"),
            proposal_value: row.get("proposal_value"),
            status: ProposalStatus::parse(&status),
            documents: row.get("documents"),
            proposal_date: row.get("proposal_date"),
        }
    }
}

fn map_unique_violation(err: tokio_postgres::Error, email: &str) -> Error {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        Error::EmailInUse(email.to_string())
    } else {
        Error::Database(err)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = self
            .client
            .query_opt("SELECT * FROM accounts WHERE email = $1", &[&email])
            .await?;
        Ok(row.as_ref().map(Self::account_from_row))
    }

    async fn get_account(&self, id: &str) -> Result<Option<Account>> {
        let row = self
            .client
            .query_opt("SELECT * FROM accounts WHERE id = $1", &[&id])
            .await?;
        Ok(row.as_ref().map(Self::account_from_row))
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfo>> {
        let rows = self
            .client
            .query("SELECT * FROM accounts ORDER BY created_at", &[])
            .await?;
        Ok(rows
            .iter()
            .map(|r| Self::account_from_row(r).info())
            .collect())
    }

    async fn create_account(&self, new: NewAccount) -> Result<Account> {
        let id = Uuid::new_v4().to_string();
        let row = self
            .client
            .query_one(
                "INSERT INTO accounts (id, name, email, password_hash, role, active)
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
                &[
                    &id,
                    &new.name,
                    &new.email,
                    &new.password_hash,
                    &new.role.to_string(),
                    &new.active,
                ],
            )
            .await
            .map_err(|e| map_unique_violation(e, &new.email))?;
        Ok(Self::account_from_row(&row))
    }

    async fn update_account(&self, id: &str, changes: AccountChanges) -> Result<Account> {
        let current = self
            .get_account(id)
            .await?
            .ok_or_else(|| Error::NotFound("Account".to_string()))?;

        let name = changes.name.unwrap_or(current.name);
        let email = changes.email.unwrap_or(current.email);
        let password_hash = changes.password_hash.unwrap_or(current.password_hash);
        let role = changes.role.unwrap_or(current.role);
        let active = changes.active.unwrap_or(current.active);

        let row = self
            .client
            .query_one(
                "UPDATE accounts
                 SET name = $1, email = $2, password_hash = $3, role = $4, active = $5,
                     updated_at = $6
                 WHERE id = $7 RETURNING *",
                &[
                    &name,
                    &email,
                    &password_hash,
                    &role.to_string(),
                    &active,
                    &Utc::now(),
                    &id,
                ],
            )
            .await
            .map_err(|e| map_unique_violation(e, &email))?;
        Ok(Self::account_from_row(&row))
    }

    async fn delete_account(&self, id: &str) -> Result<()> {
        let affected = self
            .client
            .execute("DELETE FROM accounts WHERE id = $1", &[&id])
            .await?;
        if affected == 0 {
            return Err(Error::NotFound("Account".to_string()));
        }
        Ok(())
    }

    async fn list_cars(&self) -> Result<Vec<Car>> {
        let rows = self
            .client
            .query("SELECT * FROM cars ORDER BY id", &[])
            .await?;
        Ok(rows.iter().map(Self::car_from_row).collect())
    }

    async fn get_car(&self, id: i64) -> Result<Option<Car>> {
        let row = self
            .client
            .query_opt("SELECT * FROM cars WHERE id = $1", &[&id])
            .await?;
        Ok(row.as_ref().map(Self::car_from_row))
    }

    async fn create_car(&self, fields: CarFields, photos: Vec<String>) -> Result<Car> {
        let row = self
            .client
            .query_one(
                "INSERT INTO cars (model, manufacturer, year, price, color, license_plate,
                                   doors, transmission, category, photos)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
                &[
                    &fields.model,
                    &fields.manufacturer,
                    &fields.year,
                    &fields.price,
                    &fields.color,
                    &fields.license_plate,
                    &fields.doors,
                    &fields.transmission,
                    &fields.category,
                    &photos,
                ],
            )
            .await?;
        Ok(Self::car_from_row(&row))
    }

    async fn update_car(&self, id: i64, fields: CarFields, photos: Vec<String>) -> Result<Car> {
        let row = self
            .client
            .query_opt(
                "UPDATE cars
                 SET model = $1, manufacturer = $2, year = $3, price = $4, color = $5,
                     license_plate = $6, doors = $7, transmission = $8, category = $9,
                     photos = $10
                 WHERE id = $11 RETURNING *",
                &[
                    &fields.model,
                    &fields.manufacturer,
                    &fields.year,
                    &fields.price,
                    &fields.color,
                    &fields.license_plate,
                    &fields.doors,
                    &fields.transmission,
                    &fields.category,
                    &photos,
                    &id,
                ],
            )
            .await?;
        row.as_ref()
            .map(Self::car_from_row)
            .ok_or_else(|| Error::NotFound("Car".to_string()))
    }

    async fn delete_car(&self, id: i64) -> Result<()> {
        let affected = self
            .client
            .execute("DELETE FROM cars WHERE id = $1", &[&id])
            .await?;
        if affected == 0 {
            return Err(Error::NotFound("Car".to_string()));
        }
        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows = self
            .client
            .query("SELECT * FROM customers ORDER BY id", &[])
            .await?;
        Ok(rows.iter().map(Self::customer_from_row).collect())
    }

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        let row = self
            .client
            .query_opt("SELECT * FROM customers WHERE id = $1", &[&id])
            .await?;
        Ok(row.as_ref().map(Self::customer_from_row))
    }

    async fn create_customer(&self, fields: CustomerFields) -> Result<Customer> {
        let row = self
            .client
            .query_one(
                "INSERT INTO customers (first_name, last_name, date_of_birth, phone, email,
                                        address, document)
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
                &[
                    &fields.first_name,
                    &fields.last_name,
                    &fields.date_of_birth,
                    &fields.phone,
                    &fields.email,
                    &fields.address,
                    &fields.document,
                ],
            )
            .await?;
        Ok(Self::customer_from_row(&row))
    }

    async fn update_customer(&self, id: i64, fields: CustomerFields) -> Result<Customer> {
        let row = self
            .client
            .query_opt(
                "UPDATE customers
                 SET first_name = $1, last_name = $2, date_of_birth = $3, phone = $4,
                     email = $5, address = $6, document = $7
                 WHERE id = $8 RETURNING *",
                &[
                    &fields.first_name,
                    &fields.last_name,
                    &fields.date_of_birth,
                    &fields.phone,
                    &fields.email,
                    &fields.address,
                    &fields.document,
                    &id,
                ],
            )
            .await?;
        row.as_ref()
            .map(Self::customer_from_row)
            .ok_or_else(|| Error::NotFound("Customer".to_string()))
    }

    async fn delete_customer(&self, id: i64) -> Result<()> {
        let affected = self
            .client
            .execute("DELETE FROM customers WHERE id = $1", &[&id])
            .await?;
        if affected == 0 {
            return Err(Error::NotFound("Customer".to_string()));
        }
        Ok(())
    }

    async fn list_partners(&self) -> Result<Vec<FinancingPartner>> {
        let rows = self
            .client
            .query("SELECT * FROM financing_partners ORDER BY name", &[])
            .await?;
        Ok(rows.iter().map(Self::partner_from_row).collect())
    }

    async fn get_partner(&self, id: &str) -> Result<Option<FinancingPartner>> {
        let row = self
            .client
            .query_opt("SELECT * FROM financing_partners WHERE id = $1", &[&id])
            .await?;
        Ok(row.as_ref().map(Self::partner_from_row))
    }

    async fn create_partner(&self, partner: FinancingPartner) -> Result<FinancingPartner> {
        let row = self
            .client
            .query_one(
                "INSERT INTO financing_partners (id, name, logo, description, additional_info)
                 VALUES ($1, $2, $3, $4, $5) RETURNING *",
                &[
                    &partner.id,
                    &partner.name,
                    &partner.logo,
                    &partner.description,
                    &partner.additional_info,
                ],
            )
            .await?;
        Ok(Self::partner_from_row(&row))
    }

    async fn update_partner(&self, id: &str, changes: PartnerChanges) -> Result<FinancingPartner> {
        let row = self
            .client
            .query_opt(
                "UPDATE financing_partners
                 SET name = $1, description = $2, additional_info = $3,
                     logo = COALESCE($4, logo)
                 WHERE id = $5 RETURNING *",
                &[
                    &changes.name,
                    &changes.description,
                    &changes.additional_info,
                    &changes.logo,
                    &id,
                ],
            )
            .await?;
        row.as_ref()
            .map(Self::partner_from_row)
            .ok_or_else(|| Error::NotFound("Financing partner".to_string()))
    }

    async fn delete_partner(&self, id: &str) -> Result<()> {
        let affected = self
            .client
            .execute("DELETE FROM financing_partners WHERE id = $1", &[&id])
            .await?;
        if affected == 0 {
            return Err(Error::NotFound("Financing partner".to_string()));
        }
        Ok(())
    }

    async fn list_proposals(&self) -> Result<Vec<FinancingProposal>> {
        let rows = self
            .client
            .query("SELECT * FROM financing_proposals ORDER BY id", &[])
            .await?;
        Ok(rows.iter().map(Self::proposal_from_row).collect())
    }

    async fn get_proposal(&self, id: i64) -> Result<Option<FinancingProposal>> {
        let row = self
            .client
            .query_opt("SELECT * FROM financing_proposals WHERE id = $1", &[&id])
            .await?;
        Ok(row.as_ref().map(Self::proposal_from_row))
    }

    async fn create_proposal(&self, fields: ProposalFields) -> Result<FinancingProposal> {
        let row = self
            .client
            .query_one(
                "INSERT INTO financing_proposals
                     (customer_name, customer_surname, date_of_birth, document, is_married,
                      address, proposal_value, documents)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
                &[
                    &fields.customer_name,
                    &fields.customer_surname,
                    &fields.date_of_birth,
                    &fields.document,
                    &fields.is_married,
                    &fields.address,
                    &fields.proposal_value,
                    &fields.documents,
                ],
            )
            .await?;
        Ok(Self::proposal_from_row(&row))
    }

    async fn update_proposal(
        &self,
        id: i64,
        fields: ProposalFields,
        status: ProposalStatus,
    ) -> Result<FinancingProposal> {
        let row = self
            .client
            .query_opt(
                "UPDATE financing_proposals
                 SET customer_name = $1, customer_surname = $2, date_of_birth = $3,
                     document = $4, is_married = $5, address = $6, proposal_value = $7,
                     documents = $8, status = $9
                 WHERE id = $10 RETURNING *",
                &[
                    &fields.customer_name,
                    &fields.customer_surname,
                    &fields.date_of_birth,
                    &fields.document,
                    &fields.is_married,
                    &fields.address,
                    &fields.proposal_value,
                    &fields.documents,
                    &status.to_string(),
                    &id,
                ],
            )
            .await?;
        row.as_ref()
            .map(Self::proposal_from_row)
            .ok_or_else(|| Error::NotFound("Financing proposal".to_string()))
    }

    async fn delete_proposal(&self, id: i64) -> Result<()> {
        let affected = self
            .client
            .execute("DELETE FROM financing_proposals WHERE id = $1", &[&id])
            .await?;
        if affected == 0 {
            return Err(Error::NotFound("Financing proposal".to_string()));
        }
        Ok(())
    }
}
