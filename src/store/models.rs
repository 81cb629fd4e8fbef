//! Dealership entity models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vehicle listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub model: String,
    pub manufacturer: String,
    pub year: i32,
    pub price: f64,
    pub color: String,
    pub license_plate: String,
    pub doors: i32,
    pub transmission: String,
    pub category: String,
    /// Relative URLs under the public web root
    pub photos: Vec<String>,
}

/// Fields for creating or replacing a vehicle listing (photos handled separately)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarFields {
    pub model: String,
    pub manufacturer: String,
    pub year: i32,
    pub price: f64,
    pub color: String,
    pub license_plate: String,
    pub doors: i32,
    pub transmission: String,
    pub category: String,
}

impl CarFields {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.model.trim().is_empty() || self.manufacturer.trim().is_empty() {
            return Err(crate::error::Error::Validation(
                "Missing required fields".to_string(),
            ));
        }
        if self.year < 1900 {
            return Err(crate::error::Error::Validation(
                "Invalid model year".to_string(),
            ));
        }
        Ok(())
    }
}

/// A dealership customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub document: String,
}

/// Fields for creating or replacing a customer record
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerFields {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub document: String,
}

impl CustomerFields {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.first_name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(crate::error::Error::Validation(
                "Missing required fields".to_string(),
            ));
        }
        Ok(())
    }
}

/// A financing partner shown on the marketing site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingPartner {
    pub id: String,
    pub name: String,
    /// Relative URL of the uploaded logo
    pub logo: String,
    pub description: String,
    pub additional_info: Option<String>,
}

/// Partner update payload; an absent logo keeps the stored one
#[derive(Debug, Clone)]
pub struct PartnerChanges {
    pub name: String,
    pub description: String,
    pub additional_info: Option<String>,
    pub logo: Option<String>,
}

/// Review state of a financing proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalStatus::Pending => write!(f, "pending"),
            ProposalStatus::Approved => write!(f, "approved"),
            ProposalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl ProposalStatus {
    pub fn parse(s: &str) -> ProposalStatus {
        match s {
            "approved" => ProposalStatus::Approved,
            "rejected" => ProposalStatus::Rejected,
            _ => ProposalStatus::Pending,
        }
    }
}

/// A financing proposal submitted from the public financing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingProposal {
    pub id: i64,
    pub customer_name: String,
    pub customer_surname: String,
    pub date_of_birth: NaiveDate,
    pub document: String,
    pub is_married: bool,
    pub address: String,
    pub proposal_value: f64,
    pub status: ProposalStatus,
    /// Relative URLs of supporting documents
    pub documents: Vec<String>,
    pub proposal_date: DateTime<Utc>,
}

/// Fields for submitting a financing proposal
#[derive(Debug, Clone, Deserialize)]
pub struct ProposalFields {
    pub customer_name: String,
    pub customer_surname: String,
    pub date_of_birth: NaiveDate,
    pub document: String,
    #[serde(default)]
    pub is_married: bool,
    pub address: String,
    pub proposal_value: f64,
    #[serde(default)]
    pub documents: Vec<String>,
}

impl ProposalFields {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.customer_name.trim().is_empty() || self.document.trim().is_empty() {
            return Err(crate::error::Error::Validation(
                "Missing required fields".to_string(),
            ));
        }
        if self.proposal_value <= 0.0 {
            return Err(crate::error::Error::Validation(
                "Proposal value must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
