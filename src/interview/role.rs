//! Interview roles
//!
//! Each role is a closed variant carrying its own interviewer script, so
//! prompt dispatch is a `match` rather than a lookup that can miss.

use crate::prompts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The job persona being practiced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewRole {
    #[default]
    SoftwareEngineer,
    ProductManager,
    RetailAssociate,
    CustomerService,
    Sales,
    Healthcare,
    Teaching,
}

impl InterviewRole {
    pub const ALL: [InterviewRole; 7] = [
        InterviewRole::SoftwareEngineer,
        InterviewRole::ProductManager,
        InterviewRole::RetailAssociate,
        InterviewRole::CustomerService,
        InterviewRole::Sales,
        InterviewRole::Healthcare,
        InterviewRole::Teaching,
    ];

    /// Wire identifier (e.g. `software_engineer`)
    pub fn id(self) -> &'static str {
        match self {
            InterviewRole::SoftwareEngineer => "software_engineer",
            InterviewRole::ProductManager => "product_manager",
            InterviewRole::RetailAssociate => "retail_associate",
            InterviewRole::CustomerService => "customer_service",
            InterviewRole::Sales => "sales",
            InterviewRole::Healthcare => "healthcare",
            InterviewRole::Teaching => "teaching",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            InterviewRole::SoftwareEngineer => "Software Engineer",
            InterviewRole::ProductManager => "Product Manager",
            InterviewRole::RetailAssociate => "Retail Associate",
            InterviewRole::CustomerService => "Customer Service",
            InterviewRole::Sales => "Sales",
            InterviewRole::Healthcare => "Healthcare",
            InterviewRole::Teaching => "Teaching",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            InterviewRole::SoftwareEngineer => {
                "Practice technical interviews with questions on algorithms, system design, and coding challenges."
            }
            InterviewRole::ProductManager => {
                "Prepare for product sense, strategy, and execution questions commonly asked in PM interviews."
            }
            InterviewRole::RetailAssociate => {
                "Practice customer service scenarios, sales techniques, and handling difficult situations."
            }
            InterviewRole::CustomerService => {
                "Improve your communication skills and learn to handle customer complaints effectively."
            }
            InterviewRole::Sales => {
                "Master sales pitches, objection handling, and closing techniques through realistic scenarios."
            }
            InterviewRole::Healthcare => {
                "Prepare for healthcare interviews focusing on patient care, ethics, and clinical scenarios."
            }
            InterviewRole::Teaching => {
                "Practice answering questions about pedagogy, classroom management, and curriculum design."
            }
        }
    }

    /// The interviewer persona/script used as the system prompt
    pub fn script(self) -> &'static str {
        match self {
            InterviewRole::SoftwareEngineer => prompts::SOFTWARE_ENGINEER_SCRIPT,
            InterviewRole::ProductManager => prompts::PRODUCT_MANAGER_SCRIPT,
            InterviewRole::RetailAssociate => prompts::RETAIL_ASSOCIATE_SCRIPT,
            InterviewRole::CustomerService => prompts::CUSTOMER_SERVICE_SCRIPT,
            InterviewRole::Sales => prompts::SALES_SCRIPT,
            InterviewRole::Healthcare => prompts::HEALTHCARE_SCRIPT,
            InterviewRole::Teaching => prompts::TEACHING_SCRIPT,
        }
    }

    /// Human-readable role name for prompts (`software engineer`)
    pub fn spoken_name(self) -> String {
        self.id().replace('_', " ")
    }

    /// Parse a role id, falling back to `SoftwareEngineer` for anything unknown
    pub fn from_id_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for InterviewRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error for role ids outside the catalogue
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown interview role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for InterviewRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InterviewRole::ALL
            .into_iter()
            .find(|role| role.id() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
