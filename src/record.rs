use serde::{Deserialize, Serialize};

use crate::filter::parse_magnitude;

/// One lead as produced by the generator or an upstream scraper.
/// Missing text attributes deserialize to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub job_title: String,
    pub seniority_level: String,
    pub functional_level: String,
    pub city: String,
    pub country: String,
    pub company_name: String,
    pub company_domain: String,
    pub industry: String,
    pub company_description: String,
    pub email_status: String,
    pub company_size: String,
    pub company_funding_stage: String,
    /// Raw revenue as shown to users, e.g. `"10M"`.
    pub company_annual_revenue: String,
    pub company_annual_revenue_clean: Option<f64>,
}

impl LeadRecord {
    /// Fill `company_annual_revenue_clean` from the raw revenue string if it
    /// isn't set yet. Returns the resolved value.
    pub fn resolve_revenue(&mut self) -> Option<f64> {
        if self.company_annual_revenue_clean.is_none() {
            self.company_annual_revenue_clean = parse_magnitude(&self.company_annual_revenue);
        }
        self.company_annual_revenue_clean
    }
}
