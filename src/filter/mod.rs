pub mod magnitude;
pub mod matcher;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::record::LeadRecord;

pub use magnitude::parse_magnitude;
pub use matcher::{clean_domain, domain_matches, matches};

/// User-supplied constraints for one query. Every dimension left empty is
/// unconstrained; configured dimensions are AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub contact_job_title: Vec<String>,
    pub contact_not_job_title: Vec<String>,
    pub seniority_level: Vec<String>,
    pub functional_level: Vec<String>,
    /// Matched against the record's country.
    pub contact_location: Vec<String>,
    pub contact_not_location: Vec<String>,
    pub contact_city: Vec<String>,
    pub contact_not_city: Vec<String>,
    pub email_status: Vec<String>,
    pub company_domain: Vec<String>,
    pub size: Vec<String>,
    pub company_industry: Vec<String>,
    pub company_not_industry: Vec<String>,
    /// Matched against the company description.
    pub company_keywords: Vec<String>,
    pub company_not_keywords: Vec<String>,
    pub min_revenue: Option<String>,
    pub max_revenue: Option<String>,
    pub funding: Vec<String>,
}

impl FilterSpec {
    /// True when no dimension is configured.
    pub fn is_empty(&self) -> bool {
        self.fuzzy_dimensions()
            .iter()
            .all(|(_, inc, exc)| inc.is_empty() && exc.is_empty())
            && self.exact_dimensions().iter().all(|(_, set)| set.is_empty())
            && self.company_domain.is_empty()
            && blank(&self.min_revenue)
            && blank(&self.max_revenue)
    }

    fn fuzzy_dimensions<'a>(&'a self) -> [(&'static str, &'a [String], &'a [String]); 5] {
        [
            ("job_title", self.contact_job_title.as_slice(), self.contact_not_job_title.as_slice()),
            ("location", self.contact_location.as_slice(), self.contact_not_location.as_slice()),
            ("city", self.contact_city.as_slice(), self.contact_not_city.as_slice()),
            ("industry", self.company_industry.as_slice(), self.company_not_industry.as_slice()),
            ("keywords", self.company_keywords.as_slice(), self.company_not_keywords.as_slice()),
        ]
    }

    fn exact_dimensions(&self) -> [(&'static str, &[String]); 5] {
        [
            ("seniority_level", self.seniority_level.as_slice()),
            ("functional_level", self.functional_level.as_slice()),
            ("email_status", self.email_status.as_slice()),
            ("funding", self.funding.as_slice()),
            ("size", self.size.as_slice()),
        ]
    }
}

fn blank(bound: &Option<String>) -> bool {
    bound.as_deref().map_or(true, str::is_empty)
}

/// Evaluate `record` against every configured dimension of `spec`.
pub fn accepts(record: &LeadRecord, spec: &FilterSpec) -> bool {
    let fuzzy_values = [
        record.job_title.as_str(),
        record.country.as_str(),
        record.city.as_str(),
        record.industry.as_str(),
        record.company_description.as_str(),
    ];
    for ((name, include, exclude), value) in spec.fuzzy_dimensions().into_iter().zip(fuzzy_values) {
        // Both passes run independently: the include pass honours the
        // exclude list too, then the exclude list is checked on its own.
        if !include.is_empty() && !matches(value, include, exclude) {
            trace!(dimension = name, value, "include filter rejected");
            return false;
        }
        if !exclude.is_empty() && !matches::<String>(value, &[], exclude) {
            trace!(dimension = name, value, "exclude filter rejected");
            return false;
        }
    }

    let exact_values = [
        record.seniority_level.as_str(),
        record.functional_level.as_str(),
        record.email_status.as_str(),
        record.company_funding_stage.as_str(),
        record.company_size.as_str(),
    ];
    for ((name, allowed), value) in spec.exact_dimensions().into_iter().zip(exact_values) {
        if !allowed.is_empty() && !allowed.iter().any(|a| a == value) {
            trace!(dimension = name, value, "not in allowed set");
            return false;
        }
    }

    if !spec.company_domain.is_empty()
        && !domain_matches(&record.company_domain, &spec.company_domain)
    {
        trace!(domain = %record.company_domain, "domain filter rejected");
        return false;
    }

    revenue_in_range(record.company_annual_revenue_clean, spec)
}

/// Unparseable bounds are ignored. A record without a resolved revenue has
/// nothing to compare and passes.
fn revenue_in_range(revenue: Option<f64>, spec: &FilterSpec) -> bool {
    let Some(revenue) = revenue else {
        return true;
    };
    let min = spec.min_revenue.as_deref().and_then(parse_magnitude);
    let max = spec.max_revenue.as_deref().and_then(parse_magnitude);
    if min.is_some_and(|min| revenue < min) {
        return false;
    }
    if max.is_some_and(|max| revenue > max) {
        return false;
    }
    true
}

/// Filter a batch in parallel, keeping accepted records in input order.
pub fn filter_batch(records: Vec<LeadRecord>, spec: &FilterSpec) -> Vec<LeadRecord> {
    records
        .into_par_iter()
        .filter(|r| accepts(r, spec))
        .collect()
}

// ── Tests ──
