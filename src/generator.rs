use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::filter::{accepts, parse_magnitude, FilterSpec};
use crate::record::LeadRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEntry {
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryEntry {
    pub name: String,
    /// Description templates; `{company}` is replaced with the company name.
    pub descriptions: Vec<String>,
}

/// Lookup tables the generator draws from. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleTables {
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
    /// (job title, seniority level, functional level)
    pub titles: Vec<(String, String, String)>,
    pub cities: Vec<CityEntry>,
    pub industries: Vec<IndustryEntry>,
    pub company_stems: Vec<String>,
    pub company_suffixes: Vec<String>,
    pub tlds: Vec<String>,
    pub email_statuses: Vec<String>,
    pub company_sizes: Vec<String>,
    pub funding_stages: Vec<String>,
    pub revenues: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SampleTables {
    fn default() -> Self {
        let titles = [
            ("Chief Executive Officer", "c_suite", "executive"),
            ("Chief Technology Officer", "c_suite", "engineering"),
            ("VP of Sales", "vp", "sales"),
            ("VP Marketing", "vp", "marketing"),
            ("Director of Engineering", "director", "engineering"),
            ("Head of Growth", "head", "marketing"),
            ("Engineering Manager", "manager", "engineering"),
            ("Senior Software Engineer", "senior", "engineering"),
            ("Account Executive", "senior", "sales"),
            ("Product Manager", "manager", "product"),
            ("HR Business Partner", "senior", "human_resources"),
            ("Financial Controller", "manager", "finance"),
            ("Marketing Coordinator", "entry", "marketing"),
            ("Software Engineering Intern", "intern", "engineering"),
        ];
        let cities = [
            ("Stockholm", "Sweden"),
            ("Gothenburg", "Sweden"),
            ("Malmo", "Sweden"),
            ("Oslo", "Norway"),
            ("Copenhagen", "Denmark"),
            ("Helsinki", "Finland"),
            ("Berlin", "Germany"),
            ("London", "United Kingdom"),
            ("New York", "United States"),
            ("San Francisco", "United States"),
        ];
        let industries = [
            (
                "Computer Software",
                &[
                    "{company} builds workflow automation software for mid-market teams",
                    "{company} is a SaaS platform for cloud cost analytics",
                ][..],
            ),
            (
                "Information Technology & Services",
                &[
                    "{company} provides managed cloud infrastructure and DevOps consulting",
                    "{company} delivers IT outsourcing and security operations",
                ][..],
            ),
            (
                "Financial Services",
                &["{company} offers payment processing and fraud detection for fintech"][..],
            ),
            (
                "Hospital & Health Care",
                &["{company} develops telemedicine tools for clinics"][..],
            ),
            (
                "Retail",
                &["{company} runs an e-commerce marketplace for sustainable fashion"][..],
            ),
            (
                "Marketing & Advertising",
                &["{company} is a performance marketing agency focused on B2B lead generation"][..],
            ),
            (
                "Logistics & Supply Chain",
                &["{company} optimizes last-mile delivery with route planning software"][..],
            ),
        ];

        SampleTables {
            first_names: strings(&[
                "Anna", "Erik", "Sara", "Johan", "Emma", "Lars", "Maja", "Oskar", "Nora", "Liam",
            ]),
            last_names: strings(&[
                "Andersson", "Johansson", "Karlsson", "Nilsson", "Larsson", "Berg", "Lind",
                "Holm", "Strand", "Ek",
            ]),
            titles: titles
                .iter()
                .map(|(t, s, f)| (t.to_string(), s.to_string(), f.to_string()))
                .collect(),
            cities: cities
                .iter()
                .map(|(city, country)| CityEntry {
                    city: city.to_string(),
                    country: country.to_string(),
                })
                .collect(),
            industries: industries
                .iter()
                .map(|(name, descriptions)| IndustryEntry {
                    name: name.to_string(),
                    descriptions: strings(descriptions),
                })
                .collect(),
            company_stems: strings(&["Nord", "Cloud", "Data", "Green", "Bright", "Swift", "Peak", "Blue"]),
            company_suffixes: strings(&["stack", "lane", "works", "labs", "hub", "ly", "wise"]),
            tlds: strings(&["com", "io", "se", "co"]),
            email_statuses: strings(&["validated", "unknown", "invalid", "catch_all"]),
            company_sizes: strings(&["1-10", "11-50", "51-200", "201-500", "501-1000", "1001-5000"]),
            funding_stages: strings(&["bootstrapped", "seed", "series_a", "series_b", "series_c", "ipo"]),
            revenues: strings(&["500K", "1M", "2.5M", "5M", "10M", "25M", "50M", "100M", "500M", "1.2B"]),
        }
    }
}

/// Outcome counters for [`LeadGenerator::generate_matching`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub attempts: usize,
    pub accepted: usize,
}

pub struct LeadGenerator<'a, R: Rng> {
    tables: &'a SampleTables,
    rng: R,
}

impl<'a, R: Rng> LeadGenerator<'a, R> {
    pub fn new(tables: &'a SampleTables, rng: R) -> Self {
        LeadGenerator { tables, rng }
    }

    /// Synthesize one lead. Empty tables yield empty attributes.
    pub fn next_lead(&mut self) -> LeadRecord {
        let tables = self.tables;
        let rng = &mut self.rng;

        let first_name = pick(rng, &tables.first_names);
        let last_name = pick(rng, &tables.last_names);
        let (job_title, seniority_level, functional_level) =
            tables.titles.choose(rng).cloned().unwrap_or_default();
        let (city, country) = tables
            .cities
            .choose(rng)
            .map(|c| (c.city.clone(), c.country.clone()))
            .unwrap_or_default();

        let company_name = format!(
            "{}{}",
            pick(rng, &tables.company_stems),
            pick(rng, &tables.company_suffixes)
        );
        let company_domain = match tables.tlds.choose(rng) {
            Some(tld) if !company_name.is_empty() => {
                format!("{}.{}", company_name.to_lowercase(), tld)
            }
            _ => String::new(),
        };
        let email = if company_domain.is_empty() {
            String::new()
        } else {
            format!("{}.{}@{}", first_name, last_name, company_domain).to_lowercase()
        };

        let (industry, company_description) = match tables.industries.choose(rng) {
            Some(entry) => {
                let template = entry
                    .descriptions
                    .choose(rng)
                    .map(String::as_str)
                    .unwrap_or_default();
                (entry.name.clone(), template.replace("{company}", &company_name))
            }
            None => (String::new(), String::new()),
        };

        let company_annual_revenue = pick(rng, &tables.revenues);
        let company_annual_revenue_clean = parse_magnitude(&company_annual_revenue);

        LeadRecord {
            first_name,
            last_name,
            email,
            job_title,
            seniority_level,
            functional_level,
            city,
            country,
            company_name,
            company_domain,
            industry,
            company_description,
            email_status: pick(rng, &tables.email_statuses),
            company_size: pick(rng, &tables.company_sizes),
            company_funding_stage: pick(rng, &tables.funding_stages),
            company_annual_revenue,
            company_annual_revenue_clean,
        }
    }

    /// Generate until `wanted` leads pass `spec` or `max_attempts` candidates
    /// have been tried.
    pub fn generate_matching(
        &mut self,
        spec: &FilterSpec,
        wanted: usize,
        max_attempts: usize,
    ) -> (Vec<LeadRecord>, GenerationStats) {
        let mut leads = Vec::with_capacity(wanted);
        let mut stats = GenerationStats::default();

        while leads.len() < wanted && stats.attempts < max_attempts {
            let lead = self.next_lead();
            stats.attempts += 1;
            if accepts(&lead, spec) {
                debug!("Accepted {} {} ({})", lead.first_name, lead.last_name, lead.job_title);
                leads.push(lead);
            }
        }
        stats.accepted = leads.len();

        if stats.accepted < wanted {
            info!(
                "Stopped after {} attempts with {}/{} matching leads",
                stats.attempts, stats.accepted, wanted
            );
        } else {
            info!("Generated {} matching leads in {} attempts", stats.accepted, stats.attempts);
        }
        (leads, stats)
    }
}

fn pick<R: Rng>(rng: &mut R, items: &[String]) -> String {
    items.choose(rng).cloned().unwrap_or_default()
}
