use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// One Maps search, e.g. `"gym in Stockholm, Sweden"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub city: String,
    pub category: String,
}

impl SearchQuery {
    pub fn new(city: &str, category: &str, country: &str) -> Self {
        SearchQuery {
            query: format!("{} in {}, {}", category, city, country),
            city: city.to_string(),
            category: category.to_string(),
        }
    }
}

/// Every city/category combination, city-major.
pub fn search_queries<S: AsRef<str>>(cities: &[S], categories: &[S], country: &str) -> Vec<SearchQuery> {
    let mut queries = Vec::with_capacity(cities.len() * categories.len());
    for city in cities {
        for category in categories {
            queries.push(SearchQuery::new(city.as_ref(), category.as_ref(), country));
        }
    }
    queries
}

/// Normalized business record built from a raw Maps scraper item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub name: String,
    pub address: String,
    pub city: String,
    pub category: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub review_count: u64,
    pub google_maps_url: String,
    pub place_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub scraped_at: DateTime<Utc>,
}

impl Place {
    pub fn from_raw(item: &Value, city: &str, category: &str, scraped_at: DateTime<Utc>) -> Self {
        let location = item.get("location");
        Place {
            name: raw_name(item).unwrap_or_default(),
            address: raw_address(item).unwrap_or_default(),
            city: city.to_string(),
            category: category.to_string(),
            website: first_str(item, &["website", "url"]),
            phone: first_str(item, &["phone", "phoneNumber"]),
            rating: first_num(item, &["rating", "totalScore"]),
            review_count: first_num(item, &["reviewsCount", "reviews"])
                .map(|n| n.max(0.0) as u64)
                .unwrap_or(0),
            google_maps_url: first_str(item, &["url", "link"]).unwrap_or_default(),
            place_id: first_str(item, &["placeId", "id"]).unwrap_or_default(),
            latitude: location.and_then(|l| first_num(l, &["lat"])),
            longitude: location.and_then(|l| first_num(l, &["lng"])),
            scraped_at,
        }
    }
}

/// Lower-cased `"{name}-{address}"`, the identity used for deduplication.
pub fn place_key(item: &Value) -> String {
    format!(
        "{}-{}",
        raw_name(item).unwrap_or_default(),
        raw_address(item).unwrap_or_default()
    )
    .to_lowercase()
}

fn raw_name(item: &Value) -> Option<String> {
    first_str(item, &["title", "name"])
}

fn raw_address(item: &Value) -> Option<String> {
    first_str(item, &["address"])
        .or_else(|| item.get("location").and_then(|l| first_str(l, &["address"])))
}

/// First non-empty string among `keys`. Numbers are stringified so that
/// numeric ids survive.
fn first_str(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match item.get(*k)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    })
}

/// First non-zero number among `keys`.
fn first_num(item: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|k| item.get(*k)?.as_f64().filter(|n| *n != 0.0))
}

/// Counters for one scraping run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub searches: usize,
    pub total_scraped: usize,
    pub unique: usize,
}

impl RunStats {
    pub fn duplicates(&self) -> usize {
        self.total_scraped - self.unique
    }
}

/// Tracks places seen across searches so each business is emitted once.
#[derive(Debug, Default)]
pub struct PlaceTracker {
    seen: HashSet<String>,
    stats: RunStats,
}

impl PlaceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the raw results of one search, returning the first-seen places.
    pub fn record(
        &mut self,
        query: &SearchQuery,
        items: &[Value],
        scraped_at: DateTime<Utc>,
    ) -> Vec<Place> {
        self.stats.searches += 1;
        self.stats.total_scraped += items.len();
        info!("Found {} businesses for {}", items.len(), query.query);

        let mut fresh = Vec::new();
        for item in items {
            if !self.seen.insert(place_key(item)) {
                debug!("Skipping duplicate: {}", raw_name(item).unwrap_or_default());
                continue;
            }
            let place = Place::from_raw(item, &query.city, &query.category, scraped_at);
            debug!("Saved: {} ({})", place.name, place.city);
            fresh.push(place);
        }
        self.stats.unique += fresh.len();
        fresh
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn query(city: &str, category: &str) -> SearchQuery {
        SearchQuery::new(city, category, "Sweden")
    }

    #[test]
    fn queries_are_city_major() {
        let q = search_queries(&["Stockholm", "Malmö"], &["café", "gym"], "Sweden");
        let texts: Vec<&str> = q.iter().map(|q| q.query.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "café in Stockholm, Sweden",
                "gym in Stockholm, Sweden",
                "café in Malmö, Sweden",
                "gym in Malmö, Sweden",
            ]
        );
        assert_eq!(q[3].city, "Malmö");
        assert_eq!(q[3].category, "gym");
    }

    #[test]
    fn no_cities_no_queries() {
        let empty: [&str; 0] = [];
        assert!(search_queries(&empty, &["gym"], "Sweden").is_empty());
    }

    #[test]
    fn from_raw_primary_fields() {
        let item = json!({
            "title": "Espresso House",
            "address": "Drottninggatan 1, Stockholm",
            "website": "https://espressohouse.com",
            "phone": "+46 8 123 45",
            "totalScore": 4.3,
            "reviewsCount": 812,
            "url": "https://maps.google.com/?cid=1",
            "placeId": "ChIJ123",
            "location": { "lat": 59.33, "lng": 18.06 }
        });
        let p = Place::from_raw(&item, "Stockholm", "café", now());
        assert_eq!(p.name, "Espresso House");
        assert_eq!(p.address, "Drottninggatan 1, Stockholm");
        assert_eq!(p.website.as_deref(), Some("https://espressohouse.com"));
        assert_eq!(p.phone.as_deref(), Some("+46 8 123 45"));
        assert_eq!(p.rating, Some(4.3));
        assert_eq!(p.review_count, 812);
        assert_eq!(p.google_maps_url, "https://maps.google.com/?cid=1");
        assert_eq!(p.place_id, "ChIJ123");
        assert_eq!(p.latitude, Some(59.33));
        assert_eq!(p.longitude, Some(18.06));
        assert_eq!(p.city, "Stockholm");
        assert_eq!(p.category, "café");
    }

    #[test]
    fn from_raw_fallbacks() {
        let item = json!({
            "title": "",
            "name": "Gym Nord",
            "location": { "address": "Storgatan 5" },
            "url": "https://maps.google.com/?cid=2",
            "phoneNumber": "010-111",
            "rating": 0,
            "reviews": 3,
            "id": 991
        });
        let p = Place::from_raw(&item, "Malmö", "gym", now());
        assert_eq!(p.name, "Gym Nord");
        assert_eq!(p.address, "Storgatan 5");
        // No website: the maps url stands in, as upstream items often omit it.
        assert_eq!(p.website.as_deref(), Some("https://maps.google.com/?cid=2"));
        assert_eq!(p.phone.as_deref(), Some("010-111"));
        assert_eq!(p.rating, None);
        assert_eq!(p.review_count, 3);
        assert_eq!(p.place_id, "991");
        assert_eq!(p.latitude, None);
    }

    #[test]
    fn from_raw_empty_item() {
        let p = Place::from_raw(&json!({}), "Malmö", "gym", now());
        assert_eq!(p.name, "");
        assert_eq!(p.address, "");
        assert_eq!(p.website, None);
        assert_eq!(p.review_count, 0);
        assert_eq!(p.google_maps_url, "");
    }

    #[test]
    fn serializes_camel_case() {
        let p = Place::from_raw(&json!({"title": "X", "reviewsCount": 2}), "A", "b", now());
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["reviewCount"], 2);
        assert!(v.get("googleMapsUrl").is_some());
        assert!(v.get("scrapedAt").is_some());
    }

    #[test]
    fn key_is_case_insensitive() {
        let a = json!({"title": "Espresso House", "address": "Main St 1"});
        let b = json!({"name": "ESPRESSO HOUSE", "location": {"address": "main st 1"}});
        assert_eq!(place_key(&a), "espresso house-main st 1");
        assert_eq!(place_key(&a), place_key(&b));
    }

    #[test]
    fn tracker_dedupes_across_searches() {
        let mut tracker = PlaceTracker::new();
        let first = vec![
            json!({"title": "Espresso House", "address": "Main St 1"}),
            json!({"title": "Wayne's", "address": "Main St 2"}),
            json!({"title": "espresso house", "address": "MAIN ST 1"}),
        ];
        let second = vec![
            json!({"title": "Wayne's", "address": "Main St 2"}),
            json!({"title": "Café Pascal", "address": "Norrtullsgatan 4"}),
        ];

        let saved = tracker.record(&query("Stockholm", "café"), &first, now());
        assert_eq!(saved.len(), 2);
        let saved = tracker.record(&query("Stockholm", "bakery"), &second, now());
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "Café Pascal");
        assert_eq!(saved[0].category, "bakery");

        let stats = tracker.stats();
        assert_eq!(
            stats,
            RunStats {
                searches: 2,
                total_scraped: 5,
                unique: 3
            }
        );
        assert_eq!(stats.duplicates(), 2);
    }
}
