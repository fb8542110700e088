//! Nested listing records as delivered by the upstream source.
//!
//! Every field is optional: the source emits sparse payloads and entire
//! sub-structures (notably `agent`) can be null. Timestamps stay as raw
//! strings here; the raw tier keeps them untouched and the schema conformer
//! parses them later.

use serde::{Deserialize, Serialize};

/// One nested listing record from the source.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Listing {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub location: Option<Location>,
    pub pricing: Option<Pricing>,
    pub features: Option<Features>,
    pub status: Option<Status>,
    pub agent: Option<Agent>,
    pub dates: Option<Dates>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Location {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub zip_code: Option<String>,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Pricing {
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub price_per_sqm: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Features {
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub half_bathrooms: Option<i64>,
    pub total_area_sqm: Option<f64>,
    pub covered_area_sqm: Option<f64>,
    pub uncovered_area_sqm: Option<f64>,
    pub lot_area_sqm: Option<f64>,
    pub construction_year: Option<i64>,
    pub floors: Option<i64>,
    pub floor_number: Option<i64>,
    pub parking_spaces: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Status {
    pub property_status: Option<String>,
    pub is_furnished: Option<bool>,
    pub is_new_construction: Option<bool>,
    pub immediate_availability: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Agent {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Dates {
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
    pub expires_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_listing() {
        let json = r#"{
            "id": 42,
            "title": "Downtown loft",
            "description": "Two-bedroom loft",
            "property_type": "apartment",
            "location": {
                "city": "Monterrey",
                "state": "Nuevo Leon",
                "country": "Mexico",
                "address": "Av. Constitucion 100",
                "neighborhood": "Centro",
                "zip_code": "64000",
                "coordinates": {"latitude": 25.67, "longitude": -100.31}
            },
            "pricing": {"price": 1250000.0, "currency": "MXN", "price_per_sqm": 15625.0},
            "features": {"bedrooms": 2, "bathrooms": 2, "half_bathrooms": 1,
                         "total_area_sqm": 80.0, "covered_area_sqm": 80.0,
                         "uncovered_area_sqm": null, "lot_area_sqm": null,
                         "construction_year": 2015, "floors": 1, "floor_number": 4,
                         "parking_spaces": 1},
            "status": {"property_status": "for_sale", "is_furnished": true,
                       "is_new_construction": false, "immediate_availability": true},
            "agent": {"name": "Ana", "email": "ana@example.com", "phone": null, "company": "Casas SA"},
            "dates": {"published_at": "2024-03-15T10:30:45",
                      "updated_at": "2024-03-16 08:00:00",
                      "expires_at": null}
        }"#;

        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.id, Some(42));
        assert_eq!(
            listing.location.as_ref().unwrap().city.as_deref(),
            Some("Monterrey")
        );
        assert_eq!(listing.agent.as_ref().unwrap().name.as_deref(), Some("Ana"));
        assert!(listing.agent.as_ref().unwrap().phone.is_none());
    }

    #[test]
    fn test_deserialize_null_agent_and_unknown_fields() {
        let json = r#"{
            "id": 7,
            "agent": null,
            "listing_badge": "featured",
            "dates": {"published_at": "2024-03-15"}
        }"#;

        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.id, Some(7));
        assert!(listing.agent.is_none());
        assert!(listing.location.is_none());
        assert_eq!(
            listing.dates.unwrap().published_at.as_deref(),
            Some("2024-03-15")
        );
    }
}
