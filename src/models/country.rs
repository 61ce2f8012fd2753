use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Distance from 'A' to REGIONAL INDICATOR SYMBOL LETTER A.
const REGIONAL_INDICATOR_OFFSET: u32 = 0x1F1E6 - 'A' as u32;

pub const KNOWN_COUNTRIES: &[(&str, &str)] = &[
    ("US", "United States"),
    ("IL", "Israel"),
    ("IN", "India"),
    ("GB", "United Kingdom"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("DE", "Germany"),
    ("FR", "France"),
    ("BR", "Brazil"),
    ("MX", "Mexico"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
}

impl Country {
    pub fn new(code: &str, name: &str) -> Self {
        Country {
            code: code.trim().to_uppercase(),
            name: name.trim().to_string(),
        }
    }

    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_uppercase();
        let name = display_name(&code).unwrap_or(&code).to_string();
        Country { code, name }
    }

    pub fn flag(&self) -> String {
        self.code
            .chars()
            .filter(|c| c.is_ascii_uppercase())
            .filter_map(|c| char::from_u32(c as u32 + REGIONAL_INDICATOR_OFFSET))
            .collect()
    }
}

pub fn display_name(code: &str) -> Option<&'static str> {
    KNOWN_COUNTRIES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

pub fn known_countries() -> Vec<Country> {
    KNOWN_COUNTRIES
        .iter()
        .map(|(code, name)| Country::new(code, name))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Ip,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCountry {
    pub country: Country,
    pub confirmed_at: DateTime<Utc>,
    pub detection_method: DetectionMethod,
}

#[derive(Debug, Serialize)]
pub struct CountryView {
    pub code: String,
    pub name: String,
    pub flag: String,
}

impl From<&Country> for CountryView {
    fn from(country: &Country) -> Self {
        CountryView {
            code: country.code.clone(),
            name: country.name.clone(),
            flag: country.flag(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserCountryView {
    pub country: CountryView,
    pub confirmed_at: DateTime<Utc>,
    pub detection_method: DetectionMethod,
}

impl From<&UserCountry> for UserCountryView {
    fn from(stored: &UserCountry) -> Self {
        UserCountryView {
            country: CountryView::from(&stored.country),
            confirmed_at: stored.confirmed_at,
            detection_method: stored.detection_method,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CountrySelection {
    pub code: String,
    pub name: Option<String>,
    pub method: Option<DetectionMethod>,
}

#[derive(Debug, Serialize)]
pub struct DetectionResult {
    pub detected: bool,
    pub candidate: Option<CountryView>,
}
