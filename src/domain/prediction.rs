use serde::Deserialize;

/// The three prediction services a person is enriched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Age,
    Gender,
    Nationality,
}

impl Lookup {
    pub fn to_name(&self) -> &'static str {
        match self {
            Lookup::Age => "age",
            Lookup::Gender => "gender",
            Lookup::Nationality => "nationality",
        }
    }
}

/// agify.io response. `age` is null for names it has never seen.
#[derive(Debug, Clone, Deserialize)]
pub struct AgePrediction {
    pub name: String,
    #[serde(default)]
    pub age: Option<i32>,
}

impl AgePrediction {
    pub fn age(&self) -> i32 {
        self.age.unwrap_or(0)
    }
}

/// genderize.io response. `gender` is null when the service cannot tell.
#[derive(Debug, Clone, Deserialize)]
pub struct GenderPrediction {
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
}

impl GenderPrediction {
    pub fn gender(&self) -> String {
        self.gender.clone().unwrap_or_default()
    }
}

/// nationalize.io response, countries ordered by descending probability.
#[derive(Debug, Clone, Deserialize)]
pub struct NationalizePrediction {
    pub name: String,
    #[serde(default)]
    pub country: Vec<CountryPrediction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryPrediction {
    pub country_id: String,
    pub probability: f64,
}

impl NationalizePrediction {
    /// The provider's first entry, or an empty string when it has no guess.
    pub fn top_country(&self) -> String {
        self.country
            .first()
            .map(|c| c.country_id.clone())
            .unwrap_or_default()
    }
}
