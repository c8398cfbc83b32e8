use anyhow::{Context, Result};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub name: String,
    pub code: String,
}

/// Country display name to ISO 3166-1 alpha-2 code, in list file order.
#[derive(Debug, Clone)]
pub struct CountryIndex {
    countries: Vec<Country>,
}

impl CountryIndex {
    pub fn load(override_path: Option<&str>) -> Result<Self> {
        let content = super::read_asset("data/countries.json", override_path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let entries: Map<String, Value> = serde_json::from_str(content)
            .context("Country list must be a JSON object of name -> code")?;

        let countries = entries
            .into_iter()
            .map(|(name, code)| match code {
                Value::String(code) => Ok(Country { name, code }),
                other => anyhow::bail!("Country code for {name} must be a string, got {other}"),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(countries))
    }

    pub fn new(countries: impl IntoIterator<Item = Country>) -> Self {
        Self {
            countries: countries.into_iter().collect(),
        }
    }

    /// Splits `"<Name>: <rest>"` into the selected country and the rest.
    #[must_use]
    pub fn split_selection<'a>(&self, text: &'a str) -> Option<(&Country, &'a str)> {
        self.countries.iter().find_map(|country| {
            text.strip_prefix(country.name.as_str())
                .and_then(|rest| rest.strip_prefix(": "))
                .map(|rest| (country, rest))
        })
    }

    /// Case-insensitive substring match; a blank query lists everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Country> {
        if query.trim().is_empty() {
            return self.countries.iter().collect();
        }

        let needle = query.to_lowercase();
        self.countries
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect()
    }

    #[cfg(test)]
    #[must_use]
    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.countries
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.code.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}
