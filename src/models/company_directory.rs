use crate::utils::normalize_symbol;
use serde::Serialize;

/// Built-in company name -> ticker pairs, in match priority order.
/// The first entry for a ticker is its primary company name.
const COMPANY_TICKERS: &[(&str, &str)] = &[
    ("Tesla", "TSLA"),
    ("Apple", "AAPL"),
    ("Microsoft", "MSFT"),
    ("Amazon", "AMZN"),
    ("Google", "GOOGL"),
    ("Alphabet", "GOOGL"),
    ("Facebook", "META"),
    ("Meta", "META"),
    ("Nvidia", "NVDA"),
    ("Netflix", "NFLX"),
    ("Intel", "INTC"),
    ("IBM", "IBM"),
    ("Disney", "DIS"),
    ("Walmart", "WMT"),
    ("Johnson", "JNJ"),
    ("Visa", "V"),
    ("Mastercard", "MA"),
    ("Coca", "KO"),
    ("Pepsi", "PEP"),
    ("McDonald", "MCD"),
];

/// Company name to ticker lookup
#[derive(Debug, Clone, Serialize)]
pub struct CompanyDirectory {
    entries: Vec<(String, String)>,
}

impl Default for CompanyDirectory {
    fn default() -> Self {
        Self::from_pairs(COMPANY_TICKERS.iter().copied())
    }
}

impl CompanyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(name, ticker)| (name.to_string(), ticker.to_uppercase()))
            .collect();
        Self { entries }
    }

    /// Find the ticker for a company name, if the directory knows it
    ///
    /// An exact (case-insensitive) name wins; otherwise the first known name
    /// contained in the input matches, so "Johnson & Johnson" resolves to JNJ.
    pub fn lookup(&self, company_name: &str) -> Option<&str> {
        let needle = company_name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        self.entries
            .iter()
            .find(|(name, _)| name.to_lowercase() == needle)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(name, _)| needle.contains(&name.to_lowercase()))
            })
            .map(|(_, ticker)| ticker.as_str())
    }

    /// Resolve a company name to a ticker, falling back to the uppercased input
    pub fn resolve(&self, company_name: &str) -> String {
        self.lookup(company_name)
            .map(str::to_string)
            .unwrap_or_else(|| normalize_symbol(company_name))
    }

    /// Primary company name for a ticker
    pub fn company_name(&self, ticker: &str) -> Option<&str> {
        let ticker = normalize_symbol(ticker);
        self.entries
            .iter()
            .find(|(_, t)| *t == ticker)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let directory = CompanyDirectory::new();
        assert_eq!(directory.resolve("tesla"), "TSLA");
        assert_eq!(directory.resolve("  APPLE "), "AAPL");
        assert_eq!(directory.resolve("Alphabet"), "GOOGL");
        assert_eq!(directory.resolve("Johnson & Johnson"), "JNJ");
        assert_eq!(directory.len(), 20);
    }

    #[test]
    fn test_unknown_name_falls_back_to_uppercase() {
        let directory = CompanyDirectory::new();
        assert_eq!(directory.lookup("Palantir"), None);
        assert_eq!(directory.resolve(" pltr "), "PLTR");
    }

    #[test]
    fn test_reverse_lookup_returns_primary_name() {
        let directory = CompanyDirectory::new();
        assert_eq!(directory.company_name("googl"), Some("Google"));
        assert_eq!(directory.company_name("META"), Some("Facebook"));
        assert_eq!(directory.company_name("XYZ"), None);
    }
}
