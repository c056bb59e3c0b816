use crate::error::ParseError;

/// Locale month names mapped to month numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTable {
    names: [&'static str; 12],
}

const FINNISH: [&str; 12] = [
    "Tammikuu", "Helmikuu", "Maaliskuu", "Huhtikuu", "Toukokuu", "Kesäkuu",
    "Heinäkuu", "Elokuu", "Syyskuu", "Lokakuu", "Marraskuu", "Joulukuu",
];

const ENGLISH: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Language codes accepted by `MonthTable::for_locale`.
pub const SUPPORTED_LOCALES: [&str; 2] = ["fi", "en"];

impl MonthTable {
    pub fn finnish() -> Self {
        Self { names: FINNISH }
    }

    pub fn english() -> Self {
        Self { names: ENGLISH }
    }

    /// Accepts a bare language code or a full tag such as `fi-FI`.
    pub fn for_locale(locale: &str) -> Result<Self, ParseError> {
        let language = locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match language.as_str() {
            "fi" => Ok(Self::finnish()),
            "en" => Ok(Self::english()),
            _ => Err(ParseError::UnsupportedLocale(locale.to_string())),
        }
    }

    /// Case-insensitive lookup of a month name, 1-based.
    pub fn lookup(&self, name: &str) -> Option<u32> {
        let name = name.trim().to_lowercase();
        self.names
            .iter()
            .position(|candidate| candidate.to_lowercase() == name)
            .map(|idx| idx as u32 + 1)
    }
}
