//! Dated-artifact key predicate.
//!
//! A key is accepted iff it is exactly eight ASCII digits, a dot and the
//! artifact extension (`20240101.png`), and it is not the alias key
//! (`latest.png`). Anything else is skipped without error: a bucket may hold
//! unrelated objects.
//!
//! The rule is exact: it rejects `202401011.png` (nine digits), `2024010.png`
//! (seven), `img/20240101.png` (prefixed), `20240101.PNG` (case) and any key
//! merely containing `latest`.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct KeyFilter {
    pattern: Regex,
    alias_key: String,
}

impl KeyFilter {
    /// Filter for `<8 digits>.<extension>`, excluding `<alias>.<extension>`.
    pub fn new(extension: &str, alias: &str) -> Result<Self, regex::Error> {
        // `[0-9]` rather than `\d`: ASCII only
        let pattern = Regex::new(&format!(r"^[0-9]{{8}}\.{}$", regex::escape(extension)))?;
        Ok(Self {
            pattern,
            alias_key: format!("{alias}.{extension}"),
        })
    }

    pub fn accepts(&self, key: &str) -> bool {
        key != self.alias_key && self.pattern.is_match(key)
    }

    pub fn alias_key(&self) -> &str {
        &self.alias_key
    }
}
