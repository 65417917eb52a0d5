use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Fixed-width bibcode: YYYY + bibstem(5) + volume(4) + qualifier(1) + page(4) + initial(1)
    pub static ref BIBCODE_PATTERN: Regex = Regex::new(
        r"^(\d{4})(.{5})(.{4})(.)(.{4})(.)$"
    ).unwrap();
}

/// A bibcode split into its fixed-width fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bibcode<'a> {
    pub raw: &'a str,
    pub year: i64,
    pub bibstem: &'a str,
    pub volume_field: &'a str,
    pub qualifier: char,
}

/// Interpretation of the 4-character volume field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeField {
    Number(i64),
    /// Placeholder volume on records not yet assigned to an issue
    Temporary,
    Invalid,
}

impl<'a> Bibcode<'a> {
    pub fn parse(raw: &'a str) -> Option<Self> {
        let caps = BIBCODE_PATTERN.captures(raw)?;
        let year = caps.get(1)?.as_str().parse().ok()?;
        let bibstem = caps.get(2)?.as_str();
        let volume_field = caps.get(3)?.as_str();
        let qualifier = caps.get(4)?.as_str().chars().next()?;

        Some(Self {
            raw,
            year,
            bibstem,
            volume_field,
            qualifier,
        })
    }

    pub fn volume(&self) -> VolumeField {
        parse_volume_field(self.volume_field)
    }
}

/// Parse a bibcode volume field ("..12", "0905", "tmp.")
pub fn parse_volume_field(field: &str) -> VolumeField {
    if field.to_lowercase().contains("tmp") {
        return VolumeField::Temporary;
    }
    let digits = field.replace('.', "");
    match digits.parse::<i64>() {
        Ok(v) => VolumeField::Number(v),
        Err(_) => VolumeField::Invalid,
    }
}

/// Directory name used by the reference resolver: periods removed, '&' -> '+'
pub fn reference_dir_name(bibstem: &str) -> String {
    bibstem.replace('.', "").replace('&', "+")
}

/// Bibstem without the trailing padding dots ("ApJ.." -> "ApJ")
pub fn short_bibstem(bibstem: &str) -> &str {
    bibstem.trim_end_matches('.')
}
