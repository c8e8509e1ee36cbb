//! Locale-dependent formatting of amounts, dates and report labels.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Supported report locales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    /// Norwegian Bokmål.
    #[default]
    #[serde(rename = "nb-NO", alias = "nb", alias = "no", alias = "no-NO")]
    NbNo,
    /// British English.
    #[serde(rename = "en-GB", alias = "en")]
    EnGb,
}

/// Fixed texts printed on the report.
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub title: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    pub bank_account: &'static str,
    pub email: &'static str,
    pub date: &'static str,
    pub attachment_column: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub amount: &'static str,
    pub total: &'static str,
    pub attachment: &'static str,
}

const NB_LABELS: Labels = Labels {
    title: "Utleggsrapport",
    name: "Navn:",
    address: "Adresse:",
    bank_account: "Kontonummer:",
    email: "E-post:",
    date: "Dato:",
    attachment_column: "Vedl.",
    description: "Beskrivelse",
    category: "Kategori",
    amount: "Beløp",
    total: "Totalt:",
    attachment: "Vedlegg",
};

const EN_LABELS: Labels = Labels {
    title: "Expense Report",
    name: "Name:",
    address: "Address:",
    bank_account: "Bank Account:",
    email: "Email:",
    date: "Date:",
    attachment_column: "Att.",
    description: "Description",
    category: "Category",
    amount: "Amount",
    total: "Total:",
    attachment: "Attachment",
};

const NB_MONTHS: [&str; 12] = [
    "januar", "februar", "mars", "april", "mai", "juni",
    "juli", "august", "september", "oktober", "november", "desember",
];

const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

impl Locale {
    /// BCP 47 tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::NbNo => "nb-NO",
            Self::EnGb => "en-GB",
        }
    }

    /// Thousands separator. Norwegian uses NO-BREAK SPACE.
    pub fn group_separator(&self) -> char {
        match self {
            Self::NbNo => '\u{a0}',
            Self::EnGb => ',',
        }
    }

    pub fn decimal_separator(&self) -> char {
        match self {
            Self::NbNo => ',',
            Self::EnGb => '.',
        }
    }

    fn minus_sign(&self) -> char {
        match self {
            Self::NbNo => '\u{2212}',
            Self::EnGb => '-',
        }
    }

    /// Default payer country for this locale.
    pub fn default_country(&self) -> &'static str {
        match self {
            Self::NbNo => "Norway",
            Self::EnGb => "United Kingdom",
        }
    }

    pub fn labels(&self) -> &'static Labels {
        match self {
            Self::NbNo => &NB_LABELS,
            Self::EnGb => &EN_LABELS,
        }
    }

    /// Format an amount with exactly two fraction digits and locale
    /// separators. No currency symbol.
    pub fn format_amount(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let s = format!("{:.2}", rounded.abs());

        let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

        let chars: Vec<char> = integer_part.chars().collect();
        let mut formatted = String::new();
        if rounded.is_sign_negative() && !rounded.is_zero() {
            formatted.push(self.minus_sign());
        }
        for (i, c) in chars.iter().enumerate() {
            if i > 0 && (chars.len() - i) % 3 == 0 {
                formatted.push(self.group_separator());
            }
            formatted.push(*c);
        }

        formatted.push(self.decimal_separator());
        formatted.push_str(decimal_part);
        formatted
    }

    /// Long date form, e.g. `16. oktober 2026` or `16 October 2026`.
    pub fn format_date(&self, date: NaiveDate) -> String {
        let month = date.month0() as usize;
        match self {
            Self::NbNo => format!("{}. {} {}", date.day(), NB_MONTHS[month], date.year()),
            Self::EnGb => format!("{} {} {}", date.day(), EN_MONTHS[month], date.year()),
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nb-no" | "nb" | "no" | "no-no" => Ok(Self::NbNo),
            "en-gb" | "en" => Ok(Self::EnGb),
            _ => Err(format!("unsupported locale: {}", s)),
        }
    }
}
