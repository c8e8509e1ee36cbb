//! Expense category taxonomy ("utleggsposter").

use serde::{Deserialize, Serialize};

/// One entry of the category taxonomy.
#[derive(Debug, PartialEq, Eq)]
pub struct CategoryItem {
    /// Account code in the organization's chart of accounts.
    pub code: u16,
    /// Item name.
    pub name: &'static str,
    /// Group the item is listed under.
    pub group: &'static str,
}

impl CategoryItem {
    /// `"<code> <name>"`, the form used on the report and in serialized data.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.code, self.name)
    }
}

const fn item(group: &'static str, code: u16, name: &'static str) -> CategoryItem {
    CategoryItem { code, name, group }
}

/// All selectable expense categories.
pub static EXPENSE_CATEGORIES: &[CategoryItem] = &[
    item("Arrangement", 6300, "Leie lokale"),
    item("Arrangement", 7350, "Bevertning"),
    item("Arrangement", 6860, "Møter, kurs og konferanser"),
    item("Arrangement", 7400, "Premier og gaver"),
    item("Reise", 7140, "Reise og transport"),
    item("Reise", 7150, "Overnatting"),
    item("Kontor", 6540, "Inventar og utstyr"),
    item("Kontor", 6800, "Kontorrekvisita"),
    item("Kontor", 6810, "Programvare og lisenser"),
    item("Kontor", 6940, "Porto"),
    item("Markedsføring", 7320, "Reklame og profilering"),
    item("Markedsføring", 7330, "Trykksaker"),
    item("Annet", 7770, "Bank- og kortgebyrer"),
    item("Annet", 7790, "Annen kostnad"),
];

/// A category selected for an expense line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExpenseCategory(&'static CategoryItem);

impl ExpenseCategory {
    /// Look up a category by account code.
    pub fn from_code(code: u16) -> Option<Self> {
        EXPENSE_CATEGORIES.iter().find(|c| c.code == code).map(Self)
    }

    pub fn item(&self) -> &'static CategoryItem {
        self.0
    }

    pub fn code(&self) -> u16 {
        self.0.code
    }

    pub fn group(&self) -> &'static str {
        self.0.group
    }

    pub fn full_name(&self) -> String {
        self.0.full_name()
    }

    /// All categories in taxonomy order.
    pub fn all() -> impl Iterator<Item = ExpenseCategory> {
        EXPENSE_CATEGORIES.iter().map(Self)
    }

    /// Categories belonging to one group.
    pub fn in_group(group: &str) -> impl Iterator<Item = ExpenseCategory> + '_ {
        Self::all().filter(move |c| c.group().eq_ignore_ascii_case(group))
    }
}

/// Distinct group names in first-seen order.
pub fn groups() -> Vec<&'static str> {
    let mut groups: Vec<&'static str> = Vec::new();
    for category in EXPENSE_CATEGORIES {
        if !groups.contains(&category.group) {
            groups.push(category.group);
        }
    }
    groups
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0.code, self.0.name)
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = String;

    /// Accepts the full name (`"7350 Bevertning"`) or the bare code (`"7350"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        EXPENSE_CATEGORIES
            .iter()
            .find(|c| c.full_name() == s)
            .map(Self)
            .or_else(|| s.parse::<u16>().ok().and_then(Self::from_code))
            .ok_or_else(|| format!("unknown expense category: {}", s))
    }
}

impl TryFrom<String> for ExpenseCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExpenseCategory> for String {
    fn from(category: ExpenseCategory) -> Self {
        category.full_name()
    }
}
