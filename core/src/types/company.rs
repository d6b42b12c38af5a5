use serde::{Deserialize, Serialize};

use crate::hydrate::{lenient, Hydrate};

/// A company (tenant) inside a Web Distribution instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
}

impl Company {
    pub fn new(id: i64) -> Self {
        Self { id, name: None }
    }
}

impl Hydrate for Company {
    const NAME: &'static str = "Company";
}

/// A product line belonging to a company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Line {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub company_id: Option<i64>,
}

impl Hydrate for Line {
    const NAME: &'static str = "Line";
}
