use serde::{Deserialize, Serialize};

macro_rules! key_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

key_newtype!(AssetId);
key_newtype!(Symbol);

/// Anything a list can be filtered by a free-text search term.
pub trait Searchable {
    /// `needle` is already trimmed and lowercased.
    fn matches(&self, needle: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub symbol: Symbol,
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub status: AssetStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap_rank: Option<u32>,
}

impl Asset {
    pub fn new(id: &str, symbol: &str, name: &str) -> Self {
        Self {
            id: AssetId::from(id),
            symbol: Symbol::from(symbol),
            name: name.to_string(),
            image: String::new(),
            status: AssetStatus::Active,
            current_price: None,
            price_change_percentage_24h: None,
            market_cap_rank: None,
        }
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.market_cap_rank = Some(rank);
        self
    }

    pub fn with_price(mut self, price: f64, change_24h: f64) -> Self {
        self.current_price = Some(price);
        self.price_change_percentage_24h = Some(change_24h);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.status = AssetStatus::Inactive;
        self
    }
}

impl Searchable for Asset {
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.symbol.0.to_lowercase().contains(needle)
            || self.id.0.to_lowercase().contains(needle)
    }
}

impl Searchable for String {
    fn matches(&self, needle: &str) -> bool {
        self.to_lowercase().contains(needle)
    }
}

impl Searchable for &'static str {
    fn matches(&self, needle: &str) -> bool {
        self.to_lowercase().contains(needle)
    }
}
