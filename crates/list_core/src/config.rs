use serde::Deserialize;

use crate::error::{ConfigError, ParamKind};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_SEARCH_PARAM: &str = "q";
pub const DEFAULT_PAGE_PARAM: &str = "page";

/// Construction-time options of an [`crate::InfiniteList`]. Fixed for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub page_size: u32,
    pub search_param: String,
    pub page_param: String,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_param: DEFAULT_SEARCH_PARAM.into(),
            page_param: DEFAULT_PAGE_PARAM.into(),
        }
    }
}

impl ListConfig {
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_params(mut self, search_param: impl Into<String>, page_param: impl Into<String>) -> Self {
        self.search_param = search_param.into();
        self.page_param = page_param.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.page_param.trim().is_empty() {
            return Err(ConfigError::EmptyParamKey {
                which: ParamKind::Page,
            });
        }
        if self.search_param.trim().is_empty() {
            return Err(ConfigError::EmptyParamKey {
                which: ParamKind::Search,
            });
        }
        if self.page_param == self.search_param {
            return Err(ConfigError::DuplicateParamKey(self.page_param.clone()));
        }
        Ok(())
    }
}
