use serde::{Deserialize, Serialize};

use crate::domain::Asset;

/// One page of a paginated listing, exactly as the backend returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub has_more: bool,
}

impl<T> PageResult<T> {
    /// Last and only page of a listing with no matching items.
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            data: Vec::new(),
            page,
            page_size,
            total: 0,
            has_more: false,
        }
    }
}

pub type AssetListResponse = PageResult<Asset>;

/// Query parameters of `GET /assets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAssetsQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}
