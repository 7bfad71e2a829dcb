pub mod addresses;
pub mod orders;
pub mod products;
pub mod reports;
pub mod users;

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::page::Page;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

impl ListParams {
    /// Bounds are enforced here, at the external interface, and nowhere below.
    pub fn clamped(&self) -> Page {
        Page::new(self.page.max(1), self.limit.clamp(1, 100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_params_are_clamped() {
        let params = ListParams { page: -3, limit: 1000 };
        let page = params.clamped();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 100);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn defaults_apply_to_missing_fields() {
        let params: ListParams = serde_json::from_str("{}").expect("parse failed");
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 20);
    }
}
