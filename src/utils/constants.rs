/// Market group holding every blueprint.
pub const BLUEPRINTS_MARKET_GROUP: i64 = 2;
/// Market group holding every skill book.
pub const SKILL_BOOKS_MARKET_GROUP: i64 = 150;

pub const EXCLUDED_MARKET_GROUPS: [i64; 2] = [BLUEPRINTS_MARKET_GROUP, SKILL_BOOKS_MARKET_GROUP];

/// Types whose name contains this never produce deals.
pub const BLUEPRINT_NAME_MARKER: &str = "Blueprint";

/// Share of posted sell depth assumed to be realistically capturable.
pub const DEFAULT_CAPTURE_RATIO: f64 = 0.05;

// Upstream response headers (lowercase, as `HeaderName` requires)
pub const EXPIRES_HEADER: &str = "expires";
pub const PAGES_HEADER: &str = "x-pages";

pub const DEFAULT_UPSTREAM_URL: &str = "https://esi.evetech.net/latest";
pub const DEFAULT_DATASOURCE: &str = "tranquility";
pub const DEFAULT_USER_AGENT: &str = concat!("market-sync/", env!("CARGO_PKG_VERSION"));

/// Upstream resource paths.
pub mod paths {
    pub const REGIONS: &str = "/universe/regions/";
    pub const CONSTELLATIONS: &str = "/universe/constellations/";
    pub const SYSTEMS: &str = "/universe/systems/";
    pub const STRUCTURES: &str = "/universe/structures/";
    pub const TYPES: &str = "/universe/types/";
    pub const MARKET_GROUPS: &str = "/markets/groups/";

    pub fn region(id: i64) -> String {
        format!("{REGIONS}{id}/")
    }

    pub fn constellation(id: i64) -> String {
        format!("{CONSTELLATIONS}{id}/")
    }

    pub fn system(id: i64) -> String {
        format!("{SYSTEMS}{id}/")
    }

    pub fn station(id: i64) -> String {
        format!("/universe/stations/{id}/")
    }

    pub fn structure(id: i64) -> String {
        format!("{STRUCTURES}{id}/")
    }

    pub fn market_type(id: i64) -> String {
        format!("{TYPES}{id}/")
    }

    pub fn market_group(id: i64) -> String {
        format!("{MARKET_GROUPS}{id}/")
    }

    pub fn region_orders(region_id: i64) -> String {
        format!("/markets/{region_id}/orders/")
    }
}
