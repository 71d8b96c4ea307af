//! Application-wide constants and reference tables
//!
//! Centralizes endpoint defaults, timing values and the KSÍ identifier
//! tables (age groups, teams, tournament types).

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Delay between uncached match fetches, to go easy on the upstream service
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;

/// Default SOAP endpoint for the KSÍ competition service
pub const DEFAULT_SOAP_URL: &str = "https://www2.ksi.is/vefthjonustur/mot.asmx";

/// Default base URL for the KSÍ results website
pub const DEFAULT_WEB_BASE_URL: &str = "https://www.ksi.is";

/// Namespace used for SOAPAction headers and request bodies
pub const SOAP_NAMESPACE: &str = "http://www2.ksi.is/vefthjonustur/mot/";

/// Cache TTL values
pub mod cache_ttl {
    /// Default TTL for cached discovery and match results (1 day)
    pub const DEFAULT_DAYS: u64 = 1;

    /// Longest TTL accepted from config (ten years)
    pub const MAX_DAYS: u64 = 3650;

    pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
}

/// Year bounds accepted by the query boundary
pub mod years {
    pub const MIN_YEAR: i32 = 1900;
    pub const MAX_YEAR: i32 = 2100;
}

/// Environment variable names
pub mod env_vars {
    /// SOAP endpoint override
    pub const SOAP_URL: &str = "KSI_SOAP_URL";

    /// Website base URL override
    pub const WEB_URL: &str = "KSI_WEB_URL";

    /// Log file path override
    pub const LOG_FILE: &str = "KSI_LOG_FILE";

    /// HTTP timeout in seconds
    pub const HTTP_TIMEOUT: &str = "KSI_HTTP_TIMEOUT";

    /// Cache TTL in days
    pub const CACHE_TTL_DAYS: &str = "KSI_CACHE_TTL_DAYS";

    /// Cache directory override
    pub const CACHE_DIR: &str = "KSI_CACHE_DIR";

    /// Delay between uncached match fetches in milliseconds
    pub const REQUEST_DELAY_MS: &str = "KSI_REQUEST_DELAY_MS";
}

/// Gender flag used by the tournament listing page
pub mod gender {
    pub const MALE: u8 = 1;
    pub const FEMALE: u8 = 2;
}

/// Age group ids from the KSÍ system.
pub mod age_group {
    pub const MEISTARAFLOKKUR: u32 = 1;
    pub const U23: u32 = 31;
    pub const SECOND_FLOKKUR: u32 = 2;
    pub const THIRD_FLOKKUR: u32 = 3;
    pub const FOURTH_FLOKKUR: u32 = 4;
    pub const FIFTH_FLOKKUR: u32 = 420;
    pub const SIXTH_FLOKKUR: u32 = 6;
    pub const SEVENTH_FLOKKUR: u32 = 7;

    pub const TABLE: &[(u32, &str)] = &[
        (MEISTARAFLOKKUR, "Meistaraflokkur"),
        (U23, "U23"),
        (SECOND_FLOKKUR, "Second Flokkur"),
        (THIRD_FLOKKUR, "Third Flokkur"),
        (FOURTH_FLOKKUR, "Fourth Flokkur"),
        (FIFTH_FLOKKUR, "Fifth Flokkur"),
        (SIXTH_FLOKKUR, "Sixth Flokkur"),
        (SEVENTH_FLOKKUR, "Seventh Flokkur"),
    ];

    pub fn name_for(id: u32) -> String {
        super::lookup(TABLE, id, "Age Group")
    }
}

/// Club ids from the KSÍ system.
pub mod team {
    // Reykjavík
    pub const KR: u32 = 103;
    pub const FRAM: u32 = 104;
    pub const VALUR: u32 = 105;
    pub const VIKINGUR_R: u32 = 106;
    pub const THROTTUR_R: u32 = 107;
    pub const LEIKNIR_R: u32 = 111;
    pub const FJOLNIR: u32 = 112;

    // Greater Reykjavík area
    pub const GROTTA: u32 = 170;
    pub const BREIDABLIK: u32 = 200;
    pub const HK: u32 = 203;
    pub const STJARNAN: u32 = 210;
    pub const FH: u32 = 220;
    pub const HAUKAR: u32 = 221;
    pub const KEFLAVIK: u32 = 240;
    pub const AFTURELDING: u32 = 270;

    // Other regions
    pub const IA: u32 = 301;
    pub const KA: u32 = 601;
    pub const THOR: u32 = 603;

    pub const TABLE: &[(u32, &str)] = &[
        (KR, "KR"),
        (FRAM, "Fram"),
        (VALUR, "Valur"),
        (VIKINGUR_R, "Víkingur R"),
        (THROTTUR_R, "Þróttur R"),
        (LEIKNIR_R, "Leiknir R"),
        (FJOLNIR, "Fjölnir"),
        (GROTTA, "Grótta"),
        (BREIDABLIK, "Breiðablik"),
        (HK, "HK"),
        (STJARNAN, "Stjarnan"),
        (FH, "FH"),
        (HAUKAR, "Haukar"),
        (KEFLAVIK, "Keflavík"),
        (AFTURELDING, "Afturelding"),
        (IA, "ÍA"),
        (KA, "KA"),
        (THOR, "Þór"),
    ];

    pub fn name_for(id: u32) -> String {
        super::lookup(TABLE, id, "Team")
    }
}

/// Tournament type ids used by the tournament listing page.
pub mod tournament_type {
    pub const ISLANDSMOT: u32 = 61;

    pub const TABLE: &[(u32, &str)] = &[(ISLANDSMOT, "Íslandsmót")];

    pub fn name_for(id: u32) -> String {
        super::lookup(TABLE, id, "Tournament Type")
    }
}

fn lookup(table: &[(u32, &str)], id: u32, kind: &str) -> String {
    table
        .iter()
        .find(|(value, _)| *value == id)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("Unknown {kind} ({id})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids_resolve_to_names() {
        assert_eq!(age_group::name_for(420), "Fifth Flokkur");
        assert_eq!(team::name_for(team::GROTTA), "Grótta");
        assert_eq!(tournament_type::name_for(61), "Íslandsmót");
    }

    #[test]
    fn test_unknown_ids_fall_back() {
        assert_eq!(age_group::name_for(999), "Unknown Age Group (999)");
        assert_eq!(team::name_for(1), "Unknown Team (1)");
        assert_eq!(tournament_type::name_for(0), "Unknown Tournament Type (0)");
    }

    #[test]
    fn test_tables_have_unique_ids() {
        for table in [age_group::TABLE, team::TABLE, tournament_type::TABLE] {
            let mut ids: Vec<u32> = table.iter().map(|(id, _)| *id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), table.len());
        }
    }
}
