/// SRV service label advertising a WireGuard endpoint
pub const SRV_SERVICE: &str = "_wireguard";

/// SRV transport label; WireGuard only speaks UDP
pub const SRV_PROTO: &str = "_udp";

/// Environment variables read in place of the matching flags
pub const ENV_ZONE: &str = "WGUSD_ZONE";
pub const ENV_IFACE: &str = "WGUSD_IFACE";
pub const ENV_FALLBACK: &str = "WGUSD_FALLBACK";
pub const ENV_CONFIG: &str = "WGUSD_CONFIG";

/// SRV query name for a discovery domain, e.g. "_wireguard._udp.wg.example.com".
/// The domain is used as given: a trailing dot makes it absolute, otherwise
/// the resolver's search list still applies to short zones like "lan".
pub fn srv_query_name(domain: &str) -> String {
    format!("{}.{}.{}", SRV_SERVICE, SRV_PROTO, domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srv_query_name() {
        assert_eq!(srv_query_name("wg.example.com"), "_wireguard._udp.wg.example.com");
        assert_eq!(srv_query_name("wg.example.com."), "_wireguard._udp.wg.example.com.");
    }

    #[test]
    fn test_srv_query_name_keeps_single_label_relative() {
        assert_eq!(srv_query_name("lan"), "_wireguard._udp.lan");
    }
}
