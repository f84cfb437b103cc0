use shared::types::Endpoint;
use crate::error::ConfigError;

/// Statically configured endpoint used when SRV discovery fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback(pub Endpoint);

impl Fallback {
    /// `Ok(None)` when no fallback is configured; an error when one is
    /// configured but unusable.
    pub fn from_setting(setting: Option<&str>) -> Result<Option<Self>, ConfigError> {
        match setting {
            None | Some("") => Ok(None),
            Some(input) => parse_fallback(input).map(|endpoint| Some(Fallback(endpoint))),
        }
    }
}

/// Parse a "host:port" string. IPv6 literals must be bracketed.
pub fn parse_fallback(input: &str) -> Result<Endpoint, ConfigError> {
    let (host, port) = split_host_port(input)?;

    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(input, "port is not a decimal number"));
    }
    // Only overflow can fail once the port is all digits
    let port: u16 = port.parse().map_err(|_| ConfigError::PortOutOfRange {
        input: input.to_string(),
        port: port.to_string(),
    })?;

    if host.is_empty() {
        return Err(ConfigError::EmptyHost { input: input.to_string() });
    }

    Ok(Endpoint::new(host, port))
}

fn split_host_port(input: &str) -> Result<(&str, &str), ConfigError> {
    if let Some(rest) = input.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| malformed(input, "missing ']' in address"))?;
        let port = after
            .strip_prefix(':')
            .ok_or_else(|| malformed(input, "missing port in address"))?;
        if host.contains('[') || port.contains(']') || port.contains('[') {
            return Err(malformed(input, "unexpected bracket in address"));
        }
        return Ok((host, port));
    }

    let (host, port) = input
        .rsplit_once(':')
        .ok_or_else(|| malformed(input, "missing port in address"))?;
    if host.contains(':') {
        return Err(malformed(input, "too many colons in address"));
    }
    if host.contains('[') || host.contains(']') || port.contains('[') || port.contains(']') {
        return Err(malformed(input, "unexpected bracket in address"));
    }
    Ok((host, port))
}

fn malformed(input: &str, reason: &'static str) -> ConfigError {
    ConfigError::Malformed { input: input.to_string(), reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hostname() {
        assert_eq!(
            parse_fallback("backup.example.com:51820").unwrap(),
            Endpoint::new("backup.example.com", 51820)
        );
    }

    #[test]
    fn test_parse_port_bounds() {
        assert_eq!(parse_fallback("h:0").unwrap().port, 0);
        assert_eq!(parse_fallback("h:65535").unwrap().port, 65535);
        assert!(matches!(
            parse_fallback("h:65536"),
            Err(ConfigError::PortOutOfRange { .. })
        ));
        assert!(matches!(
            parse_fallback("h:99999999999999999999999"),
            Err(ConfigError::PortOutOfRange { .. })
        ));
    }

    #[test]
    fn test_parse_ip_literals() {
        assert_eq!(parse_fallback("192.0.2.7:51820").unwrap(), Endpoint::new("192.0.2.7", 51820));
        assert_eq!(parse_fallback("[fd00::1]:51820").unwrap(), Endpoint::new("fd00::1", 51820));
    }

    #[test]
    fn test_parse_malformed() {
        for input in ["backup.example.com", "fd00::1:51820", "h:", "h:port", "h:+80", "h:-1", "[fd00::1]", "[fd00::1:80", "a]:80"] {
            assert!(
                matches!(parse_fallback(input), Err(ConfigError::Malformed { .. })),
                "expected Malformed for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_parse_empty_host() {
        assert!(matches!(parse_fallback(":51820"), Err(ConfigError::EmptyHost { .. })));
        assert!(matches!(parse_fallback("[]:51820"), Err(ConfigError::EmptyHost { .. })));
    }

    #[test]
    fn test_from_setting_distinguishes_absent_and_invalid() {
        assert_eq!(Fallback::from_setting(None).unwrap(), None);
        assert_eq!(Fallback::from_setting(Some("")).unwrap(), None);
        assert!(Fallback::from_setting(Some("nonsense")).is_err());
        assert_eq!(
            Fallback::from_setting(Some("h:1")).unwrap(),
            Some(Fallback(Endpoint::new("h", 1)))
        );
    }
}
