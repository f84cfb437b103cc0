use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::TokioAsyncResolver;
use shared::protocol::srv_query_name;
use shared::types::{Endpoint, ServiceRecord};
use crate::error::LookupError;

/// Anything that can answer a `_wireguard._udp` SRV query.
pub trait SrvSource {
    /// Return the records for `name` in the order the source emitted them.
    /// An empty vec means the query succeeded with no answers.
    async fn lookup_srv(&self, name: &str) -> Result<Vec<ServiceRecord>, LookupError>;
}

/// SRV source backed by the system resolver configuration.
pub struct HickorySrvSource {
    resolver: TokioAsyncResolver,
}

impl HickorySrvSource {
    pub fn from_system_conf() -> Result<Self, LookupError> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().map_err(|e| {
            LookupError::QueryFailed {
                name: "<system resolver>".to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { resolver })
    }
}

impl SrvSource for HickorySrvSource {
    async fn lookup_srv(&self, name: &str) -> Result<Vec<ServiceRecord>, LookupError> {
        match self.resolver.srv_lookup(name).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|srv| ServiceRecord {
                    priority: srv.priority(),
                    weight: srv.weight(),
                    target: srv.target().to_utf8(),
                    port: srv.port(),
                })
                .collect()),
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => Ok(Vec::new()),
                _ => Err(LookupError::QueryFailed {
                    name: name.to_string(),
                    reason: e.to_string(),
                }),
            },
        }
    }
}

/// Pick the most preferred record: lowest priority, then highest weight.
/// Remaining ties keep the earliest record seen.
pub fn select_best(records: &[ServiceRecord]) -> Option<&ServiceRecord> {
    records.iter().fold(None, |best, candidate| match best {
        None => Some(candidate),
        Some(current) if candidate.priority < current.priority => Some(candidate),
        Some(current)
            if candidate.priority == current.priority && candidate.weight > current.weight =>
        {
            Some(candidate)
        }
        keep => keep,
    })
}

/// Discover the WireGuard endpoint advertised for `domain`.
pub async fn resolve<S: SrvSource>(source: &S, domain: &str) -> Result<Endpoint, LookupError> {
    let name = srv_query_name(domain);
    let records = source.lookup_srv(&name).await?;

    for record in &records {
        tracing::debug!(
            "Found SRV record: {} {} {} {}",
            record.priority,
            record.weight,
            record.port,
            record.target
        );
    }

    let chosen = select_best(&records).ok_or(LookupError::NoRecords { name })?;
    tracing::debug!(
        "Preferred SRV record: {} {} {} {}",
        chosen.priority,
        chosen.weight,
        chosen.port,
        chosen.target
    );

    let host = chosen.target.strip_suffix('.').unwrap_or(&chosen.target);
    Ok(Endpoint::new(host, chosen.port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(priority: u16, weight: u16, target: &str, port: u16) -> ServiceRecord {
        ServiceRecord { priority, weight, target: target.to_string(), port }
    }

    #[derive(Default)]
    struct StaticSrv {
        zones: HashMap<String, Vec<ServiceRecord>>,
    }

    impl StaticSrv {
        fn with(name: &str, records: Vec<ServiceRecord>) -> Self {
            Self { zones: HashMap::from([(name.to_string(), records)]) }
        }
    }

    impl SrvSource for StaticSrv {
        async fn lookup_srv(&self, name: &str) -> Result<Vec<ServiceRecord>, LookupError> {
            self.zones.get(name).cloned().ok_or_else(|| LookupError::QueryFailed {
                name: name.to_string(),
                reason: "SERVFAIL".to_string(),
            })
        }
    }

    #[test]
    fn test_select_lowest_priority() {
        let records = vec![record(20, 100, "a.", 1), record(10, 0, "b.", 2), record(30, 0, "c.", 3)];
        assert_eq!(select_best(&records).unwrap().target, "b.");
    }

    #[test]
    fn test_select_highest_weight_on_equal_priority() {
        let records = vec![record(10, 5, "a", 1), record(10, 9, "b", 2)];
        let best = select_best(&records).unwrap();
        assert_eq!((best.target.as_str(), best.port), ("b", 2));
    }

    #[test]
    fn test_select_keeps_first_of_true_ties() {
        let records = vec![record(10, 5, "a", 1), record(10, 5, "b", 2), record(10, 1, "c", 3)];
        assert_eq!(select_best(&records).unwrap().target, "a");

        let reordered = vec![record(10, 1, "c", 3), record(10, 5, "a", 1), record(10, 5, "b", 2)];
        assert_eq!(select_best(&reordered).unwrap().target, "a");
    }

    #[test]
    fn test_priority_beats_weight() {
        let records = vec![record(10, 0, "low-weight", 1), record(20, 65535, "heavy", 2)];
        assert_eq!(select_best(&records).unwrap().target, "low-weight");
    }

    #[test]
    fn test_select_empty() {
        assert!(select_best(&[]).is_none());
    }

    #[tokio::test]
    async fn test_resolve_strips_root_dot() {
        let source = StaticSrv::with(
            "_wireguard._udp.wg.example.com",
            vec![record(10, 0, "node1.example.com.", 51820)],
        );
        let endpoint = resolve(&source, "wg.example.com").await.unwrap();
        assert_eq!(endpoint, Endpoint::new("node1.example.com", 51820));
    }

    #[tokio::test]
    async fn test_resolve_strips_only_one_dot() {
        let source = StaticSrv::with("_wireguard._udp.example.org", vec![record(0, 0, "odd..", 1)]);
        let endpoint = resolve(&source, "example.org").await.unwrap();
        assert_eq!(endpoint.host, "odd.");
    }

    #[tokio::test]
    async fn test_resolve_no_records() {
        let source = StaticSrv::with("_wireguard._udp.wg.example.com", Vec::new());
        let err = resolve(&source, "wg.example.com").await.unwrap_err();
        assert!(matches!(err, LookupError::NoRecords { .. }));
    }

    #[tokio::test]
    async fn test_resolve_query_failure() {
        let err = resolve(&StaticSrv::default(), "wg.example.com").await.unwrap_err();
        assert!(matches!(err, LookupError::QueryFailed { .. }));
    }
}
