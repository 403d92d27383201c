// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - DNS Resolution
 * Resolver capability used by the subdomain takeover spider
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::errors::{SpiderError, SpiderResult};
use async_trait::async_trait;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioResolver;
use tracing::debug;

/// Records observed for one host. Lookups never fail the caller; an
/// unresolvable host is simply empty with `nxdomain` set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsRecords {
    pub a: Vec<String>,
    pub cname: Vec<String>,
    pub ns: Vec<String>,
    pub dnssec: bool,
    pub nxdomain: bool,
}

impl DnsRecords {
    /// Host resolves to something an attacker-claimable service could sit behind
    pub fn resolves(&self) -> bool {
        !self.a.is_empty() || !self.cname.is_empty()
    }
}

#[async_trait]
pub trait DnsLookup: Send + Sync {
    async fn resolve(&self, host: &str) -> DnsRecords;
}

/// hickory-resolver backed implementation
pub struct HickoryDns {
    resolver: TokioResolver,
}

impl HickoryDns {
    pub fn new() -> SpiderResult<Self> {
        let resolver = TokioResolver::builder(TokioConnectionProvider::default())
            .map_err(|e| SpiderError::General(format!("Failed to create resolver: {e}")))?
            .build();
        Ok(Self { resolver })
    }
}

#[async_trait]
impl DnsLookup for HickoryDns {
    async fn resolve(&self, host: &str) -> DnsRecords {
        let mut records = DnsRecords::default();

        match self.resolver.lookup_ip(host).await {
            Ok(lookup) => {
                records.a = lookup.iter().map(|ip| ip.to_string()).collect();
            }
            Err(err) => {
                let msg = err.to_string().to_lowercase();
                if msg.contains("nxdomain") || msg.contains("no name") {
                    records.nxdomain = true;
                }
                debug!(host = host, error = %err, "A lookup failed");
            }
        }

        if let Ok(lookup) = self.resolver.lookup(host, RecordType::CNAME).await {
            records.cname = lookup
                .iter()
                .filter_map(|r| {
                    r.as_cname()
                        .map(|c| c.0.to_string().trim_end_matches('.').to_string())
                })
                .collect();
        }

        if let Ok(lookup) = self.resolver.lookup(host, RecordType::NS).await {
            records.ns = lookup
                .iter()
                .filter_map(|r| {
                    r.as_ns()
                        .map(|n| n.0.to_string().trim_end_matches('.').to_string())
                })
                .collect();
        }

        // RRSIG presence is only a hint that the zone signs records
        if let Ok(lookup) = self.resolver.lookup(host, RecordType::RRSIG).await {
            records.dnssec = lookup.iter().next().is_some();
        }

        records
    }
}

pub mod mock {
    use super::*;
    use std::collections::HashMap;

    /// Table-driven resolver for tests
    #[derive(Default)]
    pub struct MockDns {
        pub table: HashMap<String, DnsRecords>,
    }

    impl MockDns {
        pub fn with(mut self, host: &str, records: DnsRecords) -> Self {
            self.table.insert(host.to_string(), records);
            self
        }
    }

    #[async_trait]
    impl DnsLookup for MockDns {
        async fn resolve(&self, host: &str) -> DnsRecords {
            self.table.get(host).cloned().unwrap_or(DnsRecords {
                nxdomain: true,
                ..DnsRecords::default()
            })
        }
    }
}
