// Host identity (hostname + resolved address)
use async_trait::async_trait;
use std::net::IpAddr;
use sysinfo::System;
use tokio::net::lookup_host;
use tracing::debug;

use helpdesk_core::port::{HostIdentity, SampleFault};

/// Hostname from the OS, address through the system resolver
#[derive(Debug, Default, Clone)]
pub struct SystemHostIdentity;

impl SystemHostIdentity {
    pub fn new() -> Self {
        Self
    }
}

/// Non-loopback IPv4 first, then any IPv4, then whatever the resolver returned
fn pick_address(addresses: &[IpAddr]) -> Option<IpAddr> {
    addresses
        .iter()
        .find(|ip| ip.is_ipv4() && !ip.is_loopback())
        .or_else(|| addresses.iter().find(|ip| ip.is_ipv4()))
        .or_else(|| addresses.first())
        .copied()
}

#[async_trait]
impl HostIdentity for SystemHostIdentity {
    fn hostname(&self) -> Result<String, SampleFault> {
        System::host_name()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| SampleFault::NoSensor("hostname".to_string()))
    }

    async fn resolve(&self, hostname: &str) -> Result<IpAddr, SampleFault> {
        let addresses: Vec<IpAddr> = lookup_host((hostname, 0))
            .await
            .map_err(|e| SampleFault::Failed(format!("cannot resolve {hostname}: {e}")))?
            .map(|addr| addr.ip())
            .collect();

        debug!(hostname = %hostname, candidates = addresses.len(), "Hostname resolved");
        pick_address(&addresses)
            .ok_or_else(|| SampleFault::Failed(format!("{hostname} resolved to no addresses")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_prefers_routable_ipv4() {
        let addrs = [
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 57)),
        ];
        assert_eq!(pick_address(&addrs), Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 57))));
    }

    #[test]
    fn test_falls_back_to_loopback_then_v6() {
        assert_eq!(
            pick_address(&[IpAddr::V6(Ipv6Addr::LOCALHOST), IpAddr::V4(Ipv4Addr::LOCALHOST)]),
            Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
        );
        assert_eq!(
            pick_address(&[IpAddr::V6(Ipv6Addr::LOCALHOST)]),
            Some(IpAddr::V6(Ipv6Addr::LOCALHOST))
        );
        assert_eq!(pick_address(&[]), None);
    }

    #[tokio::test]
    async fn test_resolve_localhost() {
        let ip = SystemHostIdentity::new().resolve("localhost").await.unwrap();
        assert!(ip.is_loopback());
    }
}
