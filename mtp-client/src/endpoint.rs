//! Remote endpoint descriptors.

/// A remote server instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// Numeric endpoint id, also the storage namespace for its key material.
    pub id: i32,
    /// IP address or hostname.
    pub address: &'static str,
    /// TCP port.
    pub port: u16,
}

/// Bootstrap production endpoint table.
pub fn production_endpoints() -> &'static [Endpoint] {
    &[
        Endpoint { id: 1, address: "149.154.175.53", port: 443 },
        Endpoint { id: 2, address: "149.154.167.51", port: 443 },
        Endpoint { id: 3, address: "149.154.175.100", port: 443 },
        Endpoint { id: 4, address: "149.154.167.91", port: 443 },
        Endpoint { id: 5, address: "91.108.56.130", port: 443 },
    ]
}

/// Test-network endpoint table.
pub fn test_endpoints() -> &'static [Endpoint] {
    &[
        Endpoint { id: 1, address: "149.154.175.10", port: 443 },
        Endpoint { id: 2, address: "149.154.167.40", port: 443 },
        Endpoint { id: 3, address: "149.154.175.117", port: 443 },
    ]
}

/// Look up an endpoint by id in the production table.
pub fn endpoint_by_id(id: i32) -> Option<&'static Endpoint> {
    production_endpoints().iter().find(|e| e.id == id)
}
