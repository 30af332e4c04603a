//! Address checks applied at every boundary of the client.

use std::net::IpAddr;

use itertools::Itertools;

use crate::error::{IpamError, Result};
use crate::models::RangeQuery;

/// Returns true if `s` parses as a dotted-decimal IPv4 address or an IPv6 literal.
///
/// This is a guard only: reserved, loopback and other non-routable addresses
/// are accepted, and the input is never rewritten.
pub fn is_valid_address(s: &str) -> bool {
    s.parse::<IpAddr>().is_ok()
}

/// Rejects a range query whose range or mask is not an address literal.
///
/// Shared by the availability query and the assignment submitter so both fail
/// before any request is built.
pub fn ensure_range_query(query: &RangeQuery) -> Result<()> {
    if !is_valid_address(&query.range) {
        return Err(IpamError::Validation(format!(
            "{} is not in IP address format (range)",
            query.range
        )));
    }
    if !is_valid_address(&query.mask) {
        return Err(IpamError::Validation(format!(
            "{} is not in IP address format (mask)",
            query.mask
        )));
    }
    Ok(())
}

/// Splits a dotted address into its four octet strings.
///
/// Anything that does not split into exactly four parts (IPv6 literals
/// included) is reported as a malformed address.
pub fn octets(addr: &str) -> Result<[String; 4]> {
    addr.split('.')
        .map(str::to_string)
        .collect_tuple()
        .map(|(a, b, c, d)| [a, b, c, d])
        .ok_or_else(|| {
            IpamError::Validation(format!(
                "{} does not decompose into four octets",
                addr
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    mod is_valid_address_tests {
        use super::*;

        #[test]
        fn test_ipv4_accepted() {
            for s in ["10.0.0.1", "0.0.0.0", "255.255.255.224", "192.168.1.255"] {
                assert!(is_valid_address(s), "{s} should be valid");
            }
        }

        #[test]
        fn test_ipv6_accepted() {
            assert!(is_valid_address("::1"));
            assert!(is_valid_address("fe80::1"));
            assert!(is_valid_address("2001:db8::ff00:42:8329"));
        }

        #[test]
        fn test_reserved_addresses_not_rejected() {
            assert!(is_valid_address("127.0.0.1"));
            assert!(is_valid_address("169.254.0.1"));
            assert!(is_valid_address("255.255.255.255"));
        }

        #[test]
        fn test_non_addresses_rejected() {
            for s in [
                "",
                "not-an-ip",
                "10.0.0",
                "10.0.0.256",
                "10.0.0.1/24",
                " 10.0.0.1",
                "10.0.0.1.5",
                "example.com",
            ] {
                assert!(!is_valid_address(s), "{s:?} should be invalid");
            }
        }
    }

    mod ensure_range_query_tests {
        use super::*;

        #[test]
        fn test_valid_pair_passes() {
            let query = RangeQuery::new("10.156.0.0", "255.255.255.224");
            assert!(ensure_range_query(&query).is_ok());
        }

        #[test]
        fn test_bad_range_names_range() {
            let err = ensure_range_query(&RangeQuery::new("ten", "255.255.255.0")).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert!(err.to_string().contains("ten"));
            assert!(err.to_string().contains("range"));
        }

        #[test]
        fn test_bad_mask_names_mask() {
            let err = ensure_range_query(&RangeQuery::new("10.0.0.0", "/27")).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert!(err.to_string().contains("mask"));
        }
    }

    mod octets_tests {
        use super::*;

        #[test]
        fn test_ipv4_splits_into_four() {
            assert_eq!(
                octets("255.255.255.224").unwrap(),
                ["255", "255", "255", "224"].map(String::from)
            );
        }

        #[test]
        fn test_ipv6_is_malformed() {
            let err = octets("fe80::1").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }

        #[test]
        fn test_wrong_count_is_malformed() {
            assert!(octets("10.0.0").is_err());
            assert!(octets("10.0.0.0.1").is_err());
        }
    }
}
