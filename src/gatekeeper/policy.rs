//! Admission checks, in the order they are applied.

use axum::http::Method;

use super::error::GateError;

/// The only method admitted past the gate.
pub const ALLOWED_METHOD: Method = Method::GET;

/// Upper-cased markers of an acceptable negotiated TLS version.
const ACCEPTED_TLS_MARKERS: [&str; 2] = ["TLSV1.2", "TLSV1.3"];

/// True when `version` names TLS 1.2 or 1.3, ignoring case.
///
/// Containment is enough: `"TLSv1.2"` and `"TLSV1.2, renegotiated"` both pass.
pub fn tls_version_acceptable(version: Option<&str>) -> bool {
    match version {
        Some(version) => {
            let upper = version.to_ascii_uppercase();
            ACCEPTED_TLS_MARKERS.iter().any(|marker| upper.contains(marker))
        }
        None => false,
    }
}

/// Transport-security floor.
pub fn check_transport(version: Option<&str>) -> Result<(), GateError> {
    if tls_version_acceptable(version) {
        Ok(())
    } else {
        Err(GateError::TlsPolicyViolation {
            version: version.map(str::to_string),
        })
    }
}

/// Method allowlist. Comparison is exact: `get` is not `GET`.
pub fn check_method(method: &Method) -> Result<(), GateError> {
    if *method == ALLOWED_METHOD {
        Ok(())
    } else {
        Err(GateError::MethodNotAllowed {
            method: method.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_tls12_and_tls13_in_any_case() {
        for version in ["TLSv1.2", "TLSv1.3", "tlsv1.3", "TLSV1.2", "TLSV1.2, renegotiated", "proto=TLSv1.3"] {
            assert!(tls_version_acceptable(Some(version)), "{version} should pass");
        }
    }

    #[test]
    fn rejects_older_or_missing_versions() {
        for version in ["TLSv1.1", "TLSv1", "TLSv1.0", "SSLv3", "", "TLS 1.2", "TLSv1_2"] {
            assert!(!tls_version_acceptable(Some(version)), "{version} should fail");
        }
        assert!(!tls_version_acceptable(None));
    }

    #[test]
    fn transport_violation_keeps_offending_version() {
        match check_transport(Some("TLSv1.1")) {
            Err(GateError::TlsPolicyViolation { version }) => {
                assert_eq!(version.as_deref(), Some("TLSv1.1"))
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            check_transport(None),
            Err(GateError::TlsPolicyViolation { version: None })
        ));
        assert!(check_transport(Some("TLSv1.3")).is_ok());
    }

    #[test]
    fn only_get_is_allowed() {
        assert!(check_method(&Method::GET).is_ok());

        let lowercase = Method::from_bytes(b"get").unwrap();
        for method in [Method::HEAD, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS, lowercase] {
            assert!(
                matches!(check_method(&method), Err(GateError::MethodNotAllowed { .. })),
                "{method} should be rejected"
            );
        }
    }
}
