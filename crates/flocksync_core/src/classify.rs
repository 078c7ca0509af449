//! Transport error classification.

use crate::error::{DataError, TransportError};

/// Maps a raw transport failure into the closed [`DataError`] taxonomy.
///
/// Total over every [`TransportError`] value: unmatched shapes (including
/// HTTP statuses outside 400-599) fall through to [`DataError::Unknown`].
/// Pure and side-effect free; callers own any logging.
pub fn classify(error: &TransportError) -> DataError {
    match error {
        TransportError::ConnectionFailed(_) => DataError::NoInternet,
        TransportError::TimedOut { .. } => DataError::Timeout,
        TransportError::Http { status, .. } if (400..=499).contains(status) => {
            DataError::Client(*status)
        }
        TransportError::Http { status, .. } if (500..=599).contains(status) => {
            DataError::Server(*status)
        }
        other => DataError::unknown(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_absence() {
        let err = TransportError::ConnectionFailed("dns lookup failed".into());
        assert_eq!(classify(&err), DataError::NoInternet);
    }

    #[test]
    fn deadline_elapsed() {
        let err = TransportError::TimedOut { millis: 30_000 };
        assert_eq!(classify(&err), DataError::Timeout);
    }

    #[test]
    fn http_status_ranges() {
        let not_found = TransportError::Http {
            status: 404,
            message: "no such flock".into(),
        };
        assert_eq!(classify(&not_found), DataError::Client(404));

        let unavailable = TransportError::Http {
            status: 503,
            message: "maintenance".into(),
        };
        assert_eq!(classify(&unavailable), DataError::Server(503));

        // Boundary statuses
        let bad_request = TransportError::Http { status: 400, message: String::new() };
        assert_eq!(classify(&bad_request), DataError::Client(400));
        let teapot_neighbour = TransportError::Http { status: 499, message: String::new() };
        assert_eq!(classify(&teapot_neighbour), DataError::Client(499));
        let internal = TransportError::Http { status: 500, message: String::new() };
        assert_eq!(classify(&internal), DataError::Server(500));
        let edge = TransportError::Http { status: 599, message: String::new() };
        assert_eq!(classify(&edge), DataError::Server(599));
    }

    #[test]
    fn out_of_range_status_is_unknown() {
        let redirect = TransportError::Http {
            status: 301,
            message: "moved".into(),
        };
        assert!(matches!(classify(&redirect), DataError::Unknown(_)));
    }

    #[test]
    fn arbitrary_failure_is_unknown() {
        let err = TransportError::Other("tls handshake exploded".into());
        match classify(&err) {
            DataError::Unknown(message) => assert!(message.contains("tls handshake")),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }
}
