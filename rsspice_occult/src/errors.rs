/// Errors raised by the geometry routines.
///
/// Each variant corresponds to a SPICE short error message, and carries the
/// long message describing the specific failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid Axis Length--Semi-axis Length is Non-positive")]
    BADAXISLENGTH(String),
    #[error("Invalid Endpoints--Left Endpoint Exceeds Right Endpoint")]
    BADENDPOINTS(String),
    #[error("The geometric computation cannot be performed for this degenerate input")]
    DEGENERATECASE(String),
    #[error("Input values are too large to be used without overflow")]
    INPUTSTOOLARGE(String),
    #[error("Ellipse axis has zero length")]
    INVALIDAXISLENGTH(String),
    #[error("Invalid count of items")]
    INVALIDCOUNT(String),
    #[error("Point is not valid for this computation")]
    INVALIDPOINT(String),
    #[error("Invalid convergence tolerance")]
    INVALIDTOLERANCE(String),
    #[error("Matrix is not a rotation")]
    NOTAROTATION(String),
    #[error("Target ellipsoids are not disjoint")]
    NOTDISJOINT(String),
    #[error("Requested operation is not supported")]
    NOTSUPPORTED(String),
    #[error("Input Vector is the Zero Vector")]
    ZEROVECTOR(String),
}

impl Error {
    /// SPICE short error message, e.g. `SPICE(NOTDISJOINT)`.
    pub fn short(&self) -> &'static str {
        match self {
            Error::BADAXISLENGTH(_) => "SPICE(BADAXISLENGTH)",
            Error::BADENDPOINTS(_) => "SPICE(BADENDPOINTS)",
            Error::DEGENERATECASE(_) => "SPICE(DEGENERATECASE)",
            Error::INPUTSTOOLARGE(_) => "SPICE(INPUTSTOOLARGE)",
            Error::INVALIDAXISLENGTH(_) => "SPICE(INVALIDAXISLENGTH)",
            Error::INVALIDCOUNT(_) => "SPICE(INVALIDCOUNT)",
            Error::INVALIDPOINT(_) => "SPICE(INVALIDPOINT)",
            Error::INVALIDTOLERANCE(_) => "SPICE(INVALIDTOLERANCE)",
            Error::NOTAROTATION(_) => "SPICE(NOTAROTATION)",
            Error::NOTDISJOINT(_) => "SPICE(NOTDISJOINT)",
            Error::NOTSUPPORTED(_) => "SPICE(NOTSUPPORTED)",
            Error::ZEROVECTOR(_) => "SPICE(ZEROVECTOR)",
        }
    }

    /// Long error message, describing this particular failure.
    pub fn long(&self) -> &str {
        match self {
            Error::BADAXISLENGTH(long)
            | Error::BADENDPOINTS(long)
            | Error::DEGENERATECASE(long)
            | Error::INPUTSTOOLARGE(long)
            | Error::INVALIDAXISLENGTH(long)
            | Error::INVALIDCOUNT(long)
            | Error::INVALIDPOINT(long)
            | Error::INVALIDTOLERANCE(long)
            | Error::NOTAROTATION(long)
            | Error::NOTDISJOINT(long)
            | Error::NOTSUPPORTED(long)
            | Error::ZEROVECTOR(long) => long,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long() {
        let err = Error::NOTDISJOINT("The target ellipsoids intersect.".to_owned());
        assert_eq!(err.short(), "SPICE(NOTDISJOINT)");
        assert_eq!(err.long(), "The target ellipsoids intersect.");
        assert_eq!(err.to_string(), "Target ellipsoids are not disjoint");
    }
}
