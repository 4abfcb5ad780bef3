//! Occurrence constraints
//!
//! `minOccurs`/`maxOccurs` are stored as raw strings in the model; this is
//! where they are interpreted.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#p

use crate::error::{Error, Result};

/// Occurrence bounds for a particle (minOccurs, maxOccurs)
/// None for max means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// Minimum number of occurrences (default 1)
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded, default 1)
    pub max: Option<u32>,
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Default occurrence (1, 1)
    pub fn once() -> Self {
        Self { min: 1, max: Some(1) }
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self { min: 0, max: Some(1) }
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// Interpret raw `minOccurs`/`maxOccurs` attribute values
    pub fn parse(min: Option<&str>, max: Option<&str>) -> Result<Self> {
        let min = match min.map(str::trim) {
            None => 1,
            Some(value) => value
                .parse()
                .map_err(|_| Error::InvalidSchema(format!("invalid minOccurs '{}'", value)))?,
        };
        let max = match max.map(str::trim) {
            None => Some(1),
            Some("unbounded") => None,
            Some(value) => Some(
                value
                    .parse()
                    .map_err(|_| Error::InvalidSchema(format!("invalid maxOccurs '{}'", value)))?,
            ),
        };
        Ok(Self { min, max })
    }

    /// Check if this particle can be absent (minOccurs == 0)
    pub fn is_emptiable(&self) -> bool {
        self.min == 0
    }

    /// Check if particle has maxOccurs == 1
    pub fn is_single(&self) -> bool {
        self.max == Some(1)
    }

    /// Check if values of this particle are arrays (any maxOccurs other than 1)
    pub fn is_repeated(&self) -> bool {
        !self.is_single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let occurs = Occurs::parse(None, None).unwrap();
        assert_eq!(occurs, Occurs::once());
        assert!(occurs.is_single());
        assert!(!occurs.is_emptiable());
    }

    #[test]
    fn test_parse_bounds() {
        assert_eq!(Occurs::parse(Some("0"), Some("unbounded")).unwrap(), Occurs::zero_or_more());
        assert_eq!(Occurs::parse(Some("0"), Some("5")).unwrap(), Occurs::new(0, Some(5)));
        assert_eq!(Occurs::parse(Some("0"), None).unwrap(), Occurs::optional());
    }

    #[test]
    fn test_repeated_is_anything_but_one() {
        assert!(!Occurs::parse(None, Some("1")).unwrap().is_repeated());
        assert!(Occurs::parse(None, Some("5")).unwrap().is_repeated());
        assert!(Occurs::parse(None, Some("unbounded")).unwrap().is_repeated());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(Occurs::parse(Some("x"), None), Err(Error::InvalidSchema(_))));
        assert!(Occurs::parse(None, Some("-1")).is_err());
    }
}
