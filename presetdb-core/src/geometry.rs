//! Geometry classes a mapped entity may take.
//!
//! # Examples
//! ```
//! use presetdb_core::Geometry;
//!
//! assert_eq!(Geometry::Area.as_str(), "area");
//! assert_eq!("vertex".parse::<Geometry>(), Ok(Geometry::Vertex));
//! ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Geometry {
    /// A standalone node.
    Point,
    /// A node that is part of a way.
    Vertex,
    /// An open way.
    Line,
    /// A closed way or multipolygon.
    Area,
    /// A relation that is not an area.
    Relation,
}

impl Geometry {
    /// Every geometry class, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Point,
        Self::Vertex,
        Self::Line,
        Self::Area,
        Self::Relation,
    ];

    /// Return the geometry as a lowercase `&str`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Vertex => "vertex",
            Self::Line => "line",
            Self::Area => "area",
            Self::Relation => "relation",
        }
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Geometry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "point" => Ok(Self::Point),
            "vertex" => Ok(Self::Vertex),
            "line" => Ok(Self::Line),
            "area" => Ok(Self::Area),
            "relation" => Ok(Self::Relation),
            _ => Err(format!("unknown geometry '{s}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn display_matches_as_str() {
        for geometry in Geometry::ALL {
            assert_eq!(geometry.to_string(), geometry.as_str());
        }
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(Geometry::from_str("LINE"), Ok(Geometry::Line));
    }

    #[test]
    fn parsing_rejects_unknown() {
        let err = Geometry::from_str("polygon").unwrap_err();
        assert!(err.contains("unknown geometry"));
    }
}
