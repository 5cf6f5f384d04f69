use serde::{Deserialize, Serialize};

/// Color tag of a jar. Tags outside the known set are kept verbatim in
/// `Other` so that data written by another client survives a round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub(crate) enum JarColor {
    #[default]
    Blue,
    Green,
    Orange,
    Pink,
    Purple,
    Red,
    Teal,
    Yellow,
    Other(String),
}

impl JarColor {
    pub(crate) fn as_str(&self) -> &str {
        match self {
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Orange => "orange",
            Self::Pink => "pink",
            Self::Purple => "purple",
            Self::Red => "red",
            Self::Teal => "teal",
            Self::Yellow => "yellow",
            Self::Other(tag) => tag,
        }
    }

    pub(crate) fn parse(s: &str) -> Self {
        match s {
            "blue" => Self::Blue,
            "green" => Self::Green,
            "orange" => Self::Orange,
            "pink" => Self::Pink,
            "purple" => Self::Purple,
            "red" => Self::Red,
            "teal" => Self::Teal,
            "yellow" => Self::Yellow,
            other => Self::Other(other.to_string()),
        }
    }

    pub(crate) fn all() -> &'static [JarColor] {
        static ALL: [JarColor; 8] = [
            JarColor::Blue,
            JarColor::Green,
            JarColor::Orange,
            JarColor::Pink,
            JarColor::Purple,
            JarColor::Red,
            JarColor::Teal,
            JarColor::Yellow,
        ];
        &ALL
    }

    pub(crate) fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for JarColor {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<JarColor> for String {
    fn from(value: JarColor) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for JarColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Icon tag of a jar, same open-ended round-trip rules as [`JarColor`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub(crate) enum JarIcon {
    #[default]
    Banknote,
    Airplane,
    Car,
    House,
    Gift,
    GraduationCap,
    Heart,
    Gamecontroller,
    Pawprint,
    Star,
    Other(String),
}

impl JarIcon {
    pub(crate) fn as_str(&self) -> &str {
        match self {
            Self::Banknote => "banknote",
            Self::Airplane => "airplane",
            Self::Car => "car",
            Self::House => "house",
            Self::Gift => "gift",
            Self::GraduationCap => "graduationcap",
            Self::Heart => "heart",
            Self::Gamecontroller => "gamecontroller",
            Self::Pawprint => "pawprint",
            Self::Star => "star",
            Self::Other(tag) => tag,
        }
    }

    pub(crate) fn parse(s: &str) -> Self {
        match s {
            "banknote" => Self::Banknote,
            "airplane" => Self::Airplane,
            "car" => Self::Car,
            "house" => Self::House,
            "gift" => Self::Gift,
            "graduationcap" => Self::GraduationCap,
            "heart" => Self::Heart,
            "gamecontroller" => Self::Gamecontroller,
            "pawprint" => Self::Pawprint,
            "star" => Self::Star,
            other => Self::Other(other.to_string()),
        }
    }

    pub(crate) fn all() -> &'static [JarIcon] {
        static ALL: [JarIcon; 10] = [
            JarIcon::Banknote,
            JarIcon::Airplane,
            JarIcon::Car,
            JarIcon::House,
            JarIcon::Gift,
            JarIcon::GraduationCap,
            JarIcon::Heart,
            JarIcon::Gamecontroller,
            JarIcon::Pawprint,
            JarIcon::Star,
        ];
        &ALL
    }

    pub(crate) fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for JarIcon {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<JarIcon> for String {
    fn from(value: JarIcon) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for JarIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
