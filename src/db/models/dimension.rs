use serde::Deserialize;

/// Dimension tables backing the dashboard filter dropdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Dimension {
    #[serde(rename = "brands")]
    Brand,
    #[serde(rename = "locations")]
    Location,
    #[serde(rename = "platforms")]
    Platform,
}

impl Dimension {
    pub fn table(&self) -> &'static str {
        match self {
            Dimension::Brand => "rb_brands",
            Dimension::Location => "rb_location",
            Dimension::Platform => "rb_platform",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Brand => "brand_name",
            Dimension::Location => "location_name",
            Dimension::Platform => "platform_name",
        }
    }
}
