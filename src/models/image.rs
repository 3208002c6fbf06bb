use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GenPixError, Result};

/// One generated image as returned by the generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub url: String,
}

/// Number of images requested per generation, sent as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Amount {
    #[default]
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
}

impl Amount {
    pub const ALL: [Amount; 5] = [
        Amount::One,
        Amount::Two,
        Amount::Three,
        Amount::Four,
        Amount::Five,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Amount::One => "1",
            Amount::Two => "2",
            Amount::Three => "3",
            Amount::Four => "4",
            Amount::Five => "5",
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Amount::One => 1,
            Amount::Two => 2,
            Amount::Three => 3,
            Amount::Four => 4,
            Amount::Five => 5,
        }
    }

    /// Label shown in the amount picker.
    pub fn label(&self) -> String {
        match self {
            Amount::One => "1 Photo".to_string(),
            other => format!("{} Photos", other.count()),
        }
    }
}

impl FromStr for Amount {
    type Err = GenPixError;

    fn from_str(s: &str) -> Result<Self> {
        Amount::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| GenPixError::ValidationError(format!("Unsupported amount: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "256x256")]
    Small,
    #[default]
    #[serde(rename = "512x512")]
    Medium,
    #[serde(rename = "1024x1024")]
    Large,
}

impl Resolution {
    pub const ALL: [Resolution; 3] = [Resolution::Small, Resolution::Medium, Resolution::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Small => "256x256",
            Resolution::Medium => "512x512",
            Resolution::Large => "1024x1024",
        }
    }
}

impl FromStr for Resolution {
    type Err = GenPixError;

    fn from_str(s: &str) -> Result<Self> {
        Resolution::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                GenPixError::ValidationError(format!("Unsupported resolution: {}", s))
            })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values bound to the generation form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormValues {
    pub prompt: String,
    pub amount: Amount,
    pub resolution: Resolution,
}

impl FormValues {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(GenPixError::ValidationError("Prompt is required.".into()));
        }
        Ok(())
    }
}

/// Body posted to the generation endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub amount: Amount,
    pub resolution: Resolution,
}

impl<'a> From<&'a FormValues> for GenerationRequest<'a> {
    fn from(values: &'a FormValues) -> Self {
        GenerationRequest {
            prompt: &values.prompt,
            amount: values.amount,
            resolution: values.resolution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_match_form() {
        let values = FormValues::default();
        assert_eq!(values.prompt, "");
        assert_eq!(values.amount.as_str(), "1");
        assert_eq!(values.resolution.as_str(), "512x512");
    }

    #[test]
    fn test_empty_prompt_rejected() {
        assert!(FormValues::new("   ").validate().is_err());
        assert!(FormValues::new("A red circle").validate().is_ok());
    }

    #[test]
    fn test_request_wire_shape() {
        let values = FormValues::new("A red circle")
            .with_amount(Amount::Three)
            .with_resolution(Resolution::Large);
        let body = serde_json::to_value(GenerationRequest::from(&values)).unwrap();
        assert_eq!(
            body,
            json!({"prompt": "A red circle", "amount": "3", "resolution": "1024x1024"})
        );
    }

    #[test]
    fn test_parse_options() {
        assert_eq!("4".parse::<Amount>().unwrap(), Amount::Four);
        assert!("6".parse::<Amount>().is_err());
        assert_eq!("256x256".parse::<Resolution>().unwrap(), Resolution::Small);
        assert!("300x300".parse::<Resolution>().is_err());
        assert_eq!(Amount::One.label(), "1 Photo");
        assert_eq!(Amount::Two.label(), "2 Photos");
    }

    #[test]
    fn test_image_results_decode_in_order() {
        let raw = r#"[{"url":"https://x/1.png"},{"url":"https://x/2.png"}]"#;
        let images: Vec<ImageResult> = serde_json::from_str(raw).unwrap();
        assert_eq!(images[0].url, "https://x/1.png");
        assert_eq!(images[1].url, "https://x/2.png");
    }
}
