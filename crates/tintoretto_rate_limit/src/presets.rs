//! Preset rate limit configurations for popular services.
//!
//! These presets are based on documented rate limits and common usage
//! patterns. Limits vary by account tier, model, and time; treat them as
//! starting points and verify against your actual quota.

use crate::RateLimitConfig;
use strum::IntoEnumIterator;
use tintoretto_error::{ThrottleError, ThrottleResult};

/// Named rate limit presets.
///
/// Lookup by string is case-insensitive, so `"OPENAI_TIER1"` and
/// `"openai_tier1"` resolve to the same preset. A few aliases from common
/// usage are accepted (`anthropic_standard`, `anthropic_scale`,
/// `google_paid`).
///
/// # Example
///
/// ```
/// use tintoretto_rate_limit::{Preset, RateLimiter};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Preset::get("anthropic_tier2")?.config();
/// assert_eq!(config.max_concurrent, 10);
///
/// let limiter = RateLimiter::new(Preset::ScrapingPolite.into())?;
/// assert_eq!(limiter.max_per_window(), Some(10));
/// # Ok(())
/// # }
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Preset {
    /// OpenAI free tier.
    OpenaiFree,
    /// OpenAI usage tier 1.
    OpenaiTier1,
    /// OpenAI usage tier 2.
    OpenaiTier2,
    /// OpenAI usage tier 3.
    OpenaiTier3,
    /// OpenAI usage tier 4.
    OpenaiTier4,
    /// OpenAI usage tier 5.
    OpenaiTier5,
    /// Anthropic free tier.
    AnthropicFree,
    /// Anthropic build tier 1.
    #[strum(to_string = "anthropic_tier1", serialize = "anthropic_standard")]
    AnthropicTier1,
    /// Anthropic build tier 2.
    AnthropicTier2,
    /// Anthropic build tier 3.
    #[strum(to_string = "anthropic_tier3", serialize = "anthropic_scale")]
    AnthropicTier3,
    /// Anthropic build tier 4.
    AnthropicTier4,
    /// Google AI free tier.
    GoogleFree,
    /// Google AI pay-as-you-go.
    #[strum(to_string = "google_pay_as_you_go", serialize = "google_paid")]
    GooglePayAsYouGo,
    /// Cohere trial keys.
    CohereTrial,
    /// Cohere production keys.
    CohereProduction,
    /// Hugging Face inference API, free.
    HuggingfaceFree,
    /// Hugging Face inference API, PRO.
    HuggingfacePro,
    /// Mistral free tier.
    MistralFree,
    /// Mistral standard tier.
    MistralStandard,
    /// Safe default when limits are unknown.
    Conservative,
    /// Balanced default.
    Moderate,
    /// High-throughput default.
    Aggressive,
    /// Concurrency cap only, no throughput limit.
    UnlimitedConcurrent,
    /// Web scraping, polite pace.
    ScrapingPolite,
    /// Web scraping, moderate pace.
    ScrapingModerate,
    /// Web scraping, aggressive pace.
    ScrapingAggressive,
}

impl Preset {
    /// The rate limit configuration for this preset.
    pub fn config(&self) -> RateLimitConfig {
        match self {
            Preset::OpenaiFree => RateLimitConfig::with_window(3, 3),
            Preset::OpenaiTier1 => RateLimitConfig::with_window(5, 60),
            Preset::OpenaiTier2 => RateLimitConfig::with_window(10, 500),
            Preset::OpenaiTier3 => RateLimitConfig::with_window(15, 5000),
            Preset::OpenaiTier4 => RateLimitConfig::with_window(20, 10000),
            Preset::OpenaiTier5 => RateLimitConfig::with_window(30, 30000),
            Preset::AnthropicFree => RateLimitConfig::with_window(2, 5),
            Preset::AnthropicTier1 => RateLimitConfig::with_window(5, 50),
            Preset::AnthropicTier2 => RateLimitConfig::with_window(10, 1000),
            Preset::AnthropicTier3 => RateLimitConfig::with_window(15, 2000),
            Preset::AnthropicTier4 => RateLimitConfig::with_window(20, 4000),
            Preset::GoogleFree => RateLimitConfig::with_window(2, 15),
            Preset::GooglePayAsYouGo => RateLimitConfig::with_window(10, 1000),
            Preset::CohereTrial => RateLimitConfig::with_window(2, 20),
            Preset::CohereProduction => RateLimitConfig::with_window(10, 10000),
            Preset::HuggingfaceFree => RateLimitConfig::with_window(1, 30),
            Preset::HuggingfacePro => RateLimitConfig::with_window(5, 1000),
            Preset::MistralFree => RateLimitConfig::with_window(2, 30),
            Preset::MistralStandard => RateLimitConfig::with_window(10, 500),
            Preset::Conservative => RateLimitConfig::with_window(2, 20),
            Preset::Moderate => RateLimitConfig::with_window(5, 60),
            Preset::Aggressive => RateLimitConfig::with_window(10, 200),
            Preset::UnlimitedConcurrent => RateLimitConfig::new(50),
            Preset::ScrapingPolite => RateLimitConfig::with_window(2, 10),
            Preset::ScrapingModerate => RateLimitConfig::with_window(5, 30),
            Preset::ScrapingAggressive => RateLimitConfig::with_window(10, 60),
        }
    }

    /// Human-readable description of this preset.
    pub fn description(&self) -> &'static str {
        match self {
            Preset::OpenaiFree => "OpenAI Free Tier",
            Preset::OpenaiTier1 => "OpenAI Tier 1",
            Preset::OpenaiTier2 => "OpenAI Tier 2",
            Preset::OpenaiTier3 => "OpenAI Tier 3",
            Preset::OpenaiTier4 => "OpenAI Tier 4",
            Preset::OpenaiTier5 => "OpenAI Tier 5",
            Preset::AnthropicFree => "Anthropic Free Tier",
            Preset::AnthropicTier1 => "Anthropic Build Tier 1",
            Preset::AnthropicTier2 => "Anthropic Build Tier 2",
            Preset::AnthropicTier3 => "Anthropic Build Tier 3",
            Preset::AnthropicTier4 => "Anthropic Build Tier 4",
            Preset::GoogleFree => "Google AI Free",
            Preset::GooglePayAsYouGo => "Google AI Pay-as-you-go",
            Preset::CohereTrial => "Cohere Trial",
            Preset::CohereProduction => "Cohere Production",
            Preset::HuggingfaceFree => "Hugging Face Inference Free",
            Preset::HuggingfacePro => "Hugging Face Inference PRO",
            Preset::MistralFree => "Mistral Free",
            Preset::MistralStandard => "Mistral Standard",
            Preset::Conservative => "Conservative - safe default",
            Preset::Moderate => "Moderate - balanced",
            Preset::Aggressive => "Aggressive - high throughput",
            Preset::UnlimitedConcurrent => "Concurrency cap only",
            Preset::ScrapingPolite => "Scraping - polite",
            Preset::ScrapingModerate => "Scraping - moderate",
            Preset::ScrapingAggressive => "Scraping - aggressive",
        }
    }

    /// Look up a preset by name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the name matches no preset.
    pub fn get(name: &str) -> ThrottleResult<Preset> {
        name.parse().map_err(|_| {
            ThrottleError::not_found(format!(
                "unknown preset '{name}'; available: {}",
                Preset::iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }

    /// All presets with their descriptions.
    pub fn list() -> Vec<(Preset, &'static str)> {
        Preset::iter().map(|p| (p, p.description())).collect()
    }
}

impl From<Preset> for RateLimitConfig {
    fn from(preset: Preset) -> Self {
        preset.config()
    }
}
