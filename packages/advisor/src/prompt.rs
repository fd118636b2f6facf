//! Advice prompt construction.

use crime_advice_ai::providers::Message;
use crime_advice_crime_models::{CrimeRate, SeverityTier};

/// A two-part prompt: tone instruction plus the user request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvicePrompt {
    /// System instruction selected by severity tier.
    pub system: String,
    /// The user message.
    pub user: String,
}

impl AdvicePrompt {
    /// Builds the prompt for a business in a city with the given rate.
    ///
    /// The user message states the rate (or `"an unknown rate"`) and asks
    /// for it to be repeated in the first line of the reply.
    #[must_use]
    pub fn build(city: &str, business: &str, rate: CrimeRate, tier: SeverityTier) -> Self {
        let rate = rate.prompt_phrase();
        let user = format!(
            "The annual crime rate in {city} is {rate} incidents per 1,000 people. \
             Make sure to incorporate this information prominently in the first line \
             of your response! Given this rate, here are some tailored security measures \
             for a {business} in {city}:"
        );

        Self {
            system: tier.system_prompt().to_string(),
            user,
        }
    }

    /// The message list handed to the provider.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        vec![Message::user(self.user.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_mentions_rate_business_and_city() {
        let prompt = AdvicePrompt::build(
            "Leicester",
            "bakery",
            CrimeRate::Known(95.0),
            SeverityTier::Moderate,
        );
        assert!(prompt.user.starts_with("The annual crime rate in Leicester is 95 incidents"));
        assert!(prompt.user.contains("first line"));
        assert!(prompt.user.ends_with("for a bakery in Leicester:"));
        assert_eq!(prompt.system, SeverityTier::Moderate.system_prompt());
    }

    #[test]
    fn unknown_rate_is_phrased_in_prose() {
        let prompt = AdvicePrompt::build("Paris", "cafe", CrimeRate::Unknown, SeverityTier::Low);
        assert!(prompt.user.contains("Paris is an unknown rate incidents"));
        assert!(prompt.system.contains("reassuring"));
    }

    #[test]
    fn messages_is_single_user_turn() {
        let prompt = AdvicePrompt::build("York", "pub", CrimeRate::Known(61.4), SeverityTier::Low);
        let messages = prompt.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, prompt.user);
    }
}
