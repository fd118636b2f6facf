#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Two-turn conversation widget.
//!
//! Asks for a city, then a business type, then requests advice for the
//! pair through an [`AdviceClient`]. The reply replaces the rendered lines
//! and its coordinates are published to the shared [`MapFocus`].
//!
//! The widget is front-end agnostic: a terminal loop, a test, or any other
//! UI sets the input, calls [`ConversationWidget::submit`], and renders
//! [`ConversationWidget::lines`].

pub mod client;

use std::sync::Arc;
use std::time::Duration;

use crime_advice_map::MapFocus;
use crime_advice_server_models::{ChatBotRequest, ChatBotResponse};
use strum_macros::AsRefStr;
use thiserror::Error;

pub use client::{AdviceClient, ClientError, HttpAdviceClient, LocalAdviceClient};

/// Lines shown before the first submission.
pub const GREETING: [&str; 2] = [
    "Hello! How can I help you today?",
    "Enter business name and city to get security measures",
];

/// Line shown after a city has been entered.
pub const BUSINESS_QUESTION: &str = "What type of business is it?";

/// Input placeholder while waiting for a city.
pub const CITY_PLACEHOLDER: &str = "Enter a city...";

/// Input placeholder while waiting for a business type.
pub const BUSINESS_PLACEHOLDER: &str = "Enter a business type...";

/// Pause between receiving advice and showing it.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

/// Where the widget is in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum WidgetState {
    /// Next submission is a city.
    AwaitingCity,
    /// Next submission is a business type for `city`.
    AwaitingBusiness {
        /// The city entered on the previous turn.
        city: String,
    },
    /// The last request failed. Behaves like [`WidgetState::AwaitingCity`].
    Failed {
        /// What went wrong, as shown to the user.
        message: String,
    },
}

/// Reasons a submission is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// A request is already in flight.
    #[error("A request is already in progress")]
    Busy,

    /// Nothing was typed.
    #[error("Input is empty")]
    EmptyInput,
}

/// What a call to [`ConversationWidget::begin`] asks the caller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The city was stored and the business question shown. Nothing to
    /// send.
    AskedForBusiness,
    /// Both answers are in. Send this request and pass the result to
    /// [`ConversationWidget::finish`].
    Request(ChatBotRequest),
}

/// Result of a completed [`ConversationWidget::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The city was stored and the business question shown.
    AskedForBusiness,
    /// Advice arrived and is now the rendered lines.
    Answered,
    /// The request failed and its error is the rendered line.
    Failed,
}

/// City/business input capture bound to an advice source and a map focus.
pub struct ConversationWidget {
    client: Arc<dyn AdviceClient>,
    focus: MapFocus,
    state: WidgetState,
    input: String,
    loading: bool,
    lines: Vec<String>,
    delay: Duration,
}

impl ConversationWidget {
    /// Creates a widget showing [`GREETING`] and waiting for a city.
    #[must_use]
    pub fn new(client: Arc<dyn AdviceClient>, focus: MapFocus) -> Self {
        Self {
            client,
            focus,
            state: WidgetState::AwaitingCity,
            input: String::new(),
            loading: false,
            lines: GREETING.iter().map(ToString::to_string).collect(),
            delay: DEFAULT_DELAY,
        }
    }

    /// Overrides the pause before advice is shown.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Where the widget is in the conversation.
    #[must_use]
    pub const fn state(&self) -> &WidgetState {
        &self.state
    }

    /// Whether the next submission is a city (true after a failure too).
    #[must_use]
    pub const fn is_awaiting_city(&self) -> bool {
        !matches!(self.state, WidgetState::AwaitingBusiness { .. })
    }

    /// Whether a request is in flight. Input is refused while true.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// The currently rendered lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The text typed so far.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Input hint for the current turn.
    #[must_use]
    pub const fn placeholder(&self) -> &'static str {
        if self.is_awaiting_city() {
            CITY_PLACEHOLDER
        } else {
            BUSINESS_PLACEHOLDER
        }
    }

    /// The map focus this widget publishes to.
    #[must_use]
    pub const fn focus(&self) -> &MapFocus {
        &self.focus
    }

    /// Replaces the input text.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Busy`] while a request is in flight (the
    /// input is disabled).
    pub fn set_input(&mut self, input: impl Into<String>) -> Result<(), SubmitError> {
        if self.loading {
            return Err(SubmitError::Busy);
        }
        self.input = input.into();
        Ok(())
    }

    /// Advances the state machine with the current input.
    ///
    /// On the city turn this completes the transition itself. On the
    /// business turn it marks the widget loading and returns the request;
    /// the caller must hand the outcome to [`Self::finish`]. Front-ends
    /// that do not need to drive the request themselves use
    /// [`Self::submit`].
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Busy`] while a request is in flight and
    /// [`SubmitError::EmptyInput`] when the input is blank.
    pub fn begin(&mut self) -> Result<Step, SubmitError> {
        if self.loading {
            return Err(SubmitError::Busy);
        }
        let value = self.input.trim().to_string();
        if value.is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        self.input.clear();

        if let WidgetState::AwaitingBusiness { city } = &self.state {
            let request = ChatBotRequest {
                city: city.clone(),
                business: value,
            };
            log::debug!(
                "Requesting advice for {} in {}",
                request.business,
                request.city
            );
            self.loading = true;
            return Ok(Step::Request(request));
        }

        log::debug!("City entered: {value}");
        self.state = WidgetState::AwaitingBusiness { city: value };
        self.lines = vec![BUSINESS_QUESTION.to_string()];
        Ok(Step::AskedForBusiness)
    }

    /// Applies the outcome of a request returned by [`Self::begin`].
    ///
    /// Loading is cleared and the input emptied either way. On success the
    /// reply is split into lines, the conversation restarts at the city
    /// question, and the map focus moves to the reply's coordinates. On
    /// failure the error becomes the only rendered line and the widget
    /// enters [`WidgetState::Failed`].
    pub fn finish(&mut self, result: Result<ChatBotResponse, ClientError>) -> Submission {
        self.loading = false;
        self.input.clear();

        match result {
            Ok(response) => {
                self.lines = response.content.split('\n').map(str::to_string).collect();
                self.state = WidgetState::AwaitingCity;
                self.focus.publish(response.coordinates);
                Submission::Answered
            }
            Err(e) => {
                log::error!("Advice request failed: {e}");
                let message = e.to_string();
                self.lines = vec![message.clone()];
                self.state = WidgetState::Failed { message };
                Submission::Failed
            }
        }
    }

    /// Submits the current input, running the request to completion when
    /// this is the business turn.
    ///
    /// Successful replies are held back for the configured delay before
    /// being shown. If the returned future is dropped mid-request the
    /// widget stops loading and keeps waiting for a business type.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] if the submission is refused. Request
    /// failures are not errors here; they land in
    /// [`WidgetState::Failed`].
    pub async fn submit(&mut self) -> Result<Submission, SubmitError> {
        let Step::Request(request) = self.begin()? else {
            return Ok(Submission::AskedForBusiness);
        };

        let client = Arc::clone(&self.client);
        let delay = self.delay;
        let guard = InFlight { widget: self };

        let result = client.advise(&request.city, &request.business).await;
        if result.is_ok() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let outcome = guard.widget.finish(result);
        log::debug!("Widget now {}", guard.widget.state.as_ref());
        Ok(outcome)
    }
}

/// Releases the widget if a request is abandoned before [`ConversationWidget::finish`].
struct InFlight<'a> {
    widget: &'a mut ConversationWidget,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.widget.loading {
            log::warn!("Advice request cancelled");
            self.widget.loading = false;
            self.widget.input.clear();
        }
    }
}
