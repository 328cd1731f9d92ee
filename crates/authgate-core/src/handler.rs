//! Handler wrapper: validators, business call, catch-all, final encode.
//!
//! ```text
//! event ── validators (all run) ──┬── failures → ValidationError ─┐
//!                                 └── pass → business fn ─────────┤
//!                                              (error or panic) ──┤
//!                                                                 ▼
//!                                              response::error / Ok(response)
//!                                                                 ▼
//!                                                       encode::jsonify
//! ```
//!
//! A [`Handler`] is immutable once built. `invoke` always returns exactly
//! one [`Envelope`]; nothing escapes it, panics included.

use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::Value;

use crate::encode::{Envelope, is_truthy, jsonify};
use crate::error::{ConfigError, Failure, ServiceError};
use crate::response::{Response, error};

/// Checks a raw event. `None` or a falsy value means pass; anything else
/// describes the failure and ends up in the error context.
pub trait Validator: Send + Sync {
    fn validate(&self, event: &Value) -> Option<Value>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Option<Value> + Send + Sync,
{
    fn validate(&self, event: &Value) -> Option<Value> {
        self(event)
    }
}

type BusinessFn<C> = dyn Fn(&Value, &C) -> Result<Response, Failure> + Send + Sync;

/// Collects the validator configuration for a [`Handler`].
pub struct HandlerBuilder<C> {
    validators: Option<Vec<Box<dyn Validator>>>,
    _context: PhantomData<fn(&C)>,
}

impl<C> Default for HandlerBuilder<C> {
    fn default() -> Self {
        Self {
            validators: None,
            _context: PhantomData,
        }
    }
}

impl<C: 'static> HandlerBuilder<C> {
    /// Configures a single validator, replacing any previous configuration.
    pub fn validate(mut self, validator: impl Validator + 'static) -> Self {
        self.validators = Some(vec![Box::new(validator)]);
        self
    }

    /// Configures an ordered list of validators. An empty list is allowed.
    pub fn validators(mut self, validators: Vec<Box<dyn Validator>>) -> Self {
        self.validators = Some(validators);
        self
    }

    /// Wraps `func`. Fails when no validator configuration was given.
    pub fn build<F, E>(self, func: F) -> Result<Handler<C>, ConfigError>
    where
        F: Fn(&Value, &C) -> Result<Response, E> + Send + Sync + 'static,
        E: Into<Failure>,
    {
        let validators = self.validators.ok_or(ConfigError::MissingValidators)?;
        Ok(Handler {
            validators,
            func: Box::new(move |event: &Value, context: &C| {
                func(event, context).map_err(Into::into)
            }),
        })
    }
}

/// A business function wrapped in the validation and error pipeline.
pub struct Handler<C> {
    validators: Vec<Box<dyn Validator>>,
    func: Box<BusinessFn<C>>,
}

impl<C: 'static> Handler<C> {
    pub fn builder() -> HandlerBuilder<C> {
        HandlerBuilder::default()
    }

    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    /// Runs every validator in order and returns the failures, in order.
    pub fn check(&self, event: &Value) -> Vec<Value> {
        self.validators
            .iter()
            .filter_map(|v| v.validate(event))
            .filter(is_truthy)
            .collect()
    }

    /// Handles one invocation and encodes the outcome.
    pub fn invoke(&self, event: &Value, context: &C) -> Envelope {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.run(event, context)))
            .unwrap_or_else(|payload| Err(Failure::panic(payload)));

        let response = outcome.unwrap_or_else(error);
        let envelope = jsonify(&response);
        tracing::debug!(status = envelope.status_code, "invocation finished");
        envelope
    }

    fn run(&self, event: &Value, context: &C) -> Result<Response, Failure> {
        let failures = self.check(event);
        if !failures.is_empty() {
            tracing::debug!(count = failures.len(), "event failed validation");
            return Err(ServiceError::validation(Some(failures)).into());
        }
        (self.func)(event, context)
    }
}
