//! Middleware invocation
//!
//! Copyright (c) 2025 Shapemap Team
//! Licensed under the Apache-2.0 license

use super::pending::{reconcile, PendingEntry, Task};
use super::walker::{WalkContext, Walker};
use crate::middleware::{Middleware, MiddlewareError, MiddlewareOutput};
use crate::template::{Directive, Operand};
use crate::{Error, Result};
use futures::FutureExt;
use serde_json::Value;
use std::sync::Arc;

enum Outcome {
    Ready(Value),
    Deferred(Task),
}

impl Walker<'_> {
    /// Run every call of `directive`; the last call decides the field value
    ///
    /// A deferred outcome leaves `null` in place and is queued on `cx`.
    pub(super) fn invoke(&self, source: &Value, directive: &Directive, cx: &mut WalkContext) -> Result<Value> {
        let registry = self.registry.ok_or_else(|| Error::MissingMiddleware {
            location: cx.describe(),
        })?;
        let key = cx.field_name();

        let mut outcome = Outcome::Ready(Value::Null);
        for call in &directive.calls {
            let function = registry.get(&call.function).ok_or_else(|| Error::UnknownMiddleware {
                function: call.function.clone(),
                location: cx.describe(),
            })?;

            outcome = match &call.operand {
                Operand::Literal(raw) => apply(&function, raw.clone(), true, &key, &call.function)?,
                Operand::Query(node) => {
                    let mut operand_cx = WalkContext::for_operand();
                    let resolved = self.walk(source, node, &mut operand_cx)?;
                    if operand_cx.has_pending() {
                        chain(function, resolved, operand_cx.into_pending(), &key, &call.function)
                    } else {
                        apply(&function, resolved, false, &key, &call.function)?
                    }
                }
            };
        }

        match outcome {
            Outcome::Ready(value) => Ok(value),
            Outcome::Deferred(task) => {
                cx.defer(task);
                Ok(Value::Null)
            }
        }
    }
}

fn apply(function: &Arc<dyn Middleware>, operand: Value, literal: bool, key: &str, name: &str) -> Result<Outcome> {
    tracing::debug!(function = name, key, literal, "calling middleware");
    match function.call(operand, literal) {
        Ok(MiddlewareOutput::Ready(value)) => Ok(Outcome::Ready(value)),
        Ok(MiddlewareOutput::Deferred(future)) => {
            let (key, name) = (key.to_string(), name.to_string());
            Ok(Outcome::Deferred(
                async move { future.await.map_err(|source| execution_error(key, name, source)) }.boxed(),
            ))
        }
        Err(source) => Err(execution_error(key.to_string(), name.to_string(), source)),
    }
}

/// Defer a call whose operand still has pending parts
fn chain(function: Arc<dyn Middleware>, operand: Value, pending: Vec<PendingEntry>, key: &str, name: &str) -> Outcome {
    Outcome::Deferred(settle(function, operand, pending, key.to_string(), name.to_string()).boxed())
}

/// Settle the operand, then call the function and settle its result too
async fn settle(
    function: Arc<dyn Middleware>,
    mut operand: Value,
    pending: Vec<PendingEntry>,
    key: String,
    name: String,
) -> Result<Value> {
    reconcile(std::slice::from_mut(&mut operand), pending).await?;
    match apply(&function, operand, false, &key, &name)? {
        Outcome::Ready(value) => Ok(value),
        Outcome::Deferred(task) => task.await,
    }
}

fn execution_error(key: String, function: String, source: MiddlewareError) -> Error {
    Error::MiddlewareExecution { key, function, source }
}
