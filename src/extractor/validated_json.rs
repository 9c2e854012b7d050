use axum::{
    async_trait,
    extract::{FromRequest, Json as AxumJson, Request},
};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;
use validator::Validate;

use crate::{
    error::{
        ApiError, BodyError, ErrorVerbosity, ErrorVerbosityProvider, InternalServerError,
        ValidationError,
    },
    validation::BodySchema,
};

/// Extracts the request body as JSON and validates it before any handler code runs.
///
/// Rejects with [`ApiError::Body`] if the body is not JSON and with [`ApiError::Validation`]
/// listing every violation if it does not match `T`'s [`BodySchema`] or its [`Validate`] rules.
pub struct ValidatedJson<T>(pub T);

fn expected_schema<T: JsonSchema>(verbosity: ErrorVerbosity) -> Result<String, ApiError> {
    serde_yaml::to_string(&schema_for!(T))
        .map_err(|err| InternalServerError::from_generic_error(verbosity, err).into())
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + JsonSchema + BodySchema + Validate + Debug + Send,
    S: Send + Sync + ErrorVerbosityProvider,
{
    type Rejection = ApiError;

    #[tracing::instrument(name = "validated_json_extractor", skip_all)]
    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let verbosity = state.error_verbosity();

        let value = match AxumJson::<Value>::from_request(req, state).await {
            Ok(AxumJson(value)) => value,
            Err(json_rejection) => {
                tracing::warn!(rejection=?json_rejection, "Rejection");

                let body_error_reason = json_rejection.body_text();
                let body_expected_schema = expected_schema::<T>(verbosity)?;

                return Err(
                    BodyError::new(verbosity, body_error_reason, body_expected_schema).into(),
                );
            }
        };

        if let Err(violations) = T::SCHEMA.check(&value) {
            tracing::warn!(?violations, "Schema violations");

            return Err(ValidationError::new(verbosity, violations).into());
        }

        let extracted = match serde_json::from_value::<T>(value) {
            Ok(extracted) => extracted,
            Err(err) => {
                tracing::warn!(%err, "Rejection");

                let body_expected_schema = expected_schema::<T>(verbosity)?;

                return Err(
                    BodyError::new(verbosity, err.to_string(), body_expected_schema).into(),
                );
            }
        };

        match extracted.validate() {
            Ok(_) => {
                tracing::trace!(json=?extracted, "Validated");

                Ok(ValidatedJson(extracted))
            }
            Err(errors) => {
                tracing::warn!(?errors, "Validation errors");

                Err(ValidationError::from_validation_errors(verbosity, errors).into())
            }
        }
    }
}
