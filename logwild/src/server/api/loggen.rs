use std::{fmt, str::FromStr, time::Duration};

use rama::{
    http::{
        Request, Response, StatusCode,
        service::web::{
            extract::State,
            response::{IntoResponse, Json},
        },
    },
    telemetry::tracing,
};
use serde::Deserialize;

use logwild_lib::burst::{BurstError, BurstRunner};

use super::AppState;
use crate::{
    config::{BurstArgs, parse_duration},
    server::MAX_HTTP_BURST_DURATION,
};

/// A query parameter of the loggen endpoint could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterParseError {
    pub parameter: &'static str,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for ParameterParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid value '{}' for parameter '{}': {}",
            self.value, self.parameter, self.reason
        )
    }
}

impl std::error::Error for ParameterParseError {}

/// Per request overrides of the server's burst defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggenParams {
    pub per_second: Option<u64>,
    pub message_size: Option<usize>,
    pub burst_dur: Option<Duration>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLoggenQuery {
    per_second: Option<String>,
    message_size: Option<String>,
    burst_dur: Option<String>,
}

impl LoggenParams {
    /// Parse the (optional) query string of a loggen request.
    ///
    /// Unknown parameters are ignored, empty values count as absent.
    pub fn from_query(query: Option<&str>) -> Result<Self, ParameterParseError> {
        let Some(query) = query.filter(|q| !q.is_empty()) else {
            return Ok(Self::default());
        };

        let raw: RawLoggenQuery =
            serde_html_form::from_str(query).map_err(|err| ParameterParseError {
                parameter: "query",
                value: query.to_owned(),
                reason: err.to_string(),
            })?;

        Ok(Self {
            per_second: parse_param("per_second", raw.per_second, parse_number)?,
            message_size: parse_param("message_size", raw.message_size, parse_number)?,
            burst_dur: parse_param("burst_dur", raw.burst_dur, |s| {
                parse_duration(s).map_err(|err| err.to_string())
            })?,
        })
    }

    fn apply(&self, defaults: &BurstArgs) -> BurstArgs {
        let mut args = defaults.clone();
        if let Some(per_second) = self.per_second {
            args.per_second = per_second;
        }
        if let Some(message_size) = self.message_size {
            args.message_size = message_size;
        }
        if let Some(burst_dur) = self.burst_dur {
            args.burst_dur = burst_dur;
        }
        args
    }
}

fn parse_param<T>(
    parameter: &'static str,
    value: Option<String>,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<Option<T>, ParameterParseError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse(s).map(Some).map_err(|reason| ParameterParseError {
            parameter,
            value: s.to_owned(),
            reason,
        }),
    }
}

fn parse_number<T>(s: &str) -> Result<T, String>
where
    T: FromStr<Err: fmt::Display>,
{
    s.parse().map_err(|err: T::Err| err.to_string())
}

/// Maps configuration fields back onto the query parameter that sets them.
fn query_parameter_for_field(field: &'static str) -> &'static str {
    match field {
        "target_rate" => "per_second",
        "payload_size" => "message_size",
        "burst_duration" => "burst_dur",
        other => other,
    }
}

pub(super) async fn loggen(State(state): State<AppState>, req: Request) -> Response {
    let params = match LoggenParams::from_query(req.uri().query()) {
        Ok(params) => params,
        Err(err) => {
            tracing::debug!("reject loggen request: {err}");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": err.to_string(),
                    "parameter": err.parameter,
                })),
            )
                .into_response();
        }
    };

    let args = params.apply(&state.defaults);
    if args.burst_dur > MAX_HTTP_BURST_DURATION {
        tracing::debug!(
            burst_dur = ?args.burst_dur,
            "reject loggen request: burst does not fit within the connection timeout"
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!(
                    "burst_dur {:?} exceeds the maximum of {:?} for bursts over http",
                    args.burst_dur, MAX_HTTP_BURST_DURATION,
                ),
                "parameter": "burst_dur",
            })),
        )
            .into_response();
    }

    let runner = match args
        .config_builder(state.sink.clone())
        .try_build()
        .and_then(BurstRunner::new)
    {
        Ok(runner) => runner,
        Err(err) => return burst_error_response(err),
    };

    state.metrics.record_started();
    let result = runner.start(state.exec.clone()).wait().await;

    match result {
        Ok(result) => {
            state.metrics.record_finished(result.emitted_count(), false);
            let report = result.report();
            tracing::info!(
                emitted = report.emitted_count,
                elapsed_ms = report.elapsed_ms,
                achieved_rate = report.achieved_rate,
                "loggen burst completed"
            );
            Json(report).into_response()
        }
        Err(err) => {
            let emitted = match &err {
                BurstError::Io { emitted, .. } => *emitted,
                _ => 0,
            };
            state.metrics.record_finished(emitted, true);
            burst_error_response(err)
        }
    }
}

fn burst_error_response(err: BurstError) -> Response {
    match &err {
        BurstError::InvalidConfiguration { field, .. } => {
            tracing::debug!("reject loggen request: {err}");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": err.to_string(),
                    "parameter": query_parameter_for_field(field),
                })),
            )
                .into_response()
        }
        BurstError::Io { emitted, .. } => {
            tracing::error!("loggen burst failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": err.to_string(),
                    "emitted": emitted,
                })),
            )
                .into_response()
        }
        BurstError::Aborted => {
            tracing::warn!("loggen burst aborted: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_uses_defaults() {
        assert_eq!(LoggenParams::default(), LoggenParams::from_query(None).unwrap());
        assert_eq!(
            LoggenParams::default(),
            LoggenParams::from_query(Some("")).unwrap()
        );
        assert_eq!(
            LoggenParams::default(),
            LoggenParams::from_query(Some("per_second=&foo=bar")).unwrap()
        );
    }

    #[test]
    fn full_query() {
        let params =
            LoggenParams::from_query(Some("per_second=4000&message_size=64&burst_dur=1")).unwrap();
        assert_eq!(
            LoggenParams {
                per_second: Some(4000),
                message_size: Some(64),
                burst_dur: Some(Duration::from_secs(1)),
            },
            params
        );

        let params = LoggenParams::from_query(Some("burst_dur=250ms")).unwrap();
        assert_eq!(Some(Duration::from_millis(250)), params.burst_dur);
    }

    #[test]
    fn malformed_parameter_is_named() {
        for (query, parameter) in [
            ("per_second=fast", "per_second"),
            ("per_second=-5", "per_second"),
            ("message_size=1.5", "message_size"),
            ("burst_dur=forever", "burst_dur"),
        ] {
            let err = LoggenParams::from_query(Some(query)).unwrap_err();
            assert_eq!(parameter, err.parameter, "query: {query}");
        }
    }

    #[test]
    fn config_fields_map_to_query_parameters() {
        assert_eq!("per_second", query_parameter_for_field("target_rate"));
        assert_eq!("message_size", query_parameter_for_field("payload_size"));
        assert_eq!("burst_dur", query_parameter_for_field("burst_duration"));
        assert_eq!("min_granularity", query_parameter_for_field("min_granularity"));
    }
}
