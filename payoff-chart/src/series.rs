use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::fetch::FetchError;

/// Summary statistics the payoff endpoint computes alongside the curve.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PayoffMetrics {
    pub max_profit: f64,
    pub max_loss: f64,
    pub net_premium: f64,
    pub breakevens: Vec<f64>,
}

/// Body of the payoff endpoint, either a curve or a list of problems.
///
/// `x`, `y` and `errors` are decoded strictly. The remaining fields are extras: a value
/// of the wrong shape reads as absent instead of failing the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayoffResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(rename = "S0", default, deserialize_with = "lenient")]
    pub spot: Option<f64>,
    pub x: Option<Vec<f64>>,
    pub y: Option<Vec<f64>>,
    pub errors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub metrics: Option<PayoffMetrics>,
    #[serde(default, deserialize_with = "lenient")]
    pub desc: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            debug!(%err, "ignoring malformed payoff extra");
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    Series(PayoffSeries),
    /// The server refused the parameters; nothing should be drawn.
    ServerErrors(Vec<String>),
}

impl PayoffResponse {
    pub fn decode(body: &str) -> Result<Self, FetchError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn into_outcome(self) -> Result<ResponseOutcome, FetchError> {
        if let Some(errors) = self.errors {
            return Ok(ResponseOutcome::ServerErrors(errors));
        }
        let x = self.x.ok_or(FetchError::MissingSeries("x"))?;
        let y = self.y.ok_or(FetchError::MissingSeries("y"))?;
        let mut series = PayoffSeries::new(self.name, x, y);
        series.spot = self.spot;
        series.metrics = self.metrics;
        series.desc = self.desc.filter(|d| !d.trim().is_empty());
        Ok(ResponseOutcome::Series(series))
    }
}

/// Payoff at expiry sampled over underlying prices; `x[i]` pairs with `y[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoffSeries {
    pub name: Option<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub spot: Option<f64>,
    pub metrics: Option<PayoffMetrics>,
    pub desc: Option<String>,
}

impl PayoffSeries {
    /// Build a series, truncating to the shorter of `x`/`y` when their lengths differ.
    pub fn new(name: Option<String>, mut x: Vec<f64>, mut y: Vec<f64>) -> Self {
        if x.len() != y.len() {
            warn!(x = x.len(), y = y.len(), "payoff series lengths differ; truncating");
            let n = x.len().min(y.len());
            x.truncate(n);
            y.truncate(n);
        }
        Self {
            name: name.filter(|n| !n.is_empty()),
            x,
            y,
            spot: None,
            metrics: None,
            desc: None,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Dataset label: the strategy name, or "Payoff" when unnamed.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("Payoff")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_take_precedence_over_data() {
        let resp = PayoffResponse::decode(r#"{"errors":["bad"],"x":[1],"y":[2]}"#).unwrap();
        assert_eq!(
            resp.into_outcome().unwrap(),
            ResponseOutcome::ServerErrors(vec!["bad".into()])
        );
    }

    #[test]
    fn full_response_keeps_extras() {
        let body = r#"{
            "name": "Bull spread", "S0": 100.0,
            "x": [90, 100, 110], "y": [-3, 2, 7],
            "metrics": {"max_profit": 7, "max_loss": -3, "net_premium": -3, "breakevens": [98.0]},
            "desc": "Max profit: 7.00"
        }"#;
        let ResponseOutcome::Series(series) = PayoffResponse::decode(body).unwrap().into_outcome().unwrap() else {
            panic!("expected a series");
        };
        assert_eq!(series.label(), "Bull spread");
        assert_eq!(series.spot, Some(100.0));
        assert_eq!(series.metrics.as_ref().unwrap().breakevens, vec![98.0]);
        assert_eq!(series.points().nth(1), Some((100.0, 2.0)));
    }

    #[test]
    fn malformed_extras_do_not_block_the_curve() {
        for body in [
            r#"{"x":[1,2],"y":[-1,1],"metrics":{"breakevens":null}}"#,
            r#"{"x":[1,2],"y":[-1,1],"metrics":{"max_profit":"unlimited"}}"#,
            r#"{"x":[1,2],"y":[-1,1],"desc":7,"S0":"spot","name":["a"]}"#,
        ] {
            let outcome = PayoffResponse::decode(body).unwrap().into_outcome().unwrap();
            let ResponseOutcome::Series(series) = outcome else {
                panic!("expected a series for {body}");
            };
            assert_eq!(series.len(), 2);
            assert!(series.metrics.is_none());
            assert!(series.desc.is_none());
            assert!(series.spot.is_none());
        }
    }

    #[test]
    fn missing_curve_is_an_error() {
        let resp = PayoffResponse::decode(r#"{"name":"x"}"#).unwrap();
        assert!(matches!(resp.into_outcome(), Err(FetchError::MissingSeries("x"))));
    }

    #[test]
    fn uneven_lengths_are_truncated() {
        let series = PayoffSeries::new(Some(String::new()), vec![1.0, 2.0, 3.0], vec![0.5]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.y.len(), 1);
        assert_eq!(series.label(), "Payoff");
    }
}
