//! Backend endpoints and their payload validation.

use mastery_core::{Article, BudgetStatus, CryptoChallengeResult, EngineConfig, FetchError, PriceQuote};
use mastery_progress::BudgetBook;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::tips::split_tips;
use crate::transport::Method;

/// One remote endpoint: where it lives and how its body is validated.
pub trait Endpoint: Send + Sync + 'static {
    /// Request body type; `()` for GET endpoints
    type Request: Serialize + Send + Sync;

    /// Validated payload type
    type Payload: Clone + Send + Sync + 'static;

    /// Name used in logs
    fn name(&self) -> &'static str;

    /// HTTP method
    fn method(&self) -> Method;

    /// Absolute URL under `config`
    fn url(&self, config: &EngineConfig) -> String;

    /// Validate a parsed JSON body.
    fn decode(&self, body: &Value) -> Result<Self::Payload, FetchError>;
}

fn as_object<'a>(body: &'a Value, endpoint: &str) -> Result<&'a Map<String, Value>, FetchError> {
    body.as_object()
        .ok_or_else(|| FetchError::validation(format!("{} response is not an object", endpoint)))
}

fn finite_number(obj: &Map<String, Value>, key: &str) -> Result<f64, FetchError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(FetchError::validation(format!("missing field `{}`", key))),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| FetchError::validation(format!("field `{}` is not finite", key))),
        Some(other) => Err(FetchError::validation(format!("field `{}` is not a number: {}", key, other))),
    }
}

/// Like [`finite_number`] but also accepts numeric strings.
fn lenient_number(obj: &Map<String, Value>, key: &str) -> Result<f64, FetchError> {
    match obj.get(key) {
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| FetchError::validation(format!("field `{}` is not numeric: {:?}", key, s))),
        _ => finite_number(obj, key),
    }
}

/// Budget status request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatusRequest {
    /// User identifier
    pub user_id: String,
    /// Category to look up
    pub category: String,
}

impl BudgetStatusRequest {
    /// Request for `category` on behalf of the configured user.
    pub fn new(config: &EngineConfig, category: impl Into<String>) -> Self {
        Self {
            user_id: config.user_id.clone(),
            category: category.into(),
        }
    }
}

/// `POST {api_base}/budget/status`
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetStatusEndpoint;

impl Endpoint for BudgetStatusEndpoint {
    type Request = BudgetStatusRequest;
    type Payload = BudgetStatus;

    fn name(&self) -> &'static str {
        "budget-status"
    }

    fn method(&self) -> Method {
        Method::Post
    }

    fn url(&self, config: &EngineConfig) -> String {
        config.endpoint_url("budget/status")
    }

    fn decode(&self, body: &Value) -> Result<BudgetStatus, FetchError> {
        let obj = as_object(body, self.name())?;
        let percent = finite_number(obj, "percent")?;
        let category = match obj.get("category") {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => {
                return Err(FetchError::validation(format!("field `category` is not a string: {}", other)))
            }
        };
        Ok(BudgetStatus { category, percent })
    }
}

/// Insights request body: spending per category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest {
    /// Amount spent per category
    pub spending_data: BTreeMap<String, f64>,
}

impl From<&BudgetBook> for InsightsRequest {
    fn from(book: &BudgetBook) -> Self {
        Self {
            spending_data: book
                .categories()
                .iter()
                .map(|c| (c.name.clone(), c.spent))
                .collect(),
        }
    }
}

/// `POST {api_base}/insights`, decoded into individual tips.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsightsEndpoint;

impl Endpoint for InsightsEndpoint {
    type Request = InsightsRequest;
    type Payload = Vec<String>;

    fn name(&self) -> &'static str {
        "insights"
    }

    fn method(&self) -> Method {
        Method::Post
    }

    fn url(&self, config: &EngineConfig) -> String {
        config.endpoint_url("insights")
    }

    fn decode(&self, body: &Value) -> Result<Vec<String>, FetchError> {
        let obj = as_object(body, self.name())?;
        match obj.get("tips") {
            Some(Value::String(text)) => Ok(split_tips(text)),
            None | Some(Value::Null) => Err(FetchError::validation("missing field `tips`")),
            Some(other) => Err(FetchError::validation(format!("field `tips` is not a string: {}", other))),
        }
    }
}

/// `GET {api_base}/news`
#[derive(Debug, Clone, Copy, Default)]
pub struct NewsEndpoint;

impl Endpoint for NewsEndpoint {
    type Request = ();
    type Payload = Vec<Article>;

    fn name(&self) -> &'static str {
        "news"
    }

    fn method(&self) -> Method {
        Method::Get
    }

    fn url(&self, config: &EngineConfig) -> String {
        config.endpoint_url("news")
    }

    fn decode(&self, body: &Value) -> Result<Vec<Article>, FetchError> {
        let obj = as_object(body, self.name())?;
        let entries = match obj.get("articles") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(FetchError::validation(format!("field `articles` is not a list: {}", other)))
            }
        };

        let articles: Vec<Article> = entries
            .iter()
            .filter_map(|entry| {
                let title = entry.get("title")?.as_str()?;
                let url = entry.get("url")?.as_str()?;
                Some(Article { title: title.to_string(), url: url.to_string() })
            })
            .collect();

        if articles.len() < entries.len() {
            debug!("Skipped {} news entries without title/url", entries.len() - articles.len());
        }
        Ok(articles)
    }
}

/// `GET {price_url}`: live bitcoin price in USD.
#[derive(Debug, Clone, Copy, Default)]
pub struct LivePriceEndpoint;

impl Endpoint for LivePriceEndpoint {
    type Request = ();
    type Payload = PriceQuote;

    fn name(&self) -> &'static str {
        "live-price"
    }

    fn method(&self) -> Method {
        Method::Get
    }

    fn url(&self, config: &EngineConfig) -> String {
        config.price_url.clone()
    }

    fn decode(&self, body: &Value) -> Result<PriceQuote, FetchError> {
        let obj = as_object(body, self.name())?;
        let bitcoin = obj
            .get("bitcoin")
            .and_then(Value::as_object)
            .ok_or_else(|| FetchError::validation("missing field `bitcoin`"))?;
        let usd_per_btc = finite_number(bitcoin, "usd")?;
        if usd_per_btc <= 0.0 {
            return Err(FetchError::validation(format!("price must be positive, got {}", usd_per_btc)));
        }
        Ok(PriceQuote { usd_per_btc })
    }
}

/// Crypto challenge request body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoChallengeRequest {
    /// USD saved so far
    pub usd_saved: f64,
    /// Goal in BTC
    pub btc_goal: f64,
}

/// `POST {api_base}/crypto-challenge`
#[derive(Debug, Clone, Copy, Default)]
pub struct CryptoChallengeEndpoint;

impl Endpoint for CryptoChallengeEndpoint {
    type Request = CryptoChallengeRequest;
    type Payload = CryptoChallengeResult;

    fn name(&self) -> &'static str {
        "crypto-challenge"
    }

    fn method(&self) -> Method {
        Method::Post
    }

    fn url(&self, config: &EngineConfig) -> String {
        config.endpoint_url("crypto-challenge")
    }

    fn decode(&self, body: &Value) -> Result<CryptoChallengeResult, FetchError> {
        let obj = as_object(body, self.name())?;
        Ok(CryptoChallengeResult {
            btc_saved: lenient_number(obj, "btcSaved")?,
            btc_goal: lenient_number(obj, "btcGoal")?,
            percent: lenient_number(obj, "percent")?,
        })
    }
}
