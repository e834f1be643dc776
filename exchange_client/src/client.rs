//! Blocking REST client for the Binance Spot testnet.

use hmac::{Hmac, Mac};
use indexmap::IndexMap;
use reqwest::{StatusCode, blocking::Client, header};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use sha2::Sha256;

use crate::config::{ClientConfig, ConfigError};
use crate::errors::Error;
use crate::models::{
    AccountInfo, ApiErrorBody, AssetBalance, KlinesRequest, RawKline, TickerPrice,
};
use crate::retry;
use crate::source::MarketDataSource;

type HmacSha256 = Hmac<Sha256>;

const KLINES_PATH: &str = "/api/v3/klines";
const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";
const ACCOUNT_PATH: &str = "/api/v3/account";

/// Exchange error codes that indicate a credential problem rather than a
/// generic request failure (-1022 bad signature, -2014 bad key format,
/// -2015 rejected key/IP/permissions).
const AUTH_ERROR_CODES: [i64; 3] = [-1022, -2014, -2015];

pub struct BinanceClient {
    http: Client,
    config: ClientConfig,
}

impl BinanceClient {
    /// Builds a blocking client with the API key installed as a default
    /// header, so every request is authenticated without restating it.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let mut headers = header::HeaderMap::new();
        let mut api_key = header::HeaderValue::from_str(
            config.credentials.api_key.expose_secret(),
        )
        .map_err(ConfigError::from)?;
        api_key.set_sensitive(true);
        headers.insert("X-MBX-APIKEY", api_key);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(ConfigError::ClientBuild(e)))?;

        Ok(Self { http, config })
    }

    /// Unauthenticated-endpoint GET (the key header is still sent; the
    /// exchange ignores it on public paths). Transient transport failures
    /// are retried per the configured policy.
    fn public_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        context: &'static str,
    ) -> Result<T, Error> {
        retry::with_backoff(&self.config.retry, Error::is_transient, || {
            let url = format!("{}{}", self.config.base_url, path);
            let response = self
                .http
                .get(&url)
                .query(query)
                .send()
                .map_err(Error::transport)?;
            decode_response(response, context)
        })
    }

    /// Signed-endpoint GET: appends `recvWindow` and a fresh `timestamp`,
    /// then an HMAC-SHA256 `signature` over the urlencoded query. The
    /// timestamp is regenerated on every retry attempt.
    fn signed_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
        context: &'static str,
    ) -> Result<T, Error> {
        retry::with_backoff(&self.config.retry, Error::is_transient, || {
            let mut signed = params.to_vec();
            signed.push((
                "recvWindow".to_string(),
                self.config.recv_window_ms.to_string(),
            ));
            signed.push((
                "timestamp".to_string(),
                chrono::Utc::now().timestamp_millis().to_string(),
            ));

            let query = serde_urlencoded::to_string(&signed)
                .map_err(|e| Error::malformed("query encoding", e))?;
            let signature = sign_query(
                self.config.credentials.api_secret.expose_secret(),
                &query,
            );
            let url = format!(
                "{}{}?{}&signature={}",
                self.config.base_url, path, query, signature
            );

            let response = self.http.get(&url).send().map_err(Error::transport)?;
            decode_response(response, context)
        })
    }
}

impl MarketDataSource for BinanceClient {
    fn fetch_klines(&self, request: &KlinesRequest) -> Result<Vec<RawKline>, Error> {
        request.validate()?;
        let query = klines_query(request);
        log::debug!(
            "fetching {} {} klines (limit {})",
            request.symbol,
            request.interval,
            request.limit
        );
        self.public_get(KLINES_PATH, &query, "klines")
    }

    fn fetch_price(&self, symbol: &str) -> Result<f64, Error> {
        if symbol.trim().is_empty() {
            return Err(Error::InvalidRequest("symbol must not be empty".into()));
        }
        let query = vec![("symbol".to_string(), symbol.to_ascii_uppercase())];
        let ticker: TickerPrice = self.public_get(TICKER_PRICE_PATH, &query, "ticker price")?;
        ticker
            .price
            .parse::<f64>()
            .map_err(|e| Error::malformed("ticker price", e))
    }

    fn fetch_balances(&self, assets: &[String]) -> Result<IndexMap<String, AssetBalance>, Error> {
        let account: AccountInfo = self.signed_get(ACCOUNT_PATH, &[], "account")?;

        let mut balances = IndexMap::new();
        for entry in account.balances {
            if !assets.is_empty() && !assets.iter().any(|a| a.eq_ignore_ascii_case(&entry.asset)) {
                continue;
            }
            let free = entry
                .free
                .parse::<f64>()
                .map_err(|e| Error::malformed("account balance", e))?;
            let locked = entry
                .locked
                .parse::<f64>()
                .map_err(|e| Error::malformed("account balance", e))?;
            balances.insert(entry.asset, AssetBalance { free, locked });
        }
        Ok(balances)
    }
}

/// Reads the body once, then either decodes the success payload or maps
/// the failure status onto the error taxonomy.
fn decode_response<T: DeserializeOwned>(
    response: reqwest::blocking::Response,
    context: &'static str,
) -> Result<T, Error> {
    let status = response.status();
    let body = response.text().map_err(Error::transport)?;
    if !status.is_success() {
        return Err(classify_api_error(status, &body));
    }
    serde_json::from_str(&body).map_err(|e| Error::malformed(context, e))
}

/// Maps a non-success status plus the exchange's `{"code", "msg"}` body
/// onto `Authentication` or `RemoteService`.
fn classify_api_error(status: StatusCode, body: &str) -> Error {
    let parsed: Option<ApiErrorBody> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().map(|b| b.code);
    let message = parsed
        .map(|b| b.msg)
        .unwrap_or_else(|| body.trim().to_string());

    let auth_code = code.is_some_and(|c| AUTH_ERROR_CODES.contains(&c));
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN || auth_code {
        Error::Authentication { code, message }
    } else {
        Error::RemoteService {
            status: status.as_u16(),
            code,
            message,
        }
    }
}

/// HMAC-SHA256 over the urlencoded query string, hex-encoded.
fn sign_query(secret: &str, query: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(query.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn klines_query(request: &KlinesRequest) -> Vec<(String, String)> {
    let mut query = vec![
        ("symbol".to_string(), request.symbol.clone()),
        ("interval".to_string(), request.interval.to_string()),
        ("limit".to_string(), request.limit.to_string()),
    ];
    if let Some(start) = request.start {
        query.push(("startTime".to_string(), start.timestamp_millis().to_string()));
    }
    if let Some(end) = request.end {
        query.push(("endTime".to_string(), end.timestamp_millis().to_string()));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KlineInterval;
    use chrono::TimeZone;

    // Published example from the Binance signed-endpoint documentation.
    #[test]
    fn signature_matches_the_documented_test_vector() {
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            sign_query(secret, query),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn http_401_maps_to_authentication() {
        let err = classify_api_error(StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, Error::Authentication { .. }));
    }

    #[test]
    fn auth_error_codes_map_to_authentication_even_on_400() {
        for code in AUTH_ERROR_CODES {
            let body = format!(r#"{{"code":{code},"msg":"rejected"}}"#);
            let err = classify_api_error(StatusCode::BAD_REQUEST, &body);
            assert!(
                matches!(err, Error::Authentication { code: Some(c), .. } if c == code),
                "code {code} should classify as Authentication, got {err:?}"
            );
        }
    }

    #[test]
    fn other_failures_map_to_remote_service_with_code_and_message() {
        let body = r#"{"code":-1121,"msg":"Invalid symbol."}"#;
        let err = classify_api_error(StatusCode::BAD_REQUEST, body);
        match err {
            Error::RemoteService {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(-1121));
                assert_eq!(message, "Invalid symbol.");
            }
            other => panic!("expected RemoteService, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_error_bodies_keep_the_raw_text() {
        let err = classify_api_error(StatusCode::BAD_GATEWAY, "upstream unavailable\n");
        match err {
            Error::RemoteService { status, code, message } => {
                assert_eq!(status, 502);
                assert_eq!(code, None);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("expected RemoteService, got {other:?}"),
        }
    }

    #[test]
    fn klines_query_includes_optional_time_bounds() {
        let start = chrono::Utc.timestamp_millis_opt(1_000).unwrap();
        let end = chrono::Utc.timestamp_millis_opt(60_000).unwrap();
        let request = KlinesRequest::new("btcusdt", KlineInterval::OneHour)
            .with_limit(100)
            .with_range(Some(start), Some(end));

        let query = klines_query(&request);
        assert_eq!(
            query,
            vec![
                ("symbol".to_string(), "BTCUSDT".to_string()),
                ("interval".to_string(), "1h".to_string()),
                ("limit".to_string(), "100".to_string()),
                ("startTime".to_string(), "1000".to_string()),
                ("endTime".to_string(), "60000".to_string()),
            ]
        );
    }

    #[test]
    fn klines_query_omits_absent_bounds() {
        let request = KlinesRequest::new("ETHUSDT", KlineInterval::OneMinute);
        let query = klines_query(&request);
        assert_eq!(query.len(), 3);
    }
}
