use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::battle::{
    compare_creatures, compute_damage, entropy_seed, estimate_matchup, simulate_seeded,
    BattleResult, Comparison, MatchupSummary, DEFAULT_MATCHUP_ITERATIONS, MAX_MATCHUP_ITERATIONS,
};
use crate::data::{Creature, CreatureRepository, DataError, ListQuery, DEFAULT_PAGE_LIMIT};

pub const MAX_PAGE_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    Parse(serde_json::Error),
    #[error("{0}")]
    Validation(String),
    #[error("Creature not found: {0}")]
    NotFound(String),
    #[error("failed to encode response: {0}")]
    Encode(serde_json::Error),
    #[error(transparent)]
    Data(DataError),
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound(key) => Self::NotFound(key),
            other => Self::Data(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> (u16, &'static str) {
        match self {
            Self::Parse(_) | Self::Validation(_) => (400, "Bad Request"),
            Self::NotFound(_) => (404, "Not Found"),
            Self::Encode(_) | Self::Data(_) => (500, "Internal Server Error"),
        }
    }
}

/// Creature reference in a request body: numeric id, string id, or name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CreatureRef {
    Number(u64),
    Text(String),
}

impl CreatureRef {
    fn key(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatureSummary {
    pub id: String,
    pub name: String,
}

impl From<&Creature> for CreatureSummary {
    fn from(creature: &Creature) -> Self {
        Self {
            id: creature.id.clone(),
            name: creature.display_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateRequest {
    pub a: CreatureRef,
    pub b: CreatureRef,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulateResponse {
    pub status: &'static str,
    pub seed: u64,
    pub a: CreatureSummary,
    pub b: CreatureSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
    pub result: BattleResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DamageRequest {
    pub a: CreatureRef,
    pub b: CreatureRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct DamageResponse {
    pub status: &'static str,
    pub a: CreatureSummary,
    pub b: CreatureSummary,
    pub a_to_b: i64,
    pub b_to_a: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchupRequest {
    pub a: CreatureRef,
    pub b: CreatureRef,
    pub iterations: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchupResponse {
    pub status: &'static str,
    pub a: CreatureSummary,
    pub b: CreatureSummary,
    pub summary: MatchupSummary,
    pub a_win_rate_95_ci: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareResponse {
    pub status: &'static str,
    pub a: CreatureSummary,
    pub b: CreatureSummary,
    pub comparison: Comparison,
}

fn encode<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(ApiError::Encode)
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(ApiError::Parse)
}

fn lookup<'r>(repo: &'r dyn CreatureRepository, key: &str) -> Result<&'r Creature, ApiError> {
    if key.is_empty() {
        return Err(ApiError::Validation("creature reference must not be empty".to_string()));
    }
    Ok(repo.require(key)?)
}

fn lookup_pair<'r>(
    repo: &'r dyn CreatureRepository,
    a: &CreatureRef,
    b: &CreatureRef,
) -> Result<(&'r Creature, &'r Creature), ApiError> {
    Ok((lookup(repo, &a.key())?, lookup(repo, &b.key())?))
}

pub fn health_payload(repo: &dyn CreatureRepository) -> Result<String, ApiError> {
    encode(&serde_json::json!({
        "status": "ok",
        "service": "bestiary-api",
        "version": env!("CARGO_PKG_VERSION"),
        "creatures": repo.all().len(),
    }))
}

pub fn creatures_payload(repo: &dyn CreatureRepository, path: &str) -> Result<String, ApiError> {
    let query = ListQuery {
        page: parse_usize_param(path, "page")?.unwrap_or(1),
        limit: parse_usize_param(path, "limit")?
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT),
        type_filter: query_param(path, "type").filter(|t| !t.trim().is_empty()),
        search: query_param(path, "q").filter(|q| !q.trim().is_empty()),
    };
    encode(&repo.list(&query))
}

pub fn creature_payload(repo: &dyn CreatureRepository, id: &str) -> Result<String, ApiError> {
    let id = percent_decode(id);
    encode(lookup(repo, id.trim())?)
}

pub fn simulate_payload(repo: &dyn CreatureRepository, body: &str) -> Result<String, ApiError> {
    let req: SimulateRequest = decode(body)?;
    let (a, b) = lookup_pair(repo, &req.a, &req.b)?;
    let seed = req.seed.unwrap_or_else(entropy_seed);

    let result = simulate_seeded(a, b, seed);
    info!(a = %a.id, b = %b.id, seed, winner = ?result.winner, "simulated fight");

    let response = SimulateResponse {
        status: "ok",
        seed,
        a: a.into(),
        b: b.into(),
        winner_name: result
            .winner_creature(a, b)
            .map(|c| c.display_name().to_string()),
        result,
    };
    encode(&response)
}

pub fn damage_payload(repo: &dyn CreatureRepository, body: &str) -> Result<String, ApiError> {
    let req: DamageRequest = decode(body)?;
    let (a, b) = lookup_pair(repo, &req.a, &req.b)?;
    encode(&DamageResponse {
        status: "ok",
        a: a.into(),
        b: b.into(),
        a_to_b: compute_damage(&a.base, &b.base),
        b_to_a: compute_damage(&b.base, &a.base),
    })
}

pub fn compare_payload(repo: &dyn CreatureRepository, path: &str) -> Result<String, ApiError> {
    let ids: Vec<String> = query_param(path, "ids")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let [first, second] = ids.as_slice() else {
        return Err(ApiError::Validation(
            "ids must name exactly two creatures".to_string(),
        ));
    };
    let a = lookup(repo, first)?;
    let b = lookup(repo, second)?;
    encode(&CompareResponse {
        status: "ok",
        a: a.into(),
        b: b.into(),
        comparison: compare_creatures(a, b),
    })
}

pub fn matchup_payload(repo: &dyn CreatureRepository, body: &str) -> Result<String, ApiError> {
    let req: MatchupRequest = decode(body)?;
    let (a, b) = lookup_pair(repo, &req.a, &req.b)?;
    let iterations = req
        .iterations
        .unwrap_or(DEFAULT_MATCHUP_ITERATIONS)
        .clamp(1, MAX_MATCHUP_ITERATIONS);
    let seed = req.seed.unwrap_or(0);

    let summary = estimate_matchup(a, b, iterations, seed);
    info!(a = %a.id, b = %b.id, iterations, seed, a_win_rate = summary.a_win_rate, "estimated matchup");

    let ci = binomial_95_ci(summary.a_wins, iterations);
    encode(&MatchupResponse {
        status: "ok",
        a: a.into(),
        b: b.into(),
        summary,
        a_win_rate_95_ci: ci,
    })
}

/// Normal-approximation 95% interval for a win rate.
pub fn binomial_95_ci(wins: usize, n: usize) -> [f64; 2] {
    if n == 0 {
        return [0.0, 0.0];
    }
    let p = wins as f64 / n as f64;
    let z = 1.96;
    let se = (p * (1.0 - p) / n as f64).sqrt();
    [(p - z * se).max(0.0), (p + z * se).min(1.0)]
}

/// Value of `key` in the query string of `path`, percent-decoded.
pub fn query_param(path: &str, key: &str) -> Option<String> {
    let query = path.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| percent_decode(v))
}

fn parse_usize_param(path: &str, key: &str) -> Result<Option<usize>, ApiError> {
    match query_param(path, key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ApiError::Validation(format!("{key} must be a positive integer"))),
    }
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            other => out.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
