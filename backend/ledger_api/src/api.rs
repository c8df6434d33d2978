//! Axum REST API handlers.
//!
//! Writes identify their caller with the `x-caller` header. Amounts in
//! request bodies are decimal strings in whole units (`"0.5"`); responses
//! carry both the raw minimal-unit value and its formatted form.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use crowdfund_ledger::{
    units::{format_units, parse_units},
    Address, Amount, Campaign, CampaignStatus, DECIMALS, REWARD_RATE,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db;
use crate::errors::{ApiError, Result};
use crate::events::EventRecord;
use crate::state::AppState;

pub const CALLER_HEADER: &str = "x-caller";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/token", get(token_info))
        .route("/token/balances/:address", get(token_balance))
        .route("/token/transfer", post(transfer))
        .route("/native/balances/:address", get(native_balance))
        .route("/campaigns", get(list_campaigns).post(create_campaign))
        .route("/campaigns/:id", get(get_campaign))
        .route("/campaigns/:id/contributions", post(contribute))
        .route("/campaigns/:id/contributions/:address", get(get_contribution))
        .route("/campaigns/:id/finalize", post(finalize_campaign))
        .route("/campaigns/:id/events", get(get_campaign_events))
        .route("/events", get(get_all_events))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AmountView {
    pub raw: String,
    pub formatted: String,
}

impl From<Amount> for AmountView {
    fn from(amount: Amount) -> Self {
        Self {
            raw: amount.to_string(),
            formatted: format_units(amount, DECIMALS),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub total_supply: AmountView,
    pub minter: Address,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: Address,
    pub balance: AmountView,
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub to: String,
    pub amount: String,
}

#[derive(Serialize)]
pub struct TransferResponse {
    pub from: Address,
    pub to: Address,
    pub amount: AmountView,
    pub balance: AmountView,
}

#[derive(Serialize)]
pub struct CampaignView {
    pub id: u64,
    pub title: String,
    pub goal: AmountView,
    pub deadline: u64,
    pub creator: Address,
    pub total_raised: AmountView,
    pub finalized: bool,
    pub status: CampaignStatus,
}

impl CampaignView {
    fn new(campaign: Campaign, now: u64) -> Self {
        Self {
            status: campaign.status(now),
            id: campaign.id,
            goal: campaign.goal.into(),
            deadline: campaign.deadline,
            creator: campaign.creator,
            total_raised: campaign.total_raised.into(),
            finalized: campaign.finalized,
            title: campaign.title,
        }
    }
}

#[derive(Serialize)]
pub struct CampaignsResponse {
    pub campaign_count: u64,
    pub campaigns: Vec<CampaignView>,
}

#[derive(Deserialize)]
pub struct CreateCampaignRequest {
    pub title: String,
    pub goal: String,
    pub duration_secs: i64,
}

#[derive(Deserialize)]
pub struct ContributeRequest {
    pub amount: String,
}

#[derive(Serialize)]
pub struct ContributionResponse {
    pub campaign_id: u64,
    pub contributor: Address,
    pub contributed: AmountView,
}

#[derive(Serialize)]
pub struct ContributeResponse {
    pub campaign_id: u64,
    pub contributor: Address,
    pub amount: AmountView,
    pub reward: AmountView,
    pub contributed: AmountView,
}

#[derive(Serialize)]
pub struct FinalizeResponse {
    pub campaign_id: u64,
    pub creator: Address,
    pub paid_out: AmountView,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub campaign_id: u64,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

// ─────────────────────────────────────────────────────────
// Extraction helpers
// ─────────────────────────────────────────────────────────

fn caller(headers: &HeaderMap) -> Result<Address> {
    let value = headers
        .get(CALLER_HEADER)
        .ok_or_else(|| ApiError::BadRequest(format!("missing {CALLER_HEADER} header")))?
        .to_str()
        .map_err(|_| ApiError::BadRequest(format!("{CALLER_HEADER} is not valid text")))?;
    Ok(value.parse()?)
}

fn amount(raw: &str) -> Result<Amount> {
    Ok(parse_units(raw, DECIMALS)?)
}

fn campaign_key(id: u64) -> Result<i64> {
    i64::try_from(id).map_err(|_| ApiError::BadRequest(format!("campaign id {id} out of range")))
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /token`
pub async fn token_info(State(state): State<Arc<AppState>>) -> Json<TokenResponse> {
    let response = state
        .read(|ledger| {
            let token = ledger.token();
            TokenResponse {
                name: token.name(),
                symbol: token.symbol(),
                decimals: token.decimals(),
                total_supply: token.total_supply().into(),
                minter: token.minter(),
            }
        })
        .await;
    Json(response)
}

/// `GET /token/balances/:address`
pub async fn token_balance(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>> {
    let address: Address = address.parse()?;
    let balance = state.read(|ledger| ledger.balance_of(&address)).await;
    Ok(Json(BalanceResponse {
        address,
        balance: balance.into(),
    }))
}

/// `POST /token/transfer`
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<TransferRequest>,
) -> Result<Json<TransferResponse>> {
    let from = caller(&headers)?;
    let to: Address = body.to.parse()?;
    let value = amount(&body.amount)?;

    let balance = state
        .write("transfer", from, |ledger| {
            ledger.transfer(from, to, value)?;
            Ok(ledger.balance_of(&from))
        })
        .await?;

    Ok(Json(TransferResponse {
        from,
        to,
        amount: value.into(),
        balance: balance.into(),
    }))
}

/// `GET /native/balances/:address`
pub async fn native_balance(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>> {
    let address: Address = address.parse()?;
    let balance = state
        .read(|ledger| ledger.native_balance_of(&address))
        .await;
    Ok(Json(BalanceResponse {
        address,
        balance: balance.into(),
    }))
}

/// `GET /campaigns`
pub async fn list_campaigns(State(state): State<Arc<AppState>>) -> Json<CampaignsResponse> {
    let response = state
        .read(|ledger| {
            let now = ledger.now();
            CampaignsResponse {
                campaign_count: ledger.campaign_count(),
                campaigns: ledger
                    .campaigns()
                    .map(|c| CampaignView::new(c, now))
                    .collect(),
            }
        })
        .await;
    Json(response)
}

/// `POST /campaigns`
pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateCampaignRequest>,
) -> Result<impl IntoResponse> {
    let creator = caller(&headers)?;
    let goal = amount(&body.goal)?;

    let view = state
        .write("create_campaign", creator, |ledger| {
            let id = ledger.create_campaign(creator, &body.title, goal, body.duration_secs)?;
            Ok(CampaignView::new(ledger.campaign(id)?, ledger.now()))
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /campaigns/:id`
pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<CampaignView>> {
    let view = state
        .read(|ledger| {
            ledger
                .campaign(id)
                .map(|c| CampaignView::new(c, ledger.now()))
        })
        .await?;
    Ok(Json(view))
}

/// `POST /campaigns/:id/contributions`
pub async fn contribute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<ContributeRequest>,
) -> Result<Json<ContributeResponse>> {
    let contributor = caller(&headers)?;
    let value = amount(&body.amount)?;

    let contributed = state
        .write("contribute", contributor, |ledger| {
            ledger.contribute(contributor, id, value)?;
            Ok(ledger.contributions(id, &contributor))
        })
        .await?;

    Ok(Json(ContributeResponse {
        campaign_id: id,
        contributor,
        amount: value.into(),
        reward: (value * REWARD_RATE).into(),
        contributed: contributed.into(),
    }))
}

/// `GET /campaigns/:id/contributions/:address`
pub async fn get_contribution(
    State(state): State<Arc<AppState>>,
    Path((id, address)): Path<(u64, String)>,
) -> Result<Json<ContributionResponse>> {
    let contributor: Address = address.parse()?;
    let contributed = state
        .read(|ledger| ledger.contributions(id, &contributor))
        .await;
    Ok(Json(ContributionResponse {
        campaign_id: id,
        contributor,
        contributed: contributed.into(),
    }))
}

/// `POST /campaigns/:id/finalize`
pub async fn finalize_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<FinalizeResponse>> {
    let trigger = caller(&headers)?;

    let (creator, paid_out) = state
        .write("finalize_campaign", trigger, |ledger| {
            let paid_out = ledger.finalize_campaign(trigger, id)?;
            Ok((ledger.campaign(id)?.creator, paid_out))
        })
        .await?;

    Ok(Json(FinalizeResponse {
        campaign_id: id,
        creator,
        paid_out: paid_out.into(),
    }))
}

/// `GET /campaigns/:id/events`
///
/// Returns all journaled events for the given campaign.
pub async fn get_campaign_events(
    State(state): State<Arc<AppState>>,
    Path(campaign_id): Path<u64>,
) -> Result<Json<EventsResponse>> {
    let events = db::get_events_for_campaign(&state.pool, campaign_key(campaign_id)?).await?;
    Ok(Json(EventsResponse {
        campaign_id,
        count: events.len(),
        events,
    }))
}

/// `GET /events`
///
/// Returns every journaled event, oldest first.
pub async fn get_all_events(State(state): State<Arc<AppState>>) -> Result<Json<AllEventsResponse>> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(AllEventsResponse {
        count: events.len(),
        events,
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;

    const DEPLOYER: &str = "0xa0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0";
    const DONOR: &str = "0xd0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0";
    const REGISTRY: &str = "0x00000000000000000000000000000000000c0ffe";

    async fn app() -> Router {
        let vars: HashMap<&str, String> = HashMap::from([
            ("DEPLOYER_ADDRESS", DEPLOYER.to_string()),
            ("INITIAL_SUPPLY", "1000".to_string()),
            ("NATIVE_ALLOCATIONS", format!("{DEPLOYER}=5,{DONOR}=10")),
            ("DATABASE_URL", "sqlite::memory:".to_string()),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
        let pool = db::init_pool(&config.database_url).await.unwrap();
        let state = AppState::deploy(pool, &config).await.unwrap();
        router(Arc::new(state))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        caller: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(caller) = caller {
            request = request.header(CALLER_HEADER, caller);
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = app().await;
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn token_is_owned_by_registry() {
        let app = app().await;
        let (status, body) = send(&app, "GET", "/token", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "RNT");
        assert_eq!(body["minter"], REGISTRY);
        assert_eq!(body["total_supply"]["formatted"], "1000.0");
    }

    #[tokio::test]
    async fn campaign_lifecycle_over_http() {
        let app = app().await;

        let (status, created) = send(
            &app,
            "POST",
            "/campaigns",
            Some(DEPLOYER),
            Some(json!({"title": "Test Campaign", "goal": "1", "duration_secs": 3600})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], 1);
        assert_eq!(created["status"], "open");

        let (status, contributed) = send(
            &app,
            "POST",
            "/campaigns/1/contributions",
            Some(DONOR),
            Some(json!({"amount": "1.1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(contributed["reward"]["formatted"], "110.0");

        let (_, balance) = send(&app, "GET", &format!("/token/balances/{DONOR}"), None, None).await;
        assert_eq!(balance["balance"]["raw"], "110000000000000000000");

        let (_, record) = send(
            &app,
            "GET",
            &format!("/campaigns/1/contributions/{DONOR}"),
            None,
            None,
        )
        .await;
        assert_eq!(record["contributed"]["formatted"], "1.1");

        let (status, finalized) =
            send(&app, "POST", "/campaigns/1/finalize", Some(DONOR), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(finalized["creator"], DEPLOYER);
        assert_eq!(finalized["paid_out"]["formatted"], "1.1");

        let (_, creator) =
            send(&app, "GET", &format!("/native/balances/{DEPLOYER}"), None, None).await;
        assert_eq!(creator["balance"]["formatted"], "6.1");

        let (status, again) = send(&app, "POST", "/campaigns/1/finalize", Some(DONOR), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(again["error"], "campaign 1 already finalized");

        let (_, events) = send(&app, "GET", "/campaigns/1/events", None, None).await;
        let kinds: Vec<&str> = events["events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["event_type"].as_str().unwrap())
            .collect();
        assert_eq!(
            kinds,
            ["campaign_created", "contribution_made", "campaign_finalized"]
        );
        assert_eq!(events["events"][2]["actor"], DEPLOYER);

        let (_, all) = send(&app, "GET", "/events", None, None).await;
        // Deploy mint, ownership transfer, create, reward mint, contribution, finalize.
        assert_eq!(all["count"], 6);
        assert_eq!(all["events"][0]["event_type"], "transfer");
        assert_eq!(all["events"][1]["event_type"], "ownership_transferred");
    }

    #[tokio::test]
    async fn token_transfer_over_http() {
        let app = app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/token/transfer",
            Some(DEPLOYER),
            Some(json!({"to": DONOR, "amount": "100"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance"]["formatted"], "900.0");

        let (status, body) = send(
            &app,
            "POST",
            "/token/transfer",
            Some(DONOR),
            Some(json!({"to": DEPLOYER, "amount": "101"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("insufficient balance"));
    }

    #[tokio::test]
    async fn rejected_requests_map_to_client_errors() {
        let app = app().await;

        let (status, _) = send(
            &app,
            "POST",
            "/campaigns",
            Some(DEPLOYER),
            Some(json!({"title": "Fail", "goal": "0", "duration_secs": 3600})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(&app, "GET", "/campaigns/1", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            "POST",
            "/campaigns",
            None,
            Some(json!({"title": "No caller", "goal": "1", "duration_secs": 60})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "POST",
            "/token/transfer",
            Some(REGISTRY),
            Some(json!({"to": DONOR, "amount": "1"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            "POST",
            "/campaigns",
            Some(DEPLOYER),
            Some(json!({"title": "Bad amount", "goal": "one", "duration_secs": 60})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, list) = send(&app, "GET", "/campaigns", None, None).await;
        assert_eq!(list["campaign_count"], 0);
    }

    #[tokio::test]
    async fn deploy_refuses_registry_equal_to_deployer() {
        let vars: HashMap<&str, String> = HashMap::from([
            ("DEPLOYER_ADDRESS", DEPLOYER.to_string()),
            ("REGISTRY_ADDRESS", DEPLOYER.to_string()),
            ("DATABASE_URL", "sqlite::memory:".to_string()),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
        let pool = db::init_pool(&config.database_url).await.unwrap();

        let result = AppState::deploy(pool, &config).await;
        assert!(matches!(
            result,
            Err(ApiError::Ledger(crowdfund_ledger::Error::InvalidAddress(_)))
        ));
    }
}
