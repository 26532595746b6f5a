use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{
    Booking, BusinessInfo, Customer, PaymentMethod, QrCode, Referral, Task,
    Transaction,
  },
  prelude::*,
  state::AppState,
  sv::{
    admin::{BookingRow, ReferralRow},
    auth::{ProfilePatch, Registration},
    booking::BookingRequest,
    referral::ReferrerTotals,
    seed,
    stats::Overview,
    task::{TaskDraft, TaskQuery},
  },
};

type App = State<Arc<AppState>>;

#[derive(Serialize)]
pub struct Status {
  success: bool,
  msg: Option<String>,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::EmailTaken => StatusCode::CONFLICT,
      Error::PasswordMismatch
      | Error::EmptyTitle
      | Error::MissingField(_)
      | Error::InsufficientFreeHours
      | Error::InvalidArgs(_) => StatusCode::BAD_REQUEST,
      Error::InvalidCredentials | Error::NotLoggedIn => {
        StatusCode::UNAUTHORIZED
      }
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::CustomerNotFound
      | Error::ServiceNotFound
      | Error::BookingNotFound
      | Error::TaskNotFound
      | Error::QrCodeNotFound => StatusCode::NOT_FOUND,
      Error::Db(_)
      | Error::Json(_)
      | Error::Hash(_)
      | Error::QuotaExceeded(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
      error!("Request failed: {self}");
    }

    let body = Status { success: false, msg: Some(self.to_string()) };
    (status, Json(body)).into_response()
  }
}

pub async fn health() -> &'static str {
  "OK"
}

pub async fn register(
  State(app): App,
  Json(form): Json<Registration>,
) -> Result<Json<Customer>> {
  let mut session = app.session.lock().await;
  Ok(Json(app.auth().register(&mut session, form).await?))
}

#[derive(Deserialize)]
pub struct LoginReq {
  email: String,
  password: String,
}

pub async fn login(
  State(app): App,
  Json(req): Json<LoginReq>,
) -> Result<Json<Customer>> {
  let mut session = app.session.lock().await;
  Ok(Json(app.auth().login(&mut session, &req.email, &req.password).await?))
}

pub async fn logout(State(app): App) -> Json<Status> {
  let mut session = app.session.lock().await;
  app.auth().logout(&mut session).await;
  Json(Status { success: true, msg: Some("You have been logged out".into()) })
}

pub async fn me(State(app): App) -> Result<Json<Customer>> {
  let mut session = app.session.lock().await;
  Ok(Json(app.auth().refresh(&mut session).await?))
}

pub async fn update_profile(
  State(app): App,
  Json(patch): Json<ProfilePatch>,
) -> Result<Json<Customer>> {
  let mut session = app.session.lock().await;
  Ok(Json(app.auth().update_profile(&mut session, patch).await?))
}

pub async fn business(State(app): App) -> Json<BusinessInfo> {
  Json(seed::ensure_business(&app.store).await)
}

pub async fn my_bookings(State(app): App) -> Result<Json<Vec<Booking>>> {
  let session = app.session.lock().await;
  let user = session.user()?;
  Ok(Json(app.bookings().for_customer(&user.id).await))
}

pub async fn submit_booking(
  State(app): App,
  Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>)> {
  let session = app.session.lock().await;
  let booking = app.bookings().submit(&session, req).await?;
  Ok((StatusCode::CREATED, Json(booking)))
}

#[derive(Deserialize)]
pub struct PayReq {
  method: PaymentMethod,
}

pub async fn pay_booking(
  State(app): App,
  Path(id): Path<String>,
  Json(req): Json<PayReq>,
) -> Result<Json<Transaction>> {
  let session = app.session.lock().await;
  Ok(Json(app.bookings().confirm_payment(&session, &id, req.method).await?))
}

pub async fn cancel_booking(
  State(app): App,
  Path(id): Path<String>,
) -> Result<Json<Booking>> {
  let session = app.session.lock().await;
  Ok(Json(app.bookings().cancel(&session, &id).await?))
}

#[derive(Serialize)]
pub struct MyReferrals {
  totals: ReferrerTotals,
  referrals: Vec<Referral>,
}

pub async fn my_referrals(State(app): App) -> Result<Json<MyReferrals>> {
  let session = app.session.lock().await;
  let user = session.user()?;
  let referrals = app.referrals();

  Ok(Json(MyReferrals {
    totals: referrals.totals(&user.id).await,
    referrals: referrals.for_customer(&user.id).await,
  }))
}

pub async fn generate_qr(State(app): App) -> Result<Json<QrCode>> {
  let session = app.session.lock().await;
  let user = session.user()?;
  let code = app
    .referrals()
    .generate_qr(&user.id, &app.config.referral_base_url)
    .await?;
  Ok(Json(code))
}

pub async fn scan_referral(
  State(app): App,
  Path(id): Path<String>,
) -> Result<Json<QrCode>> {
  Ok(Json(app.referrals().record_scan(&id).await?))
}

pub async fn admin_overview(State(app): App) -> Result<Json<Overview>> {
  app.session.lock().await.require_admin()?;
  Ok(Json(app.stats().overview().await))
}

#[derive(Deserialize)]
pub struct SearchQuery {
  #[serde(default)]
  q: String,
}

pub async fn admin_customers(
  State(app): App,
  Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Customer>>> {
  app.session.lock().await.require_admin()?;
  Ok(Json(app.admin().customers(&query.q).await))
}

pub async fn admin_bookings(
  State(app): App,
) -> Result<Json<Vec<BookingRow>>> {
  app.session.lock().await.require_admin()?;
  Ok(Json(app.admin().booking_rows().await))
}

pub async fn admin_referrals(
  State(app): App,
) -> Result<Json<Vec<ReferralRow>>> {
  app.session.lock().await.require_admin()?;
  Ok(Json(app.admin().referral_rows().await))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeHoursReq {
  customer_id: String,
  delta: f64,
  #[serde(default)]
  reason: String,
}

pub async fn admin_free_hours(
  State(app): App,
  Json(req): Json<FreeHoursReq>,
) -> Result<Json<Customer>> {
  let admin = app.session.lock().await.require_admin()?.clone();
  let customer = app
    .admin()
    .adjust_free_hours(&admin, &req.customer_id, req.delta, &req.reason)
    .await?;
  Ok(Json(customer))
}

pub async fn list_tasks(
  State(app): App,
  Query(query): Query<TaskQuery>,
) -> Json<Vec<Task>> {
  Json(app.tasks().query(&query).await)
}

pub async fn add_task(
  State(app): App,
  Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>)> {
  let task = app.tasks().add(draft).await?;
  Ok((StatusCode::CREATED, Json(task)))
}

pub async fn edit_task(
  State(app): App,
  Path(id): Path<String>,
  Json(draft): Json<TaskDraft>,
) -> Result<Json<Task>> {
  Ok(Json(app.tasks().edit(&id, draft).await?))
}

pub async fn delete_task(
  State(app): App,
  Path(id): Path<String>,
) -> Result<Json<Task>> {
  Ok(Json(app.tasks().delete(&id).await?))
}

pub async fn toggle_task(
  State(app): App,
  Path(id): Path<String>,
) -> Result<Json<Task>> {
  Ok(Json(app.tasks().toggle(&id).await?))
}
