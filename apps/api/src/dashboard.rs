//! Role-specific landing summary.
//!
//! Each role maps to one builder in [`DASHBOARDS`]. Builders call the same
//! services the JSON endpoints use.

use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    middleware,
    routing::get,
    Router,
};
use futures::future::{BoxFuture, FutureExt};
use serde_json::{json, Value};

use admin_cell::AdminService;
use appointment_cell::services::AppointmentLifecycleService;
use concern_cell::ConcernService;
use notification_cell::NotificationService;
use pharmacy_cell::PharmacyService;
use referral_cell::ReferralService;
use shared_database::AppState;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_models::response::{self, ApiResponse};
use shared_utils::extractor::auth_middleware;

pub type DashboardBuilder = for<'a> fn(&'a AppState, AuthUser) -> BoxFuture<'a, Result<Value, AppError>>;

pub const DASHBOARDS: [(Role, DashboardBuilder); 4] = [
    (Role::Student, student_dashboard as DashboardBuilder),
    (Role::Doctor, doctor_dashboard as DashboardBuilder),
    (Role::Pharmacy, pharmacy_dashboard as DashboardBuilder),
    (Role::Admin, admin_dashboard as DashboardBuilder),
];

pub fn builder_for(role: Role) -> Option<DashboardBuilder> {
    DASHBOARDS
        .iter()
        .find(|(candidate, _)| *candidate == role)
        .map(|(_, builder)| *builder)
}

fn student_dashboard(state: &AppState, user: AuthUser) -> BoxFuture<'_, Result<Value, AppError>> {
    async move {
        let today = chrono::Local::now().date_naive();
        let appointments = AppointmentLifecycleService::new(state);
        let notifications = NotificationService::new(state);
        let pharmacy = PharmacyService::new(state);

        let (upcoming, unread, orders) = futures::try_join!(
            async { appointments.upcoming_for_student(user.id, today).await.map_err(AppError::from) },
            notifications.unread_for(user.id),
            async { pharmacy.student_orders(user.id).await.map_err(AppError::from) },
        )?;

        Ok(json!({
            "upcoming_appointments": upcoming,
            "unread_notifications": unread,
            "orders": orders,
        }))
    }
    .boxed()
}

fn doctor_dashboard(state: &AppState, user: AuthUser) -> BoxFuture<'_, Result<Value, AppError>> {
    async move {
        let appointments = AppointmentLifecycleService::new(state);
        let concerns = ConcernService::new(state);
        let referrals = ReferralService::new(state);

        let (appointments, concerns, referrals) = futures::try_join!(
            async { appointments.doctor_appointments(user.id).await.map_err(AppError::from) },
            concerns.pending(),
            referrals.pending(),
        )?;

        Ok(json!({
            "appointments": appointments,
            "pending_concerns": concerns,
            "pending_referrals": referrals,
        }))
    }
    .boxed()
}

fn pharmacy_dashboard(state: &AppState, _user: AuthUser) -> BoxFuture<'_, Result<Value, AppError>> {
    async move {
        let pharmacy = PharmacyService::new(state);
        let (orders, inventory) = futures::try_join!(pharmacy.all_orders(), pharmacy.inventory())?;

        Ok(json!({
            "orders": orders,
            "inventory": inventory,
        }))
    }
    .boxed()
}

fn admin_dashboard(state: &AppState, _user: AuthUser) -> BoxFuture<'_, Result<Value, AppError>> {
    async move {
        let overview = AdminService::new(state).overview().await?;
        Ok(json!({ "overview": overview }))
    }
    .boxed()
}

pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse, AppError> {
    let builder = builder_for(user.role)
        .ok_or_else(|| AppError::Forbidden("No dashboard for this role".to_string()))?;
    let summary = builder(&state, user).await?;
    Ok(response::ok(json!({ "role": user.role, "summary": summary })))
}

pub fn dashboard_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(get_dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_utils::test_utils::{TestConfig, TestUser};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_every_role_has_exactly_one_builder() {
        for role in [Role::Student, Role::Doctor, Role::Pharmacy, Role::Admin] {
            let matches = DASHBOARDS.iter().filter(|(r, _)| *r == role).count();
            assert_eq!(matches, 1, "{:?}", role);
            assert!(builder_for(role).is_some());
        }
    }

    #[tokio::test]
    async fn test_pharmacy_dashboard_lists_orders_and_inventory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/medicines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "name": "Cetirizine", "description": null, "stock": 40, "price": 1.25 }
            ])))
            .mount(&server)
            .await;

        let state = TestConfig::with_url(&server.uri()).to_state();
        let (status, axum::Json(body)) = get_dashboard(
            State(state),
            Extension(TestUser::pharmacist(7).to_auth_user()),
        )
        .await
        .unwrap();

        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body["data"]["role"], "pharmacy");
        assert_eq!(body["data"]["summary"]["inventory"][0]["name"], "Cetirizine");
        assert_eq!(body["data"]["summary"]["orders"], json!([]));
    }
}
