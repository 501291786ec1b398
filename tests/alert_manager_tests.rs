mod common;

use common::{MockBackend, GOOD_TOKEN};
use stock_panel::services::{
    alerts_service::{AlertForm, AlertManager, BulkRow},
    api_client::ApiClient,
    notifications::ToastKind,
    session::{Session, LOGIN_PATH},
};

fn session(backend: &MockBackend, token: Option<&str>) -> Session {
    Session::new(ApiClient::new(&backend.url, None), token.map(str::to_string))
}

fn stock_row(symbol: &str, target: &str) -> BulkRow {
    BulkRow {
        symbol: symbol.into(),
        target: target.into(),
        ..BulkRow::empty()
    }
}

#[tokio::test]
async fn list_loads_alerts_from_backend() {
    let backend = MockBackend::start().await;
    let mut s = session(&backend, Some(GOOD_TOKEN));
    let mut alerts = AlertManager::default();

    alerts.list(&mut s).await.unwrap();

    assert_eq!(alerts.alerts().len(), 1);
    let infy = alerts.find(1).unwrap();
    assert_eq!(infy.symbol, "INFY");
    assert!(!infy.is_option());
}

#[tokio::test]
async fn toggle_is_visible_only_through_the_reload() {
    let backend = MockBackend::start().await;
    let mut s = session(&backend, Some(GOOD_TOKEN));
    let mut alerts = AlertManager::default();

    alerts.list(&mut s).await.unwrap();
    assert!(alerts.find(1).unwrap().is_active);
    let lists_before = backend.alert_lists();

    alerts.toggle_active(&mut s, 1).await.unwrap();

    assert_eq!(backend.alert_active(1), Some(false));
    assert_eq!(backend.alert_lists(), lists_before + 1);
    assert!(!alerts.find(1).unwrap().is_active);

    let toasts = s.notifier().drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Success);
    assert_eq!(toasts[0].message, "Alert status updated successfully");
}

#[tokio::test]
async fn invalid_form_is_rejected_without_a_request() {
    let backend = MockBackend::start().await;
    let mut s = session(&backend, Some(GOOD_TOKEN));
    let mut alerts = AlertManager::default();

    let form = AlertForm {
        instrument_type: "STOCK".into(),
        symbol: "TCS".into(),
        ..AlertForm::default()
    };
    assert!(alerts.save(&mut s, None, &form).await.is_err());
    assert_eq!(backend.requests(), 0);
}

#[tokio::test]
async fn created_alert_appears_after_reload() {
    let backend = MockBackend::start().await;
    let mut s = session(&backend, Some(GOOD_TOKEN));
    let mut alerts = AlertManager::default();

    let form = AlertForm {
        instrument_type: "OPTION".into(),
        symbol: "RELIANCE24JAN2500CE".into(),
        underlying_symbol: "RELIANCE".into(),
        option_type: "CALL".into(),
        strike_price: "2500".into(),
        expiry: "2024-01-25".into(),
        alert_type: "PRICE_ABOVE".into(),
        target_value: "50".into(),
        condition: ">".into(),
        message: String::new(),
    };
    alerts.save(&mut s, None, &form).await.unwrap();

    assert_eq!(alerts.alerts().len(), 2);
    let created = alerts.alerts().iter().find(|a| a.symbol == "RELIANCE24JAN2500CE").unwrap();
    assert!(created.is_option());
    assert_eq!(created.strike_price, Some(2500.0));
}

#[tokio::test]
async fn delete_of_unknown_alert_sends_nothing() {
    let backend = MockBackend::start().await;
    let mut s = session(&backend, Some(GOOD_TOKEN));
    let mut alerts = AlertManager::default();

    alerts.list(&mut s).await.unwrap();
    let before = backend.requests();

    assert!(!alerts.delete(&mut s, 99).await.unwrap());
    assert_eq!(backend.requests(), before);

    assert!(alerts.delete(&mut s, 1).await.unwrap());
    assert!(alerts.alerts().is_empty());
}

#[tokio::test]
async fn bulk_create_posts_only_valid_rows() {
    let backend = MockBackend::start().await;
    let mut s = session(&backend, Some(GOOD_TOKEN));
    let mut alerts = AlertManager::default();

    let rows = vec![
        stock_row("TCS", "4000"),
        stock_row("HDFCBANK", "1600"),
        stock_row("WIPRO", "not-a-number"),
        stock_row("ITC", "450"),
    ];
    let report = alerts.bulk_create(&mut s, &rows).await;

    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].row, 3);
    assert!(report.rejected[0].errors.contains_key("targetValue"));
    assert_eq!(report.created, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(backend.alert_posts(), 3);
    assert_eq!(alerts.alerts().len(), 4);

    let toasts = s.notifier().drain();
    assert!(toasts[0].message.starts_with("Validation errors:\nRow 3:"));
    assert_eq!(toasts[1].message, "Successfully created 3 alerts");
}

#[tokio::test]
async fn bulk_row_without_symbol_is_rejected_not_skipped() {
    let backend = MockBackend::start().await;
    let mut s = session(&backend, Some(GOOD_TOKEN));
    let mut alerts = AlertManager::default();

    let rows = vec![
        stock_row("TCS", "4000"),
        stock_row("HDFCBANK", "1600"),
        BulkRow {
            target: "900".into(),
            message: "no symbol".into(),
            ..BulkRow::empty()
        },
        stock_row("ITC", "450"),
    ];
    assert!(!rows[2].is_blank());

    let report = alerts.bulk_create(&mut s, &rows).await;

    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].row, 3);
    assert!(report.rejected[0].errors.contains_key("symbol"));
    assert_eq!(report.created, 3);
    assert_eq!(backend.alert_posts(), 3);

    let toasts = s.notifier().drain();
    assert!(toasts[0].message.contains("Row 3: Missing or invalid fields (symbol)"));
}

#[tokio::test]
async fn bulk_create_stops_at_first_unauthorized_row() {
    let backend = MockBackend::start().await;
    let mut s = session(&backend, Some("expired"));
    let mut alerts = AlertManager::default();

    let rows = vec![stock_row("TCS", "4000"), stock_row("ITC", "450")];
    let report = alerts.bulk_create(&mut s, &rows).await;

    assert_eq!(report.created, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(backend.alert_posts(), 1);
    assert!(s.token().is_none());
    assert_eq!(s.take_redirect().as_deref(), Some(LOGIN_PATH));
}
