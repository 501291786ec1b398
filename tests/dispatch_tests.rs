mod common;

use common::{MockBackend, GOOD_TOKEN};
use stock_panel::{
    commands::{dispatch, Action},
    services::{
        alerts_service::BulkRow, api_client::ApiClient, notifications::ToastKind,
        workspace::Workspace,
    },
    views::models::View,
};

fn workspace(backend: &MockBackend) -> Workspace {
    Workspace::new(ApiClient::new(&backend.url, None), Some(GOOD_TOKEN.to_string()))
}

fn stock_row(symbol: &str, target: &str) -> BulkRow {
    BulkRow {
        symbol: symbol.into(),
        target: target.into(),
        ..BulkRow::empty()
    }
}

#[tokio::test]
async fn bulk_submit_reports_row_missing_its_symbol() {
    let backend = MockBackend::start().await;
    let mut ws = workspace(&backend);

    let rows = vec![
        stock_row("TCS", "4000"),
        stock_row("HDFCBANK", "1600"),
        stock_row("ITC", "450"),
        BulkRow {
            target: "900".into(),
            message: "no symbol".into(),
            ..BulkRow::empty()
        },
    ];
    let out = dispatch(&mut ws, Action::BulkCreate(rows)).await;

    assert!(matches!(out.view, Some(View::AlertsGrid(_))));
    assert!(out.toasts.iter().any(|t| t.kind == ToastKind::Error
        && t.message.contains("Row 4: Missing or invalid fields (symbol)")));
    assert!(out.toasts.iter().any(|t| t.message == "Successfully created 3 alerts"));
    assert_eq!(backend.alert_posts(), 3);
}

#[tokio::test]
async fn resetting_the_dashboard_filter_says_so() {
    let backend = MockBackend::start().await;
    let mut ws = workspace(&backend);
    let today = chrono::NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();

    let filtered = dispatch(
        &mut ws,
        Action::ApplyDateFilter {
            start: "2024-02-01".into(),
            end: "2024-02-29".into(),
            today,
        },
    )
    .await;
    assert!(matches!(filtered.view, Some(View::Dashboard(_))));

    let requests = backend.requests();
    let out = dispatch(&mut ws, Action::ResetDateFilter { today }).await;

    let Some(View::Dashboard(_)) = out.view else {
        panic!("expected dashboard, got {:?}", out.view);
    };
    assert_eq!(out.toasts.len(), 1);
    assert_eq!(out.toasts[0].kind, ToastKind::Info);
    assert_eq!(out.toasts[0].message, "Showing all data");
    assert_eq!(backend.requests(), requests);
}
