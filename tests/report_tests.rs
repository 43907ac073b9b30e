mod common;

use chrono::NaiveDate;

use common::FixtureLauncher;
use profile_finder::{
    BrowserConfig, HtmlReport, KnowledgePanel, PdfReport, ProfileQuery, ProfileRecord,
    ReferenceSummary, ReportError, ReportRenderer, SnippetList,
};

fn record() -> ProfileRecord {
    let query = ProfileQuery::new("Grace Hopper").unwrap();
    ProfileRecord::new(
        &query,
        SnippetList::new(vec![
            "Grace Hopper was a pioneer of computer programming.".to_string(),
            "She invented one of the first linkers.".to_string(),
        ]),
        KnowledgePanel {
            title: Some("Grace Hopper".to_string()),
            subtitle: Some("American computer scientist".to_string()),
            description: None,
            born: Some("December 9, 1906".to_string()),
        },
        ReferenceSummary {
            extract: "Grace Brewster Hopper was an American computer scientist.".to_string(),
            title: "Grace Hopper".to_string(),
            thumbnail: None,
        },
    )
}

#[tokio::test]
async fn html_report_through_renderer_trait() {
    let renderer = HtmlReport::with_date(NaiveDate::from_ymd_opt(2024, 12, 9).unwrap());
    assert_eq!(renderer.content_type(), "text/html; charset=utf-8");

    let html = String::from_utf8(renderer.render(&record()).await.unwrap()).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Generated: December 9, 2024"));
    assert!(html.contains("<h2>Overview</h2>"));
    assert!(!html.contains("<h2>Profile Summary</h2>"));
    assert_eq!(html.matches("<li>").count(), 2);
}

#[tokio::test]
async fn pdf_report_prints_the_html_and_releases_the_session() {
    let launcher = FixtureLauncher::serving("<html></html>");
    let date = NaiveDate::from_ymd_opt(2024, 12, 9).unwrap();
    let renderer = PdfReport::new(launcher.clone(), BrowserConfig::default())
        .with_html(HtmlReport::with_date(date));

    let bytes = renderer.render(&record()).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    let body = String::from_utf8_lossy(&bytes);
    assert!(body.contains("<h1>Grace Hopper</h1>"));

    assert_eq!(renderer.content_type(), "application/pdf");
    assert_eq!(launcher.counters.acquired(), 1);
    assert_eq!(launcher.counters.released(), 1);
    assert_eq!(launcher.counters.pages_closed(), 1);
    assert!(launcher.counters.navigated().is_empty());
}

#[tokio::test]
async fn pdf_report_surfaces_session_start_failure() {
    let renderer = PdfReport::new(FixtureLauncher::unlaunchable(), BrowserConfig::default());
    let err = renderer.render(&record()).await.unwrap_err();
    assert!(matches!(err, ReportError::SessionStart(_)));
}
