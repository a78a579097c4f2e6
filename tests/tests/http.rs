mod utils;
#[allow(unused)]
use utils::*;

use fire_bench::prelude::*;
use fire_bench::run_concurrency;
use std::time::Duration;

fn request(url: String) -> RunRequest {
    RunRequest::new(url)
        .pacing(PacingMode::Burst)
        .duration(Duration::from_secs(1))
}

#[tracing_test::traced_test]
#[tokio::test]
#[ntest::timeout(10_000)]
async fn levels_are_reported_in_order() {
    let base = mock_service().await;

    let report = Benchmark::new(request(format!("{base}/delay/ms/1")))
        .levels([1, 5])
        .await
        .unwrap();

    assert_eq!(report.levels(), vec![1, 5]);
    for row in &report {
        assert_eq!(row.total_errors, 0);
        assert_eq!(row.error_rate, 0.);
        assert!(row.latency.unwrap().p50 >= 1.);
    }
    assert!(report[1].successful_requests > report[0].successful_requests);
    assert!(logs_contain("Benchmark complete"));
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn refused_target_counts_only_errors() {
    init();
    let addr = refused_addr().await;

    let request = RunRequest::new(format!("http://{addr}/"))
        .pacing(PacingMode::Exponential)
        .avg_jitter(Duration::from_millis(10))
        .duration(Duration::from_secs(1));
    let report = Benchmark::new(request).levels([2]).await.unwrap();

    let row = &report[0];
    assert_eq!(row.successful_requests, 0);
    assert!(row.total_errors > 0);
    assert_eq!(row.error_rate, 1.);
    assert!(row.latency.is_none());

    let json = serde_json::to_value(&report).unwrap();
    assert!(json[0].get("latency").is_none());
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn server_errors_are_successes() {
    let base = mock_service().await;

    let report = Benchmark::new(request(format!("{base}/status/503")))
        .levels([2])
        .await
        .unwrap();

    assert!(report[0].successful_requests > 0);
    assert_eq!(report[0].total_errors, 0);
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn post_with_body_and_headers() {
    let base = mock_service().await;

    let request = request(format!("{base}/echo"))
        .method(HttpMethod::Post)
        .header("Content-Type", "application/json")
        .body(r#"{"hello":"world"}"#);
    let report = Benchmark::new(request).levels([3]).await.unwrap();

    assert!(report[0].successful_requests > 0);
    assert_eq!(report[0].error_rate, 0.);
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn slow_target_bounds_throughput() {
    let base = mock_service().await;

    let result = run_concurrency(&request(format!("{base}/delay/ms/20")), 4)
        .await
        .unwrap();

    assert!(result.successful_requests <= 4 * 51, "{result}");
    assert!(result.successful_requests >= 4 * 20, "{result}");
    assert!(result.elapsed >= Duration::from_secs(1));
    assert!(result.latency.unwrap().p50 >= 20.);
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn report_serializes_as_rows() {
    let base = mock_service().await;

    let report = Benchmark::new(request(format!("{base}/delay/ms/1")))
        .levels([1])
        .await
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["concurrency"], 1);
    assert_eq!(rows[0]["duration"], 1);
    assert!(rows[0]["latency"]["p99"].as_f64().unwrap() >= 1.);
}

#[cfg(feature = "integration")]
mod integration {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    #[ntest::timeout(120_000)]
    async fn rate_limited_target_saturates() {
        let base = mock_service().await;

        let request = RunRequest::new(format!("{base}/limited/200/delay/ms/1/server/saturate"))
            .pacing(PacingMode::Uniform)
            .avg_jitter(Duration::from_millis(2))
            .duration(Duration::from_secs(10));
        let report = Benchmark::new(request).levels([1, 10, 50]).await.unwrap();

        assert!(dbg!(report[2].throughput()) <= 230.);
        assert!(report[2].latency.unwrap().p99 > report[0].latency.unwrap().p99);
    }

    #[tokio::test(flavor = "multi_thread")]
    #[ntest::timeout(120_000)]
    async fn exponential_pacing_spreads_requests() {
        let base = mock_service().await;

        let request = RunRequest::new(format!("{base}/delay/ms/0"))
            .pacing(PacingMode::Exponential)
            .avg_jitter(Duration::from_millis(50))
            .duration(Duration::from_secs(10));
        let report = Benchmark::new(request).levels([4]).await.unwrap();

        // Roughly 4 workers × 10s / 50ms.
        let total = report[0].total();
        assert!((600..=900).contains(&total), "total={total}");
    }
}
