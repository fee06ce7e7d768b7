//! Detector set and aggregator over simulated traffic.

use txsentry::alert::{AlertDetails, AlertType, Severity, Status};
use txsentry::analysis::{analyze_traffic, TrafficAnalyzer};
use txsentry::config::DetectorsConfig;
use txsentry::detectors::{standard_detectors, Detector, DetectorError};
use txsentry::events::TrafficRecord;
use txsentry::Alert;

const BASE: f64 = 1_700_000_000.0;

/// 100 requests over 60 s from 50 terminals.
fn normal_traffic() -> Vec<TrafficRecord> {
    (0..100)
        .map(|i| {
            TrafficRecord::new(
                BASE + i as f64 * 0.6,
                format!("10.0.0.{}", i % 50 + 1),
                format!("TERM{:04}", i % 50),
                50.0 + (i % 30) as f64,
                200,
            )
        })
        .collect()
}

/// 500 requests in 5 s from one source; the last 200 fail with 503.
fn flood() -> Vec<TrafficRecord> {
    (0..500)
        .map(|i| {
            TrafficRecord::new(
                BASE + 30.0 + i as f64 * 0.01,
                "192.168.1.100",
                "FAKE0001",
                100.0 + i as f64 * 2.0,
                if i < 300 { 200 } else { 503 },
            )
        })
        .collect()
}

fn of_type(alerts: &[Alert], t: AlertType) -> Vec<&Alert> {
    alerts.iter().filter(|a| a.alert_type() == t).collect()
}

#[test]
fn baseline_is_normal() {
    let report = analyze_traffic(&DetectorsConfig::default(), &normal_traffic());
    assert_eq!(report.status, Status::Normal);
    assert!(report.alerts.is_empty());
    assert_eq!(report.summary.total, 0);
    assert_eq!(report.total_requests, 100);
    assert_eq!(report.unique_sources, 50);
    assert_eq!(report.unique_terminals, 50);
    assert!(!report.is_degraded());
}

#[test]
fn empty_traffic_is_normal() {
    let report = TrafficAnalyzer::new(&DetectorsConfig::default()).analyze();
    assert_eq!(report.status, Status::Normal);
    assert!(report.alerts.is_empty());
    assert!(report.degraded.is_empty());
}

#[test]
fn flood_is_detected_as_attack() {
    let mut analyzer = TrafficAnalyzer::new(&DetectorsConfig::default());
    analyzer.extend(normal_traffic());
    analyzer.extend(flood());
    let report = analyzer.analyze();

    assert_eq!(report.status, Status::AttackDetected);
    assert_eq!(report.total_requests, 600);
    assert_eq!(report.unique_sources, 51);
    assert_eq!(report.unique_terminals, 51);

    let bursts = of_type(&report.alerts, AlertType::BurstDetected);
    assert_eq!(bursts.len(), 1);
    assert_eq!(bursts[0].severity(), Severity::Critical);
    match bursts[0].details {
        AlertDetails::BurstDetected {
            count,
            window_seconds,
            ..
        } => {
            assert!(count >= 500);
            assert_eq!(window_seconds, 5.0);
        }
        _ => unreachable!(),
    }

    // 200 of 600 requests failed
    let spikes = of_type(&report.alerts, AlertType::ErrorSpike);
    assert_eq!(spikes.len(), 1);
    match spikes[0].details {
        AlertDetails::ErrorSpike {
            error_count,
            error_rate,
            threshold,
        } => {
            assert_eq!(error_count, 200);
            assert!((error_rate - 1.0 / 3.0).abs() < 1e-9);
            assert_eq!(threshold, 0.3);
        }
        _ => unreachable!(),
    }

    // 49 slow requests out of 600 stay under the 10% bar
    assert!(of_type(&report.alerts, AlertType::HighLatency).is_empty());
    assert_eq!(report.summary.total, report.alerts.len());
    assert!(report.summary.critical >= 2);
}

#[test]
fn error_rate_uses_all_traffic() {
    let config = DetectorsConfig::default();

    // 200 errors in a 500-request burst is 40% locally, but diluted by 300
    // normal requests it is 25% overall.
    let mut traffic = flood();
    traffic.extend(normal_traffic());
    traffic.extend(normal_traffic().into_iter().map(|mut r| {
        r.timestamp += 120.0;
        r
    }));
    traffic.extend(normal_traffic().into_iter().map(|mut r| {
        r.timestamp += 240.0;
        r
    }));
    let report = analyze_traffic(&config, &traffic);
    assert_eq!(report.total_requests, 800);
    assert!(of_type(&report.alerts, AlertType::ErrorSpike).is_empty());
}

#[test]
fn rate_violation_reported_once_per_second() {
    let traffic: Vec<TrafficRecord> = (0..150)
        .map(|i| TrafficRecord::new(BASE + 7.0 + i as f64 * 0.005, "S", "T1", 20.0, 200))
        .collect();
    let report = analyze_traffic(&DetectorsConfig::default(), &traffic);

    assert_eq!(report.alerts.len(), 1);
    assert_eq!(
        report.alerts[0].details,
        AlertDetails::RateLimitExceeded {
            source: "S".into(),
            rate: 150,
            limit: 100,
            timestamp: (BASE + 7.0) as i64,
        }
    );
    assert_eq!(report.status, Status::Suspicious);
    assert_eq!(report.summary.high, 1);
}

#[test]
fn invalid_threshold_degrades_one_detector_only() {
    let config = DetectorsConfig {
        error_rate_threshold: 1.5,
        ..DetectorsConfig::default()
    };
    let mut traffic = normal_traffic();
    traffic.extend(flood());
    let report = analyze_traffic(&config, &traffic);

    assert_eq!(report.degraded.len(), 1);
    assert_eq!(report.degraded[0].detector, "error_spike");
    assert!(of_type(&report.alerts, AlertType::ErrorSpike).is_empty());
    assert_eq!(of_type(&report.alerts, AlertType::BurstDetected).len(), 1);
    assert_eq!(report.status, Status::AttackDetected);
}

struct Exploding;

impl Detector for Exploding {
    fn name(&self) -> &'static str {
        "exploding"
    }

    fn detect(&self, _traffic: &[TrafficRecord]) -> Result<Vec<Alert>, DetectorError> {
        panic!("boom")
    }
}

#[test]
fn panicking_detector_is_isolated() {
    let mut detectors: Vec<Box<dyn Detector>> = vec![Box::new(Exploding)];
    detectors.extend(standard_detectors(&DetectorsConfig::default()));
    let mut analyzer = TrafficAnalyzer::with_detectors(detectors);
    analyzer.extend(normal_traffic());
    analyzer.extend(flood());

    let report = analyzer.analyze();
    assert_eq!(report.degraded.len(), 1);
    assert_eq!(report.degraded[0].detector, "exploding");
    assert!(report.degraded[0].reason.contains("boom"));
    assert_eq!(report.status, Status::AttackDetected);
}

#[test]
fn retain_since_prunes_old_traffic() {
    let mut analyzer = TrafficAnalyzer::new(&DetectorsConfig::default());
    analyzer.extend(normal_traffic());
    let removed = analyzer.retain_since(BASE + 29.7);
    assert_eq!(removed, 50);
    assert_eq!(analyzer.len(), 50);
}

#[test]
fn report_serializes_with_upper_case_enums() {
    let mut traffic = normal_traffic();
    traffic.extend(flood());
    let report = analyze_traffic(&DetectorsConfig::default(), &traffic);
    let v = serde_json::to_value(&report).unwrap();
    assert_eq!(v["status"], "ATTACK_DETECTED");
    assert!(v["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .any(|a| a["type"] == "BURST_DETECTED" && a["severity"] == "CRITICAL"));
    assert!(v.get("degraded").is_none());
}
