//! Stress test: drives concurrent `/chat` traffic at a running gateway.
//! Simulates a busy launch day: 10 concurrent visitors, 5 messages each, mixing
//! intent shortcuts with model questions. Reports success, rate-limited and failed counts.
//! Run with gateway up: cargo run --bin stress_test [-- http://127.0.0.1:3000]

use reqwest::Client;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
const CONCURRENT_VISITORS: usize = 10;
const REQUESTS_PER_VISITOR: usize = 5;

const MESSAGES: &[&str] = &[
    "Can we book a call next week?",
    "What is your email?",
    "How much does a chatbot cost?",
    "What services do you provide?",
    "Which industries do you support?",
    "Tell me about your business analysis work.",
    "What is your mission?",
    "Who is behind Spitfox?",
    "Θέλω ραντεβού",
    "Do you use Agile?",
];

/// A visitor task that panicked counts as one failure.
fn record_join(result: Result<(), tokio::task::JoinError>, failure: &AtomicU32) {
    if let Err(e) = result {
        eprintln!("[STRESS TEST] Visitor task failed: {}", e);
        failure.fetch_add(1, Ordering::Relaxed);
    }
}

#[tokio::main]
async fn main() {
    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    println!(
        "[STRESS TEST] Starting: {} visitors × {} requests = {} total",
        CONCURRENT_VISITORS,
        REQUESTS_PER_VISITOR,
        CONCURRENT_VISITORS * REQUESTS_PER_VISITOR
    );
    println!("[STRESS TEST] Target: {} (ensure gateway is running)", base_url);

    let success = Arc::new(AtomicU32::new(0));
    let limited = Arc::new(AtomicU32::new(0));
    let failure = Arc::new(AtomicU32::new(0));
    let latencies: Arc<RwLock<Vec<u64>>> = Arc::new(RwLock::new(Vec::new()));

    let client = Client::new();

    let mut handles = Vec::new();
    for visitor_id in 0..CONCURRENT_VISITORS {
        let client = client.clone();
        let base_url = base_url.clone();
        let success = Arc::clone(&success);
        let limited = Arc::clone(&limited);
        let failure = Arc::clone(&failure);
        let latencies = Arc::clone(&latencies);

        let h = tokio::spawn(async move {
            for r in 0..REQUESTS_PER_VISITOR {
                let m_idx = (visitor_id + r) % MESSAGES.len();
                let body = json!({ "message": MESSAGES[m_idx] });

                let start = Instant::now();
                let res = client
                    .post(format!("{}/chat", base_url))
                    .header("x-session-id", format!("stress-{}", visitor_id))
                    .json(&body)
                    .send()
                    .await;
                let elapsed_ms = start.elapsed().as_millis() as u64;

                match res {
                    Ok(resp) if resp.status().is_success() => {
                        success.fetch_add(1, Ordering::Relaxed);
                        latencies.write().await.push(elapsed_ms);
                    }
                    Ok(resp) if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                        limited.fetch_add(1, Ordering::Relaxed);
                    }
                    _ => {
                        failure.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        });
        handles.push(h);
    }

    for h in handles {
        record_join(h.await, &failure);
    }

    let s = success.load(Ordering::Relaxed);
    let l = limited.load(Ordering::Relaxed);
    let f = failure.load(Ordering::Relaxed);
    let total = s + l + f;
    let success_rate = if total > 0 { (s as f64 / total as f64) * 100.0 } else { 0.0 };
    let latencies_guard = latencies.read().await;
    let avg_latency_ms = if latencies_guard.is_empty() {
        0.0
    } else {
        latencies_guard.iter().sum::<u64>() as f64 / latencies_guard.len() as f64
    };

    println!(
        "[STRESS TEST] Success rate: {:.1}% | Average Latency: {:.0}ms",
        success_rate, avg_latency_ms
    );
    println!(
        "[STRESS TEST] Total: {} | Success: {} | Rate-limited: {} | Failure: {}",
        total, s, l, f
    );
    println!("[STRESS TEST] From one address the hardened profile admits 10 requests per 30s; expect 429s beyond that.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panicked_visitor_counts_as_failure() {
        let failure = AtomicU32::new(0);
        record_join(tokio::spawn(async { panic!("visitor crashed") }).await, &failure);
        record_join(tokio::spawn(async {}).await, &failure);
        assert_eq!(failure.load(Ordering::Relaxed), 1);
    }
}
