//! Integration tests for the TokenScan pipeline
//!
//! Real adapters run against local axum servers; handler-level behavior is
//! driven through fake providers and a recording transport.

use async_trait::async_trait;
use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokenscan::{
    AppResult, ChatHandle, ChatTransport, DexScreenerClient, Identifier, IdentifierValidator,
    MarketDataProvider, MarketLookup, MarketSnapshot, MessageRef, PopularityLedger,
    RenderedOutput, RequestHandler, RugcheckClient, SafetyScoreProvider, SafetyTier,
    ScanAggregator, ScanConfig, ScanStatus, ScanTelemetry,
};

const MINT: &str = "So11111111111111111111111111111111111111112";

// ============================================
// Test doubles
// ============================================

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Sent(u64, RenderedOutput),
    Edited(u64, RenderedOutput),
}

#[derive(Default)]
struct RecordingTransport {
    events: Mutex<Vec<Event>>,
    next_id: AtomicU64,
}

impl RecordingTransport {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Text the user ends up seeing for each message id, in send order
    fn final_texts(&self) -> Vec<RenderedOutput> {
        let mut finals: Vec<(u64, RenderedOutput)> = Vec::new();
        for event in self.events() {
            match event {
                Event::Sent(id, out) => finals.push((id, out)),
                Event::Edited(id, out) => {
                    if let Some(slot) = finals.iter_mut().find(|(sent, _)| *sent == id) {
                        slot.1 = out;
                    }
                }
            }
        }
        finals.into_iter().map(|(_, out)| out).collect()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(&self, chat: &ChatHandle, output: &RenderedOutput) -> AppResult<MessageRef> {
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.events
            .lock()
            .unwrap()
            .push(Event::Sent(message_id, output.clone()));
        Ok(MessageRef {
            chat: chat.clone(),
            message_id,
        })
    }

    async fn edit_message(&self, message: &MessageRef, output: &RenderedOutput) -> AppResult<()> {
        self.events
            .lock()
            .unwrap()
            .push(Event::Edited(message.message_id, output.clone()));
        Ok(())
    }
}

enum MarketScript {
    Found,
    NotFound,
    Fail,
    Panic,
    Slow(Duration),
}

struct ScriptedMarket(MarketScript);

#[async_trait]
impl MarketDataProvider for ScriptedMarket {
    fn name(&self) -> &'static str {
        "scripted-market"
    }

    async fn fetch_market(&self, _id: &Identifier, _timeout: Duration) -> AppResult<MarketLookup> {
        match &self.0 {
            MarketScript::Found => Ok(MarketLookup::Found(MarketSnapshot {
                display_name: Some("Example".to_string()),
                symbol: Some("EXM".to_string()),
                price_usd: Some("1.23".to_string()),
                ..Default::default()
            })),
            MarketScript::NotFound => Ok(MarketLookup::NotFound),
            MarketScript::Fail => Err(tokenscan::AppError::provider_error("upstream 503")),
            MarketScript::Panic => panic!("market adapter bug"),
            MarketScript::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(MarketLookup::NotFound)
            }
        }
    }
}

struct FixedSafety(SafetyTier, Duration);

#[async_trait]
impl SafetyScoreProvider for FixedSafety {
    fn name(&self) -> &'static str {
        "fixed-safety"
    }

    async fn fetch_safety(&self, _id: &Identifier, _timeout: Duration) -> SafetyTier {
        tokio::time::sleep(self.1).await;
        self.0
    }
}

/// Sets its flag when the future holding it is dropped
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[derive(Default, Clone)]
struct CallFlags {
    started: Arc<AtomicBool>,
    dropped: Arc<AtomicBool>,
}

impl CallFlags {
    fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

/// Never answers; records that it started and whether it was dropped
struct HangingMarket(CallFlags);

#[async_trait]
impl MarketDataProvider for HangingMarket {
    fn name(&self) -> &'static str {
        "hanging-market"
    }

    async fn fetch_market(&self, _id: &Identifier, _timeout: Duration) -> AppResult<MarketLookup> {
        let _flag = DropFlag(self.0.dropped.clone());
        self.0.started.store(true, Ordering::SeqCst);
        std::future::pending().await
    }
}

struct HangingSafety(CallFlags);

#[async_trait]
impl SafetyScoreProvider for HangingSafety {
    fn name(&self) -> &'static str {
        "hanging-safety"
    }

    async fn fetch_safety(&self, _id: &Identifier, _timeout: Duration) -> SafetyTier {
        let _flag = DropFlag(self.0.dropped.clone());
        self.0.started.store(true, Ordering::SeqCst);
        std::future::pending().await
    }
}

fn handler_with(
    market: impl MarketDataProvider + 'static,
    safety: impl SafetyScoreProvider + 'static,
    config: ScanConfig,
) -> RequestHandler {
    let aggregator = ScanAggregator::from_config(Arc::new(market), Arc::new(safety), &config);
    RequestHandler::new(
        config,
        aggregator,
        Arc::new(PopularityLedger::new()),
        Arc::new(ScanTelemetry::new()),
    )
}

fn fake_handler(script: MarketScript) -> RequestHandler {
    handler_with(
        ScriptedMarket(script),
        FixedSafety(SafetyTier::Safe, Duration::ZERO),
        ScanConfig::default(),
    )
}

fn ident(raw: &str) -> Identifier {
    IdentifierValidator::new(1).validate(raw).unwrap()
}

fn chat() -> ChatHandle {
    ChatHandle("chat-1".to_string())
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn live_handler(dex_base: String, rug_base: String, config: ScanConfig) -> RequestHandler {
    let client = tokenscan::providers::build_http_client().unwrap();
    let market = DexScreenerClient::with_base_url(client.clone(), dex_base);
    let safety = RugcheckClient::with_base_url(client, rug_base, config.risk_thresholds);
    handler_with(market, safety, config)
}

// ============================================
// End to end through the real adapters
// ============================================

#[tokio::test]
async fn test_full_report_from_live_adapters() {
    let dex = serve(Router::new().route(
        "/tokens/:addr",
        get(|Path(addr): Path<String>| async move {
            Json(json!({
                "pairs": [{
                    "baseToken": { "address": addr, "name": "Example", "symbol": "EXM" },
                    "priceUsd": "1.23",
                    "priceChange": { "h24": 4.5 },
                    "liquidity": { "usd": 15000 },
                    "fdv": 900000,
                    "url": "https://dexscreener.com/solana/pair"
                }]
            }))
        }),
    ))
    .await;
    let rug = serve(Router::new().route(
        "/tokens/:mint/report/summary",
        get(|| async { Json(json!({ "score": 200 })) }),
    ))
    .await;

    let handler = live_handler(dex, rug, ScanConfig::default());
    let transport = RecordingTransport::default();
    handler.handle_message(&transport, &chat(), MINT).await.unwrap();

    let events = transport.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], Event::Sent(1, out) if out.text.contains("Scanning")));

    let Event::Edited(1, report) = &events[1] else {
        panic!("expected edit of the placeholder, got {:?}", events[1]);
    };
    for expected in ["Example (EXM)", "$1.23", "$900,000", "$15,000", "+4.5%", "SAFE"] {
        assert!(report.text.contains(expected), "missing {expected} in {}", report.text);
    }
    assert_eq!(report.links.len(), 3);
    assert!(report.links.iter().all(|l| l.url.contains(MINT)));
    assert_eq!(handler.ledger().count(&ident(MINT)), 1);
}

#[tokio::test]
async fn test_zero_pairs_reports_no_liquidity() {
    let dex = serve(Router::new().route(
        "/tokens/:addr",
        get(|| async { Json(json!({ "schemaVersion": "1.0.0", "pairs": [] })) }),
    ))
    .await;
    let rug = serve(Router::new().route(
        "/tokens/:mint/report/summary",
        get(|| async { Json(json!({ "score": 200 })) }),
    ))
    .await;

    let handler = live_handler(dex, rug, ScanConfig::default());
    let transport = RecordingTransport::default();
    let raw = "X".repeat(44);
    handler.handle_message(&transport, &chat(), &raw).await.unwrap();

    let finals = transport.final_texts();
    assert_eq!(finals.len(), 1);
    assert!(finals[0].text.contains("No liquidity"));
    assert!(finals[0].text.contains("XXXXXX...XXXX"));
    assert!(finals[0].links.is_empty());
    assert_eq!(handler.ledger().count(&ident(&raw)), 1);
}

#[tokio::test]
async fn test_safety_failure_still_renders_market_data() {
    let dex = serve(Router::new().route(
        "/tokens/:addr",
        get(|| async {
            Json(json!({ "pairs": [{ "baseToken": { "name": "Example", "symbol": "EXM" }, "priceUsd": "0.5" }] }))
        }),
    ))
    .await;
    let rug = serve(Router::new().route(
        "/tokens/:mint/report/summary",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    ))
    .await;

    let handler = live_handler(dex, rug, ScanConfig::default());
    let reply = handler.scan(MINT).await.unwrap();

    assert_eq!(reply.status, ScanStatus::Found);
    assert!(reply.scan_id.is_some());
    assert_eq!(reply.safety, Some(SafetyTier::Unknown));
    assert!(reply.output.text.contains("UNKNOWN"));
    assert!(reply.output.text.contains("$0.5"));
    assert_eq!(handler.telemetry().snapshot().safety_unknown, 1);
}

#[tokio::test]
async fn test_safety_score_tiers_end_to_end() {
    let dex = serve(Router::new().route(
        "/tokens/:addr",
        get(|| async { Json(json!({ "pairs": [{ "priceUsd": "1" }] })) }),
    ))
    .await;

    for (score, tier) in [
        (200.0, SafetyTier::Safe),
        (1000.0, SafetyTier::Safe),
        (1500.0, SafetyTier::MediumRisk),
        (7500.0, SafetyTier::HighRisk),
    ] {
        let rug = serve(Router::new().route(
            "/tokens/:mint/report/summary",
            get(move || async move { Json(json!({ "score": score })) }),
        ))
        .await;
        let handler = live_handler(dex.clone(), rug, ScanConfig::default());
        let reply = handler.scan(MINT).await.unwrap();
        assert_eq!(reply.safety, Some(tier), "score {score}");
    }
}

// ============================================
// Handler contract
// ============================================

#[tokio::test]
async fn test_rejected_input_is_silent_and_not_counted() {
    let handler = fake_handler(MarketScript::Found);
    let transport = RecordingTransport::default();

    for text in ["gm", "", "   ", "So1111111111111111 1111111111111111111111112"] {
        handler.handle_message(&transport, &chat(), text).await.unwrap();
    }

    assert!(transport.events().is_empty());
    assert!(handler.ledger().is_empty());
    let stats = handler.telemetry().snapshot();
    assert_eq!(stats.rejected, 4);
    assert_eq!(stats.accepted, 0);
}

#[tokio::test]
async fn test_rejection_hint_when_enabled() {
    let config = ScanConfig {
        reply_to_rejects: true,
        ..ScanConfig::default()
    };
    let handler = handler_with(
        ScriptedMarket(MarketScript::Found),
        FixedSafety(SafetyTier::Safe, Duration::ZERO),
        config,
    );
    let transport = RecordingTransport::default();

    handler.handle_message(&transport, &chat(), "hello there").await.unwrap();

    let events = transport.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], Event::Sent(_, out) if out.text.contains("32+")));
    assert!(handler.ledger().is_empty());
}

#[tokio::test]
async fn test_exactly_one_increment_per_accepted_scan() {
    for script in [
        MarketScript::Found,
        MarketScript::NotFound,
        MarketScript::Fail,
        MarketScript::Panic,
    ] {
        let handler = fake_handler(script);
        let transport = RecordingTransport::default();
        handler
            .handle_message(&transport, &chat(), &format!("  {}  ", MINT))
            .await
            .unwrap();

        assert_eq!(handler.ledger().count(&ident(MINT)), 1);
        assert_eq!(handler.ledger().len(), 1);
        assert_eq!(transport.final_texts().len(), 1);
    }
}

#[tokio::test]
async fn test_not_found_and_fetch_failure_read_differently() {
    let not_found = fake_handler(MarketScript::NotFound).scan(MINT).await.unwrap();
    let failed = fake_handler(MarketScript::Fail).scan(MINT).await.unwrap();

    assert_eq!(not_found.status, ScanStatus::NotFound);
    assert_eq!(failed.status, ScanStatus::FetchFailed);
    assert_ne!(not_found.output.text, failed.output.text);
    assert!(not_found.output.links.is_empty());
    assert!(failed.output.links.is_empty());
}

#[tokio::test]
async fn test_panicking_provider_yields_generic_failure() {
    let handler = fake_handler(MarketScript::Panic);
    let transport = RecordingTransport::default();

    handler.handle_message(&transport, &chat(), MINT).await.unwrap();

    let finals = transport.final_texts();
    assert_eq!(finals.len(), 1);
    assert!(finals[0].text.contains("Analysis failed"));
    assert!(finals[0].links.is_empty());

    let stats = handler.telemetry().snapshot();
    assert_eq!(stats.internal_failures, 1);
    assert_eq!(handler.ledger().count(&ident(MINT)), 1);

    let reply = handler.scan(MINT).await.unwrap();
    assert_eq!(reply.status, ScanStatus::InternalError);
    assert_eq!(reply.scan_id, None);

    // handler stays usable after a caught panic
    handler.handle_message(&transport, &chat(), MINT).await.unwrap();
    assert_eq!(handler.ledger().count(&ident(MINT)), 3);
}

#[tokio::test]
async fn test_slow_market_times_out_without_delaying_safety() {
    let config = ScanConfig {
        market_timeout: Duration::from_millis(100),
        safety_timeout: Duration::from_millis(500),
        ..ScanConfig::default()
    };
    let handler = handler_with(
        ScriptedMarket(MarketScript::Slow(Duration::from_secs(5))),
        FixedSafety(SafetyTier::HighRisk, Duration::from_millis(20)),
        config,
    );

    let start = Instant::now();
    let reply = handler.scan(MINT).await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(reply.status, ScanStatus::FetchFailed);
    assert_eq!(reply.safety, Some(SafetyTier::HighRisk));
    assert!(reply.output.text.contains("unavailable"));
}

#[tokio::test]
async fn test_slow_safety_times_out_to_unknown() {
    let config = ScanConfig {
        safety_timeout: Duration::from_millis(100),
        ..ScanConfig::default()
    };
    let handler = handler_with(
        ScriptedMarket(MarketScript::Found),
        FixedSafety(SafetyTier::Safe, Duration::from_secs(5)),
        config,
    );

    let start = Instant::now();
    let reply = handler.scan(MINT).await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(reply.status, ScanStatus::Found);
    assert_eq!(reply.safety, Some(SafetyTier::Unknown));
    assert_eq!(reply.output.links.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_scans_lose_no_updates() {
    let handler = Arc::new(fake_handler(MarketScript::Found));
    let transport = Arc::new(RecordingTransport::default());
    let ids: Vec<String> = (0..5).map(|i| format!("{}{}", i, "A".repeat(40))).collect();

    let mut tasks = Vec::new();
    for round in 0..20 {
        for id in &ids {
            let handler = handler.clone();
            let transport = transport.clone();
            let text = id.clone();
            tasks.push(tokio::spawn(async move {
                let chat = ChatHandle(format!("chat-{}", round));
                handler
                    .handle_message(transport.as_ref(), &chat, &text)
                    .await
                    .unwrap();
            }));
        }
    }
    for task in tasks {
        task.await.unwrap();
    }

    for id in &ids {
        assert_eq!(handler.ledger().count(&ident(id)), 20);
    }
    assert_eq!(transport.final_texts().len(), 100);
    assert_eq!(handler.telemetry().snapshot().accepted, 100);
}

#[tokio::test]
async fn test_abandoned_request_cancels_provider_calls() {
    let market_flags = CallFlags::default();
    let safety_flags = CallFlags::default();
    let handler = handler_with(
        HangingMarket(market_flags.clone()),
        HangingSafety(safety_flags.clone()),
        ScanConfig::default(),
    );
    let transport = RecordingTransport::default();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(100),
        handler.handle_message(&transport, &chat(), MINT),
    )
    .await;
    assert!(abandoned.is_err());

    assert!(market_flags.started() && safety_flags.started());
    assert!(market_flags.dropped(), "market call outlived its request");
    assert!(safety_flags.dropped(), "safety call outlived its request");

    assert_eq!(handler.ledger().count(&ident(MINT)), 1);
    let events = transport.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], Event::Sent(_, out) if out.text.contains("Scanning")));
}

// ============================================
// Commands
// ============================================

#[tokio::test]
async fn test_top_command_ranks_by_count_then_first_seen() {
    let handler = fake_handler(MarketScript::NotFound);
    let transport = RecordingTransport::default();
    let [a, b, c, d] = ["A", "B", "C", "D"].map(|p| format!("{}{}", p, "1".repeat(40)));

    // A:3, B:3 (recorded after A), C:1, D:2
    for text in [&a, &b, &a, &d, &b, &c, &a, &b, &d] {
        handler.handle_message(&transport, &chat(), text).await.unwrap();
    }

    let top = handler.top(Some(3));
    let ranked: Vec<(String, u64)> = top
        .iter()
        .map(|e| (e.identifier.as_str().to_string(), e.count))
        .collect();
    assert_eq!(ranked, vec![(a.clone(), 3), (b.clone(), 3), (d.clone(), 2)]);

    let before = transport.events().len();
    handler.handle_message(&transport, &chat(), "/top 3").await.unwrap();
    let events = transport.events();
    assert_eq!(events.len(), before + 1);
    let Event::Sent(_, out) = &events[before] else {
        panic!("expected a new message");
    };
    assert!(out.text.contains("1. `A11111...1111` - 3 scans"));
    assert!(out.text.contains("3. `D11111...1111` - 2 scans"));
    assert!(!out.text.contains("C11111"));
}

#[tokio::test]
async fn test_commands_do_not_touch_the_ledger() {
    let handler = fake_handler(MarketScript::Found);
    let transport = RecordingTransport::default();

    handler.handle_message(&transport, &chat(), "/top").await.unwrap();
    handler.handle_message(&transport, &chat(), "/start").await.unwrap();
    handler.handle_message(&transport, &chat(), "/unknown").await.unwrap();

    let finals = transport.final_texts();
    assert_eq!(finals.len(), 2);
    assert!(finals[0].text.contains("No tokens scanned yet"));
    assert!(finals[1].text.contains("Welcome"));
    assert!(handler.ledger().is_empty());
    assert_eq!(handler.telemetry().snapshot().total_messages, 0);
}

#[tokio::test]
async fn test_top_n_is_clamped() {
    let handler = fake_handler(MarketScript::NotFound);
    for i in 0..60 {
        handler.scan(&format!("{:0>40}", i)).await.unwrap();
    }

    assert_eq!(handler.top(None).len(), 10);
    assert_eq!(handler.top(Some(0)).len(), 1);
    assert_eq!(handler.top(Some(1000)).len(), 50);
}
