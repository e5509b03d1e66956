//! The periodic tasks AthenaCore runs.
//!
//! | id | interval |
//! |---|---|
//! | `llm-summary` | 60 s |
//! | `memory-store` | 5 s |
//! | `trading-balance` | 30 s |
//! | `lilith-pattern` | 15 s |
//! | `lilith-decision` | 30 s |
//! | `dreamscape-consciousness` | 10 s |
//! | `dreamscape-pattern` | 20 s |
//! | `dreamscape-lilith-integration` | 30 s |
//! | `llm-to-trade` | 120 s |
//!
//! Lilith tasks are skipped when Lilith is disabled, Dreamscape tasks when
//! Dreamscape is disabled, and the integration task unless both are enabled.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use athena_core::Config;
use athena_llm::{GenerateRequest, LlmClient};
use athena_taskmatrix::{HeartbeatTracker, TaskDescriptor, TaskMatrix};

use crate::dreamscape::{DreamContext, DreamData, Dreamscape};
use crate::lilith::{Lilith, MarketContext, MarketData};
use crate::memory::Memory;
use crate::trading::Trading;

const MARKET: &str = "BTC/USD";
const LLM_MAX_TOKENS: u32 = 100;

/// Collaborators the task handlers capture.
#[derive(Clone)]
pub struct TaskContext {
    pub llm: LlmClient,
    pub lilith: Arc<dyn Lilith>,
    pub dreamscape: Arc<dyn Dreamscape>,
    pub memory: Arc<dyn Memory>,
    pub trading: Arc<dyn Trading>,
    pub heartbeat: HeartbeatTracker,
}

/// Register every task enabled by `config`. Returns how many were registered.
pub fn register_all(matrix: &TaskMatrix, ctx: &TaskContext, config: &Config) -> anyhow::Result<usize> {
    let lilith_on = config.lilith.enabled;
    let dreamscape_on = config.dreamscape.enabled;

    let tasks = [
        (true, llm_summary(ctx.llm.clone())),
        (true, memory_store(Arc::clone(&ctx.memory), ctx.heartbeat.clone())),
        (true, trading_balance(Arc::clone(&ctx.trading))),
        (lilith_on, lilith_pattern(Arc::clone(&ctx.lilith))),
        (lilith_on, lilith_decision(Arc::clone(&ctx.lilith))),
        (dreamscape_on, dreamscape_consciousness(Arc::clone(&ctx.dreamscape))),
        (dreamscape_on, dreamscape_pattern(Arc::clone(&ctx.dreamscape))),
        (
            lilith_on && dreamscape_on,
            dreamscape_lilith_integration(Arc::clone(&ctx.lilith), Arc::clone(&ctx.dreamscape)),
        ),
        (true, llm_to_trade(ctx.llm.clone())),
    ];

    let mut registered = 0;
    for (enabled, task) in tasks {
        let task = task.context("invalid task definition")?;
        if !enabled {
            info!(task_id = %task.id(), "module disabled, task not registered");
            continue;
        }
        let id = task.id().to_string();
        matrix
            .register_task(task)
            .with_context(|| format!("failed to register task '{}'", id))?;
        registered += 1;
    }
    Ok(registered)
}

fn sample_market_data() -> MarketData {
    MarketData {
        symbol: MARKET.into(),
        price: 50_000.0,
        volume: 1_000.0,
        timestamp: Utc::now(),
    }
}

fn sample_dream() -> DreamData {
    DreamData {
        symbols: vec!["light".into(), "water".into(), "mountain".into()],
        emotions: vec!["peace".into(), "clarity".into()],
        context: DreamContext {
            environment: "lucid".into(),
            time_of_day: "night".into(),
            emotional_state: "peaceful".into(),
        },
        timestamp: Utc::now(),
    }
}

fn llm_summary(llm: LlmClient) -> athena_taskmatrix::Result<TaskDescriptor> {
    TaskDescriptor::builder("llm-summary")
        .name("Market News Summary")
        .description("Generate summary of market news")
        .interval(Duration::from_secs(60))
        .handler(move || {
            let llm = llm.clone();
            async move {
                let response = llm
                    .generate(
                        GenerateRequest::new("Summarize the latest market news").max_tokens(LLM_MAX_TOKENS),
                    )
                    .await
                    .context("market summary generation failed")?;
                info!(summary = %response.content, "market summary");
                Ok(())
            }
        })
        .build()
}

fn memory_store(memory: Arc<dyn Memory>, heartbeat: HeartbeatTracker) -> athena_taskmatrix::Result<TaskDescriptor> {
    TaskDescriptor::builder("memory-store")
        .name("Memory Update")
        .description("Update memory with last heartbeat")
        .interval(Duration::from_secs(5))
        .handler(move || {
            let memory = Arc::clone(&memory);
            let last_heartbeat = heartbeat.last_heartbeat();
            async move {
                memory.store_heartbeat(last_heartbeat).await?;
                Ok(())
            }
        })
        .build()
}

fn trading_balance(trading: Arc<dyn Trading>) -> athena_taskmatrix::Result<TaskDescriptor> {
    TaskDescriptor::builder("trading-balance")
        .name("Trading Balance Check")
        .description("Check and log trading balance")
        .interval(Duration::from_secs(30))
        .handler(move || {
            let trading = Arc::clone(&trading);
            async move {
                if let Some(balances) = trading.balances().await? {
                    info!(?balances, "trading balance");
                }
                Ok(())
            }
        })
        .build()
}

fn lilith_pattern(lilith: Arc<dyn Lilith>) -> athena_taskmatrix::Result<TaskDescriptor> {
    TaskDescriptor::builder("lilith-pattern")
        .name("Pattern Recognition")
        .description("Recognize market patterns using Lilith")
        .interval(Duration::from_secs(15))
        .handler(move || {
            let lilith = Arc::clone(&lilith);
            async move {
                let patterns = lilith.recognize_pattern(&sample_market_data()).await?;
                info!(count = patterns.len(), ?patterns, "recognized patterns");
                Ok(())
            }
        })
        .build()
}

fn lilith_decision(lilith: Arc<dyn Lilith>) -> athena_taskmatrix::Result<TaskDescriptor> {
    TaskDescriptor::builder("lilith-decision")
        .name("Autonomous Decision")
        .description("Make trading decisions using Lilith")
        .interval(Duration::from_secs(30))
        .handler(move || {
            let lilith = Arc::clone(&lilith);
            async move {
                let context = MarketContext {
                    market: MARKET.into(),
                    data: sample_market_data(),
                    patterns: lilith.patterns().await?,
                };
                let decision = lilith.make_decision(&context).await?;
                info!(
                    market = %decision.market,
                    action = ?decision.action,
                    confidence = decision.confidence,
                    "Lilith decision"
                );
                Ok(())
            }
        })
        .build()
}

fn dreamscape_consciousness(dreamscape: Arc<dyn Dreamscape>) -> athena_taskmatrix::Result<TaskDescriptor> {
    TaskDescriptor::builder("dreamscape-consciousness")
        .name("Consciousness Mapping")
        .description("Map consciousness state using Dreamscape")
        .interval(Duration::from_secs(10))
        .handler(move || {
            let dreamscape = Arc::clone(&dreamscape);
            async move {
                let state = dreamscape.map_consciousness().await?;
                info!(?state, "consciousness state");
                Ok(())
            }
        })
        .build()
}

fn dreamscape_pattern(dreamscape: Arc<dyn Dreamscape>) -> athena_taskmatrix::Result<TaskDescriptor> {
    TaskDescriptor::builder("dreamscape-pattern")
        .name("Dream Pattern Recognition")
        .description("Recognize dream patterns using Dreamscape")
        .interval(Duration::from_secs(20))
        .handler(move || {
            let dreamscape = Arc::clone(&dreamscape);
            async move {
                let patterns = dreamscape.recognize_dream_pattern(&sample_dream()).await?;
                info!(count = patterns.len(), "dream patterns");
                Ok(())
            }
        })
        .build()
}

fn dreamscape_lilith_integration(
    lilith: Arc<dyn Lilith>,
    dreamscape: Arc<dyn Dreamscape>,
) -> athena_taskmatrix::Result<TaskDescriptor> {
    TaskDescriptor::builder("dreamscape-lilith-integration")
        .name("Dream-Lilith Integration")
        .description("Integrate dream patterns with Lilith")
        .interval(Duration::from_secs(30))
        .handler(move || {
            let lilith = Arc::clone(&lilith);
            let dreamscape = Arc::clone(&dreamscape);
            async move {
                let patterns = lilith.patterns().await?;
                dreamscape.integrate_with_lilith(&patterns).await?;
                info!(patterns = patterns.len(), "dream-Lilith integration complete");
                Ok(())
            }
        })
        .build()
}

fn llm_to_trade(llm: LlmClient) -> athena_taskmatrix::Result<TaskDescriptor> {
    TaskDescriptor::builder("llm-to-trade")
        .name("LLM Trading Decision")
        .description("Use LLM to decide on trading actions")
        .interval(Duration::from_secs(120))
        .handler(move || {
            let llm = llm.clone();
            async move {
                let prompt = format!(
                    "Analyze current market conditions and decide whether to buy or sell {}",
                    MARKET
                );
                let response = llm
                    .generate(GenerateRequest::new(prompt).max_tokens(LLM_MAX_TOKENS))
                    .await
                    .context("trading decision generation failed")?;
                info!(decision = %response.content, "LLM trading decision");
                Ok(())
            }
        })
        .build()
}
