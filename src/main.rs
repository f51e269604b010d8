//! Headless animation driver.
//!
//! Animates a few in-memory nodes through a staggered entrance, a chained
//! colour/filter pass and a pause, stepping a manual clock at the configured
//! frame interval and logging lifecycle events as they arrive.
//!
//! Run with: `RUST_LOG=rune_motion=debug cargo run`

use anyhow::{Result, bail};
use rune_config::RuneConfig;
use rune_motion::{
    AnimationVars, ManualClock, MemoryNode, MotionEvent, NodeHandle, SchedulerContext, Stagger,
};

/// Upper bound when `demo.frames` is not configured.
const MAX_FRAMES: u32 = 600;

fn main() -> Result<()> {
    let config = RuneConfig::load();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.demo.log_filter.as_str()),
    )
    .init();

    log::info!(
        "motion defaults: {}s, {}, stagger {}s, frame {:.2}ms",
        config.motion.default_duration_s,
        config.motion.default_easing,
        config.motion.stagger_step_s,
        config.motion.frame_interval_ms
    );

    if !(config.motion.frame_interval_ms > 0.0) {
        bail!(
            "frame interval must be positive, got {}ms",
            config.motion.frame_interval_ms
        );
    }

    let clock = ManualClock::new();
    let mut ctx = SchedulerContext::with_config(Box::new(clock.clone()), &config.motion);

    let cards: Vec<_> = (0..3)
        .map(|i| {
            MemoryNode::new(format!("card-{i}"))
                .with_property("opacity", "1")
                .with_property("transform", "translateY(0px) rotate(0deg)")
                .with_property("background", "#1e293b")
                .shared()
        })
        .collect();
    let handles: Vec<NodeHandle> = cards.iter().map(|c| c.clone() as NodeHandle).collect();

    ctx.select(handles.clone())
        .from(
            AnimationVars::new()
                .set("y", 40.0)
                .set("o", 0.0)
                .duration(0.4)
                .ease("easeOutBack")
                .stagger(Stagger::Step)
                .id("enter"),
        )
        .to(AnimationVars::new()
            .set("bg", "#38bdf8")
            .set("blur", 2.0)
            .set("rotate", "+=15")
            .duration(0.6)
            .easing("spring(1, 120, 12, 0)")
            .id("highlight")
            .on_complete(|node| {
                if let Ok(node) = node.try_borrow() {
                    log::info!("highlight done, filter = {:?}", node.get_property("filter"));
                }
            }));

    let frames = config.demo.frames.unwrap_or(MAX_FRAMES);
    let mut paused = false;
    let mut resumed = false;
    for frame in 0..frames {
        ctx.tick();
        for event in ctx.drain_events() {
            log::info!("frame {frame}: {}", describe(&event));
        }

        let now = ctx.now();
        if !paused && now >= 500.0 {
            ctx.select(handles.clone()).pause(Some("highlight"));
            paused = true;
        } else if paused && !resumed && now >= 700.0 {
            ctx.select(handles.clone()).resume(Some("highlight"));
            resumed = true;
        }

        if ctx.is_idle() {
            log::info!("all queues drained after {} frames", frame + 1);
            break;
        }
        clock.advance(config.motion.frame_interval_ms);
    }

    if !ctx.is_idle() {
        log::warn!("stopped after {frames} frames with animations still running");
    }

    for card in &cards {
        let card = card.borrow();
        println!("{}:", card.label());
        for (name, value) in card.properties() {
            println!("  {name}: {value}");
        }
    }
    Ok(())
}

fn describe(event: &MotionEvent) -> String {
    let kind = match event {
        MotionEvent::Launched { .. } => "launched",
        MotionEvent::Started { .. } => "started",
        MotionEvent::Paused { .. } => "paused",
        MotionEvent::Resumed { .. } => "resumed",
        MotionEvent::Completed { .. } => "completed",
        MotionEvent::Stopped { .. } => "stopped",
    };
    format!(
        "{} {} {kind} ({})",
        event.node(),
        event.tween(),
        event.id().unwrap_or("-")
    )
}
