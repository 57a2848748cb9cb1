use std::time::Duration;

use anyhow::{Result, bail};
use rune_config::RuneConfig;
use rune_transit::{Coordinator, ItemId, ItemProperty, SimulatedTweens, TweenDriver};

const FRAME: Duration = Duration::from_millis(16);
const MAX_FRAMES: u32 = 10_000;

/// A scripted set of list mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scenario {
    /// Removals, a move, a replacement and insertions in one change set.
    Shuffle,
    /// A list filling up from empty.
    Fill,
    /// A change set interrupted halfway by a new mutation.
    Interrupt,
    /// A row swiped off screen, with the rows below closing the gap.
    Swipe,
}

impl Scenario {
    fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "shuffle" => Self::Shuffle,
            "fill" => Self::Fill,
            "interrupt" => Self::Interrupt,
            "swipe" => Self::Swipe,
            other => {
                bail!("unknown scenario '{other}' (expected shuffle, fill, interrupt or swipe)")
            }
        })
    }

    fn from_env() -> Result<Self> {
        let arg = std::env::args().find_map(|a| a.strip_prefix("--scenario=").map(str::to_owned));
        match arg.or_else(|| std::env::var("DEMO_SCENARIO").ok()) {
            Some(name) => Self::parse(&name),
            None => Ok(Self::Shuffle),
        }
    }
}

fn apply(scenario: Scenario, coordinator: &mut Coordinator<SimulatedTweens>) -> Result<()> {
    match scenario {
        Scenario::Shuffle => {
            // Rows are 48px tall; row 1 goes away and row 3 slides up.
            coordinator.notify_remove(ItemId(1));
            coordinator.notify_reposition(ItemId(3), 0.0, 144.0, 0.0, 96.0);
            coordinator.notify_replace(Some(ItemId(4)), Some(ItemId(14)), 0.0, 192.0, 0.0, 144.0);
            coordinator.notify_insert(ItemId(5));
            coordinator.run_pending_animations();
            play(coordinator)
        }
        Scenario::Fill => {
            for id in 1..=4 {
                coordinator.notify_insert(ItemId(id));
            }
            coordinator.run_pending_animations();
            play(coordinator)
        }
        Scenario::Interrupt => {
            coordinator.notify_remove(ItemId(1));
            coordinator.notify_reposition(ItemId(2), 0.0, 96.0, 0.0, 48.0);
            coordinator.run_pending_animations();
            for _ in 0..10 {
                step(coordinator)?;
            }
            log::info!(
                "interrupting: item 2 drawn at translation_y={}",
                coordinator
                    .driver()
                    .value(ItemId(2), ItemProperty::TranslationY)
            );
            coordinator.notify_reposition(ItemId(2), 0.0, 48.0, 0.0, 0.0);
            coordinator.run_pending_animations();
            play(coordinator)
        }
        Scenario::Swipe => {
            // The swipe gesture left row 2 most of the way off a 360px wide list.
            coordinator
                .driver_mut()
                .set_immediate_property(ItemId(2), ItemProperty::TranslationX, 341.5);
            coordinator.notify_swipe_dismiss(ItemId(2));
            for (row, y) in [(3, 144.0), (4, 192.0)] {
                coordinator.notify_reposition(ItemId(row), 0.0, y, 0.0, y - 48.0);
            }
            coordinator.run_pending_animations();
            play(coordinator)
        }
    }
}

/// Print pending events as JSON lines stamped with the coordinator clock.
fn flush(coordinator: &mut Coordinator<SimulatedTweens>) -> Result<()> {
    let at = coordinator.now().as_millis();
    for event in coordinator.drain_events() {
        println!("{at:>5} ms {}", serde_json::to_string(&event)?);
    }
    Ok(())
}

fn step(coordinator: &mut Coordinator<SimulatedTweens>) -> Result<()> {
    coordinator.step(FRAME);
    flush(coordinator)
}

fn play(coordinator: &mut Coordinator<SimulatedTweens>) -> Result<()> {
    flush(coordinator)?;
    let mut frames = 0;
    while coordinator.is_running() {
        if frames == MAX_FRAMES {
            bail!("transitions still running after {MAX_FRAMES} frames");
        }
        step(coordinator)?;
        frames += 1;
    }
    log::info!("settled after {frames} frames ({:?})", coordinator.now());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let config = RuneConfig::load();
    let scenario = Scenario::from_env()?;
    log::info!("running {scenario:?} with {:?}", config.transitions);

    let mut coordinator = Coordinator::from_config(SimulatedTweens::new(), &config);
    apply(scenario, &mut coordinator)
}
