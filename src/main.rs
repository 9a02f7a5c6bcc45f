/*!
 * Harness - Demonstration Driver
 *
 * Runs a simulated launcher through the full handshake:
 * - loader ready, carrying the loader handle
 * - player joined
 * - game closed
 *
 * and drives a delegate runner and the exit decision against it.
 */

use anyhow::Context;
use readiness_signals::{
    init_tracing, HarnessResult, HarnessSettings, LaunchSession, ReadinessRegistry, SignalName,
    TimeoutPolicy,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Handle published by the simulated environment
#[derive(Debug, Clone)]
struct LoaderHandle {
    game_dir: PathBuf,
    generation: u32,
}

/// Stand-in for the runner built on the far side of the loader
struct DemoRunner {
    handle: LoaderHandle,
}

impl DemoRunner {
    fn run_test(&self, name: &str) -> bool {
        info!(test = name, generation = self.handle.generation, "running test");
        !name.is_empty()
    }
}

fn simulated_launcher(
    game_dir: PathBuf,
) -> impl FnOnce(Arc<ReadinessRegistry<LoaderHandle>>) -> HarnessResult<()> + Send + 'static {
    move |registry| {
        std::fs::create_dir_all(&game_dir)?;

        thread::sleep(Duration::from_millis(100));
        registry.complete_loader_ready(LoaderHandle {
            game_dir,
            generation: 1,
        })?;

        thread::sleep(Duration::from_millis(50));
        registry.complete(SignalName::PlayerJoined)?;

        // Stands in for the user closing the client window
        thread::sleep(Duration::from_millis(250));
        registry.complete(SignalName::GameClosed)?;
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Harness starting...");

    let settings = HarnessSettings::from_env().context("invalid harness settings")?;
    info!(
        game_dir = %settings.game_dir.display(),
        startup_timeout = settings.startup_timeout.category(),
        policy = settings.duplicate_policy.as_str(),
        "settings loaded"
    );

    let session = LaunchSession::start(simulated_launcher(settings.game_dir.clone()), settings)?;

    let runner = session.resolve_delegate(|handle| {
        info!(game_dir = %handle.game_dir.display(), "loader ready, building delegate");
        Ok(DemoRunner {
            handle: handle.clone(),
        })
    });

    let runner = match runner {
        Ok(runner) => runner,
        Err(err) => {
            for init_err in session.initialization_errors() {
                warn!(error = %init_err, "initialization error");
            }
            session.status().mark_aborted();
            session.shutdown_coordinator().run(|| Ok(()))?;
            return Err(err.into());
        }
    };

    let join_deadline = TimeoutPolicy::default_join().deadline_from(Instant::now());
    session
        .registry()
        .wait_until(SignalName::PlayerJoined, join_deadline)
        .context("player never joined")?;

    for test in ["joins_world", "places_block", "reads_chat"] {
        session.status().record(runner.run_test(test));
    }

    let action = session.shutdown_coordinator().run(|| {
        info!("client closed");
        Ok(())
    })?;
    info!(?action, summary = ?session.status().summary(), "shutdown complete");

    session.join()?;
    info!(snapshot = %session.registry().snapshot().to_json()?, "final registry state");

    Ok(())
}
