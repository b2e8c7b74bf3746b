use anyhow::{bail, Result};
use galacticwar::config::Config;
use galacticwar::dashboard::{Dashboard, ViewOutcome};
use galacticwar::gateway::HttpGateway;
use galacticwar::logging::{log, obj, v_num, v_str, Domain, Level};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let view = std::env::args().nth(1).unwrap_or_else(|| "overview".to_string());
    let watch_secs: u64 = std::env::var("WATCH_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("view", v_str(&view)),
            ("api_base", v_str(&cfg.api_base)),
            ("watch_secs", v_num(watch_secs as f64)),
        ]),
    );

    let gateway = HttpGateway::new(&cfg)?;
    let (dashboard, mut ticks) = Dashboard::new(gateway, &cfg);
    let outcome = dashboard.load_view(&view).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let ViewOutcome::Failed(err) = &outcome {
        bail!("{}: {}", err.message, err.detail);
    }

    if watch_secs > 0 && dashboard.registry().active_count() > 0 {
        let deadline = sleep(Duration::from_secs(watch_secs));
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                tick = ticks.recv() => match tick {
                    Some(tick) => println!("{}\t{}", tick.name, tick.state.display()),
                    None => break,
                },
            }
        }
    }

    let cancelled = dashboard.registry().cancel_all();
    log(
        Level::Info,
        Domain::System,
        "shutdown",
        obj(&[("cancelled_timers", v_num(cancelled as f64))]),
    );
    Ok(())
}
