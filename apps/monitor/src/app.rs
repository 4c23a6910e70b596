//! Application orchestrator: wires the session loop to the console.

use devlink_protocol::{Device, DeviceRequest, endpoint_url};
use devlink_session::SessionHandle;
use devlink_session::driver;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::render::ConsoleRenderer;

/// A line typed on stdin.
#[derive(Debug, Clone, PartialEq)]
enum Input {
    Refresh,
    Write(DeviceRequest),
    Quit,
}

/// Parses `r`, `w <channel> <value>` or `q` (long forms accepted).
fn parse_input(line: &str, device: Device) -> Option<Input> {
    let mut words = line.split_whitespace();
    match words.next()? {
        "r" | "refresh" => Some(Input::Refresh),
        "q" | "quit" => Some(Input::Quit),
        "w" | "write" => {
            let channel = words.next()?.parse().ok()?;
            let value = words.next()?.parse().ok()?;
            if words.next().is_some() {
                return None;
            }
            Some(Input::Write(DeviceRequest::write(device, channel, value)))
        }
        _ => None,
    }
}

/// Runs the monitor until Ctrl-C or `q`.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let url = endpoint_url(&config.host);
    tracing::info!(%url, device = %config.device, "connecting to device");

    let renderer = ConsoleRenderer::new(config.device);
    let (handle, join) = driver::spawn(url, renderer, config.session_config());
    let cancel = handle.cancel_token();

    tokio::spawn(read_commands(handle.clone(), config.device));

    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::info!("quit requested");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("SIGINT received, shutting down");
        }
    }

    handle.shutdown();
    let session = join.await?;
    session.renderer().log_summary();
    Ok(())
}

/// Forwards stdin commands to the session until stdin closes.
async fn read_commands(handle: SessionHandle, device: Device) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("stdin read failed: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let alive = match parse_input(&line, device) {
            Some(Input::Refresh) => handle.refresh().await,
            Some(Input::Write(request)) => handle.send(request.encode()).await,
            Some(Input::Quit) => {
                handle.shutdown();
                break;
            }
            None => {
                tracing::warn!(input = %line.trim(), "unknown command (r | w <ch> <val> | q)");
                true
            }
        };
        if !alive {
            break;
        }
    }
    tracing::debug!("command reader stopped");
}
